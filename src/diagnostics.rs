use std::fmt::Display;

use crate::methods::MethodInfo;

pub const QUERY_TARGET: &str = "pg_expr::query";

/// Non-fatal diagnostics emitted during translation.
///
/// Nothing here feeds back into control flow. A translator declining a call is
///  the normal case and is logged at `debug` at most.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticsLogger;

impl DiagnosticsLogger {
    pub fn translated(&self, translator: &str, method: &MethodInfo) {
        log::trace!(
            target: QUERY_TARGET,
            "{translator} translated {:?}.{}",
            method.declaring_type(),
            method.name()
        );
    }

    pub fn no_translator(&self, method: &MethodInfo) {
        log::debug!(
            target: QUERY_TARGET,
            "no translator for {:?}.{}/{}",
            method.declaring_type(),
            method.name(),
            method.parameter_count()
        );
    }

    pub fn rewritten(&self, rule: impl Display) {
        log::trace!(target: QUERY_TARGET, "rewrote {rule}");
    }

    pub fn untranslatable(&self, what: impl Display) {
        log::debug!(target: QUERY_TARGET, "could not translate {what}");
    }
}
