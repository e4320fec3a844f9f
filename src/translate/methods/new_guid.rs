use std::sync::Arc;

use crate::{
    ast::SourceType,
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    options::ProviderOptions,
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation},
};

/// `Guid.NewGuid()`. PostgreSQL 13 has `gen_random_uuid()` built in; older
///  servers need the uuid-ossp extension.
#[derive(Debug)]
pub struct NewGuidTranslator {
    factory: Arc<PgSqlExpressionFactory>,
    function: &'static str,
}

impl NewGuidTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>, options: &ProviderOptions) -> Self {
        let function = if options.is_version_at_least(13, 0) {
            "gen_random_uuid"
        } else {
            "uuid_generate_v4"
        };
        Self { factory, function }
    }
}

impl MethodCallTranslator for NewGuidTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        _arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        if !method.is(KnownMethod::GuidNewGuid) {
            return None;
        }
        Some(self.factory.function(self.function, vec![], false, vec![], SourceType::Guid, None))
    }
}
