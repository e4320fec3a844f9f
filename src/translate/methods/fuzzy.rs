use std::sync::Arc;

use crate::{
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation, propagates},
};

/// The fuzzystrmatch extension.
#[derive(Debug)]
pub struct FuzzyStringMatchMethodTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl FuzzyStringMatchMethodTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

impl MethodCallTranslator for FuzzyStringMatchMethodTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        use KnownMethod as K;
        let name = match KnownMethod::identify(method)? {
            K::FuzzyStringMatchSoundex => "soundex",
            K::FuzzyStringMatchDifference => "difference",
            K::FuzzyStringMatchLevenshtein => "levenshtein",
            K::FuzzyStringMatchMetaphone => "metaphone",
            K::FuzzyStringMatchDoubleMetaphone => "dmetaphone",
            _ => return None,
        };
        // skip the EF.Functions receiver
        let arguments = arguments.get(1..)?.to_vec();
        let n = arguments.len();
        Some(self.factory.function(
            name,
            arguments,
            true,
            propagates(n),
            method.return_type.clone(),
            None,
        ))
    }
}
