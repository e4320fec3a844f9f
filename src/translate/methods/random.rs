use std::sync::Arc;

use crate::{
    ast::SourceType,
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation},
};

/// `EF.Functions.Random()`
#[derive(Debug)]
pub struct RandomTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl RandomTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

impl MethodCallTranslator for RandomTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        _arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        method
            .is(KnownMethod::Random)
            .then(|| self.factory.function("random", vec![], false, vec![], SourceType::Double, None))
    }
}
