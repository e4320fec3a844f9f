use std::sync::Arc;

use crate::{
    ast::Value,
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation},
};

/// `EF.Functions.Like` and `ILike`.
#[derive(Debug)]
pub struct LikeTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl LikeTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

impl MethodCallTranslator for LikeTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        use KnownMethod as K;
        let f = &self.factory;
        let case_insensitive = match KnownMethod::identify(method)? {
            K::Like | K::LikeWithEscape => false,
            K::ILike | K::ILikeWithEscape => true,
            _ => return None,
        };
        let (match_expression, pattern, escape) = match arguments {
            [_, m, p, e] => (m, p, e.clone()),
            // PostgreSQL escapes with a backslash unless told otherwise
            [_, m, p] => (m, p, f.constant(Value::String(String::new()), None)),
            _ => return None,
        };
        Some(f.like(match_expression.clone(), pattern.clone(), Some(escape), case_insensitive))
    }
}
