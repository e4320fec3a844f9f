use std::sync::Arc;

use crate::{
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::{SqlBinaryOperator, SqlExpression},
    translate::{MethodCallTranslator, Translation},
};

/// `EF.Functions.GreaterThan((a, b), (c, d))` and friends: lexicographic
///  comparison of row values of the same width.
#[derive(Debug)]
pub struct RowValueTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl RowValueTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

impl MethodCallTranslator for RowValueTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        use KnownMethod as K;
        let operator = match KnownMethod::identify(method)? {
            K::RowValueGreaterThan => SqlBinaryOperator::GreaterThan,
            K::RowValueGreaterThanOrEqual => SqlBinaryOperator::GreaterThanOrEqual,
            K::RowValueLessThan => SqlBinaryOperator::LessThan,
            K::RowValueLessThanOrEqual => SqlBinaryOperator::LessThanOrEqual,
            _ => return None,
        };
        let [_, SqlExpression::RowValue(left), SqlExpression::RowValue(right)] = arguments else {
            return None;
        };
        if left.values.len() != right.values.len() {
            return None;
        }
        self.factory.make_binary(
            operator,
            SqlExpression::RowValue(left.clone()),
            SqlExpression::RowValue(right.clone()),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ast::{SourceType, Value},
        translate::methods::test_support::{column, db_functions, factory},
    };

    #[test]
    fn compares_rows_of_equal_width() {
        let f = factory();
        let t = RowValueTranslator::new(f.clone());
        let pair = SourceType::Tuple(vec![SourceType::Int, SourceType::String]);
        let left = f.row_value(
            vec![column(&f, "a", SourceType::Int, None), column(&f, "b", SourceType::String, None)],
            pair.clone(),
        );
        let right = f.row_value(
            vec![f.constant(Value::Int(1), None), f.constant(Value::String("x".into()), None)],
            pair,
        );
        let method = KnownMethod::RowValueLessThan.method();
        let SqlExpression::Binary(cmp) = t
            .translate(None, &method, &[db_functions(&f), left.clone(), right], &DiagnosticsLogger)
            .unwrap()
        else {
            panic!("expected a comparison");
        };
        assert_eq!(cmp.operator, SqlBinaryOperator::LessThan);

        let narrow = f.row_value(vec![f.constant(Value::Int(1), None)], SourceType::Tuple(vec![SourceType::Int]));
        assert_eq!(
            t.translate(None, &method, &[db_functions(&f), left, narrow], &DiagnosticsLogger),
            None
        );
    }
}
