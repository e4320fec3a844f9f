use std::sync::Arc;

use crate::{
    ast::SourceType,
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{DeclaringType, MethodInfo},
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation},
};

const TARGETS: &[&str] = &[
    "ToBoolean",
    "ToByte",
    "ToDecimal",
    "ToDouble",
    "ToInt16",
    "ToInt32",
    "ToInt64",
    "ToString",
];

/// `Convert.ToXxx(value)` as a cast to the target's store type.
#[derive(Debug)]
pub struct ConvertTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl ConvertTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

fn is_supported_source(ty: &SourceType) -> bool {
    matches!(
        ty.unwrap_nullable(),
        SourceType::Bool
            | SourceType::Byte
            | SourceType::Decimal
            | SourceType::Double
            | SourceType::Float
            | SourceType::Short
            | SourceType::Int
            | SourceType::Long
            | SourceType::String
            | SourceType::Object
    )
}

impl MethodCallTranslator for ConvertTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        if method.declaring_type() != DeclaringType::Convert || !TARGETS.contains(&method.name()) {
            return None;
        }
        let [value] = arguments else {
            return None;
        };
        if !method.parameter_types().first().is_some_and(is_supported_source) {
            return None;
        }
        Some(self.factory.convert(value.clone(), method.return_type.clone(), None))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ast::Value, translate::methods::test_support::factory};

    #[test]
    fn to_int32_is_a_cast() {
        let f = factory();
        let t = ConvertTranslator::new(f.clone());
        let method = MethodInfo::new_static(
            DeclaringType::Convert,
            "ToInt32",
            vec![SourceType::String],
            SourceType::Int,
        );
        let sql = t
            .translate(None, &method, &[f.constant(Value::String("42".into()), None)], &DiagnosticsLogger)
            .unwrap();
        let SqlExpression::Convert(cast) = sql else {
            panic!("expected a cast");
        };
        assert_eq!(cast.type_mapping.unwrap().store_type, "integer");
    }

    #[test]
    fn unsupported_sources_are_declined() {
        let f = factory();
        let t = ConvertTranslator::new(f.clone());
        let method = MethodInfo::new_static(
            DeclaringType::Convert,
            "ToInt64",
            vec![SourceType::DateTime],
            SourceType::Long,
        );
        let now = f.typed_constant(Value::Null, SourceType::DateTime, None);
        assert_eq!(t.translate(None, &method, &[now], &DiagnosticsLogger), None);
    }
}
