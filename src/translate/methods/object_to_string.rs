use std::sync::Arc;

use crate::{
    ast::{SourceType, Value},
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::MethodInfo,
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation},
};

/// `x.ToString()` for scalar types, as a cast to text. A null receiver gives
///  the empty string, as it does in memory.
#[derive(Debug)]
pub struct ObjectToStringTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl ObjectToStringTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

fn is_supported(ty: &SourceType) -> bool {
    use SourceType as T;
    ty.is_numeric()
        || matches!(
            ty,
            T::Bool
                | T::Char
                | T::Guid
                | T::DateTime
                | T::DateTimeOffset
                | T::DateOnly
                | T::TimeOnly
                | T::TimeSpan
        )
}

impl MethodCallTranslator for ObjectToStringTranslator {
    fn translate(
        &self,
        instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        if method.name() != "ToString" || !arguments.is_empty() {
            return None;
        }
        let instance = instance?;
        let ty = instance.ty();
        if *ty.unwrap_nullable() == SourceType::String {
            return Some(instance.clone());
        }
        if !is_supported(ty.unwrap_nullable()) {
            return None;
        }
        let f = &self.factory;
        let text = f.convert(instance.clone(), SourceType::String, None);
        if !matches!(ty, SourceType::Nullable(_)) {
            return Some(text);
        }
        let empty = f.constant(Value::String(String::new()), None);
        Some(f.coalesce(text, empty, None))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        methods::DeclaringType,
        translate::methods::test_support::{column, factory},
    };

    fn to_string() -> MethodInfo {
        MethodInfo::new_instance(DeclaringType::Object, "ToString", vec![], SourceType::String)
    }

    #[test]
    fn casts_scalars_to_text() {
        let f = factory();
        let t = ObjectToStringTranslator::new(f.clone());
        let id = column(&f, "id", SourceType::Int, None);
        let sql = t.translate(Some(&id), &to_string(), &[], &DiagnosticsLogger).unwrap();
        assert!(matches!(sql, SqlExpression::Convert(_)));
        assert_eq!(sql.type_mapping().unwrap().store_type, "text");
    }

    #[test]
    fn nullable_receivers_coalesce_to_empty() {
        let f = factory();
        let t = ObjectToStringTranslator::new(f.clone());
        let id = column(&f, "id", SourceType::nullable(SourceType::Int), None);
        let sql = t.translate(Some(&id), &to_string(), &[], &DiagnosticsLogger).unwrap();
        assert_eq!(sql.as_function().unwrap().name, "COALESCE");
    }

    #[test]
    fn enums_are_declined() {
        let f = factory();
        let t = ObjectToStringTranslator::new(f.clone());
        let status = SourceType::Enum {
            name: "Status".into(),
            underlying: Box::new(SourceType::Int),
        };
        let status = column(&f, "status", status, None);
        assert_eq!(t.translate(Some(&status), &to_string(), &[], &DiagnosticsLogger), None);
    }
}
