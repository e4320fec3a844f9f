use std::sync::Arc;

use crate::{
    ast::{SourceType, Value},
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation, propagates},
};

/// `Contains` and `First` over columns mapped to `bytea`. Byte arrays mapped
///  any other way are left to the array translator.
#[derive(Debug)]
pub struct ByteArrayMethodTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl ByteArrayMethodTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

impl MethodCallTranslator for ByteArrayMethodTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        if !method.is_generic_method() {
            return None;
        }
        let source = arguments.first()?;
        let mapping = source.type_mapping().filter(|m| m.is_byte_array())?.clone();
        let f = &self.factory;

        match (KnownMethod::identify(method)?, arguments) {
            (KnownMethod::EnumerableContains, [_, needle]) => {
                // position() wants a bytea needle, not a byte
                let needle = match needle.as_constant() {
                    Some(value) => {
                        let byte = u8::try_from(value.as_i64()?).ok()?;
                        f.constant(Value::Bytes(vec![byte]), Some(mapping))
                    }
                    None => f.function(
                        "set_byte",
                        vec![
                            f.constant(Value::Bytes(vec![0]), Some(mapping.clone())),
                            f.constant(Value::Int(0), None),
                            needle.clone(),
                        ],
                        true,
                        propagates(3),
                        SourceType::byte_array(),
                        Some(mapping),
                    ),
                };
                let position = f.function_with_argument_separators(
                    "position",
                    vec![needle, source.clone()],
                    vec![Some("IN".into())],
                    true,
                    propagates(2),
                    SourceType::Int,
                    None,
                );
                Some(f.greater_than(position, f.constant(Value::Int(0), None)))
            }
            (KnownMethod::EnumerableFirstWithoutPredicate, [_]) => {
                let byte = f.function(
                    "get_byte",
                    vec![source.clone(), f.constant(Value::Int(0), None)],
                    true,
                    propagates(2),
                    SourceType::Byte,
                    None,
                );
                Some(f.convert(byte, method.return_type.clone(), None))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        sql::{SqlBinaryOperator, SqlParameter},
        translate::methods::test_support::{column, factory},
    };

    fn contains() -> MethodInfo {
        KnownMethod::EnumerableContains.instantiate(vec![SourceType::Byte])
    }

    #[test]
    fn constant_needle_is_folded_into_a_bytea_literal() {
        let f = factory();
        let t = ByteArrayMethodTranslator::new(f.clone());
        let bytes = column(&f, "bytes", SourceType::byte_array(), None);
        let needle = f.constant(Value::Byte(7), None);
        let SqlExpression::Binary(gt) = t
            .translate(None, &contains(), &[bytes, needle], &DiagnosticsLogger)
            .unwrap()
        else {
            panic!("expected a comparison");
        };
        assert_eq!(gt.operator, SqlBinaryOperator::GreaterThan);
        let position = gt.left.as_function().unwrap();
        assert_eq!(position.name, "position");
        assert_eq!(position.argument_separators, Some(vec![Some("IN".to_string())]));
        assert_eq!(position.arguments[0].as_constant(), Some(&Value::Bytes(vec![7])));
    }

    #[test]
    fn parameter_needle_goes_through_set_byte() {
        let f = factory();
        let t = ByteArrayMethodTranslator::new(f.clone());
        let bytes = column(&f, "bytes", SourceType::byte_array(), None);
        let needle = SqlExpression::Parameter(SqlParameter {
            name: "b".into(),
            ty: SourceType::Byte,
            type_mapping: None,
            nullable: false,
        });
        let SqlExpression::Binary(gt) = t
            .translate(None, &contains(), &[bytes, needle], &DiagnosticsLogger)
            .unwrap()
        else {
            panic!("expected a comparison");
        };
        let position = gt.left.as_function().unwrap();
        let set_byte = position.arguments[0].as_function().unwrap();
        assert_eq!(set_byte.name, "set_byte");
        assert_eq!(set_byte.type_mapping.as_ref().unwrap().store_type, "bytea");
    }

    #[test]
    fn first_reads_the_first_byte() {
        let f = factory();
        let t = ByteArrayMethodTranslator::new(f.clone());
        let bytes = column(&f, "bytes", SourceType::byte_array(), None);
        let first = KnownMethod::EnumerableFirstWithoutPredicate.instantiate(vec![SourceType::Byte]);
        let SqlExpression::Convert(convert) =
            t.translate(None, &first, &[bytes], &DiagnosticsLogger).unwrap()
        else {
            panic!("expected a cast");
        };
        assert_eq!(convert.operand.as_function().unwrap().name, "get_byte");
    }

    #[test]
    fn smallint_arrays_are_not_bytea() {
        let f = factory();
        let t = ByteArrayMethodTranslator::new(f.clone());
        let bytes = column(&f, "bytes", SourceType::byte_array(), Some("smallint[]"));
        let needle = f.constant(Value::Byte(7), None);
        assert_eq!(t.translate(None, &contains(), &[bytes, needle], &DiagnosticsLogger), None);
    }
}
