//! Methods over PostgreSQL arrays, and over JSON arrays where the receiver is
//!  a JSON document.

use std::sync::Arc;

use crate::{
    ast::{SourceType, Value},
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{DeclaringType, KnownMethod, MethodInfo},
    sql::{AnyOperatorType, SqlExpression},
    translate::{MethodCallTranslator, Translation, json::JsonPocoTranslator, propagates},
};

#[derive(Debug)]
pub struct ArrayTranslator {
    factory: Arc<PgSqlExpressionFactory>,
    json: JsonPocoTranslator,
    use_redshift: bool,
}

impl ArrayTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>, json: JsonPocoTranslator, use_redshift: bool) -> Self {
        Self {
            factory,
            json,
            use_redshift,
        }
    }

    fn function(&self, name: &str, arguments: Vec<SqlExpression>, ty: SourceType) -> SqlExpression {
        let n = arguments.len();
        self.factory.function(name, arguments, true, propagates(n), ty, None)
    }

    fn cardinality(&self, array: &SqlExpression) -> SqlExpression {
        self.json
            .translate_array_length(array)
            .unwrap_or_else(|| self.function("cardinality", vec![array.clone()], SourceType::Int))
    }

    fn element_at(&self, array: &SqlExpression, index: &SqlExpression, return_type: &SourceType) -> Translation {
        if is_json(array) {
            return self.json.translate_member_access(array, index, return_type);
        }
        let f = &self.factory;
        Some(f.array_index(array.clone(), f.generate_one_based_index(index.clone()), true))
    }

    /// `COALESCE(array_position(array, item) - 1, -1)`
    fn index_of(&self, array: &SqlExpression, item: &SqlExpression) -> Translation {
        if self.use_redshift {
            return None;
        }
        let f = &self.factory;
        let int = Some(f.int_mapping().clone());
        let position = f.function(
            "array_position",
            vec![array.clone(), item.clone()],
            true,
            vec![true, false],
            SourceType::Int,
            int.clone(),
        );
        let zero_based = f.subtract(position, f.constant(Value::Int(1), int.clone()), int.clone())?;
        Some(f.coalesce(zero_based, f.constant(Value::Int(-1), int.clone()), int))
    }
}

fn is_json(expression: &SqlExpression) -> bool {
    matches!(expression, SqlExpression::JsonTraversal(_))
        || expression.type_mapping().is_some_and(|m| m.is_json())
}

fn is_array(expression: &SqlExpression) -> bool {
    expression.ty().unwrap_nullable().is_array_or_generic_list()
}

impl MethodCallTranslator for ArrayTranslator {
    fn translate(
        &self,
        instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        use KnownMethod as K;
        let f = &self.factory;
        let known = KnownMethod::identify(method);

        if known == Some(K::StringJoin) {
            let [separator, array] = arguments else {
                return None;
            };
            if !is_array(array) || is_json(array) {
                return None;
            }
            let empty = f.constant(Value::String(String::new()), None);
            return Some(f.function(
                "array_to_string",
                vec![array.clone(), separator.clone(), empty],
                true,
                vec![true, false, false],
                SourceType::String,
                None,
            ));
        }

        // Extension methods receive the array first, list methods as the instance.
        let (array, rest) = match (instance, arguments) {
            (Some(list), rest) if method.declaring_type() == DeclaringType::List => (list, rest),
            (None, [array, rest @ ..]) => (array, rest),
            _ => return None,
        };
        if !is_array(array) && !is_json(array) {
            return None;
        }
        if array.type_mapping().is_some_and(|m| m.is_byte_array()) {
            return None;
        }

        if method.declaring_type() == DeclaringType::List {
            return match (method.name(), rest) {
                ("get_Item", [index]) => self.element_at(array, index, &method.return_type),
                ("Contains", [item]) if !is_json(array) => {
                    Some(f.any(item.clone(), array.clone(), AnyOperatorType::Equal))
                }
                ("IndexOf", [item]) if !is_json(array) => self.index_of(array, item),
                ("get_Count", []) => Some(self.cardinality(array)),
                _ => None,
            };
        }

        match (known?, rest) {
            (K::EnumerableCountWithoutPredicate, []) => Some(self.cardinality(array)),
            (K::EnumerableElementAt, [index]) => self.element_at(array, index, &method.return_type),
            _ if is_json(array) => None,
            (K::EnumerableContains, [item]) => {
                Some(f.any(item.clone(), array.clone(), AnyOperatorType::Equal))
            }
            (K::EnumerableAnyWithoutPredicate, []) => {
                let length = self.cardinality(array);
                Some(f.greater_than(length, f.constant(Value::Int(0), None)))
            }
            (K::EnumerableSequenceEqual, [other]) if is_array(other) => {
                Some(f.equal(array.clone(), other.clone()))
            }
            (K::EnumerableAppend, [item]) => Some(f.function(
                "array_append",
                vec![array.clone(), item.clone()],
                true,
                vec![true, false],
                array.ty().clone(),
                array.type_mapping().cloned(),
            )),
            (K::EnumerableConcat, [other]) if is_array(other) => Some(f.function(
                "array_cat",
                vec![array.clone(), other.clone()],
                true,
                vec![false, false],
                array.ty().clone(),
                array.type_mapping().cloned(),
            )),
            (K::ArrayIndexOf, [item]) => self.index_of(array, item),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::translate::methods::test_support::{column, factory};

    fn translator(use_redshift: bool) -> ArrayTranslator {
        let f = factory();
        ArrayTranslator::new(f.clone(), JsonPocoTranslator::new(f), use_redshift)
    }

    fn ints() -> SourceType {
        SourceType::Array(Box::new(SourceType::Int))
    }

    #[test]
    fn contains_becomes_any() {
        let t = translator(false);
        let array = column(&t.factory, "ints", ints(), None);
        let item = t.factory.constant(Value::Int(3), None);
        let method = KnownMethod::EnumerableContains.instantiate(vec![SourceType::Int]);
        let sql = t
            .translate(None, &method, &[array, item], &DiagnosticsLogger)
            .unwrap();
        let SqlExpression::Any(any) = sql else {
            panic!("expected ANY");
        };
        assert_eq!(any.operator_type, AnyOperatorType::Equal);
        assert_eq!(any.array.type_mapping().unwrap().store_type, "integer[]");
    }

    #[test]
    fn element_at_is_one_based() {
        let t = translator(false);
        let array = column(&t.factory, "ints", ints(), None);
        let index = t.factory.constant(Value::Int(0), None);
        let method = KnownMethod::EnumerableElementAt.instantiate(vec![SourceType::Int]);
        let sql = t
            .translate(None, &method, &[array, index], &DiagnosticsLogger)
            .unwrap();
        let SqlExpression::ArrayIndex(ix) = sql else {
            panic!("expected a subscript");
        };
        assert_eq!(ix.index.as_constant(), Some(&Value::Int(1)));
        assert_eq!(ix.ty, SourceType::Int);
    }

    #[test]
    fn index_of_is_not_translated_on_redshift() {
        let method = KnownMethod::ArrayIndexOf.instantiate(vec![SourceType::Int]);
        for (redshift, expected) in [(false, true), (true, false)] {
            let t = translator(redshift);
            let array = column(&t.factory, "ints", ints(), None);
            let item = t.factory.constant(Value::Int(3), None);
            let sql = t.translate(None, &method, &[array, item], &DiagnosticsLogger);
            assert_eq!(sql.is_some(), expected);
            if let Some(sql) = sql {
                assert_eq!(sql.as_function().unwrap().name, "COALESCE");
            }
        }
    }

    #[test]
    fn declines_bytea_receivers() {
        let t = translator(false);
        let bytes = column(&t.factory, "bytes", SourceType::byte_array(), None);
        let method = KnownMethod::EnumerableCountWithoutPredicate.instantiate(vec![SourceType::Byte]);
        assert_eq!(t.translate(None, &method, &[bytes], &DiagnosticsLogger), None);
    }

    #[test]
    fn string_join_uses_array_to_string() {
        let t = translator(false);
        let strings = SourceType::Array(Box::new(SourceType::String));
        let array = column(&t.factory, "tags", strings, None);
        let separator = t.factory.constant(Value::String(", ".into()), None);
        let sql = t
            .translate(None, &KnownMethod::StringJoin.method(), &[separator, array], &DiagnosticsLogger)
            .unwrap();
        let function = sql.as_function().unwrap();
        assert_eq!(function.name, "array_to_string");
        assert_eq!(function.arguments.len(), 3);
    }
}
