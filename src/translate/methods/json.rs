use std::sync::Arc;

use crate::{
    ast::SourceType,
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::{PgOperator, SqlExpression},
    translate::{MethodCallTranslator, Translation, propagates},
    type_mapping::TypeMapping,
};

/// `EF.Functions.JsonXxx`: containment, key existence and `json[b]_typeof`.
#[derive(Debug)]
pub struct JsonDbFunctionsTranslator {
    factory: Arc<PgSqlExpressionFactory>,
    jsonb_mapping: Option<TypeMapping>,
}

impl JsonDbFunctionsTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        let jsonb_mapping = factory.type_mapping_source().find_mapping_by_store_type("jsonb");
        Self {
            factory,
            jsonb_mapping,
        }
    }

    /// Operands that are not already JSON are taken to be jsonb text.
    fn as_json(&self, operand: &SqlExpression) -> SqlExpression {
        let is_json = matches!(operand, SqlExpression::JsonTraversal(_))
            || operand.type_mapping().is_some_and(|m| m.is_json());
        if is_json {
            return operand.clone();
        }
        match operand.type_mapping() {
            None => self.factory.apply_type_mapping(operand.clone(), self.jsonb_mapping.as_ref()),
            Some(_) => self
                .factory
                .convert(operand.clone(), SourceType::String, self.jsonb_mapping.clone()),
        }
    }
}

impl MethodCallTranslator for JsonDbFunctionsTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        use KnownMethod as K;
        let f = &self.factory;
        let known = KnownMethod::identify(method)?;
        let operator = |operator, left: &SqlExpression, right: &SqlExpression| {
            f.pg_binary(operator, left.clone(), right.clone(), None, None)
        };

        Some(match (known, arguments) {
            (K::JsonContains, [_, json, contained]) => {
                operator(PgOperator::Contains, &self.as_json(json), &self.as_json(contained))
            }
            (K::JsonContained, [_, contained, json]) => {
                operator(PgOperator::ContainedBy, &self.as_json(contained), &self.as_json(json))
            }
            (K::JsonExists, [_, json, key]) => operator(PgOperator::JsonExists, &self.as_json(json), key),
            (K::JsonExistAny, [_, json, keys]) => {
                operator(PgOperator::JsonExistsAny, &self.as_json(json), keys)
            }
            (K::JsonExistAll, [_, json, keys]) => {
                operator(PgOperator::JsonExistsAll, &self.as_json(json), keys)
            }
            (K::JsonTypeof, [_, json]) => {
                let json = self.as_json(json);
                let jsonb = json.type_mapping().is_none_or(|m| m.is_jsonb())
                    || matches!(&json, SqlExpression::JsonTraversal(t)
                        if t.expression.type_mapping().is_some_and(|m| m.is_jsonb()));
                let name = if jsonb { "jsonb_typeof" } else { "json_typeof" };
                f.function(name, vec![json], true, propagates(1), SourceType::String, None)
            }
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::translate::methods::test_support::{column, db_functions, factory, string};

    #[test]
    fn contains_casts_text_to_jsonb() {
        let f = factory();
        let t = JsonDbFunctionsTranslator::new(f.clone());
        let doc = column(&f, "doc", SourceType::String, Some("jsonb"));
        let needle = string(&f, r#"{"a": 1}"#);
        let SqlExpression::PgBinary(contains) = t
            .translate(
                None,
                &KnownMethod::JsonContains.method(),
                &[db_functions(&f), doc, needle],
                &DiagnosticsLogger,
            )
            .unwrap()
        else {
            panic!("expected @>");
        };
        assert_eq!(contains.operator, PgOperator::Contains);
        assert!(matches!(*contains.right, SqlExpression::Convert(_)));
        assert_eq!(contains.right.type_mapping().unwrap().store_type, "jsonb");
    }

    #[test]
    fn typeof_follows_the_column_type() {
        let f = factory();
        let t = JsonDbFunctionsTranslator::new(f.clone());
        let doc = column(&f, "doc", SourceType::String, Some("json"));
        let sql = t
            .translate(None, &KnownMethod::JsonTypeof.method(), &[db_functions(&f), doc], &DiagnosticsLogger)
            .unwrap();
        assert_eq!(sql.as_function().unwrap().name, "json_typeof");
    }
}
