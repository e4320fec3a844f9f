//! Traversal into JSON columns mapped to user types.

use std::sync::Arc;

use super::{Translation, propagates};
use crate::{
    ast::SourceType,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    sql::{JsonTraversalExpression, SqlExpression},
};

#[derive(Debug, Clone)]
pub struct JsonPocoTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl JsonPocoTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }

    /// Member or element access on a JSON column or on an earlier traversal.
    ///  The first access on a column starts a traversal, later ones extend its
    ///  path.
    pub fn translate_member_access(
        &self,
        instance: &SqlExpression,
        member: &SqlExpression,
        return_type: &SourceType,
    ) -> Translation {
        let f = &self.factory;
        match instance {
            SqlExpression::Column(column)
                if column.type_mapping.as_ref().is_some_and(|m| m.is_json()) =>
            {
                let traversal = JsonTraversalExpression {
                    expression: Box::new(instance.clone()),
                    path: vec![f.apply_default_type_mapping(member.clone())],
                    returns_text: true,
                    ty: SourceType::String,
                    type_mapping: f.find_mapping(&SourceType::String),
                };
                Some(self.convert_from_text(traversal, return_type))
            }
            SqlExpression::JsonTraversal(previous) => {
                let mut traversal = previous.clone();
                traversal.path.push(f.apply_default_type_mapping(member.clone()));
                traversal.returns_text = true;
                traversal.ty = SourceType::String;
                traversal.type_mapping = f.find_mapping(&SourceType::String);
                Some(self.convert_from_text(traversal, return_type))
            }
            _ => None,
        }
    }

    /// `json[b]_array_length` over a JSON column or traversal.
    pub fn translate_array_length(&self, expression: &SqlExpression) -> Translation {
        let (argument, jsonb) = match expression {
            SqlExpression::Column(column) => {
                let mapping = column.type_mapping.as_ref().filter(|m| m.is_json())?;
                (expression.clone(), mapping.is_jsonb())
            }
            SqlExpression::JsonTraversal(traversal) => {
                let jsonb = traversal.expression.type_mapping().is_some_and(|m| m.is_jsonb());
                let mut traversal = traversal.clone();
                traversal.returns_text = false;
                traversal.type_mapping = traversal.expression.type_mapping().cloned();
                (SqlExpression::JsonTraversal(traversal), jsonb)
            }
            _ => return None,
        };
        let name = if jsonb { "jsonb_array_length" } else { "json_array_length" };
        Some(self.factory.function(
            name,
            vec![argument],
            true,
            propagates(1),
            SourceType::Int,
            None,
        ))
    }

    /// Text traversals yield strings; scalars are cast from the text, and
    ///  anything structured stays JSON.
    fn convert_from_text(
        &self,
        mut traversal: JsonTraversalExpression,
        return_type: &SourceType,
    ) -> SqlExpression {
        let f = &self.factory;
        let return_type = return_type.unwrap_nullable();
        if *return_type == SourceType::String {
            return SqlExpression::JsonTraversal(traversal);
        }
        let structured = matches!(
            return_type,
            SourceType::Poco(_)
                | SourceType::Array(_)
                | SourceType::List(_)
                | SourceType::Object
        );
        if structured {
            traversal.returns_text = false;
            traversal.ty = return_type.clone();
            traversal.type_mapping = traversal.expression.type_mapping().cloned();
            return SqlExpression::JsonTraversal(traversal);
        }
        f.convert(SqlExpression::JsonTraversal(traversal), return_type.clone(), None)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ast::Value, sql::ColumnExpression, type_mapping::PgTypeMappingSource};

    fn translator() -> JsonPocoTranslator {
        JsonPocoTranslator::new(Arc::new(
            PgSqlExpressionFactory::new(Arc::new(PgTypeMappingSource::new())).unwrap(),
        ))
    }

    fn customer(f: &PgSqlExpressionFactory) -> SqlExpression {
        SqlExpression::Column(ColumnExpression {
            table: Some("c".into()),
            name: "customer".into(),
            ty: SourceType::Poco("Customer".into()),
            type_mapping: f.find_mapping(&SourceType::Poco("Customer".into())),
            nullable: true,
        })
    }

    #[test]
    fn nested_access_extends_the_path() {
        let t = translator();
        let column = customer(&t.factory);
        let orders_ty = SourceType::Array(Box::new(SourceType::Poco("Order".into())));
        let orders = t
            .translate_member_access(&column, &t.factory.constant(Value::String("Orders".into()), None), &orders_ty)
            .unwrap();
        let SqlExpression::JsonTraversal(first) = &orders else {
            panic!("expected a traversal");
        };
        assert!(!first.returns_text);

        let price = t
            .translate_member_access(&orders, &t.factory.constant(Value::Int(0), None), &SourceType::Int)
            .unwrap();
        let SqlExpression::Convert(convert) = price else {
            panic!("scalar access is cast from text");
        };
        let SqlExpression::JsonTraversal(inner) = *convert.operand else {
            panic!("expected a traversal");
        };
        assert_eq!(inner.path.len(), 2);
        assert!(inner.returns_text);
    }

    #[test]
    fn array_length_uses_the_jsonb_function() {
        let t = translator();
        let length = t.translate_array_length(&customer(&t.factory)).unwrap();
        assert_eq!(length.as_function().unwrap().name, "jsonb_array_length");

        let plain = t.factory.constant(Value::Int(1), None);
        assert_eq!(t.translate_array_length(&plain), None);
    }
}
