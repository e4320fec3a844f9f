//! The base traversal strategy: literals, parameters, columns, plain operators
//!  and method calls dispatched to the translator registry.

use std::sync::Arc;

use super::{
    AggregateMethodCallTranslator, BaseTranslator, EnumerableExpression, MethodCallTranslator,
    Translation, TranslationContext, propagates,
    registry::{AggregateMethodCallTranslatorProvider, MethodCallTranslatorProvider},
};
use crate::{
    ast::{
        BinaryExpression, BinaryKind, Expression as E, MethodCallExpression, SourceType,
        UnaryExpression, UnaryKind, Value,
    },
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::{ColumnExpression, SqlBinaryOperator, SqlExpression, SqlParameter, SqlUnaryOperator},
};

pub struct RelationalTranslator {
    factory: Arc<PgSqlExpressionFactory>,
    method_call_translators: Arc<MethodCallTranslatorProvider>,
    aggregate_translators: Arc<AggregateMethodCallTranslatorProvider>,
}

impl RelationalTranslator {
    pub fn new(
        factory: Arc<PgSqlExpressionFactory>,
        method_call_translators: Arc<MethodCallTranslatorProvider>,
        aggregate_translators: Arc<AggregateMethodCallTranslatorProvider>,
    ) -> Self {
        Self {
            factory,
            method_call_translators,
            aggregate_translators,
        }
    }

    pub fn factory(&self) -> &Arc<PgSqlExpressionFactory> {
        &self.factory
    }

    pub fn method_call_translators(&self) -> &MethodCallTranslatorProvider {
        &self.method_call_translators
    }

    fn translate_property(
        &self,
        source: Option<&str>,
        property: &str,
        cx: &dyn TranslationContext,
    ) -> Translation {
        let Some(column) = cx.lookup_column(source, property) else {
            cx.logger().untranslatable(format_args!("unknown property {property}"));
            return None;
        };
        let mappings = self.factory.type_mapping_source();
        let type_mapping = match &column.store_type {
            Some(store_type) => mappings.find_mapping_for(&column.ty, store_type),
            None => mappings.find_mapping(&column.ty),
        };
        Some(SqlExpression::Column(ColumnExpression {
            table: column.table.or_else(|| source.map(str::to_string)),
            name: column.name,
            ty: column.ty,
            type_mapping,
            nullable: column.nullable,
        }))
    }

    fn translate_unary(&self, unary: &UnaryExpression, cx: &dyn TranslationContext) -> Translation {
        let operand = cx.translate(&unary.operand)?;
        let f = &self.factory;
        match unary.kind {
            UnaryKind::Not if *operand.ty().unwrap_nullable() == SourceType::Bool => {
                Some(f.not(operand))
            }
            UnaryKind::Not => None,
            UnaryKind::Negate => Some(f.unary(SqlUnaryOperator::Negate, operand)),
            UnaryKind::Convert | UnaryKind::ConvertChecked => {
                if is_representation_preserving(unary.operand.ty(), &unary.ty) {
                    return Some(operand);
                }
                Some(f.convert(operand, unary.ty.clone(), None))
            }
            UnaryKind::ArrayLength => Some(f.function(
                "cardinality",
                vec![operand],
                true,
                propagates(1),
                SourceType::Int,
                None,
            )),
        }
    }

    fn translate_binary(
        &self,
        binary: &BinaryExpression,
        cx: &dyn TranslationContext,
    ) -> Translation {
        let f = &self.factory;
        let is_null_constant =
            |e: &E| matches!(e, E::Constant(c) if c.value == Value::Null);

        // x == null, x != null
        if matches!(binary.kind, BinaryKind::Equal | BinaryKind::NotEqual) {
            let other = match (is_null_constant(&binary.left), is_null_constant(&binary.right)) {
                (true, false) => Some(&binary.right),
                (false, true) => Some(&binary.left),
                _ => None,
            };
            if let Some(other) = other {
                let operand = cx.translate(other)?;
                return Some(if binary.kind == BinaryKind::Equal {
                    f.is_null(operand)
                } else {
                    f.is_not_null(operand)
                });
            }
        }

        let left = cx.translate(&binary.left)?;
        let right = cx.translate(&binary.right)?;
        let operator = match binary.kind {
            BinaryKind::Coalesce => return Some(f.coalesce(left, right, None)),
            BinaryKind::ArrayIndex => {
                let index = f.generate_one_based_index(right);
                return Some(f.array_index(left, index, true));
            }
            BinaryKind::Add => SqlBinaryOperator::Add,
            BinaryKind::Subtract => SqlBinaryOperator::Subtract,
            BinaryKind::Multiply => SqlBinaryOperator::Multiply,
            BinaryKind::Divide => SqlBinaryOperator::Divide,
            BinaryKind::Modulo => SqlBinaryOperator::Modulo,
            BinaryKind::Equal => SqlBinaryOperator::Equal,
            BinaryKind::NotEqual => SqlBinaryOperator::NotEqual,
            BinaryKind::LessThan => SqlBinaryOperator::LessThan,
            BinaryKind::LessThanOrEqual => SqlBinaryOperator::LessThanOrEqual,
            BinaryKind::GreaterThan => SqlBinaryOperator::GreaterThan,
            BinaryKind::GreaterThanOrEqual => SqlBinaryOperator::GreaterThanOrEqual,
            BinaryKind::AndAlso => SqlBinaryOperator::AndAlso,
            BinaryKind::OrElse => SqlBinaryOperator::OrElse,
            BinaryKind::And => SqlBinaryOperator::And,
            BinaryKind::Or => SqlBinaryOperator::Or,
            BinaryKind::ExclusiveOr => SqlBinaryOperator::ExclusiveOr,
        };
        f.make_binary(operator, left, right, None)
    }

    fn translate_method_call(
        &self,
        call: &MethodCallExpression,
        cx: &dyn TranslationContext,
    ) -> Translation {
        let instance = match &call.object {
            Some(object) => Some(cx.translate(object)?),
            None => None,
        };
        let arguments = call
            .arguments
            .iter()
            .map(|a| cx.translate(a))
            .collect::<Option<Vec<_>>>()?;

        let method = &call.method;
        if method.is(KnownMethod::ObjectEquals) {
            let [left, right] = <[SqlExpression; 2]>::try_from(arguments).ok()?;
            return Some(self.factory.equal(left, right));
        }
        if method.name() == "Equals" && arguments.len() == 1 {
            if let Some(instance) = instance {
                let [right] = <[SqlExpression; 1]>::try_from(arguments).ok()?;
                return Some(self.factory.equal(instance, right));
            }
        }

        let translated = self.method_call_translators.translate(
            instance.as_ref(),
            method,
            &arguments,
            cx.logger(),
        );
        if translated.is_none() {
            cx.logger().no_translator(method);
        }
        translated
    }
}

impl BaseTranslator for RelationalTranslator {
    fn translate(&self, source: &E, cx: &dyn TranslationContext) -> Translation {
        match source {
            E::Constant(c) => Some(self.factory.typed_constant(c.value.clone(), c.ty.clone(), None)),
            E::QueryParameter(p) => {
                let type_mapping = self.factory.find_mapping(&p.ty);
                Some(SqlExpression::Parameter(SqlParameter {
                    name: p.name.clone(),
                    ty: p.ty.clone(),
                    type_mapping,
                    nullable: is_nullable_type(&p.ty),
                }))
            }
            // Only meaningful inside a lambda body, which must be pattern matched.
            E::Parameter(_) => None,
            E::Property(p) => self.translate_property(p.source.as_deref(), &p.name, cx),
            E::Unary(u) => self.translate_unary(u, cx),
            E::Binary(b) => self.translate_binary(b, cx),
            E::MethodCall(c) => self.translate_method_call(c, cx),
            E::New(_) | E::NewArray(_) | E::Lambda(_) => None,
        }
    }

    fn translate_aggregate(
        &self,
        method: &MethodInfo,
        source: &EnumerableExpression,
        arguments: &[SqlExpression],
        logger: &DiagnosticsLogger,
    ) -> Translation {
        let translated = self
            .aggregate_translators
            .translate(method, source, arguments, logger);
        if translated.is_none() {
            logger.no_translator(method);
        }
        translated
    }
}

/// Whether a value of `ty` can be NULL.
pub(crate) fn is_nullable_type(ty: &SourceType) -> bool {
    use SourceType as T;
    match ty {
        T::Nullable(_) => true,
        t if t.is_numeric() => false,
        T::Bool
        | T::Char
        | T::Guid
        | T::DateTime
        | T::DateTimeOffset
        | T::DateOnly
        | T::TimeOnly
        | T::TimeSpan
        | T::DateTimeKind
        | T::Enum { .. }
        | T::LocalDate
        | T::Period
        | T::Tuple(_) => false,
        _ => true,
    }
}

/// A conversion with no SQL-level effect: same runtime representation, a
///  nullable wrapper, or boxing to `object`.
fn is_representation_preserving(from: &SourceType, to: &SourceType) -> bool {
    *to == SourceType::Object
        || from.underlying() == to.underlying()
        || (*to == SourceType::ITuple && from.is_tuple())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{translate::ColumnInfo, type_mapping::PgTypeMappingSource};

    struct Cx<'a>(&'a RelationalTranslator, DiagnosticsLogger);

    impl TranslationContext for Cx<'_> {
        fn lookup_column(&self, _source: Option<&str>, property: &str) -> Option<ColumnInfo> {
            match property {
                "Name" => Some(ColumnInfo::new("name", SourceType::String)),
                "Age" => Some(ColumnInfo::new("age", SourceType::Int).not_null()),
                _ => None,
            }
        }

        fn translate(&self, source: &E) -> Translation {
            self.0.translate(source, self)
        }

        fn logger(&self) -> &DiagnosticsLogger {
            &self.1
        }
    }

    fn base() -> RelationalTranslator {
        let factory = Arc::new(
            PgSqlExpressionFactory::new(Arc::new(PgTypeMappingSource::new())).unwrap(),
        );
        RelationalTranslator::new(
            factory,
            Arc::new(MethodCallTranslatorProvider::from_translators(vec![])),
            Arc::new(AggregateMethodCallTranslatorProvider::default()),
        )
    }

    #[test]
    fn comparisons_with_null_become_null_checks() {
        let base = base();
        let cx = Cx(&base, DiagnosticsLogger);
        let name = E::property(Some("e"), "Name", SourceType::String);
        let tree = E::binary(BinaryKind::NotEqual, name, E::constant(Value::Null));
        let Some(SqlExpression::Unary(unary)) = cx.translate(&tree) else {
            panic!("expected IS NOT NULL");
        };
        assert_eq!(unary.operator, SqlUnaryOperator::IsNotNull);
    }

    #[test]
    fn unknown_properties_and_lambda_parameters_decline() {
        let base = base();
        let cx = Cx(&base, DiagnosticsLogger);
        assert_eq!(cx.translate(&E::property(None, "Missing", SourceType::Int)), None);
        assert_eq!(cx.translate(&E::parameter("x", SourceType::Int)), None);

        // the failure of a sub-expression aborts the enclosing node
        let sum = E::binary(
            BinaryKind::Add,
            E::property(None, "Age", SourceType::Int),
            E::parameter("x", SourceType::Int),
        );
        assert_eq!(cx.translate(&sum), None);
    }

    #[test]
    fn widening_conversions_are_elided() {
        let base = base();
        let cx = Cx(&base, DiagnosticsLogger);
        let age = E::property(Some("e"), "Age", SourceType::Int);
        let tree = E::convert(age, SourceType::nullable(SourceType::Int));
        let Some(SqlExpression::Column(column)) = cx.translate(&tree) else {
            panic!("expected the bare column");
        };
        assert_eq!(column.table.as_deref(), Some("e"));
        assert!(!column.nullable);
    }

    #[test]
    fn equals_becomes_equality() {
        let base = base();
        let cx = Cx(&base, DiagnosticsLogger);
        let name = E::property(None, "Name", SourceType::String);
        let equals = MethodInfo::new_instance(
            crate::methods::DeclaringType::String,
            "Equals",
            vec![SourceType::String],
            SourceType::Bool,
        );
        let tree = E::call_on(name, equals, vec![E::constant(Value::String("x".into()))]);
        let Some(SqlExpression::Binary(eq)) = cx.translate(&tree) else {
            panic!("expected =");
        };
        assert_eq!(eq.operator, SqlBinaryOperator::Equal);
    }
}
