//! Construction of SQL AST nodes with their type mappings resolved up front.
//!
//! [`SqlExpressionFactory`] is the dialect-neutral contract. Components that
//!  need the PostgreSQL-only node builders (`ANY`, array operators, row
//!  values...) hold the concrete [`PgSqlExpressionFactory`] and reject any
//!  other implementation at construction time.

use std::{any::Any, fmt, sync::Arc};

use crate::{
    ast::{RegexOptions, SourceType, Value},
    error::{Error, Result},
    sql::*,
    translate::EnumerableExpression,
    type_mapping::{TypeMapping, TypeMappingSource},
};

pub trait SqlExpressionFactory: fmt::Debug + Send + Sync {
    fn type_mapping_source(&self) -> &dyn TypeMappingSource;

    /// A scalar function call. `arguments_propagate_nullability` has one entry
    ///  per argument.
    fn function(
        &self,
        name: &str,
        arguments: Vec<SqlExpression>,
        nullable: bool,
        arguments_propagate_nullability: Vec<bool>,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression;

    /// An aggregate call over `source`, picking up its distinct flag, filter
    ///  predicate and orderings.
    #[allow(clippy::too_many_arguments)]
    fn aggregate_function(
        &self,
        name: &str,
        arguments: Vec<SqlExpression>,
        source: &EnumerableExpression,
        nullable: bool,
        arguments_propagate_nullability: Vec<bool>,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression;

    fn convert(
        &self,
        operand: SqlExpression,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression;

    /// A binary operator node, or `None` when the operator means nothing for
    ///  the operand types (arithmetic on booleans, `AND` on integers...).
    fn make_binary(
        &self,
        operator: SqlBinaryOperator,
        left: SqlExpression,
        right: SqlExpression,
        type_mapping: Option<TypeMapping>,
    ) -> Option<SqlExpression>;

    fn constant(&self, value: Value, type_mapping: Option<TypeMapping>) -> SqlExpression;

    /// Attaches `type_mapping` to an expression that does not have one yet.
    fn apply_type_mapping(
        &self,
        expression: SqlExpression,
        type_mapping: Option<&TypeMapping>,
    ) -> SqlExpression;

    fn apply_default_type_mapping(&self, expression: SqlExpression) -> SqlExpression {
        if expression.type_mapping().is_some() {
            return expression;
        }
        let mapping = self.type_mapping_source().find_mapping(expression.ty());
        self.apply_type_mapping(expression, mapping.as_ref())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Downcasts a factory to the PostgreSQL implementation, failing with
///  [`Error::InvalidSqlExpressionFactory`] otherwise.
pub fn require_pg_factory(
    factory: Arc<dyn SqlExpressionFactory>,
) -> Result<Arc<PgSqlExpressionFactory>> {
    factory
        .into_any()
        .downcast::<PgSqlExpressionFactory>()
        .map_err(|_| Error::InvalidSqlExpressionFactory {
            expected: "PostgreSQL",
        })
}

#[derive(Debug, Clone)]
pub struct PgSqlExpressionFactory {
    type_mapping_source: Arc<dyn TypeMappingSource>,
    bool_mapping: TypeMapping,
    int_mapping: TypeMapping,
}

impl PgSqlExpressionFactory {
    pub fn new(type_mapping_source: Arc<dyn TypeMappingSource>) -> Result<Self> {
        let bool_mapping = type_mapping_source
            .find_mapping(&SourceType::Bool)
            .ok_or_else(|| Error::MissingTypeMapping("boolean".into()))?;
        let int_mapping = type_mapping_source
            .find_mapping(&SourceType::Int)
            .ok_or_else(|| Error::MissingTypeMapping("integer".into()))?;
        Ok(Self {
            type_mapping_source,
            bool_mapping,
            int_mapping,
        })
    }

    pub fn bool_mapping(&self) -> &TypeMapping {
        &self.bool_mapping
    }

    pub fn int_mapping(&self) -> &TypeMapping {
        &self.int_mapping
    }

    pub fn find_mapping(&self, ty: &SourceType) -> Option<TypeMapping> {
        self.type_mapping_source.find_mapping(ty)
    }

    fn infer_mapping(&self, left: &SqlExpression, right: &SqlExpression) -> Option<TypeMapping> {
        left.type_mapping()
            .or_else(|| right.type_mapping())
            .cloned()
            .or_else(|| self.find_mapping(left.ty()))
            .or_else(|| self.find_mapping(right.ty()))
    }

    fn build_function(
        &self,
        name: &str,
        arguments: Vec<SqlExpression>,
        nullable: bool,
        arguments_propagate_nullability: Vec<bool>,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlFunction {
        assert_eq!(
            arguments.len(),
            arguments_propagate_nullability.len(),
            "nullability vector for {name} does not match its arguments"
        );
        let arguments = arguments
            .into_iter()
            .map(|a| self.apply_default_type_mapping(a))
            .collect();
        let type_mapping = type_mapping.or_else(|| self.find_mapping(&ty));
        SqlFunction {
            name: name.to_string(),
            arguments,
            argument_names: None,
            argument_separators: None,
            nullable,
            arguments_propagate_nullability,
            built_in: true,
            ty,
            type_mapping,
        }
    }

    /// A call using named argument notation, e.g. `make_interval(days => x)`.
    pub fn function_with_named_arguments(
        &self,
        name: &str,
        arguments: Vec<SqlExpression>,
        argument_names: Vec<Option<String>>,
        nullable: bool,
        arguments_propagate_nullability: Vec<bool>,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        assert_eq!(arguments.len(), argument_names.len());
        let mut function = self.build_function(
            name,
            arguments,
            nullable,
            arguments_propagate_nullability,
            ty,
            type_mapping,
        );
        function.argument_names = Some(argument_names);
        SqlExpression::Function(function)
    }

    /// A call whose arguments are separated by keywords, e.g. `position(a IN b)`.
    pub fn function_with_argument_separators(
        &self,
        name: &str,
        arguments: Vec<SqlExpression>,
        argument_separators: Vec<Option<String>>,
        nullable: bool,
        arguments_propagate_nullability: Vec<bool>,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        assert_eq!(arguments.len().saturating_sub(1), argument_separators.len());
        let mut function = self.build_function(
            name,
            arguments,
            nullable,
            arguments_propagate_nullability,
            ty,
            type_mapping,
        );
        function.argument_separators = Some(argument_separators);
        SqlExpression::Function(function)
    }

    pub fn typed_constant(
        &self,
        value: Value,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        let type_mapping = type_mapping.or_else(|| self.find_mapping(&ty));
        SqlExpression::Constant(SqlConstant {
            value,
            ty,
            type_mapping,
        })
    }

    fn build_binary(
        &self,
        operator: SqlBinaryOperator,
        left: SqlExpression,
        right: SqlExpression,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        let operand_mapping = self.infer_mapping(&left, &right);
        let left = self.apply_type_mapping(left, operand_mapping.as_ref());
        let right = self.apply_type_mapping(right, operand_mapping.as_ref());
        let (ty, type_mapping) = if operator.is_predicate() {
            (SourceType::Bool, Some(self.bool_mapping.clone()))
        } else {
            (left.ty().clone(), type_mapping.or(operand_mapping))
        };
        SqlExpression::Binary(SqlBinary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            ty,
            type_mapping,
        })
    }

    pub fn equal(&self, left: SqlExpression, right: SqlExpression) -> SqlExpression {
        self.build_binary(SqlBinaryOperator::Equal, left, right, None)
    }

    pub fn not_equal(&self, left: SqlExpression, right: SqlExpression) -> SqlExpression {
        self.build_binary(SqlBinaryOperator::NotEqual, left, right, None)
    }

    pub fn greater_than(&self, left: SqlExpression, right: SqlExpression) -> SqlExpression {
        self.build_binary(SqlBinaryOperator::GreaterThan, left, right, None)
    }

    pub fn less_than(&self, left: SqlExpression, right: SqlExpression) -> SqlExpression {
        self.build_binary(SqlBinaryOperator::LessThan, left, right, None)
    }

    pub fn or_else(&self, left: SqlExpression, right: SqlExpression) -> SqlExpression {
        self.build_binary(SqlBinaryOperator::OrElse, left, right, None)
    }

    pub fn add(
        &self,
        left: SqlExpression,
        right: SqlExpression,
        type_mapping: Option<TypeMapping>,
    ) -> Option<SqlExpression> {
        self.make_binary(SqlBinaryOperator::Add, left, right, type_mapping)
    }

    pub fn subtract(
        &self,
        left: SqlExpression,
        right: SqlExpression,
        type_mapping: Option<TypeMapping>,
    ) -> Option<SqlExpression> {
        self.make_binary(SqlBinaryOperator::Subtract, left, right, type_mapping)
    }

    pub fn unary(&self, operator: SqlUnaryOperator, operand: SqlExpression) -> SqlExpression {
        let (ty, type_mapping) = match operator {
            SqlUnaryOperator::Negate => (operand.ty().clone(), operand.type_mapping().cloned()),
            _ => (SourceType::Bool, Some(self.bool_mapping.clone())),
        };
        SqlExpression::Unary(SqlUnary {
            operator,
            operand: Box::new(operand),
            ty,
            type_mapping,
        })
    }

    pub fn is_null(&self, operand: SqlExpression) -> SqlExpression {
        self.unary(SqlUnaryOperator::IsNull, operand)
    }

    pub fn is_not_null(&self, operand: SqlExpression) -> SqlExpression {
        self.unary(SqlUnaryOperator::IsNotNull, operand)
    }

    pub fn not(&self, operand: SqlExpression) -> SqlExpression {
        self.unary(SqlUnaryOperator::Not, operand)
    }

    pub fn coalesce(
        &self,
        left: SqlExpression,
        right: SqlExpression,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        let mapping = type_mapping.or_else(|| self.infer_mapping(&left, &right));
        let left = self.apply_type_mapping(left, mapping.as_ref());
        let right = self.apply_type_mapping(right, mapping.as_ref());
        let nullable = right.is_nullable();
        let ty = left.ty().unwrap_nullable().clone();
        self.function(
            "COALESCE",
            vec![left, right],
            nullable,
            vec![false, false],
            ty,
            mapping,
        )
    }

    pub fn like(
        &self,
        match_expression: SqlExpression,
        pattern: SqlExpression,
        escape: Option<SqlExpression>,
        case_insensitive: bool,
    ) -> SqlExpression {
        let mapping = self.infer_mapping(&match_expression, &pattern);
        let match_expression = self.apply_type_mapping(match_expression, mapping.as_ref());
        let pattern = self.apply_type_mapping(pattern, mapping.as_ref());
        let escape = escape.map(|e| Box::new(self.apply_type_mapping(e, mapping.as_ref())));
        SqlExpression::Like(LikeExpression {
            match_expression: Box::new(match_expression),
            pattern: Box::new(pattern),
            escape,
            case_insensitive,
            type_mapping: Some(self.bool_mapping.clone()),
        })
    }

    /// Resolves the mappings of an item and an array of such items against
    ///  each other.
    fn apply_item_and_array_mappings(
        &self,
        item: SqlExpression,
        array: SqlExpression,
    ) -> (SqlExpression, SqlExpression) {
        let element_mapping = array
            .type_mapping()
            .and_then(TypeMapping::element_mapping)
            .cloned()
            .or_else(|| item.type_mapping().cloned())
            .or_else(|| self.find_mapping(item.ty()));
        let array_mapping = array.type_mapping().cloned().or_else(|| {
            let element = element_mapping.as_ref()?;
            self.type_mapping_source
                .find_mapping_for(array.ty(), &format!("{}[]", element.store_type))
        });
        let item = self.apply_type_mapping(item, element_mapping.as_ref());
        let array = self.apply_type_mapping(array, array_mapping.as_ref());
        (item, array)
    }

    /// `item op ANY(array)`
    pub fn any(
        &self,
        item: SqlExpression,
        array: SqlExpression,
        operator_type: AnyOperatorType,
    ) -> SqlExpression {
        let (item, array) = self.apply_item_and_array_mappings(item, array);
        SqlExpression::Any(AnyExpression {
            item: Box::new(item),
            array: Box::new(array),
            operator_type,
            type_mapping: Some(self.bool_mapping.clone()),
        })
    }

    /// `item op ALL(array)`
    pub fn all(
        &self,
        item: SqlExpression,
        array: SqlExpression,
        operator_type: AllOperatorType,
    ) -> SqlExpression {
        let (item, array) = self.apply_item_and_array_mappings(item, array);
        SqlExpression::All(AllExpression {
            item: Box::new(item),
            array: Box::new(array),
            operator_type,
            type_mapping: Some(self.bool_mapping.clone()),
        })
    }

    /// A PostgreSQL operator node. The operands' mappings are inferred from
    ///  each other; `ty` defaults to a boolean result.
    pub fn pg_binary(
        &self,
        operator: PgOperator,
        left: SqlExpression,
        right: SqlExpression,
        ty: Option<SourceType>,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        let operand_mapping = self.infer_mapping(&left, &right);
        let left = self.apply_type_mapping(left, operand_mapping.as_ref());
        let right = self.apply_type_mapping(right, operand_mapping.as_ref());
        let (ty, type_mapping) = match ty {
            Some(ty) => {
                let mapping = type_mapping.or_else(|| self.find_mapping(&ty));
                (ty, mapping)
            }
            None => (SourceType::Bool, Some(self.bool_mapping.clone())),
        };
        SqlExpression::PgBinary(PgBinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            ty,
            type_mapping,
        })
    }

    /// `left && right`
    pub fn overlaps(&self, left: SqlExpression, right: SqlExpression) -> SqlExpression {
        self.pg_binary(PgOperator::Overlaps, left, right, None, None)
    }

    /// `left <@ right`
    pub fn contained_by(&self, left: SqlExpression, right: SqlExpression) -> SqlExpression {
        self.pg_binary(PgOperator::ContainedBy, left, right, None, None)
    }

    /// `left @> right`
    pub fn contains(&self, left: SqlExpression, right: SqlExpression) -> SqlExpression {
        self.pg_binary(PgOperator::Contains, left, right, None, None)
    }

    /// `array[index]`; `index` must already be one-based.
    pub fn array_index(
        &self,
        array: SqlExpression,
        index: SqlExpression,
        nullable: bool,
    ) -> SqlExpression {
        let ty = array
            .ty()
            .unwrap_nullable()
            .element_type()
            .cloned()
            .unwrap_or(SourceType::Object);
        let type_mapping = array
            .type_mapping()
            .and_then(TypeMapping::element_mapping)
            .cloned()
            .or_else(|| self.find_mapping(&ty));
        let index = self.apply_type_mapping(index, Some(&self.int_mapping));
        SqlExpression::ArrayIndex(ArrayIndexExpression {
            array: Box::new(array),
            index: Box::new(index),
            nullable,
            ty,
            type_mapping,
        })
    }

    /// Converts a zero-based index into a one-based one. Constants are folded.
    pub fn generate_one_based_index(&self, index: SqlExpression) -> SqlExpression {
        let folded = index
            .as_constant()
            .and_then(Value::as_i64)
            .and_then(|i| i.checked_add(1));
        match folded {
            Some(i) => {
                let value = match i32::try_from(i) {
                    Ok(v) => Value::Int(v),
                    Err(_) => Value::Long(i),
                };
                let ty = value.source_type();
                self.typed_constant(value, ty, None)
            }
            None => {
                let one = self.constant(Value::Int(1), Some(self.int_mapping.clone()));
                let mapping = Some(self.int_mapping.clone());
                self.build_binary(SqlBinaryOperator::Add, index, one, mapping)
            }
        }
    }

    /// `ARRAY[...]`; the elements take the array's element mapping.
    pub fn new_array(&self, expressions: Vec<SqlExpression>, ty: SourceType) -> SqlExpression {
        let type_mapping = self.find_mapping(&ty);
        let element_mapping = type_mapping
            .as_ref()
            .and_then(TypeMapping::element_mapping)
            .cloned();
        let expressions = expressions
            .into_iter()
            .map(|e| self.apply_type_mapping(e, element_mapping.as_ref()))
            .collect();
        SqlExpression::NewArray(NewArrayExpression {
            expressions,
            ty,
            type_mapping,
        })
    }

    pub fn row_value(&self, values: Vec<SqlExpression>, ty: SourceType) -> SqlExpression {
        let values = values
            .into_iter()
            .map(|v| self.apply_default_type_mapping(v))
            .collect();
        SqlExpression::RowValue(RowValueExpression { values, ty })
    }

    pub fn regex_match(
        &self,
        match_expression: SqlExpression,
        pattern: SqlExpression,
        options: RegexOptions,
    ) -> SqlExpression {
        let mapping = self.infer_mapping(&match_expression, &pattern);
        let match_expression = self.apply_type_mapping(match_expression, mapping.as_ref());
        let pattern = self.apply_type_mapping(pattern, mapping.as_ref());
        SqlExpression::RegexMatch(RegexMatchExpression {
            match_expression: Box::new(match_expression),
            pattern: Box::new(pattern),
            options,
            type_mapping: Some(self.bool_mapping.clone()),
        })
    }

    pub fn json_traversal(
        &self,
        expression: SqlExpression,
        path: Vec<SqlExpression>,
        returns_text: bool,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        let type_mapping = type_mapping.or_else(|| self.find_mapping(&ty));
        let path = path
            .into_iter()
            .map(|p| self.apply_default_type_mapping(p))
            .collect();
        SqlExpression::JsonTraversal(JsonTraversalExpression {
            expression: Box::new(expression),
            path,
            returns_text,
            ty,
            type_mapping,
        })
    }

    fn is_meaningful(operator: SqlBinaryOperator, left: &SourceType, right: &SourceType) -> bool {
        use SqlBinaryOperator as O;
        let is_bool = |t: &SourceType| *t.unwrap_nullable() == SourceType::Bool;
        let is_row = |t: &SourceType| t.is_tuple();
        match operator {
            O::AndAlso | O::OrElse => is_bool(left) && is_bool(right),
            O::And | O::Or | O::ExclusiveOr => {
                (is_bool(left) && is_bool(right))
                    || (left.underlying().is_integer() && right.underlying().is_integer())
            }
            O::Add | O::Subtract | O::Multiply | O::Divide | O::Modulo => {
                !is_bool(left) && !is_bool(right) && !is_row(left) && !is_row(right)
            }
            _ => true,
        }
    }
}

impl SqlExpressionFactory for PgSqlExpressionFactory {
    fn type_mapping_source(&self) -> &dyn TypeMappingSource {
        self.type_mapping_source.as_ref()
    }

    fn function(
        &self,
        name: &str,
        arguments: Vec<SqlExpression>,
        nullable: bool,
        arguments_propagate_nullability: Vec<bool>,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        SqlExpression::Function(self.build_function(
            name,
            arguments,
            nullable,
            arguments_propagate_nullability,
            ty,
            type_mapping,
        ))
    }

    fn aggregate_function(
        &self,
        name: &str,
        arguments: Vec<SqlExpression>,
        source: &EnumerableExpression,
        nullable: bool,
        arguments_propagate_nullability: Vec<bool>,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        assert_eq!(
            arguments.len(),
            arguments_propagate_nullability.len(),
            "nullability vector for aggregate {name} does not match its arguments"
        );
        let arguments = arguments
            .into_iter()
            .map(|a| self.apply_default_type_mapping(a))
            .collect();
        let type_mapping = type_mapping.or_else(|| self.find_mapping(&ty));
        SqlExpression::AggregateFunction(SqlAggregateFunction {
            name: name.to_string(),
            arguments,
            is_distinct: source.is_distinct,
            predicate: source.predicate.clone().map(Box::new),
            orderings: source.orderings.clone(),
            nullable,
            arguments_propagate_nullability,
            ty,
            type_mapping,
        })
    }

    fn convert(
        &self,
        operand: SqlExpression,
        ty: SourceType,
        type_mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        let type_mapping = type_mapping.or_else(|| self.find_mapping(&ty));
        let operand = self.apply_default_type_mapping(operand);
        SqlExpression::Convert(SqlConvert {
            operand: Box::new(operand),
            ty,
            type_mapping,
        })
    }

    fn make_binary(
        &self,
        operator: SqlBinaryOperator,
        left: SqlExpression,
        right: SqlExpression,
        type_mapping: Option<TypeMapping>,
    ) -> Option<SqlExpression> {
        if !Self::is_meaningful(operator, left.ty(), right.ty()) {
            return None;
        }
        Some(self.build_binary(operator, left, right, type_mapping))
    }

    fn constant(&self, value: Value, type_mapping: Option<TypeMapping>) -> SqlExpression {
        let ty = match &type_mapping {
            Some(mapping) if value != Value::Null => mapping.clr_type.clone(),
            _ => value.source_type(),
        };
        self.typed_constant(value, ty, type_mapping)
    }

    fn apply_type_mapping(
        &self,
        expression: SqlExpression,
        type_mapping: Option<&TypeMapping>,
    ) -> SqlExpression {
        let Some(mapping) = type_mapping else {
            return expression;
        };
        if expression.type_mapping().is_some() {
            return expression;
        }
        match expression {
            SqlExpression::Constant(mut c) => {
                c.type_mapping = Some(mapping.clone());
                SqlExpression::Constant(c)
            }
            SqlExpression::Parameter(mut p) => {
                p.type_mapping = Some(mapping.clone());
                SqlExpression::Parameter(p)
            }
            SqlExpression::NewArray(mut a) => {
                let element = mapping.element_mapping();
                a.expressions = a
                    .expressions
                    .into_iter()
                    .map(|e| self.apply_type_mapping(e, element))
                    .collect();
                a.type_mapping = Some(mapping.clone());
                SqlExpression::NewArray(a)
            }
            SqlExpression::Binary(mut b) if !b.operator.is_predicate() => {
                b.left = Box::new(self.apply_type_mapping(*b.left, Some(mapping)));
                b.right = Box::new(self.apply_type_mapping(*b.right, Some(mapping)));
                b.type_mapping = Some(mapping.clone());
                SqlExpression::Binary(b)
            }
            SqlExpression::Function(mut f) => {
                f.type_mapping = Some(mapping.clone());
                SqlExpression::Function(f)
            }
            SqlExpression::Convert(mut c) => {
                c.type_mapping = Some(mapping.clone());
                SqlExpression::Convert(c)
            }
            SqlExpression::Column(mut c) => {
                c.type_mapping = Some(mapping.clone());
                SqlExpression::Column(c)
            }
            SqlExpression::ArrayIndex(mut a) => {
                a.type_mapping = Some(mapping.clone());
                SqlExpression::ArrayIndex(a)
            }
            other => other,
        }
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::type_mapping::PgTypeMappingSource;

    fn factory() -> PgSqlExpressionFactory {
        PgSqlExpressionFactory::new(Arc::new(PgTypeMappingSource::new())).unwrap()
    }

    #[test]
    fn one_based_index_folds_constants() {
        let f = factory();
        let ix = f.generate_one_based_index(f.constant(Value::Int(2), None));
        assert_eq!(ix.as_constant(), Some(&Value::Int(3)));

        let param = SqlExpression::Parameter(SqlParameter {
            name: "i".into(),
            ty: SourceType::Int,
            type_mapping: None,
            nullable: false,
        });
        let SqlExpression::Binary(add) = f.generate_one_based_index(param) else {
            panic!("expected an addition");
        };
        assert_eq!(add.operator, SqlBinaryOperator::Add);
        assert_eq!(add.right.as_constant(), Some(&Value::Int(1)));
        assert_eq!(add.left.type_mapping().unwrap().store_type, "integer");
    }

    #[test]
    fn one_based_index_leaves_the_largest_long_unfolded() {
        let f = factory();
        let ix = f.generate_one_based_index(f.constant(Value::Long(i64::MAX), None));
        let SqlExpression::Binary(add) = ix else {
            panic!("expected an addition");
        };
        assert_eq!(add.operator, SqlBinaryOperator::Add);
        assert_eq!(add.left.as_constant(), Some(&Value::Long(i64::MAX)));

        let ix = f.generate_one_based_index(f.constant(Value::Long(i64::from(i32::MAX)), None));
        assert_eq!(ix.as_constant(), Some(&Value::Long(i64::from(i32::MAX) + 1)));
    }

    #[test]
    fn make_binary_rejects_meaningless_operators() {
        let f = factory();
        let t = f.constant(Value::Bool(true), None);
        let one = f.constant(Value::Int(1), None);
        assert!(f.make_binary(SqlBinaryOperator::Add, t.clone(), t.clone(), None).is_none());
        assert!(f.make_binary(SqlBinaryOperator::AndAlso, one.clone(), one.clone(), None).is_none());

        let cmp = f.make_binary(SqlBinaryOperator::LessThan, one.clone(), one, None).unwrap();
        assert_eq!(cmp.ty(), &SourceType::Bool);
        assert_eq!(cmp.type_mapping().unwrap().store_type, "boolean");
    }

    #[test]
    fn binary_operands_share_a_mapping() {
        let f = factory();
        let column = SqlExpression::Column(ColumnExpression {
            table: None,
            name: "price".into(),
            ty: SourceType::Decimal,
            type_mapping: f.type_mapping_source().find_mapping_by_store_type("money"),
            nullable: false,
        });
        let constant = f.constant(Value::Decimal("3".into()), None);
        let SqlExpression::Binary(eq) = f.equal(column, constant) else {
            panic!("expected a comparison");
        };
        // the constant had its own default mapping, so it keeps it
        assert_eq!(eq.right.type_mapping().unwrap().store_type, "numeric");
        assert_eq!(eq.left.type_mapping().unwrap().store_type, "money");
    }

    #[test]
    #[should_panic(expected = "nullability vector")]
    fn nullability_vector_must_match() {
        let f = factory();
        f.function(
            "lower",
            vec![f.constant(Value::String("A".into()), None)],
            true,
            vec![],
            SourceType::String,
            None,
        );
    }

    #[test]
    fn any_infers_the_array_mapping_from_the_item() {
        let f = factory();
        let item = f.constant(Value::Int(1), None);
        let array = SqlExpression::Parameter(SqlParameter {
            name: "ids".into(),
            ty: SourceType::List(Box::new(SourceType::Int)),
            type_mapping: None,
            nullable: false,
        });
        let SqlExpression::Any(any) = f.any(item, array, AnyOperatorType::Equal) else {
            panic!("expected ANY");
        };
        assert_eq!(any.array.type_mapping().unwrap().store_type, "integer[]");
    }
}
