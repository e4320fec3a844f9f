//! The SQL AST produced by translation.
//!
//! Nodes are plain values: composing a larger expression moves or clones the
//!  children into a new parent and never mutates them. Every node carries its
//!  result type and, once the factory has built it, its type mapping.

use crate::{
    ast::{RegexOptions, SourceType, Value},
    type_mapping::TypeMapping,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SqlConstant {
    pub value: Value,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlParameter {
    pub name: String,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnExpression {
    pub table: Option<String>,
    pub name: String,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
    pub nullable: bool,
}

/// A scalar function call.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFunction {
    pub name: String,
    pub arguments: Vec<SqlExpression>,
    /// Named argument notation (`make_interval(days => 3)`); one slot per argument.
    pub argument_names: Option<Vec<Option<String>>>,
    /// Keyword separators (`position(a IN b)`); the separator preceding each
    ///  argument after the first.
    pub argument_separators: Option<Vec<Option<String>>>,
    pub nullable: bool,
    pub arguments_propagate_nullability: Vec<bool>,
    pub built_in: bool,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub expression: SqlExpression,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlAggregateFunction {
    pub name: String,
    pub arguments: Vec<SqlExpression>,
    pub is_distinct: bool,
    /// Rendered as `FILTER (WHERE ...)`.
    pub predicate: Option<Box<SqlExpression>>,
    pub orderings: Vec<Ordering>,
    pub nullable: bool,
    pub arguments_propagate_nullability: Vec<bool>,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlBinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
    And,
    Or,
    ExclusiveOr,
}

impl SqlBinaryOperator {
    /// Operators whose result is a boolean regardless of operand types.
    pub fn is_predicate(self) -> bool {
        use SqlBinaryOperator as O;
        matches!(
            self,
            O::Equal
                | O::NotEqual
                | O::LessThan
                | O::LessThanOrEqual
                | O::GreaterThan
                | O::GreaterThanOrEqual
                | O::AndAlso
                | O::OrElse
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlBinary {
    pub operator: SqlBinaryOperator,
    pub left: Box<SqlExpression>,
    pub right: Box<SqlExpression>,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlUnaryOperator {
    Not,
    Negate,
    IsNull,
    IsNotNull,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlUnary {
    pub operator: SqlUnaryOperator,
    pub operand: Box<SqlExpression>,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

/// `CAST(operand AS store_type)`
#[derive(Debug, Clone, PartialEq)]
pub struct SqlConvert {
    pub operand: Box<SqlExpression>,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LikeExpression {
    pub match_expression: Box<SqlExpression>,
    pub pattern: Box<SqlExpression>,
    pub escape: Option<Box<SqlExpression>>,
    pub case_insensitive: bool,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum AnyOperatorType {
    #[strum(serialize = "=")]
    Equal,
    #[strum(serialize = "LIKE")]
    Like,
    #[strum(serialize = "ILIKE")]
    ILike,
}

/// `item <op> ANY(array)`
#[derive(Debug, Clone, PartialEq)]
pub struct AnyExpression {
    pub item: Box<SqlExpression>,
    pub array: Box<SqlExpression>,
    pub operator_type: AnyOperatorType,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum AllOperatorType {
    #[strum(serialize = "LIKE")]
    Like,
    #[strum(serialize = "ILIKE")]
    ILike,
}

/// `item <op> ALL(array)`
#[derive(Debug, Clone, PartialEq)]
pub struct AllExpression {
    pub item: Box<SqlExpression>,
    pub array: Box<SqlExpression>,
    pub operator_type: AllOperatorType,
    pub type_mapping: Option<TypeMapping>,
}

/// `array[index]`, where `index` is already one-based.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayIndexExpression {
    pub array: Box<SqlExpression>,
    pub index: Box<SqlExpression>,
    pub nullable: bool,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

/// `ARRAY[a, b, c]`
#[derive(Debug, Clone, PartialEq)]
pub struct NewArrayExpression {
    pub expressions: Vec<SqlExpression>,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

/// `(a, b, c)`
#[derive(Debug, Clone, PartialEq)]
pub struct RowValueExpression {
    pub values: Vec<SqlExpression>,
    pub ty: SourceType,
}

/// `input ~ pattern`, case insensitive (`~*`) when the options say so.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexMatchExpression {
    pub match_expression: Box<SqlExpression>,
    pub pattern: Box<SqlExpression>,
    pub options: RegexOptions,
    pub type_mapping: Option<TypeMapping>,
}

impl RegexMatchExpression {
    /// The embedded options prefix (`(?p)`, `(?nx)`...) written in front of
    ///  the pattern. Case insensitivity is carried by the operator instead.
    pub fn embedded_flags(&self) -> String {
        let mut flags = String::new();
        if self.options.contains(RegexOptions::MULTILINE) {
            flags.push('n');
        } else if !self.options.contains(RegexOptions::SINGLELINE) {
            flags.push('p');
        }
        if self.options.contains(RegexOptions::IGNORE_PATTERN_WHITESPACE) {
            flags.push('x');
        }
        format!("(?{flags})")
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.options.contains(RegexOptions::IGNORE_CASE)
    }
}

/// `expression #> path` (or `#>>` when returning text).
#[derive(Debug, Clone, PartialEq)]
pub struct JsonTraversalExpression {
    pub expression: Box<SqlExpression>,
    pub path: Vec<SqlExpression>,
    pub returns_text: bool,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

/// PostgreSQL-specific infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum PgOperator {
    #[strum(serialize = "@>")]
    Contains,
    #[strum(serialize = "<@")]
    ContainedBy,
    #[strum(serialize = "&&")]
    Overlaps,

    #[strum(serialize = "<<")]
    NetworkContainedBy,
    #[strum(serialize = "<<=")]
    NetworkContainedByOrEqual,
    #[strum(serialize = ">>")]
    NetworkContains,
    #[strum(serialize = ">>=")]
    NetworkContainsOrEqual,
    #[strum(serialize = "&&")]
    NetworkContainsOrContainedBy,

    #[strum(serialize = "~")]
    LTreeMatches,
    #[strum(serialize = "@")]
    LTreeMatchesText,
    #[strum(serialize = "?")]
    LTreeMatchesAny,
    #[strum(serialize = "?@>")]
    LTreeFirstAncestor,
    #[strum(serialize = "?<@")]
    LTreeFirstDescendent,
    #[strum(serialize = "?~")]
    LTreeFirstMatches,
    #[strum(serialize = "?@")]
    LTreeFirstMatchesText,

    #[strum(serialize = "?")]
    JsonExists,
    #[strum(serialize = "?|")]
    JsonExistsAny,
    #[strum(serialize = "?&")]
    JsonExistsAll,

    #[strum(serialize = "%")]
    TrigramAreSimilar,
    #[strum(serialize = "<%")]
    TrigramAreWordSimilar,
    #[strum(serialize = "<<%")]
    TrigramAreStrictWordSimilar,
    #[strum(serialize = "<->")]
    TrigramSimilarityDistance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PgBinaryExpression {
    pub operator: PgOperator,
    pub left: Box<SqlExpression>,
    pub right: Box<SqlExpression>,
    pub ty: SourceType,
    pub type_mapping: Option<TypeMapping>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpression {
    Constant(SqlConstant),
    Parameter(SqlParameter),
    Column(ColumnExpression),
    Function(SqlFunction),
    AggregateFunction(SqlAggregateFunction),
    Binary(SqlBinary),
    Unary(SqlUnary),
    Convert(SqlConvert),
    Like(LikeExpression),
    Any(AnyExpression),
    All(AllExpression),
    ArrayIndex(ArrayIndexExpression),
    NewArray(NewArrayExpression),
    RowValue(RowValueExpression),
    RegexMatch(RegexMatchExpression),
    JsonTraversal(JsonTraversalExpression),
    PgBinary(PgBinaryExpression),
}

impl SqlExpression {
    pub fn ty(&self) -> &SourceType {
        use SqlExpression as S;
        match self {
            S::Constant(e) => &e.ty,
            S::Parameter(e) => &e.ty,
            S::Column(e) => &e.ty,
            S::Function(e) => &e.ty,
            S::AggregateFunction(e) => &e.ty,
            S::Binary(e) => &e.ty,
            S::Unary(e) => &e.ty,
            S::Convert(e) => &e.ty,
            S::Like(_) | S::Any(_) | S::All(_) | S::RegexMatch(_) => &SourceType::Bool,
            S::ArrayIndex(e) => &e.ty,
            S::NewArray(e) => &e.ty,
            S::RowValue(e) => &e.ty,
            S::JsonTraversal(e) => &e.ty,
            S::PgBinary(e) => &e.ty,
        }
    }

    pub fn type_mapping(&self) -> Option<&TypeMapping> {
        use SqlExpression as S;
        match self {
            S::Constant(e) => e.type_mapping.as_ref(),
            S::Parameter(e) => e.type_mapping.as_ref(),
            S::Column(e) => e.type_mapping.as_ref(),
            S::Function(e) => e.type_mapping.as_ref(),
            S::AggregateFunction(e) => e.type_mapping.as_ref(),
            S::Binary(e) => e.type_mapping.as_ref(),
            S::Unary(e) => e.type_mapping.as_ref(),
            S::Convert(e) => e.type_mapping.as_ref(),
            S::Like(e) => e.type_mapping.as_ref(),
            S::Any(e) => e.type_mapping.as_ref(),
            S::All(e) => e.type_mapping.as_ref(),
            S::ArrayIndex(e) => e.type_mapping.as_ref(),
            S::NewArray(e) => e.type_mapping.as_ref(),
            S::RowValue(_) => None,
            S::RegexMatch(e) => e.type_mapping.as_ref(),
            S::JsonTraversal(e) => e.type_mapping.as_ref(),
            S::PgBinary(e) => e.type_mapping.as_ref(),
        }
    }

    /// Whether the expression can evaluate to NULL.
    pub fn is_nullable(&self) -> bool {
        use SqlExpression as S;
        match self {
            S::Constant(e) => e.value == Value::Null,
            S::Parameter(e) => e.nullable,
            S::Column(e) => e.nullable,
            S::Function(e) => e.nullable,
            S::AggregateFunction(e) => e.nullable,
            S::ArrayIndex(e) => e.nullable,
            S::Unary(SqlUnary {
                operator: SqlUnaryOperator::IsNull | SqlUnaryOperator::IsNotNull,
                ..
            }) => false,
            S::Unary(e) => e.operand.is_nullable(),
            S::Convert(e) => e.operand.is_nullable(),
            S::Binary(e) => e.left.is_nullable() || e.right.is_nullable(),
            S::PgBinary(e) => e.left.is_nullable() || e.right.is_nullable(),
            S::Like(e) => e.match_expression.is_nullable() || e.pattern.is_nullable(),
            S::RegexMatch(e) => e.match_expression.is_nullable() || e.pattern.is_nullable(),
            S::Any(_) | S::All(_) | S::JsonTraversal(_) => true,
            S::NewArray(_) | S::RowValue(_) => false,
        }
    }

    /// The constant value, if this is a constant.
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            SqlExpression::Constant(c) => Some(&c.value),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&SqlFunction> {
        match self {
            SqlExpression::Function(f) => Some(f),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_symbols() {
        assert_eq!(PgOperator::Overlaps.to_string(), "&&");
        assert_eq!(PgOperator::LTreeFirstDescendent.to_string(), "?<@");
        assert_eq!(AnyOperatorType::ILike.to_string(), "ILIKE");
    }

    #[test]
    fn null_checks_are_never_null() {
        let column = SqlExpression::Column(ColumnExpression {
            table: None,
            name: "name".into(),
            ty: SourceType::String,
            type_mapping: None,
            nullable: true,
        });
        assert!(column.is_nullable());

        let is_null = SqlExpression::Unary(SqlUnary {
            operator: SqlUnaryOperator::IsNull,
            operand: Box::new(column),
            ty: SourceType::Bool,
            type_mapping: None,
        });
        assert!(!is_null.is_nullable());
        assert_eq!(is_null.ty(), &SourceType::Bool);
    }
}
