//! The source expression tree: the typed, immutable representation of a query
//! predicate or projection before SQL translation.

use chrono::{NaiveDate, NaiveDateTime};

use crate::methods::{ConstructorInfo, MethodInfo};

/// Static type carried by every source node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceType {
    Bool,
    Byte,
    SByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Char,
    Float,
    Double,
    Decimal,
    String,
    Guid,
    DateTime,
    DateTimeOffset,
    DateOnly,
    TimeOnly,
    TimeSpan,
    DateTimeKind,
    RegexOptions,
    Object,
    Nullable(Box<SourceType>),
    Enum {
        name: String,
        underlying: Box<SourceType>,
    },
    Array(Box<SourceType>),
    List(Box<SourceType>),
    HashSet(Box<SourceType>),
    Enumerable(Box<SourceType>),
    /// A value tuple. Every tuple satisfies the row-tuple capability.
    Tuple(Vec<SourceType>),
    /// The row-tuple capability marker itself (what tuples are cast to when
    /// passed to row value comparison functions).
    ITuple,
    /// A delegate: parameter types followed by the return type.
    Func(Vec<SourceType>),
    /// The `EF.Functions` receiver.
    DbFunctions,
    Geometry,
    LocalDate,
    Period,
    LTree,
    LQuery,
    LTxtQuery,
    IPAddress,
    PhysicalAddress,
    /// A user type stored as a JSON document.
    Poco(String),
    /// An open generic method parameter, by position.
    GenericParameter(usize),
}

impl SourceType {
    pub fn byte_array() -> Self {
        SourceType::Array(Box::new(SourceType::Byte))
    }

    pub fn nullable(inner: SourceType) -> Self {
        match inner {
            SourceType::Nullable(_) => inner,
            inner => SourceType::Nullable(Box::new(inner)),
        }
    }

    pub fn unwrap_nullable(&self) -> &SourceType {
        match self {
            SourceType::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_byte_array(&self) -> bool {
        matches!(self, SourceType::Array(inner) if **inner == SourceType::Byte)
    }

    /// True for arrays and `List<T>`, the shapes that map onto PostgreSQL arrays.
    pub fn is_array_or_generic_list(&self) -> bool {
        matches!(self, SourceType::Array(_) | SourceType::List(_))
    }

    pub fn element_type(&self) -> Option<&SourceType> {
        match self {
            SourceType::Array(e)
            | SourceType::List(e)
            | SourceType::HashSet(e)
            | SourceType::Enumerable(e) => Some(e),
            _ => None,
        }
    }

    /// True if the type can be assigned to the row-tuple capability.
    pub fn is_tuple(&self) -> bool {
        matches!(self, SourceType::Tuple(_) | SourceType::ITuple)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.unwrap_nullable(),
            SourceType::Byte
                | SourceType::SByte
                | SourceType::Short
                | SourceType::UShort
                | SourceType::Int
                | SourceType::UInt
                | SourceType::Long
                | SourceType::ULong
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self.unwrap_nullable(),
                SourceType::Float | SourceType::Double | SourceType::Decimal
            )
    }

    /// The type with enums replaced by their underlying integer type.
    pub fn underlying(&self) -> &SourceType {
        match self.unwrap_nullable() {
            SourceType::Enum { underlying, .. } => underlying,
            other => other,
        }
    }

    /// Replaces open generic parameters with the supplied arguments.
    pub fn substitute(&self, generic_arguments: &[SourceType]) -> SourceType {
        let sub = |t: &SourceType| Box::new(t.substitute(generic_arguments));
        match self {
            SourceType::GenericParameter(i) => generic_arguments
                .get(*i)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            SourceType::Nullable(t) => SourceType::Nullable(sub(t)),
            SourceType::Array(t) => SourceType::Array(sub(t)),
            SourceType::List(t) => SourceType::List(sub(t)),
            SourceType::HashSet(t) => SourceType::HashSet(sub(t)),
            SourceType::Enumerable(t) => SourceType::Enumerable(sub(t)),
            SourceType::Tuple(ts) => {
                SourceType::Tuple(ts.iter().map(|t| t.substitute(generic_arguments)).collect())
            }
            SourceType::Func(ts) => {
                SourceType::Func(ts.iter().map(|t| t.substitute(generic_arguments)).collect())
            }
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateTimeKind {
    Unspecified,
    Utc,
    Local,
}

/// Regular expression options, using the bit values of the source library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegexOptions(pub u32);

impl RegexOptions {
    pub const NONE: RegexOptions = RegexOptions(0);
    pub const IGNORE_CASE: RegexOptions = RegexOptions(1);
    pub const MULTILINE: RegexOptions = RegexOptions(2);
    pub const EXPLICIT_CAPTURE: RegexOptions = RegexOptions(4);
    pub const COMPILED: RegexOptions = RegexOptions(8);
    pub const SINGLELINE: RegexOptions = RegexOptions(16);
    pub const IGNORE_PATTERN_WHITESPACE: RegexOptions = RegexOptions(32);
    pub const RIGHT_TO_LEFT: RegexOptions = RegexOptions(64);
    pub const ECMA_SCRIPT: RegexOptions = RegexOptions(256);
    pub const CULTURE_INVARIANT: RegexOptions = RegexOptions(512);

    pub fn contains(self, other: RegexOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn without(self, other: RegexOptions) -> RegexOptions {
        RegexOptions(self.0 & !other.0)
    }
}

impl std::ops::BitOr for RegexOptions {
    type Output = RegexOptions;
    fn bitor(self, rhs: Self) -> Self::Output {
        RegexOptions(self.0 | rhs.0)
    }
}

/// A literal value, shared by source constants and SQL constants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Double(f64),
    Decimal(String),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    DateTimeKind(DateTimeKind),
    RegexOptions(RegexOptions),
    Array(Vec<Value>),
}

impl Value {
    /// The natural source type of the value. `Null` has no type of its own.
    pub fn source_type(&self) -> SourceType {
        match self {
            Value::Null => SourceType::Object,
            Value::Bool(_) => SourceType::Bool,
            Value::Byte(_) => SourceType::Byte,
            Value::Short(_) => SourceType::Short,
            Value::Int(_) => SourceType::Int,
            Value::Long(_) => SourceType::Long,
            Value::Double(_) => SourceType::Double,
            Value::Decimal(_) => SourceType::Decimal,
            Value::Char(_) => SourceType::Char,
            Value::String(_) => SourceType::String,
            Value::Bytes(_) => SourceType::byte_array(),
            Value::DateTime(_) => SourceType::DateTime,
            Value::Date(_) => SourceType::DateOnly,
            Value::DateTimeKind(_) => SourceType::DateTimeKind,
            Value::RegexOptions(_) => SourceType::RegexOptions,
            Value::Array(values) => SourceType::Array(Box::new(
                values
                    .iter()
                    .find(|v| **v != Value::Null)
                    .map(Value::source_type)
                    .unwrap_or(SourceType::Object),
            )),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantExpression {
    pub value: Value,
    pub ty: SourceType,
}

/// A named parameter. Lambda parameters are compared by value, so a lambda's
/// parameters must have distinct names within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterExpression {
    pub name: String,
    pub ty: SourceType,
}

impl ParameterExpression {
    pub fn new(name: impl Into<String>, ty: SourceType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Access to a mapped property of an entity, i.e. a column reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyExpression {
    /// The alias of the entity the property belongs to (`e` in `e.Name`).
    pub source: Option<String>,
    pub name: String,
    pub ty: SourceType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallExpression {
    pub method: MethodInfo,
    pub object: Option<Box<Expression>>,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryKind {
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
    Coalesce,
    ArrayIndex,
}

impl BinaryKind {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryKind::Equal
                | BinaryKind::NotEqual
                | BinaryKind::LessThan
                | BinaryKind::LessThanOrEqual
                | BinaryKind::GreaterThan
                | BinaryKind::GreaterThanOrEqual
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub kind: BinaryKind,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub ty: SourceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryKind {
    Not,
    Negate,
    Convert,
    ConvertChecked,
    ArrayLength,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub kind: UnaryKind,
    pub operand: Box<Expression>,
    pub ty: SourceType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    pub constructor: ConstructorInfo,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewArrayKind {
    /// `new[] { a, b, c }`
    Init,
    /// `new T[n]`
    Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArrayExpression {
    pub kind: NewArrayKind,
    pub expressions: Vec<Expression>,
    pub ty: SourceType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpression {
    pub parameters: Vec<ParameterExpression>,
    pub body: Box<Expression>,
    pub ty: SourceType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(ConstantExpression),
    /// A lambda-bound parameter; only meaningful inside the lambda's body.
    Parameter(ParameterExpression),
    /// A query parameter captured from the caller's closure.
    QueryParameter(ParameterExpression),
    Property(PropertyExpression),
    MethodCall(MethodCallExpression),
    Binary(BinaryExpression),
    Unary(UnaryExpression),
    New(NewExpression),
    NewArray(NewArrayExpression),
    Lambda(LambdaExpression),
}

impl Expression {
    pub fn ty(&self) -> &SourceType {
        match self {
            Expression::Constant(c) => &c.ty,
            Expression::Parameter(p) | Expression::QueryParameter(p) => &p.ty,
            Expression::Property(p) => &p.ty,
            Expression::MethodCall(c) => &c.method.return_type,
            Expression::Binary(b) => &b.ty,
            Expression::Unary(u) => &u.ty,
            Expression::New(n) => &n.constructor.declaring_type,
            Expression::NewArray(a) => &a.ty,
            Expression::Lambda(l) => &l.ty,
        }
    }

    pub fn constant(value: Value) -> Self {
        let ty = value.source_type();
        Expression::Constant(ConstantExpression { value, ty })
    }

    pub fn typed_constant(value: Value, ty: SourceType) -> Self {
        Expression::Constant(ConstantExpression { value, ty })
    }

    /// The `EF.Functions` receiver passed as the first argument of database
    /// function extension methods.
    pub fn db_functions() -> Self {
        Self::typed_constant(Value::Null, SourceType::DbFunctions)
    }

    pub fn parameter(name: impl Into<String>, ty: SourceType) -> Self {
        Expression::Parameter(ParameterExpression::new(name, ty))
    }

    pub fn query_parameter(name: impl Into<String>, ty: SourceType) -> Self {
        Expression::QueryParameter(ParameterExpression::new(name, ty))
    }

    pub fn property(source: Option<&str>, name: impl Into<String>, ty: SourceType) -> Self {
        Expression::Property(PropertyExpression {
            source: source.map(str::to_string),
            name: name.into(),
            ty,
        })
    }

    /// A static method call.
    pub fn call(method: MethodInfo, arguments: Vec<Expression>) -> Self {
        Expression::MethodCall(MethodCallExpression {
            method,
            object: None,
            arguments,
        })
    }

    /// An instance method call on `object`.
    pub fn call_on(object: Expression, method: MethodInfo, arguments: Vec<Expression>) -> Self {
        Expression::MethodCall(MethodCallExpression {
            method,
            object: Some(Box::new(object)),
            arguments,
        })
    }

    /// A binary node; the result type follows from the operator and operands.
    pub fn binary(kind: BinaryKind, left: Expression, right: Expression) -> Self {
        let ty = match kind {
            k if k.is_comparison() => SourceType::Bool,
            BinaryKind::AndAlso | BinaryKind::OrElse => SourceType::Bool,
            BinaryKind::ArrayIndex => left
                .ty()
                .element_type()
                .cloned()
                .unwrap_or(SourceType::Object),
            BinaryKind::Subtract
                if *left.ty().unwrap_nullable() == SourceType::LocalDate
                    && *right.ty().unwrap_nullable() == SourceType::LocalDate =>
            {
                SourceType::Period
            }
            BinaryKind::Coalesce => right.ty().clone(),
            _ => left.ty().clone(),
        };
        Expression::Binary(BinaryExpression {
            kind,
            left: Box::new(left),
            right: Box::new(right),
            ty,
        })
    }

    pub fn unary(kind: UnaryKind, operand: Expression, ty: SourceType) -> Self {
        Expression::Unary(UnaryExpression {
            kind,
            operand: Box::new(operand),
            ty,
        })
    }

    pub fn convert(operand: Expression, ty: SourceType) -> Self {
        Self::unary(UnaryKind::Convert, operand, ty)
    }

    pub fn array_length(operand: Expression) -> Self {
        Self::unary(UnaryKind::ArrayLength, operand, SourceType::Int)
    }

    pub fn new_object(constructor: ConstructorInfo, arguments: Vec<Expression>) -> Self {
        Expression::New(NewExpression {
            constructor,
            arguments,
        })
    }

    pub fn new_array(element_type: SourceType, expressions: Vec<Expression>) -> Self {
        Expression::NewArray(NewArrayExpression {
            kind: NewArrayKind::Init,
            expressions,
            ty: SourceType::Array(Box::new(element_type)),
        })
    }

    pub fn lambda(parameters: Vec<ParameterExpression>, body: Expression) -> Self {
        let mut signature: Vec<SourceType> = parameters.iter().map(|p| p.ty.clone()).collect();
        signature.push(body.ty().clone());
        Expression::Lambda(LambdaExpression {
            parameters,
            body: Box::new(body),
            ty: SourceType::Func(signature),
        })
    }

    /// True if this node is exactly the given lambda parameter.
    pub fn is_parameter(&self, parameter: &ParameterExpression) -> bool {
        matches!(self, Expression::Parameter(p) if p == parameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitute_replaces_generic_parameters() {
        let open = SourceType::Func(vec![
            SourceType::GenericParameter(0),
            SourceType::Enumerable(Box::new(SourceType::GenericParameter(0))),
        ]);
        assert_eq!(
            open.substitute(&[SourceType::Int]),
            SourceType::Func(vec![
                SourceType::Int,
                SourceType::Enumerable(Box::new(SourceType::Int))
            ])
        );
    }

    #[test]
    fn binary_infers_result_types() {
        let a = Expression::property(Some("e"), "Dates", SourceType::LocalDate);
        let b = Expression::property(Some("e"), "Other", SourceType::LocalDate);
        assert_eq!(
            Expression::binary(BinaryKind::Subtract, a.clone(), b).ty(),
            &SourceType::Period
        );

        let arr = Expression::property(None, "Ints", SourceType::Array(Box::new(SourceType::Int)));
        let ix = Expression::constant(Value::Int(0));
        assert_eq!(
            Expression::binary(BinaryKind::ArrayIndex, arr, ix).ty(),
            &SourceType::Int
        );
    }

    #[test]
    fn array_and_list_shapes() {
        assert!(SourceType::byte_array().is_array_or_generic_list());
        assert!(SourceType::List(Box::new(SourceType::String)).is_array_or_generic_list());
        assert!(!SourceType::HashSet(Box::new(SourceType::String)).is_array_or_generic_list());
        assert_eq!(
            Value::Array(vec![Value::Null, Value::Int(3)]).source_type(),
            SourceType::Array(Box::new(SourceType::Int))
        );
    }
}
