use std::sync::Arc;

use crate::{
    ast::{Expression, SourceType},
    diagnostics::DiagnosticsLogger,
    methods::MethodInfo,
    sql::{Ordering, SqlExpression},
};

pub mod json;
pub mod legacy;
pub mod ltree;
pub mod methods;
pub mod postgres;
pub mod registry;
pub mod relational;
pub mod spatial;

/// The result of translating a node: `None` means "cannot translate this
///  shape", which is an expected outcome and not an error.
pub type Translation = Option<SqlExpression>;

/// What the caller knows about a mapped property.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Table alias the column is qualified with.
    pub table: Option<String>,
    pub name: String,
    pub ty: SourceType,
    /// Configured store type (`bytea`, `smallint[]`, `geography`...). When
    ///  absent the default mapping for `ty` is used.
    pub store_type: Option<String>,
    pub nullable: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, ty: SourceType) -> Self {
        Self {
            table: None,
            name: name.into(),
            ty,
            store_type: None,
            nullable: true,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_store_type(mut self, store_type: impl Into<String>) -> Self {
        self.store_type = Some(store_type.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// The set an aggregate reduces: the per-element selector plus the modifiers
///  the query applied to the set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumerableExpression {
    pub selector: Option<SqlExpression>,
    pub is_distinct: bool,
    pub predicate: Option<SqlExpression>,
    pub orderings: Vec<Ordering>,
}

impl EnumerableExpression {
    pub fn new(selector: SqlExpression) -> Self {
        Self {
            selector: Some(selector),
            ..Default::default()
        }
    }

    pub fn distinct(mut self) -> Self {
        self.is_distinct = true;
        self
    }

    pub fn with_predicate(mut self, predicate: SqlExpression) -> Self {
        self.predicate = Some(predicate);
        self
    }
}

/// This trait is the visitor seen from the inside: every sub-expression is
///  translated through it, so the outermost visitor gets a look at each node.
///  A dialect is built by wrapping a base strategy and intercepting what needs
///  to be handled differently:
///
/// ```rust
/// # use pg_expr::{ast::Expression, diagnostics::DiagnosticsLogger,
/// #     translate::{ColumnInfo, Translation, TranslationContext, BaseTranslator, relational::RelationalTranslator}};
/// struct NoConstants<'a> {
///     base: &'a RelationalTranslator,
///     logger: DiagnosticsLogger,
/// }
///
/// impl TranslationContext for NoConstants<'_> {
///     fn lookup_column(&self, _source: Option<&str>, _property: &str) -> Option<ColumnInfo> {
///         None
///     }
///
///     fn translate(&self, source: &Expression) -> Translation {
///         // This is the place to handle specific cases...
///         if let Expression::Constant(_) = source {
///             return None;
///         }
///         // ...and everything else can be delegated
///         self.base.translate(source, self)
///     }
///
///     fn logger(&self) -> &DiagnosticsLogger {
///         &self.logger
///     }
/// }
/// ```
pub trait TranslationContext {
    /// Called to resolve a property access to a column.
    ///   `source`: the alias of the entity (`e` in `e.Name`)
    ///   `property`: the property name
    fn lookup_column(&self, source: Option<&str>, property: &str) -> Option<ColumnInfo>;

    /// Called to translate an expression generally.
    fn translate(&self, source: &Expression) -> Translation;

    fn logger(&self) -> &DiagnosticsLogger;
}

/// A base traversal strategy. It recurses through `cx`, never through itself.
pub trait BaseTranslator: Send + Sync {
    fn translate(&self, source: &Expression, cx: &dyn TranslationContext) -> Translation;

    /// Translates an aggregate method over an already translated set.
    fn translate_aggregate(
        &self,
        method: &MethodInfo,
        source: &EnumerableExpression,
        arguments: &[SqlExpression],
        logger: &DiagnosticsLogger,
    ) -> Translation;
}

/// Translates one narrow family of scalar method calls. Returning `None`
///  declines the call so the next translator gets a chance.
pub trait MethodCallTranslator: Send + Sync {
    fn translate(
        &self,
        instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        logger: &DiagnosticsLogger,
    ) -> Translation;

    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// As [`MethodCallTranslator`], for methods that reduce a set.
pub trait AggregateMethodCallTranslator: Send + Sync {
    fn translate(
        &self,
        method: &MethodInfo,
        source: &EnumerableExpression,
        arguments: &[SqlExpression],
        logger: &DiagnosticsLogger,
    ) -> Translation;

    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Supplies extra scalar translators, appended after the built-in ones.
pub trait MethodCallTranslatorPlugin {
    fn translators(&self) -> Vec<Arc<dyn MethodCallTranslator>>;
}

/// Supplies aggregate translators.
pub trait AggregateMethodCallTranslatorPlugin {
    fn translators(&self) -> Vec<Arc<dyn AggregateMethodCallTranslator>>;
}

/// `true` repeated `n` times, the usual nullability vector.
pub(crate) fn propagates(n: usize) -> Vec<bool> {
    vec![true; n]
}
