//! The PostgreSQL visitor.
//!
//! [`Translator`] sits in front of a base strategy and intercepts the node
//!  shapes PostgreSQL translates its own way: array lengths and subscripts,
//!  lambda predicates over arrays, array and tuple construction, date
//!  constructors and `LocalDate` subtraction. Everything else is delegated.

use std::sync::Arc;

use super::{
    BaseTranslator, ColumnInfo, EnumerableExpression, MethodCallTranslatorPlugin, Translation,
    TranslationContext,
    json::JsonPocoTranslator,
    ltree::LTreeTranslator,
    propagates,
    registry::{AggregateMethodCallTranslatorProvider, MethodCallTranslatorProvider},
    relational::RelationalTranslator,
    spatial::SpatialAggregateMethodCallTranslatorPlugin,
};
use crate::{
    ast::{
        BinaryExpression, BinaryKind, DateTimeKind, Expression as E, MethodCallExpression,
        NewArrayExpression, NewArrayKind, NewExpression, ParameterExpression, SourceType,
        UnaryExpression, UnaryKind, Value,
    },
    diagnostics::DiagnosticsLogger,
    error::{Error, Result},
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{
        DATE_ONLY_YMD, DATE_TIME_YMD, DATE_TIME_YMDHMS, DATE_TIME_YMDHMS_KIND, DeclaringType,
        KnownMethod, MethodInfo,
    },
    options::ProviderOptions,
    sql::{AllOperatorType, AnyOperatorType, SqlBinaryOperator, SqlExpression},
    type_mapping::{PgTypeMappingSource, TypeMapping, TypeMappingSource},
};

/// This type provides the PostgreSQL translation of source expressions. The
///  `column_lookup` callback resolves property accesses; `base` handles every
///  node the visitor does not intercept, recursing back through the visitor.
pub struct Translator<F, B = RelationalTranslator>
where
    F: Fn(Option<&str>, &str) -> Option<ColumnInfo>,
{
    pub column_lookup: F,
    base: B,
    factory: Arc<PgSqlExpressionFactory>,
    json: JsonPocoTranslator,
    ltree: Arc<LTreeTranslator>,
    timestamp_mapping: TypeMapping,
    timestamptz_mapping: TypeMapping,
    logger: DiagnosticsLogger,
}

impl<F> Translator<F>
where
    F: Fn(Option<&str>, &str) -> Option<ColumnInfo>,
{
    /// The default provider: the built-in type catalog, the built-in method
    ///  translators and the spatial aggregates.
    pub fn new(column_lookup: F, options: &ProviderOptions) -> Result<Self> {
        Self::with_plugins(column_lookup, options, Arc::new(PgTypeMappingSource::new()), &[])
    }

    /// As [`Translator::new`], with a custom type catalog and extra method
    ///  translators. Plugin translators are consulted after the built-in ones.
    pub fn with_plugins(
        column_lookup: F,
        options: &ProviderOptions,
        type_mapping_source: Arc<dyn TypeMappingSource>,
        plugins: &[&dyn MethodCallTranslatorPlugin],
    ) -> Result<Self> {
        options.version()?;
        let factory = Arc::new(PgSqlExpressionFactory::new(type_mapping_source.clone())?);
        let ltree = Arc::new(LTreeTranslator::new(factory.clone()));

        let mut method_calls = MethodCallTranslatorProvider::new(&factory, options, ltree.clone());
        for plugin in plugins {
            method_calls.add_plugin(*plugin);
        }
        let spatial = SpatialAggregateMethodCallTranslatorPlugin::new(
            type_mapping_source,
            factory.clone(),
        )?;
        let mut aggregates = AggregateMethodCallTranslatorProvider::default();
        aggregates.add_plugin(&spatial);

        log::debug!(
            "built PostgreSQL translator with {} method translators",
            method_calls.len()
        );
        let base = RelationalTranslator::new(
            factory.clone(),
            Arc::new(method_calls),
            Arc::new(aggregates),
        );
        Translator::with_base(column_lookup, base, factory, ltree)
    }
}

impl<F, B> Translator<F, B>
where
    F: Fn(Option<&str>, &str) -> Option<ColumnInfo>,
    B: BaseTranslator,
{
    /// Wraps an arbitrary base strategy. Fails when the catalog has no
    ///  timestamp mappings, which the date constructors need.
    pub fn with_base(
        column_lookup: F,
        base: B,
        factory: Arc<PgSqlExpressionFactory>,
        ltree: Arc<LTreeTranslator>,
    ) -> Result<Self> {
        let require = |store_type: &str| {
            factory
                .type_mapping_source()
                .find_mapping_by_store_type(store_type)
                .ok_or_else(|| Error::MissingTypeMapping(store_type.to_string()))
        };
        let timestamp_mapping = require("timestamp without time zone")?;
        let timestamptz_mapping = require("timestamp with time zone")?;
        Ok(Self {
            column_lookup,
            base,
            json: JsonPocoTranslator::new(factory.clone()),
            factory,
            ltree,
            timestamp_mapping,
            timestamptz_mapping,
            logger: DiagnosticsLogger,
        })
    }

    pub fn factory(&self) -> &Arc<PgSqlExpressionFactory> {
        &self.factory
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    /// Translates an aggregate method (`ConvexHull`, `Union`...) over a set
    ///  the caller has already translated.
    pub fn translate_aggregate(
        &self,
        method: &MethodInfo,
        source: &EnumerableExpression,
        arguments: &[SqlExpression],
    ) -> Translation {
        self.base
            .translate_aggregate(method, source, arguments, &self.logger)
    }

    fn function(&self, name: &str, arguments: Vec<SqlExpression>, ty: SourceType) -> SqlExpression {
        let n = arguments.len();
        self.factory
            .function(name, arguments, true, propagates(n), ty, None)
    }

    fn visit_unary(&self, unary: &UnaryExpression) -> Option<Translation> {
        match unary.kind {
            UnaryKind::ArrayLength => {
                let Some(operand) = self.translate(&unary.operand) else {
                    return Some(None);
                };
                if is_bytea(unary.operand.ty(), &operand) {
                    return Some(Some(self.function("length", vec![operand], SourceType::Int)));
                }
                if let Some(length) = self.json.translate_array_length(&operand) {
                    return Some(Some(length));
                }
                Some(Some(self.function("cardinality", vec![operand], SourceType::Int)))
            }
            // a tuple viewed as ITuple is still the same row
            UnaryKind::Convert if unary.ty == SourceType::ITuple && unary.operand.ty().is_tuple() => {
                Some(self.translate(&unary.operand))
            }
            _ => None,
        }
    }

    fn visit_method_call(&self, call: &MethodCallExpression) -> Option<Translation> {
        let receiver = call.arguments.first()?;
        if !receiver.ty().unwrap_nullable().is_array_or_generic_list() {
            return None;
        }
        self.visit_array_method_call(&call.method, &call.arguments)
    }

    /// `array.Any(x => ...)` and `array.All(x => ...)` patterns, then the ltree
    ///  ones.
    fn visit_array_method_call(&self, method: &MethodInfo, arguments: &[E]) -> Option<Translation> {
        let all = match KnownMethod::identify(method) {
            Some(KnownMethod::EnumerableAnyWithPredicate) => Some(false),
            Some(KnownMethod::EnumerableAll) => Some(true),
            _ => None,
        };
        if let (Some(all), [array, E::Lambda(lambda)]) = (all, arguments) {
            if let [parameter] = lambda.parameters.as_slice() {
                if let Some(translation) = self.visit_predicate(all, array, parameter, &lambda.body) {
                    return Some(translation);
                }
            }
        }
        self.ltree.visit_array_method_call(self, method, arguments)
    }

    fn visit_predicate(
        &self,
        all: bool,
        array: &E,
        parameter: &ParameterExpression,
        body: &E,
    ) -> Option<Translation> {
        let predicate = match body {
            E::Binary(b) if !all && b.kind == BinaryKind::Equal => {
                return self.rewrite_equality(array, parameter, &b.left, &b.right);
            }
            E::MethodCall(predicate) => predicate,
            _ => return None,
        };
        let known = KnownMethod::identify(&predicate.method);

        // Like(EF.Functions, match, x)
        if let Some(KnownMethod::Like | KnownMethod::ILike) = known {
            if let [_, match_expression, pattern] = predicate.arguments.as_slice() {
                if pattern.is_parameter(parameter) {
                    let case_insensitive = known == Some(KnownMethod::ILike);
                    self.logger.rewritten(format_args!(
                        "{} over a pattern array to {}",
                        if case_insensitive { "ILike" } else { "Like" },
                        if all { "ALL" } else { "ANY" }
                    ));
                    return Some(self.like_any_or_all(all, match_expression, array, case_insensitive));
                }
            }
        }

        // other.Contains(x), static or instance
        let other = match (known, predicate.object.as_deref(), predicate.arguments.as_slice()) {
            (Some(KnownMethod::EnumerableContains), None, [other, item])
                if item.is_parameter(parameter) && is_sequence(other.ty()) =>
            {
                Some(other)
            }
            (_, Some(other), [item])
                if predicate.method.name() == "Contains"
                    && matches!(
                        predicate.method.declaring_type(),
                        DeclaringType::List | DeclaringType::HashSet
                    )
                    && item.is_parameter(parameter) =>
            {
                Some(other)
            }
            _ => None,
        };
        if let Some(other) = other {
            self.logger.rewritten(if all {
                "All(Contains) to <@"
            } else {
                "Any(Contains) to &&"
            });
            return Some(self.overlap_or_containment(all, array, other));
        }

        if all {
            return None;
        }
        match (known, predicate.object.as_deref(), predicate.arguments.as_slice()) {
            (Some(KnownMethod::ObjectEquals), None, [left, right]) => {
                self.rewrite_equality(array, parameter, left, right)
            }
            (_, Some(left), [right]) if predicate.method.name() == "Equals" => {
                self.rewrite_equality(array, parameter, left, right)
            }
            _ => None,
        }
    }

    /// `array.Any(x => x == v)` is `array.Contains(v)`, which the method
    ///  translators know how to handle.
    fn rewrite_equality(
        &self,
        array: &E,
        parameter: &ParameterExpression,
        left: &E,
        right: &E,
    ) -> Option<Translation> {
        let other = if left.is_parameter(parameter) {
            right
        } else if right.is_parameter(parameter) {
            left
        } else {
            return None;
        };
        self.logger.rewritten("Any(x => x == v) to Contains(v)");
        let contains = KnownMethod::EnumerableContains.instantiate(vec![parameter.ty.clone()]);
        Some(self.translate(&E::call(contains, vec![array.clone(), other.clone()])))
    }

    fn like_any_or_all(&self, all: bool, match_expression: &E, array: &E, case_insensitive: bool) -> Translation {
        let item = self.translate(match_expression)?;
        let array = self.translate(array)?;
        let f = &self.factory;
        Some(match (all, case_insensitive) {
            (false, false) => f.any(item, array, AnyOperatorType::Like),
            (false, true) => f.any(item, array, AnyOperatorType::ILike),
            (true, false) => f.all(item, array, AllOperatorType::Like),
            (true, true) => f.all(item, array, AllOperatorType::ILike),
        })
    }

    fn overlap_or_containment(&self, all: bool, array: &E, other: &E) -> Translation {
        let array = self.translate(array)?;
        let other = self.translate(other)?;
        Some(if all {
            self.factory.contained_by(array, other)
        } else {
            self.factory.overlaps(array, other)
        })
    }

    fn visit_new_array(&self, new_array: &NewArrayExpression) -> Option<Translation> {
        if new_array.kind != NewArrayKind::Init {
            return None;
        }
        let elements = new_array
            .expressions
            .iter()
            .map(|e| self.translate(e))
            .collect::<Option<Vec<_>>>();
        if elements.is_none() {
            self.logger
                .untranslatable(format_args!("an element of {:?}", new_array.ty));
        }
        Some(elements.map(|e| self.factory.new_array(e, new_array.ty.clone())))
    }

    fn visit_binary(&self, binary: &BinaryExpression) -> Option<Translation> {
        let f = &self.factory;
        match binary.kind {
            BinaryKind::Subtract => {
                let left = try_remove_implicit_convert(&binary.left);
                let right = try_remove_implicit_convert(&binary.right);
                let is_date = |e: &E| *e.ty().unwrap_nullable() == SourceType::LocalDate;
                if !is_date(left) || !is_date(right) {
                    return None;
                }
                let days = self.translate(left).zip(self.translate(right)).and_then(|(l, r)| {
                    f.make_binary(SqlBinaryOperator::Subtract, l, r, Some(f.int_mapping().clone()))
                });
                Some(days.map(|days| {
                    f.function_with_named_arguments(
                        "make_interval",
                        vec![days],
                        vec![Some("days".into())],
                        true,
                        propagates(1),
                        SourceType::Period,
                        None,
                    )
                }))
            }
            BinaryKind::ArrayIndex => {
                let (Some(array), Some(index)) = (
                    self.translate(try_remove_implicit_convert(&binary.left)),
                    self.translate(try_remove_implicit_convert(&binary.right)),
                ) else {
                    return Some(None);
                };
                if is_bytea(binary.left.ty(), &array) {
                    return Some(Some(self.function("get_byte", vec![array, index], SourceType::Byte)));
                }
                if let Some(member) = self.json.translate_member_access(&array, &index, &binary.ty) {
                    return Some(Some(member));
                }
                Some(Some(f.array_index(array, f.generate_one_based_index(index), true)))
            }
            _ => None,
        }
    }

    fn visit_new(&self, new: &NewExpression) -> Option<Translation> {
        let constructor = &new.constructor;
        if constructor.declaring_type.is_tuple() {
            let values = self.translate_all(&new.arguments);
            return Some(values.map(|v| self.factory.row_value(v, constructor.declaring_type.clone())));
        }

        let timestamp = Some(self.timestamp_mapping.clone());
        if *constructor == *DATE_TIME_YMD {
            return Some(self.make("make_date", &new.arguments, SourceType::DateTime, timestamp));
        }
        if *constructor == *DATE_ONLY_YMD {
            return Some(self.make("make_date", &new.arguments, SourceType::DateOnly, None));
        }
        if *constructor == *DATE_TIME_YMDHMS {
            let arguments = with_double_seconds(&new.arguments)?;
            return Some(self.make("make_timestamp", &arguments, SourceType::DateTime, timestamp));
        }
        if *constructor == *DATE_TIME_YMDHMS_KIND {
            let E::Constant(kind) = new.arguments.get(6)? else {
                return Some(None);
            };
            let Value::DateTimeKind(kind) = kind.value else {
                return Some(None);
            };
            let mut arguments = with_double_seconds(&new.arguments)?;
            if kind == DateTimeKind::Utc {
                arguments.push(E::constant(Value::String("UTC".into())));
                let timestamptz = Some(self.timestamptz_mapping.clone());
                return Some(self.make("make_timestamptz", &arguments, SourceType::DateTime, timestamptz));
            }
            return Some(self.make("make_timestamp", &arguments, SourceType::DateTime, timestamp));
        }
        None
    }

    fn make(
        &self,
        name: &str,
        arguments: &[E],
        ty: SourceType,
        mapping: Option<TypeMapping>,
    ) -> Translation {
        let arguments = self.translate_all(arguments)?;
        let n = arguments.len();
        Some(self.factory.function(name, arguments, true, propagates(n), ty, mapping))
    }

    fn translate_all(&self, expressions: &[E]) -> Option<Vec<SqlExpression>> {
        expressions.iter().map(|e| self.translate(e)).collect()
    }
}

impl<F, B> TranslationContext for Translator<F, B>
where
    F: Fn(Option<&str>, &str) -> Option<ColumnInfo>,
    B: BaseTranslator,
{
    fn lookup_column(&self, source: Option<&str>, property: &str) -> Option<ColumnInfo> {
        (self.column_lookup)(source, property)
    }

    fn translate(&self, source: &E) -> Translation {
        let intercepted = match source {
            E::Unary(u) => self.visit_unary(u),
            E::MethodCall(c) => self.visit_method_call(c),
            E::Binary(b) => self.visit_binary(b),
            // constructors get the base strategy's opinion first
            E::NewArray(a) => {
                return self
                    .base
                    .translate(source, self)
                    .or_else(|| self.visit_new_array(a).flatten());
            }
            E::New(n) => {
                return self
                    .base
                    .translate(source, self)
                    .or_else(|| self.visit_new(n).flatten());
            }
            _ => None,
        };
        intercepted.unwrap_or_else(|| self.base.translate(source, self))
    }

    fn logger(&self) -> &DiagnosticsLogger {
        &self.logger
    }
}

/// A byte array that is stored as `bytea`, or that has no mapping yet.
fn is_bytea(ty: &SourceType, translated: &SqlExpression) -> bool {
    ty.unwrap_nullable().is_byte_array()
        && translated.type_mapping().is_none_or(TypeMapping::is_byte_array)
}

fn is_sequence(ty: &SourceType) -> bool {
    matches!(
        ty.unwrap_nullable(),
        SourceType::Array(_) | SourceType::List(_) | SourceType::HashSet(_)
    )
}

/// The first six constructor arguments, seconds widened to a double as
///  `make_timestamp` wants them.
fn with_double_seconds(arguments: &[E]) -> Option<Vec<E>> {
    let [year, month, day, hour, minute, second, ..] = arguments else {
        return None;
    };
    Some(vec![
        year.clone(),
        month.clone(),
        day.clone(),
        hour.clone(),
        minute.clone(),
        E::convert(second.clone(), SourceType::Double),
    ])
}

/// Strips conversions the compiler inserted around `expression`: to the same
///  type, to its nullable form, or widening a small integer to `int`.
pub fn try_remove_implicit_convert(expression: &E) -> &E {
    let E::Unary(unary) = expression else {
        return expression;
    };
    if !matches!(unary.kind, UnaryKind::Convert | UnaryKind::ConvertChecked) {
        return expression;
    }
    let inner = unary.operand.ty().underlying();
    let converted = unary.ty.unwrap_nullable();
    let widened = *converted == SourceType::Int
        && matches!(
            inner,
            SourceType::Byte
                | SourceType::SByte
                | SourceType::Char
                | SourceType::Short
                | SourceType::UShort
        );
    if inner == converted || widened {
        try_remove_implicit_convert(&unary.operand)
    } else {
        expression
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::methods::ConstructorInfo;

    fn lookup(_source: Option<&str>, property: &str) -> Option<ColumnInfo> {
        match property {
            "Born" => Some(ColumnInfo::new("born", SourceType::LocalDate)),
            "Died" => Some(ColumnInfo::new("died", SourceType::LocalDate)),
            "Year" => Some(ColumnInfo::new("year", SourceType::Int).not_null()),
            "Level" => Some(ColumnInfo::new("level", SourceType::Short).not_null()),
            "Ids" => Some(ColumnInfo::new("ids", SourceType::Array(Box::new(SourceType::Int)))),
            _ => None,
        }
    }

    type Lookup = fn(Option<&str>, &str) -> Option<ColumnInfo>;

    fn translator() -> Translator<Lookup> {
        Translator::new(lookup as Lookup, &ProviderOptions::default()).unwrap()
    }

    fn int(v: i32) -> E {
        E::constant(Value::Int(v))
    }

    #[test]
    fn implicit_widening_is_removed() {
        let level = E::property(None, "Level", SourceType::Short);
        let widened = E::convert(level.clone(), SourceType::Int);
        assert_eq!(try_remove_implicit_convert(&widened), &level);

        let nested = E::convert(widened, SourceType::nullable(SourceType::Int));
        assert_eq!(try_remove_implicit_convert(&nested), &level);

        let narrowing = E::convert(E::property(None, "Year", SourceType::Int), SourceType::Short);
        assert_eq!(try_remove_implicit_convert(&narrowing), &narrowing);
    }

    #[test]
    fn widened_constant_index_is_folded() {
        let t = translator();
        let ids = E::property(None, "Ids", SourceType::Array(Box::new(SourceType::Int)));

        // e.Ids[(int)(short)1]
        let index = E::convert(E::constant(Value::Short(1)), SourceType::Int);
        let tree = E::binary(BinaryKind::ArrayIndex, ids.clone(), index);
        let Some(SqlExpression::ArrayIndex(subscript)) = t.translate(&tree) else {
            panic!("expected a subscript");
        };
        assert_eq!(subscript.index.as_constant(), Some(&Value::Int(2)));

        let tree = E::binary(BinaryKind::ArrayIndex, ids, E::constant(Value::Long(i64::MAX)));
        let Some(SqlExpression::ArrayIndex(subscript)) = t.translate(&tree) else {
            panic!("expected a subscript");
        };
        assert!(matches!(*subscript.index, SqlExpression::Binary(_)));
    }

    #[test]
    fn local_date_subtraction_is_an_interval_in_days() {
        let t = translator();
        let born = E::property(None, "Born", SourceType::LocalDate);
        let died = E::convert(
            E::property(None, "Died", SourceType::LocalDate),
            SourceType::nullable(SourceType::LocalDate),
        );
        let tree = E::binary(BinaryKind::Subtract, died, born);
        let sql = t.translate(&tree).unwrap();
        let interval = sql.as_function().unwrap();
        assert_eq!(interval.name, "make_interval");
        assert_eq!(interval.argument_names, Some(vec![Some("days".to_string())]));
        assert_eq!(interval.ty, SourceType::Period);
        let SqlExpression::Binary(days) = &interval.arguments[0] else {
            panic!("expected a subtraction");
        };
        assert_eq!(days.operator, SqlBinaryOperator::Subtract);
        assert_eq!(days.type_mapping.as_ref().unwrap().store_type, "integer");
    }

    #[test]
    fn date_time_constructors() {
        let t = translator();
        let ymd = E::new_object(DATE_TIME_YMD.clone(), vec![E::property(None, "Year", SourceType::Int), int(1), int(1)]);
        let sql = t.translate(&ymd).unwrap();
        let make_date = sql.as_function().unwrap();
        assert_eq!(make_date.name, "make_date");
        assert_eq!(make_date.type_mapping.as_ref().unwrap().store_type, "timestamp without time zone");

        let mut arguments: Vec<E> = (1..=6).map(int).collect();
        let sql = t.translate(&E::new_object(DATE_TIME_YMDHMS.clone(), arguments.clone())).unwrap();
        let make_timestamp = sql.as_function().unwrap();
        assert_eq!(make_timestamp.name, "make_timestamp");
        assert_eq!(make_timestamp.arguments[5].ty(), &SourceType::Double);

        arguments.push(E::constant(Value::DateTimeKind(DateTimeKind::Utc)));
        let sql = t.translate(&E::new_object(DATE_TIME_YMDHMS_KIND.clone(), arguments.clone())).unwrap();
        let make_timestamptz = sql.as_function().unwrap();
        assert_eq!(make_timestamptz.name, "make_timestamptz");
        assert_eq!(make_timestamptz.arguments.len(), 7);
        assert_eq!(make_timestamptz.arguments[6].as_constant(), Some(&Value::String("UTC".into())));
        assert_eq!(make_timestamptz.type_mapping.as_ref().unwrap().store_type, "timestamp with time zone");

        arguments[6] = E::constant(Value::DateTimeKind(DateTimeKind::Local));
        let sql = t.translate(&E::new_object(DATE_TIME_YMDHMS_KIND.clone(), arguments)).unwrap();
        assert_eq!(sql.as_function().unwrap().name, "make_timestamp");
        assert_eq!(sql.as_function().unwrap().arguments.len(), 6);
    }

    #[test]
    fn unknown_constructors_are_not_translated() {
        let t = translator();
        let other = ConstructorInfo::new(SourceType::Guid, vec![SourceType::String]);
        let tree = E::new_object(other, vec![E::constant(Value::String("x".into()))]);
        assert_eq!(t.translate(&tree), None);
    }

    #[test]
    fn array_literals_fail_as_a_whole() {
        let t = translator();
        let literal = E::new_array(SourceType::Int, vec![int(1), E::property(None, "Year", SourceType::Int)]);
        let SqlExpression::NewArray(array) = t.translate(&literal).unwrap() else {
            panic!("expected ARRAY[...]");
        };
        assert_eq!(array.type_mapping.unwrap().store_type, "integer[]");

        let broken = E::new_array(SourceType::Int, vec![int(1), E::parameter("x", SourceType::Int)]);
        assert_eq!(t.translate(&broken), None);
    }

    #[test]
    fn rejects_an_invalid_version() {
        let options = ProviderOptions::default().with_postgres_version("twelve");
        let result = Translator::new(lookup, &options);
        assert!(matches!(result, Err(Error::InvalidPostgresVersion(_))));
    }
}
