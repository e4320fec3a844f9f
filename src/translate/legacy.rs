//! The composite translator of earlier releases: a fixed table of narrow
//!  single-method entries. Superseded by
//!  [`MethodCallTranslatorProvider`](super::registry::MethodCallTranslatorProvider).

use std::sync::Arc;

use super::{MethodCallTranslator, Translation, propagates};
use crate::{
    ast::{RegexOptions, SourceType, Value},
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{DeclaringType, KnownMethod, MethodInfo},
    sql::SqlExpression,
};

type Build = fn(&PgSqlExpressionFactory, Option<&SqlExpression>, &[SqlExpression], &MethodInfo) -> Translation;

struct Entry {
    matches: fn(&MethodInfo) -> bool,
    build: Build,
}

fn call(f: &PgSqlExpressionFactory, name: &str, arguments: Vec<SqlExpression>, ty: &SourceType) -> SqlExpression {
    let n = arguments.len();
    f.function(name, arguments, true, propagates(n), ty.clone(), None)
}

fn math(method: &MethodInfo, name: &str) -> bool {
    method.declaring_type() == DeclaringType::Math && method.name() == name
}

fn string(f: &PgSqlExpressionFactory, s: &str) -> SqlExpression {
    f.constant(Value::String(s.to_string()), None)
}

/// `function(instance)`, for the argumentless string methods.
fn on_instance(f: &PgSqlExpressionFactory, name: &str, instance: Option<&SqlExpression>) -> Translation {
    Some(call(f, name, vec![instance?.clone()], &SourceType::String))
}

static ENTRIES: &[Entry] = &[
    Entry {
        matches: |m| m.declaring_type() == DeclaringType::Convert && m.name().starts_with("To"),
        build: |f, _, args, m| match args {
            [value] => Some(f.convert(value.clone(), m.return_type.clone(), None)),
            _ => None,
        },
    },
    Entry {
        matches: |m| m.is(KnownMethod::StringSubstring),
        build: |f, instance, args, _| {
            let [start, length] = args else { return None };
            let start = f.generate_one_based_index(start.clone());
            Some(call(f, "substr", vec![instance?.clone(), start, length.clone()], &SourceType::String))
        },
    },
    Entry {
        matches: |m| math(m, "Abs"),
        build: |f, _, args, m| Some(call(f, "abs", args.to_vec(), &m.return_type)),
    },
    Entry {
        matches: |m| math(m, "Ceiling"),
        build: |f, _, args, m| Some(call(f, "ceiling", args.to_vec(), &m.return_type)),
    },
    Entry {
        matches: |m| math(m, "Floor"),
        build: |f, _, args, m| Some(call(f, "floor", args.to_vec(), &m.return_type)),
    },
    Entry {
        matches: |m| math(m, "Pow"),
        build: |f, _, args, m| Some(call(f, "power", args.to_vec(), &m.return_type)),
    },
    Entry {
        matches: |m| math(m, "Round"),
        build: |f, _, args, m| Some(call(f, "round", args.to_vec(), &m.return_type)),
    },
    Entry {
        matches: |m| math(m, "Truncate"),
        build: |f, _, args, m| Some(call(f, "trunc", args.to_vec(), &m.return_type)),
    },
    // instance LIKE '%' || pattern
    Entry {
        matches: |m| m.is(KnownMethod::StringEndsWith),
        build: |f, instance, args, _| {
            let [pattern] = args else { return None };
            let pattern = f.add(string(f, "%"), pattern.clone(), None)?;
            Some(f.like(instance?.clone(), pattern, None, false))
        },
    },
    Entry {
        matches: |m| m.is(KnownMethod::StringStartsWith),
        build: |f, instance, args, _| {
            let [pattern] = args else { return None };
            let pattern = f.add(pattern.clone(), string(f, "%"), None)?;
            Some(f.like(instance?.clone(), pattern, None, false))
        },
    },
    Entry {
        matches: |m| m.is(KnownMethod::StringContains),
        build: |f, instance, args, _| {
            let [needle] = args else { return None };
            let position = call(f, "strpos", vec![instance?.clone(), needle.clone()], &SourceType::Int);
            Some(f.greater_than(position, f.constant(Value::Int(0), None)))
        },
    },
    Entry {
        matches: |m| m.is(KnownMethod::StringReplace),
        build: |f, instance, args, _| {
            let mut arguments = vec![instance?.clone()];
            arguments.extend_from_slice(args);
            Some(call(f, "replace", arguments, &SourceType::String))
        },
    },
    Entry {
        matches: |m| m.is(KnownMethod::StringToLower),
        build: |f, instance, _, _| on_instance(f, "lower", instance),
    },
    Entry {
        matches: |m| m.is(KnownMethod::StringToUpper),
        build: |f, instance, _, _| on_instance(f, "upper", instance),
    },
    Entry {
        matches: |m| m.is(KnownMethod::StringTrim),
        build: |f, instance, _, _| on_instance(f, "btrim", instance),
    },
    Entry {
        matches: |m| m.is(KnownMethod::StringTrimEnd),
        build: |f, instance, _, _| on_instance(f, "rtrim", instance),
    },
    Entry {
        matches: |m| m.is(KnownMethod::StringTrimStart),
        build: |f, instance, _, _| on_instance(f, "ltrim", instance),
    },
    Entry {
        matches: |m| m.is(KnownMethod::RegexIsMatch),
        build: |f, _, args, _| {
            let [input, pattern] = args else { return None };
            Some(f.regex_match(input.clone(), pattern.clone(), RegexOptions::NONE))
        },
    },
];

#[derive(Debug)]
pub struct CompositeMethodCallTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl CompositeMethodCallTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }

    pub fn len(&self) -> usize {
        ENTRIES.len()
    }

    pub fn is_empty(&self) -> bool {
        ENTRIES.is_empty()
    }
}

impl MethodCallTranslator for CompositeMethodCallTranslator {
    fn translate(
        &self,
        instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        ENTRIES
            .iter()
            .filter(|e| (e.matches)(method))
            .find_map(|e| (e.build)(&self.factory, instance, arguments, method))
    }
}
