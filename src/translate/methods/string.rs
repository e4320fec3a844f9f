//! `string` instance methods plus `IsNullOrEmpty`/`IsNullOrWhiteSpace`.

use std::sync::Arc;

use crate::{
    ast::{SourceType, Value},
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation, propagates},
};

const LIKE_ESCAPE: char = '\\';

/// Escapes LIKE wildcards so a literal can be embedded in a pattern.
pub(crate) fn escape_like_pattern(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug)]
pub struct StringMethodTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl StringMethodTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }

    fn function(&self, name: &str, arguments: Vec<SqlExpression>, ty: SourceType) -> SqlExpression {
        let n = arguments.len();
        self.factory.function(name, arguments, true, propagates(n), ty, None)
    }

    fn string(&self, s: impl Into<String>) -> SqlExpression {
        self.factory.constant(Value::String(s.into()), None)
    }

    fn int(&self, i: i32) -> SqlExpression {
        self.factory.constant(Value::Int(i), None)
    }

    fn strpos(&self, instance: &SqlExpression, needle: &SqlExpression) -> SqlExpression {
        self.function("strpos", vec![instance.clone(), needle.clone()], SourceType::Int)
    }

    /// `StartsWith` and `EndsWith`. Constant patterns become LIKE with the
    ///  wildcards escaped; anything else compares a prefix or suffix.
    fn starts_or_ends_with(
        &self,
        instance: &SqlExpression,
        pattern: &SqlExpression,
        starts: bool,
    ) -> Translation {
        let f = &self.factory;
        if let Some(value) = pattern.as_constant() {
            let Value::String(s) = value else {
                return None;
            };
            let escaped = escape_like_pattern(s);
            let pattern = if starts { format!("{escaped}%") } else { format!("%{escaped}") };
            return Some(f.like(
                instance.clone(),
                self.string(pattern),
                Some(self.string(LIKE_ESCAPE)),
                false,
            ));
        }
        let length = self.function("length", vec![pattern.clone()], SourceType::Int);
        let side = self.function(
            if starts { "left" } else { "right" },
            vec![instance.clone(), length],
            SourceType::String,
        );
        Some(f.equal(side, pattern.clone()))
    }
}

impl MethodCallTranslator for StringMethodTranslator {
    fn translate(
        &self,
        instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        use KnownMethod as K;
        let f = &self.factory;
        let known = KnownMethod::identify(method)?;

        match (known, arguments) {
            (K::StringIsNullOrEmpty, [s]) => {
                let empty = f.equal(s.clone(), self.string(""));
                return Some(f.or_else(f.is_null(s.clone()), empty));
            }
            (K::StringIsNullOrWhiteSpace, [s]) => {
                let trimmed = self.function("btrim", vec![s.clone(), self.string(" \t\n\r")], SourceType::String);
                let empty = f.equal(trimmed, self.string(""));
                return Some(f.or_else(f.is_null(s.clone()), empty));
            }
            _ => {}
        }

        let instance = instance?;
        let ty = SourceType::String;
        Some(match (known, arguments) {
            (K::StringContains, [needle]) => f.greater_than(self.strpos(instance, needle), self.int(0)),
            (K::StringStartsWith, [pattern]) => self.starts_or_ends_with(instance, pattern, true)?,
            (K::StringEndsWith, [pattern]) => self.starts_or_ends_with(instance, pattern, false)?,
            (K::StringIndexOf, [needle]) => f.subtract(self.strpos(instance, needle), self.int(1), None)?,
            (K::StringReplace, [old, new]) => {
                self.function("replace", vec![instance.clone(), old.clone(), new.clone()], ty)
            }
            (K::StringToLower, []) => self.function("lower", vec![instance.clone()], ty),
            (K::StringToUpper, []) => self.function("upper", vec![instance.clone()], ty),
            (K::StringSubstringFrom, [start]) => {
                let start = f.generate_one_based_index(start.clone());
                self.function("substr", vec![instance.clone(), start], ty)
            }
            (K::StringSubstring, [start, length]) => {
                let start = f.generate_one_based_index(start.clone());
                self.function("substr", vec![instance.clone(), start, length.clone()], ty)
            }
            (K::StringTrim, []) => self.function("btrim", vec![instance.clone()], ty),
            (K::StringTrimStart, []) => self.function("ltrim", vec![instance.clone()], ty),
            (K::StringTrimEnd, []) => self.function("rtrim", vec![instance.clone()], ty),
            (K::StringPadLeft | K::StringPadLeftWith, _) => {
                let mut arguments_with_instance = vec![instance.clone()];
                arguments_with_instance.extend_from_slice(arguments);
                self.function("lpad", arguments_with_instance, ty)
            }
            (K::StringPadRight | K::StringPadRightWith, _) => {
                let mut arguments_with_instance = vec![instance.clone()];
                arguments_with_instance.extend_from_slice(arguments);
                self.function("rpad", arguments_with_instance, ty)
            }
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        sql::{SqlBinaryOperator, SqlParameter},
        translate::methods::test_support::{column, factory, string},
    };

    fn translate(method: KnownMethod, instance: Option<&SqlExpression>, arguments: &[SqlExpression]) -> SqlExpression {
        let t = StringMethodTranslator::new(factory());
        t.translate(instance, &method.method(), arguments, &DiagnosticsLogger)
            .unwrap()
    }

    #[test]
    fn escapes_wildcards() {
        assert_eq!(escape_like_pattern(r"50%_off\"), r"50\%\_off\\");
    }

    #[test]
    fn starts_with_constant_is_an_escaped_like() {
        let f = factory();
        let name = column(&f, "name", SourceType::String, None);
        let SqlExpression::Like(like) =
            translate(KnownMethod::StringStartsWith, Some(&name), &[string(&f, "a_b")])
        else {
            panic!("expected LIKE");
        };
        assert_eq!(like.pattern.as_constant(), Some(&Value::String(r"a\_b%".into())));
        assert_eq!(like.escape.unwrap().as_constant(), Some(&Value::String(r"\".into())));
    }

    #[test]
    fn ends_with_parameter_compares_the_suffix() {
        let f = factory();
        let name = column(&f, "name", SourceType::String, None);
        let suffix = SqlExpression::Parameter(SqlParameter {
            name: "suffix".into(),
            ty: SourceType::String,
            type_mapping: None,
            nullable: true,
        });
        let SqlExpression::Binary(eq) = translate(KnownMethod::StringEndsWith, Some(&name), &[suffix]) else {
            panic!("expected a comparison");
        };
        assert_eq!(eq.operator, SqlBinaryOperator::Equal);
        assert_eq!(eq.left.as_function().unwrap().name, "right");
    }

    #[test]
    fn substring_is_one_based() {
        let f = factory();
        let name = column(&f, "name", SourceType::String, None);
        let sql = translate(
            KnownMethod::StringSubstring,
            Some(&name),
            &[f.constant(Value::Int(0), None), f.constant(Value::Int(3), None)],
        );
        let substr = sql.as_function().unwrap();
        assert_eq!(substr.name, "substr");
        assert_eq!(substr.arguments[1].as_constant(), Some(&Value::Int(1)));
    }

    #[test]
    fn is_null_or_white_space() {
        let f = factory();
        let name = column(&f, "name", SourceType::String, None);
        let SqlExpression::Binary(or) = translate(KnownMethod::StringIsNullOrWhiteSpace, None, &[name]) else {
            panic!("expected OR");
        };
        assert_eq!(or.operator, SqlBinaryOperator::OrElse);
        assert!(matches!(*or.left, SqlExpression::Unary(_)));
    }
}
