use std::sync::Arc;

use crate::{
    ast::{RegexOptions, Value},
    diagnostics::DiagnosticsLogger,
    factory::PgSqlExpressionFactory,
    methods::{KnownMethod, MethodInfo},
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation},
};

/// Options PostgreSQL regular expressions can express; `Compiled` and the
///  culture flag have no effect on matching.
const SUPPORTED: RegexOptions = RegexOptions(
    RegexOptions::IGNORE_CASE.0
        | RegexOptions::MULTILINE.0
        | RegexOptions::SINGLELINE.0
        | RegexOptions::IGNORE_PATTERN_WHITESPACE.0
        | RegexOptions::COMPILED.0
        | RegexOptions::CULTURE_INVARIANT.0,
);

/// `Regex.IsMatch(input, pattern[, options])` as `~` or `~*`. The options
///  must be a constant.
#[derive(Debug)]
pub struct RegexIsMatchTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl RegexIsMatchTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

impl MethodCallTranslator for RegexIsMatchTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        logger: &DiagnosticsLogger,
    ) -> Translation {
        let (input, pattern, options) = match (KnownMethod::identify(method)?, arguments) {
            (KnownMethod::RegexIsMatch, [input, pattern]) => (input, pattern, RegexOptions::NONE),
            (KnownMethod::RegexIsMatchWithOptions, [input, pattern, options]) => {
                let Some(Value::RegexOptions(options)) = options.as_constant() else {
                    logger.untranslatable("Regex.IsMatch with non-constant options");
                    return None;
                };
                (input, pattern, *options)
            }
            _ => return None,
        };
        if options.without(SUPPORTED) != RegexOptions::NONE {
            logger.untranslatable(format_args!("Regex.IsMatch with options {:#x}", options.0));
            return None;
        }
        let options = options.without(RegexOptions::COMPILED | RegexOptions::CULTURE_INVARIANT);
        Some(self.factory.regex_match(input.clone(), pattern.clone(), options))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ast::SourceType,
        factory::SqlExpressionFactory,
        translate::methods::test_support::{column, factory, string},
    };

    fn is_match(t: &RegexIsMatchTranslator, options: Option<RegexOptions>) -> Translation {
        let f = &t.factory;
        let mut arguments = vec![column(f, "name", SourceType::String, None), string(f, "^A")];
        let method = match options {
            Some(options) => {
                arguments.push(f.constant(Value::RegexOptions(options), None));
                KnownMethod::RegexIsMatchWithOptions.method()
            }
            None => KnownMethod::RegexIsMatch.method(),
        };
        t.translate(None, &method, &arguments, &DiagnosticsLogger)
    }

    #[test]
    fn ignore_case_is_case_insensitive_matching() {
        let t = RegexIsMatchTranslator::new(factory());
        let Some(SqlExpression::RegexMatch(m)) =
            is_match(&t, Some(RegexOptions::IGNORE_CASE | RegexOptions::COMPILED))
        else {
            panic!("expected a regex match");
        };
        assert!(m.is_case_insensitive());
        assert_eq!(m.options, RegexOptions::IGNORE_CASE);
        assert_eq!(m.embedded_flags(), "(?p)");
    }

    #[test]
    fn multiline_and_whitespace_become_flags() {
        let t = RegexIsMatchTranslator::new(factory());
        let Some(SqlExpression::RegexMatch(m)) =
            is_match(&t, Some(RegexOptions::MULTILINE | RegexOptions::IGNORE_PATTERN_WHITESPACE))
        else {
            panic!("expected a regex match");
        };
        assert_eq!(m.embedded_flags(), "(?nx)");

        let Some(SqlExpression::RegexMatch(plain)) = is_match(&t, None) else {
            panic!("expected a regex match");
        };
        assert!(!plain.is_case_insensitive());
    }

    #[test]
    fn right_to_left_is_declined() {
        let t = RegexIsMatchTranslator::new(factory());
        assert_eq!(is_match(&t, Some(RegexOptions::RIGHT_TO_LEFT)), None);
    }
}
