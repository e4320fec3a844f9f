use std::sync::Arc;

use crate::{
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::{PgOperator, SqlExpression},
    translate::{MethodCallTranslator, Translation, propagates},
};

/// The pg_trgm extension.
#[derive(Debug)]
pub struct TrigramsMethodTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl TrigramsMethodTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

impl MethodCallTranslator for TrigramsMethodTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        use KnownMethod as K;
        let f = &self.factory;
        let known = KnownMethod::identify(method)?;
        let arguments = arguments.get(1..)?;

        let operator = match known {
            K::TrigramsAreSimilar => Some(PgOperator::TrigramAreSimilar),
            K::TrigramsAreWordSimilar => Some(PgOperator::TrigramAreWordSimilar),
            K::TrigramsAreStrictWordSimilar => Some(PgOperator::TrigramAreStrictWordSimilar),
            K::TrigramsSimilarityDistance => Some(PgOperator::TrigramSimilarityDistance),
            _ => None,
        };
        if let Some(operator) = operator {
            let [left, right] = arguments else {
                return None;
            };
            let ty = (operator == PgOperator::TrigramSimilarityDistance).then(|| method.return_type.clone());
            return Some(f.pg_binary(operator, left.clone(), right.clone(), ty, None));
        }

        let name = match known {
            K::TrigramsShow => "show_trgm",
            K::TrigramsSimilarity => "similarity",
            K::TrigramsWordSimilarity => "word_similarity",
            K::TrigramsStrictWordSimilarity => "strict_word_similarity",
            _ => return None,
        };
        Some(f.function(
            name,
            arguments.to_vec(),
            true,
            propagates(arguments.len()),
            method.return_type.clone(),
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ast::SourceType,
        translate::methods::test_support::{column, db_functions, factory, string},
    };

    #[test]
    fn distance_is_a_double_operator() {
        let f = factory();
        let t = TrigramsMethodTranslator::new(f.clone());
        let name = column(&f, "name", SourceType::String, None);
        let SqlExpression::PgBinary(op) = t
            .translate(
                None,
                &KnownMethod::TrigramsSimilarityDistance.method(),
                &[db_functions(&f), name, string(&f, "word")],
                &DiagnosticsLogger,
            )
            .unwrap()
        else {
            panic!("expected an operator");
        };
        assert_eq!(op.operator.to_string(), "<->");
        assert_eq!(op.ty, SourceType::Double);
    }

    #[test]
    fn show_returns_a_text_array() {
        let f = factory();
        let t = TrigramsMethodTranslator::new(f.clone());
        let sql = t
            .translate(None, &KnownMethod::TrigramsShow.method(), &[db_functions(&f), string(&f, "cat")], &DiagnosticsLogger)
            .unwrap();
        assert_eq!(sql.as_function().unwrap().name, "show_trgm");
        assert_eq!(sql.type_mapping().unwrap().store_type, "text[]");
    }
}
