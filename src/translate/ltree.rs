//! ltree (label tree) methods, plus the lambda patterns over arrays of ltrees
//!  that only the visitor can see.

use std::sync::Arc;

use super::{MethodCallTranslator, Translation, TranslationContext, propagates};
use crate::{
    ast::{Expression, SourceType},
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::{PgOperator, SqlExpression},
};

#[derive(Debug)]
pub struct LTreeTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl LTreeTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }

    /// Patterns of the form `array.Any(t => ...)` and
    ///  `array.FirstOrDefault(t => ...)` where the lambda applies an ltree
    ///  method to its parameter.
    pub fn visit_array_method_call(
        &self,
        cx: &dyn TranslationContext,
        method: &MethodInfo,
        arguments: &[Expression],
    ) -> Option<Translation> {
        let known = KnownMethod::identify(method)?;
        let first_or_default = match known {
            KnownMethod::EnumerableAnyWithPredicate => false,
            KnownMethod::EnumerableFirstOrDefaultWithPredicate => true,
            _ => return None,
        };
        let [array, Expression::Lambda(lambda)] = arguments else {
            return None;
        };
        let Expression::MethodCall(call) = lambda.body.as_ref() else {
            return None;
        };
        let parameter = lambda.parameters.first()?;
        let instance = call.object.as_deref()?;
        let [argument] = call.arguments.as_slice() else {
            return None;
        };
        let predicate = KnownMethod::identify(&call.method)?;

        use KnownMethod as K;
        use PgOperator as O;

        // Any(q => e.Path.MatchesLQuery(q)): path ? ARRAY[queries]
        if !first_or_default
            && predicate == K::LTreeMatchesLQuery
            && argument.is_parameter(parameter)
        {
            cx.logger().rewritten("Any(MatchesLQuery) to ?");
            return Some(self.operator(O::LTreeMatchesAny, cx.translate(instance), cx.translate(array), None));
        }

        if !instance.is_parameter(parameter) {
            return None;
        }
        let operator = match (first_or_default, predicate) {
            (false, K::LTreeIsAncestorOf) => O::Contains,
            (false, K::LTreeIsDescendantOf) => O::ContainedBy,
            (false, K::LTreeMatchesLQuery) => O::LTreeMatches,
            (false, K::LTreeMatchesLTxtQuery) => O::LTreeMatchesText,
            (true, K::LTreeIsAncestorOf) => O::LTreeFirstAncestor,
            (true, K::LTreeIsDescendantOf) => O::LTreeFirstDescendent,
            (true, K::LTreeMatchesLQuery) => O::LTreeFirstMatches,
            (true, K::LTreeMatchesLTxtQuery) => O::LTreeFirstMatchesText,
            _ => return None,
        };
        cx.logger().rewritten(format_args!("{known} over ltree[] to {operator}"));
        let result_type = first_or_default.then_some(SourceType::LTree);
        Some(self.operator(operator, cx.translate(array), cx.translate(argument), result_type))
    }

    fn operator(
        &self,
        operator: PgOperator,
        left: Translation,
        right: Translation,
        ty: Option<SourceType>,
    ) -> Translation {
        Some(self.factory.pg_binary(operator, left?, right?, ty, None))
    }

    fn function(&self, name: &str, arguments: Vec<SqlExpression>, ty: SourceType) -> SqlExpression {
        let n = arguments.len();
        self.factory.function(name, arguments, true, propagates(n), ty, None)
    }
}

impl MethodCallTranslator for LTreeTranslator {
    fn translate(
        &self,
        instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        use KnownMethod as K;
        let known = KnownMethod::identify(method)?;
        if known == K::LTreeLongestCommonAncestor {
            return Some(self.function("lca", arguments.to_vec(), SourceType::LTree));
        }

        let instance = instance?.clone();
        let f = &self.factory;
        let binary = |operator, argument: &SqlExpression| {
            f.pg_binary(operator, instance.clone(), argument.clone(), None, None)
        };
        Some(match (known, arguments) {
            (K::LTreeIsAncestorOf, [other]) => binary(PgOperator::Contains, other),
            (K::LTreeIsDescendantOf, [other]) => binary(PgOperator::ContainedBy, other),
            (K::LTreeMatchesLQuery, [query]) => binary(PgOperator::LTreeMatches, query),
            (K::LTreeMatchesLTxtQuery, [query]) => binary(PgOperator::LTreeMatchesText, query),
            (K::LTreeSubtree, [start, end]) => self.function(
                "subltree",
                vec![instance.clone(), start.clone(), end.clone()],
                SourceType::LTree,
            ),
            (K::LTreeSubpathFrom, [offset]) => self.function(
                "subpath",
                vec![instance.clone(), offset.clone()],
                SourceType::LTree,
            ),
            (K::LTreeSubpath, [offset, length]) => self.function(
                "subpath",
                vec![instance.clone(), offset.clone(), length.clone()],
                SourceType::LTree,
            ),
            (K::LTreeIndex, [other]) => self.function(
                "index",
                vec![instance.clone(), other.clone()],
                SourceType::Int,
            ),
            _ => return None,
        })
    }
}
