//! Ordered translator registries. The first translator to return a result
//!  wins, so registration order is part of the contract.

use std::sync::Arc;

use super::{
    AggregateMethodCallTranslator, AggregateMethodCallTranslatorPlugin, EnumerableExpression,
    MethodCallTranslator, MethodCallTranslatorPlugin, Translation,
    json::JsonPocoTranslator,
    ltree::LTreeTranslator,
    methods::{
        ArrayTranslator, ByteArrayMethodTranslator, ConvertTranslator, DateTimeMethodTranslator,
        FuzzyStringMatchMethodTranslator, JsonDbFunctionsTranslator, LikeTranslator,
        MathTranslator, NetworkTranslator, NewGuidTranslator, ObjectToStringTranslator,
        RandomTranslator, RegexIsMatchTranslator, RowValueTranslator, StringMethodTranslator,
        TrigramsMethodTranslator,
    },
};
use crate::{
    diagnostics::{DiagnosticsLogger, QUERY_TARGET},
    factory::PgSqlExpressionFactory,
    methods::MethodInfo,
    options::ProviderOptions,
    sql::SqlExpression,
};

pub struct MethodCallTranslatorProvider {
    translators: Vec<Arc<dyn MethodCallTranslator>>,
}

impl MethodCallTranslatorProvider {
    /// The built-in PostgreSQL translators in their fixed order. `ltree` is
    ///  shared with the visitor, which uses it for lambda patterns over ltree
    ///  arrays.
    pub fn new(
        factory: &Arc<PgSqlExpressionFactory>,
        options: &ProviderOptions,
        ltree: Arc<LTreeTranslator>,
    ) -> Self {
        let json = JsonPocoTranslator::new(factory.clone());
        let f = || factory.clone();
        let translators: Vec<Arc<dyn MethodCallTranslator>> = vec![
            Arc::new(ArrayTranslator::new(f(), json, options.use_redshift)),
            Arc::new(ByteArrayMethodTranslator::new(f())),
            Arc::new(ConvertTranslator::new(f())),
            Arc::new(DateTimeMethodTranslator::new(f())),
            Arc::new(FuzzyStringMatchMethodTranslator::new(f())),
            Arc::new(JsonDbFunctionsTranslator::new(f())),
            Arc::new(LikeTranslator::new(f())),
            ltree,
            Arc::new(MathTranslator::new(f())),
            Arc::new(NetworkTranslator::new(f())),
            Arc::new(NewGuidTranslator::new(f(), options)),
            Arc::new(ObjectToStringTranslator::new(f())),
            Arc::new(RandomTranslator::new(f())),
            Arc::new(RegexIsMatchTranslator::new(f())),
            Arc::new(RowValueTranslator::new(f())),
            Arc::new(StringMethodTranslator::new(f())),
            Arc::new(TrigramsMethodTranslator::new(f())),
        ];
        log::debug!(
            target: QUERY_TARGET,
            "registered {} method call translators",
            translators.len()
        );
        Self { translators }
    }

    /// A registry holding exactly `translators`, in order.
    pub fn from_translators(translators: Vec<Arc<dyn MethodCallTranslator>>) -> Self {
        Self { translators }
    }

    pub fn add_translators(&mut self, translators: impl IntoIterator<Item = Arc<dyn MethodCallTranslator>>) {
        self.translators.extend(translators);
    }

    pub fn add_plugin(&mut self, plugin: &dyn MethodCallTranslatorPlugin) {
        self.add_translators(plugin.translators());
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }

    pub fn translator_names(&self) -> Vec<&'static str> {
        self.translators.iter().map(|t| t.name()).collect()
    }
}

impl MethodCallTranslator for MethodCallTranslatorProvider {
    fn translate(
        &self,
        instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        logger: &DiagnosticsLogger,
    ) -> Translation {
        self.translators.iter().find_map(|t| {
            let translated = t.translate(instance, method, arguments, logger)?;
            logger.translated(t.name(), method);
            Some(translated)
        })
    }
}

#[derive(Default)]
pub struct AggregateMethodCallTranslatorProvider {
    translators: Vec<Arc<dyn AggregateMethodCallTranslator>>,
}

impl AggregateMethodCallTranslatorProvider {
    pub fn from_translators(translators: Vec<Arc<dyn AggregateMethodCallTranslator>>) -> Self {
        Self { translators }
    }

    pub fn add_plugin(&mut self, plugin: &dyn AggregateMethodCallTranslatorPlugin) {
        self.translators.extend(plugin.translators());
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }
}

impl AggregateMethodCallTranslator for AggregateMethodCallTranslatorProvider {
    fn translate(
        &self,
        method: &MethodInfo,
        source: &EnumerableExpression,
        arguments: &[SqlExpression],
        logger: &DiagnosticsLogger,
    ) -> Translation {
        self.translators.iter().find_map(|t| {
            let translated = t.translate(method, source, arguments, logger)?;
            logger.translated(t.name(), method);
            Some(translated)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{SourceType, Value},
        methods::DeclaringType,
        type_mapping::PgTypeMappingSource,
    };

    struct Fixed(&'static str);

    impl MethodCallTranslator for Fixed {
        fn translate(
            &self,
            _instance: Option<&SqlExpression>,
            method: &MethodInfo,
            _arguments: &[SqlExpression],
            _logger: &DiagnosticsLogger,
        ) -> Translation {
            (method.name() == "Frobnicate").then(|| SqlExpression::Constant(crate::sql::SqlConstant {
                value: Value::String(self.0.into()),
                ty: SourceType::String,
                type_mapping: None,
            }))
        }
    }

    #[test]
    fn builtins_are_registered_in_order() {
        let factory = Arc::new(
            PgSqlExpressionFactory::new(Arc::new(PgTypeMappingSource::new())).unwrap(),
        );
        let ltree = Arc::new(LTreeTranslator::new(factory.clone()));
        let provider = MethodCallTranslatorProvider::new(&factory, &ProviderOptions::default(), ltree);
        let names = provider.translator_names();
        assert_eq!(names.len(), 17);
        assert_eq!(names[0], "ArrayTranslator");
        assert_eq!(names[1], "ByteArrayMethodTranslator");
        assert_eq!(names[7], "LTreeTranslator");
        assert_eq!(names[16], "TrigramsMethodTranslator");
    }

    #[test]
    fn plugins_come_after_builtins() {
        struct Plugin;
        impl MethodCallTranslatorPlugin for Plugin {
            fn translators(&self) -> Vec<Arc<dyn MethodCallTranslator>> {
                vec![Arc::new(Fixed("plugin"))]
            }
        }

        let mut provider = MethodCallTranslatorProvider::from_translators(vec![Arc::new(Fixed("builtin"))]);
        provider.add_plugin(&Plugin);
        assert_eq!(provider.len(), 2);

        let method = MethodInfo::new_static(DeclaringType::Other("Test"), "Frobnicate", vec![], SourceType::String);
        let translated = provider
            .translate(None, &method, &[], &DiagnosticsLogger)
            .unwrap();
        assert_eq!(translated.as_constant(), Some(&Value::String("builtin".into())));
    }
}
