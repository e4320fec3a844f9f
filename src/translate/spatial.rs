//! Aggregate translation for geometry sets (PostGIS).

use std::sync::Arc;

use super::{
    AggregateMethodCallTranslator, AggregateMethodCallTranslatorPlugin, EnumerableExpression,
    Translation,
};
use crate::{
    ast::SourceType,
    diagnostics::DiagnosticsLogger,
    error::Result,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory, require_pg_factory},
    methods::{KnownMethod, MethodInfo},
    sql::SqlExpression,
    type_mapping::{TypeMapping, TypeMappingSource},
};

pub struct SpatialAggregateMethodCallTranslatorPlugin {
    translator: Arc<SpatialAggregateMethodTranslator>,
}

impl SpatialAggregateMethodCallTranslatorPlugin {
    /// Fails with [`Error::InvalidSqlExpressionFactory`](crate::error::Error)
    ///  unless `factory` is the PostgreSQL factory.
    pub fn new(
        type_mapping_source: Arc<dyn TypeMappingSource>,
        factory: Arc<dyn SqlExpressionFactory>,
    ) -> Result<Self> {
        let factory = require_pg_factory(factory)?;
        Ok(Self {
            translator: Arc::new(SpatialAggregateMethodTranslator {
                factory,
                type_mapping_source,
            }),
        })
    }
}

impl AggregateMethodCallTranslatorPlugin for SpatialAggregateMethodCallTranslatorPlugin {
    fn translators(&self) -> Vec<Arc<dyn AggregateMethodCallTranslator>> {
        vec![self.translator.clone()]
    }
}

#[derive(Debug)]
pub struct SpatialAggregateMethodTranslator {
    factory: Arc<PgSqlExpressionFactory>,
    type_mapping_source: Arc<dyn TypeMappingSource>,
}

impl SpatialAggregateMethodTranslator {
    /// geometry or geography, following the selector.
    fn mapping(&self, selector: &SqlExpression) -> Option<TypeMapping> {
        let store_type = selector
            .type_mapping()
            .map_or("geometry", |m| m.store_type.as_str());
        self.type_mapping_source
            .find_mapping_for(&SourceType::Geometry, store_type)
    }

    fn aggregate(
        &self,
        name: &str,
        selector: &SqlExpression,
        source: &EnumerableExpression,
        mapping: Option<TypeMapping>,
    ) -> SqlExpression {
        self.factory.aggregate_function(
            name,
            vec![selector.clone()],
            source,
            true,
            vec![false],
            SourceType::Geometry,
            mapping,
        )
    }
}

impl AggregateMethodCallTranslator for SpatialAggregateMethodTranslator {
    fn translate(
        &self,
        method: &MethodInfo,
        source: &EnumerableExpression,
        _arguments: &[SqlExpression],
        logger: &DiagnosticsLogger,
    ) -> Translation {
        let selector = source.selector.as_ref()?;
        let mapping = self.mapping(selector);
        let f = &self.factory;

        Some(match KnownMethod::identify(method)? {
            // there is no convex hull aggregate, so collect first
            KnownMethod::ConvexHullCreate => {
                logger.rewritten("ConvexHull over a set to ST_ConvexHull(ST_Collect(...))");
                let collected = self.aggregate("ST_Collect", selector, source, mapping.clone());
                f.function(
                    "ST_ConvexHull",
                    vec![collected],
                    true,
                    vec![true],
                    SourceType::Geometry,
                    mapping,
                )
            }
            // ST_Extent yields a box2d, which cannot be read back as is
            KnownMethod::EnvelopeCombinerCombineAsGeometry => {
                let extent = self.aggregate("ST_Extent", selector, source, mapping.clone());
                f.convert(extent, SourceType::Geometry, mapping)
            }
            KnownMethod::UnaryUnionOpUnion => self.aggregate("ST_Union", selector, source, mapping),
            KnownMethod::GeometryCombinerCombine => {
                self.aggregate("ST_Collect", selector, source, mapping)
            }
            _ => return None,
        })
    }
}
