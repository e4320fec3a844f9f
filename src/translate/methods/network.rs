//! inet, cidr and macaddr functions and operators.

use std::sync::Arc;

use crate::{
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{KnownMethod, MethodInfo},
    sql::{PgOperator, SqlExpression},
    translate::{MethodCallTranslator, Translation, propagates},
};

#[derive(Debug)]
pub struct NetworkTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl NetworkTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }
}

impl MethodCallTranslator for NetworkTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        use KnownMethod as K;
        let known = KnownMethod::identify(method)?;
        let operator = match known {
            K::NetworkContainedBy => Some(PgOperator::NetworkContainedBy),
            K::NetworkContainedByOrEqual => Some(PgOperator::NetworkContainedByOrEqual),
            K::NetworkContains => Some(PgOperator::NetworkContains),
            K::NetworkContainsOrEqual => Some(PgOperator::NetworkContainsOrEqual),
            K::NetworkContainsOrContainedBy => Some(PgOperator::NetworkContainsOrContainedBy),
            _ => None,
        };
        if let Some(operator) = operator {
            let [_, left, right] = arguments else {
                return None;
            };
            return Some(self.factory.pg_binary(operator, left.clone(), right.clone(), None, None));
        }

        let name = match known {
            K::NetworkAbbreviate => "abbrev",
            K::NetworkBroadcast => "broadcast",
            K::NetworkFamily => "family",
            K::NetworkHost => "host",
            K::NetworkHostMask => "hostmask",
            K::NetworkMaskLength => "masklen",
            K::NetworkNetmask => "netmask",
            K::NetworkNetwork => "network",
            K::NetworkSetMaskLength => "set_masklen",
            K::NetworkText => "text",
            K::NetworkSameFamily => "inet_same_family",
            K::NetworkMerge => "inet_merge",
            K::NetworkTruncate => "trunc",
            K::NetworkSet7BitMac8 => "macaddr8_set7bit",
            _ => return None,
        };
        let arguments = arguments.get(1..)?.to_vec();
        // the address functions keep the mapping of the address they operate on
        let mapping = arguments
            .first()
            .filter(|a| *a.ty() == method.return_type)
            .and_then(|a| a.type_mapping())
            .cloned();
        let n = arguments.len();
        Some(self.factory.function(
            name,
            arguments,
            true,
            propagates(n),
            method.return_type.clone(),
            mapping,
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        ast::SourceType,
        translate::methods::test_support::{column, db_functions, factory},
    };

    #[test]
    fn contained_by_is_an_operator() {
        let f = factory();
        let t = NetworkTranslator::new(f.clone());
        let ip = column(&f, "ip", SourceType::IPAddress, None);
        let net = column(&f, "net", SourceType::IPAddress, Some("cidr"));
        let SqlExpression::PgBinary(op) = t
            .translate(None, &KnownMethod::NetworkContainedBy.method(), &[db_functions(&f), ip, net], &DiagnosticsLogger)
            .unwrap()
        else {
            panic!("expected an operator");
        };
        assert_eq!(op.operator.to_string(), "<<");
    }

    #[test]
    fn network_keeps_the_cidr_mapping() {
        let f = factory();
        let t = NetworkTranslator::new(f.clone());
        let net = column(&f, "net", SourceType::IPAddress, Some("cidr"));
        let sql = t
            .translate(None, &KnownMethod::NetworkNetwork.method(), &[db_functions(&f), net], &DiagnosticsLogger)
            .unwrap();
        let function = sql.as_function().unwrap();
        assert_eq!(function.name, "network");
        assert_eq!(function.type_mapping.as_ref().unwrap().store_type, "cidr");
    }
}
