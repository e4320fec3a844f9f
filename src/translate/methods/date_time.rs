//! Date arithmetic through `make_interval`.

use std::sync::Arc;

use crate::{
    ast::{SourceType, Value},
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{DeclaringType, KnownMethod, MethodInfo},
    sql::{SqlBinaryOperator, SqlExpression},
    translate::{MethodCallTranslator, Translation, propagates},
};

/// The `make_interval` argument for each `AddXxx` method, and how many seconds
///  one unit is for fractional amounts (`make_interval` only takes whole
///  numbers outside `secs`).
const UNITS: &[(&str, &str, Option<f64>)] = &[
    ("AddYears", "years", None),
    ("AddMonths", "months", None),
    ("AddDays", "days", Some(86_400.0)),
    ("AddHours", "hours", Some(3_600.0)),
    ("AddMinutes", "mins", Some(60.0)),
    ("AddSeconds", "secs", Some(1.0)),
];

#[derive(Debug)]
pub struct DateTimeMethodTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl DateTimeMethodTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }

    fn make_interval(&self, unit: &str, seconds: Option<f64>, amount: &SqlExpression) -> Translation {
        let f = &self.factory;
        let (unit, amount) = match seconds {
            Some(factor) if unit != "secs" && !amount.ty().is_integer() => {
                let factor = f.constant(Value::Double(factor), None);
                let secs = f.make_binary(SqlBinaryOperator::Multiply, amount.clone(), factor, None)?;
                ("secs", secs)
            }
            _ => (unit, amount.clone()),
        };
        Some(f.function_with_named_arguments(
            "make_interval",
            vec![amount],
            vec![Some(unit.to_string())],
            true,
            propagates(1),
            SourceType::TimeSpan,
            None,
        ))
    }
}

impl MethodCallTranslator for DateTimeMethodTranslator {
    fn translate(
        &self,
        instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        let f = &self.factory;
        if method.is(KnownMethod::DateOnlyFromDateTime) {
            let [value] = arguments else {
                return None;
            };
            return Some(f.convert(value.clone(), SourceType::DateOnly, None));
        }

        let declaring_type = method.declaring_type();
        if !matches!(declaring_type, DeclaringType::DateTime | DeclaringType::DateOnly) {
            return None;
        }
        let (instance, [amount]) = (instance?, arguments) else {
            return None;
        };
        let &(_, unit, seconds) = UNITS.iter().find(|(name, ..)| *name == method.name())?;
        if declaring_type == DeclaringType::DateOnly && seconds.is_some_and(|s| s < 86_400.0) {
            return None;
        }

        let interval = self.make_interval(unit, seconds, amount)?;
        let sum = f.add(instance.clone(), interval, instance.type_mapping().cloned())?;
        // date + interval yields a timestamp
        Some(match declaring_type {
            DeclaringType::DateOnly => f.convert(sum, SourceType::DateOnly, None),
            _ => sum,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::translate::methods::test_support::{column, factory};

    fn add(declaring_type: DeclaringType, name: &str, amount: SourceType, ty: SourceType) -> MethodInfo {
        MethodInfo::new_instance(declaring_type, name, vec![amount], ty)
    }

    #[test]
    fn add_days_uses_make_interval() {
        let f = factory();
        let t = DateTimeMethodTranslator::new(f.clone());
        let created = column(&f, "created", SourceType::DateTime, None);
        let method = add(DeclaringType::DateTime, "AddDays", SourceType::Int, SourceType::DateTime);
        let SqlExpression::Binary(sum) = t
            .translate(Some(&created), &method, &[f.constant(Value::Int(3), None)], &DiagnosticsLogger)
            .unwrap()
        else {
            panic!("expected an addition");
        };
        assert_eq!(sum.operator, SqlBinaryOperator::Add);
        let interval = sum.right.as_function().unwrap();
        assert_eq!(interval.name, "make_interval");
        assert_eq!(interval.argument_names, Some(vec![Some("days".to_string())]));
        assert_eq!(sum.type_mapping.unwrap().store_type, "timestamp with time zone");
    }

    #[test]
    fn fractional_days_become_seconds() {
        let f = factory();
        let t = DateTimeMethodTranslator::new(f.clone());
        let created = column(&f, "created", SourceType::DateTime, None);
        let method = add(DeclaringType::DateTime, "AddDays", SourceType::Double, SourceType::DateTime);
        let SqlExpression::Binary(sum) = t
            .translate(Some(&created), &method, &[f.constant(Value::Double(1.5), None)], &DiagnosticsLogger)
            .unwrap()
        else {
            panic!("expected an addition");
        };
        let interval = sum.right.as_function().unwrap();
        assert_eq!(interval.argument_names, Some(vec![Some("secs".to_string())]));
    }

    #[test]
    fn date_only_results_are_cast_back_to_date() {
        let f = factory();
        let t = DateTimeMethodTranslator::new(f.clone());
        let day = column(&f, "day", SourceType::DateOnly, None);
        let method = add(DeclaringType::DateOnly, "AddMonths", SourceType::Int, SourceType::DateOnly);
        let sql = t
            .translate(Some(&day), &method, &[f.constant(Value::Int(1), None)], &DiagnosticsLogger)
            .unwrap();
        assert!(matches!(sql, SqlExpression::Convert(_)));
        assert_eq!(sql.type_mapping().unwrap().store_type, "date");

        let hours = add(DeclaringType::DateOnly, "AddHours", SourceType::Int, SourceType::DateOnly);
        let one = f.constant(Value::Int(1), None);
        assert_eq!(t.translate(Some(&day), &hours, &[one], &DiagnosticsLogger), None);
    }
}
