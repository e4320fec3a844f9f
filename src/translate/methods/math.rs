//! `Math` methods. Overloads differ only in numeric type, so methods are
//!  matched by name and the result takes the method's return type.

use std::sync::Arc;

use crate::{
    ast::SourceType,
    diagnostics::DiagnosticsLogger,
    factory::{PgSqlExpressionFactory, SqlExpressionFactory},
    methods::{DeclaringType, MethodInfo},
    sql::SqlExpression,
    translate::{MethodCallTranslator, Translation, propagates},
};

/// Methods that map one-to-one onto a function with the same arguments.
/// The flag says whether the result keeps the first argument's mapping.
const FUNCTIONS: &[(&str, &str, bool)] = &[
    ("Abs", "abs", true),
    ("Ceiling", "ceiling", true),
    ("Floor", "floor", true),
    ("Pow", "power", false),
    ("Exp", "exp", false),
    ("Log10", "log", false),
    ("Sqrt", "sqrt", false),
    ("Truncate", "trunc", true),
    ("Acos", "acos", false),
    ("Asin", "asin", false),
    ("Atan", "atan", false),
    ("Atan2", "atan2", false),
    ("Cos", "cos", false),
    ("Sin", "sin", false),
    ("Tan", "tan", false),
];

#[derive(Debug)]
pub struct MathTranslator {
    factory: Arc<PgSqlExpressionFactory>,
}

impl MathTranslator {
    pub fn new(factory: Arc<PgSqlExpressionFactory>) -> Self {
        Self { factory }
    }

    fn function(
        &self,
        name: &str,
        arguments: Vec<SqlExpression>,
        ty: SourceType,
        keep_mapping: bool,
    ) -> SqlExpression {
        let mapping = keep_mapping
            .then(|| arguments.first().and_then(|a| a.type_mapping()).cloned())
            .flatten();
        let n = arguments.len();
        self.factory.function(name, arguments, true, propagates(n), ty, mapping)
    }

    /// `round(x, digits)` only exists for numeric.
    fn round(&self, value: &SqlExpression, digits: &SqlExpression, ty: SourceType) -> SqlExpression {
        let f = &self.factory;
        if ty.unwrap_nullable() == &SourceType::Decimal {
            return self.function("round", vec![value.clone(), digits.clone()], ty, true);
        }
        let numeric = f.convert(value.clone(), SourceType::Decimal, None);
        let rounded = self.function("round", vec![numeric, digits.clone()], SourceType::Decimal, false);
        f.convert(rounded, ty, None)
    }
}

impl MethodCallTranslator for MathTranslator {
    fn translate(
        &self,
        _instance: Option<&SqlExpression>,
        method: &MethodInfo,
        arguments: &[SqlExpression],
        _logger: &DiagnosticsLogger,
    ) -> Translation {
        if !matches!(method.declaring_type(), DeclaringType::Math | DeclaringType::Other("MathF")) {
            return None;
        }
        let f = &self.factory;
        let ty = method.return_type.clone();
        let name = method.name();

        if let Some(&(_, function, keep_mapping)) = FUNCTIONS.iter().find(|(n, ..)| *n == name) {
            return Some(self.function(function, arguments.to_vec(), ty, keep_mapping));
        }
        Some(match (name, arguments) {
            ("Round", [value]) => self.function("round", vec![value.clone()], ty, true),
            ("Round", [value, digits]) => self.round(value, digits, ty),
            ("Log", [value]) => self.function("ln", vec![value.clone()], ty, false),
            ("Log", [value, base]) => self.function("log", vec![base.clone(), value.clone()], ty, false),
            // sign() returns the argument's type, the source method an int
            ("Sign", [value]) => {
                let sign = self.function("sign", vec![value.clone()], value.ty().clone(), true);
                f.convert(sign, SourceType::Int, None)
            }
            ("Max" | "Min", [a, b]) => {
                let function = if name == "Max" { "GREATEST" } else { "LEAST" };
                let mapping = a.type_mapping().or_else(|| b.type_mapping()).cloned();
                let a = f.apply_type_mapping(a.clone(), mapping.as_ref());
                let b = f.apply_type_mapping(b.clone(), mapping.as_ref());
                f.function(function, vec![a, b], true, vec![false, false], ty, mapping)
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
        ast::Value,
        translate::methods::test_support::{column, factory},
    };

    fn math(name: &str, parameters: Vec<SourceType>, ret: SourceType) -> MethodInfo {
        MethodInfo::new_static(DeclaringType::Math, name, parameters, ret)
    }

    #[test]
    fn abs_keeps_the_column_mapping() {
        let f = factory();
        let t = MathTranslator::new(f.clone());
        let price = column(&f, "price", SourceType::Decimal, Some("money"));
        let sql = t
            .translate(None, &math("Abs", vec![SourceType::Decimal], SourceType::Decimal), &[price], &DiagnosticsLogger)
            .unwrap();
        assert_eq!(sql.type_mapping().unwrap().store_type, "money");
    }

    #[test]
    fn round_with_digits_goes_through_numeric_for_doubles() {
        let f = factory();
        let t = MathTranslator::new(f.clone());
        let x = column(&f, "x", SourceType::Double, None);
        let method = math("Round", vec![SourceType::Double, SourceType::Int], SourceType::Double);
        let sql = t
            .translate(None, &method, &[x, f.constant(Value::Int(2), None)], &DiagnosticsLogger)
            .unwrap();
        let SqlExpression::Convert(outer) = sql else {
            panic!("expected a cast back to double");
        };
        let round = outer.operand.as_function().unwrap();
        assert_eq!(round.name, "round");
        assert!(matches!(round.arguments[0], SqlExpression::Convert(_)));
    }

    #[test]
    fn max_is_greatest_and_sign_is_an_int() {
        let f = factory();
        let t = MathTranslator::new(f.clone());
        let a = column(&f, "a", SourceType::Double, None);
        let b = f.constant(Value::Double(0.0), None);
        let max = math("Max", vec![SourceType::Double, SourceType::Double], SourceType::Double);
        let sql = t.translate(None, &max, &[a.clone(), b], &DiagnosticsLogger).unwrap();
        let greatest = sql.as_function().unwrap();
        assert_eq!(greatest.name, "GREATEST");
        assert_eq!(greatest.arguments_propagate_nullability, vec![false, false]);

        let sign = math("Sign", vec![SourceType::Double], SourceType::Int);
        let sql = t.translate(None, &sign, &[a], &DiagnosticsLogger).unwrap();
        assert_eq!(sql.ty(), &SourceType::Int);
    }

    #[test]
    fn other_declaring_types_are_declined() {
        let f = factory();
        let t = MathTranslator::new(f.clone());
        let method = MethodInfo::new_static(DeclaringType::String, "Abs", vec![SourceType::Int], SourceType::Int);
        assert_eq!(t.translate(None, &method, &[f.constant(Value::Int(1), None)], &DiagnosticsLogger), None);
    }
}
