//! DECIMAL precision and scale derivation for arithmetic.
//!
//! Each rule only applies when both operands are exact numerics and at least
//! one of them is a DECIMAL. Integers contribute the digits needed for their
//! full range with a scale of zero.
use crate::types::{DataType, TypeName, TypeSystem};

fn decimal_operands(a: &DataType, b: &DataType) -> Option<((u32, u32), (u32, u32))> {
    if a.name() != TypeName::Decimal && b.name() != TypeName::Decimal {
        return None;
    }
    Some((a.exact_digits()?, b.exact_digits()?))
}

/// Type of `a + b` and `a - b`.
pub fn decimal_sum(ts: &TypeSystem, a: &DataType, b: &DataType) -> Option<DataType> {
    let ((d1, s1), (d2, s2)) = decimal_operands(a, b)?;
    let scale = s1.max(s2);
    let precision = d1.max(d2) + scale + 1;
    Some(ts.capped_decimal(precision, scale))
}

/// Type of `a * b`.
pub fn decimal_product(ts: &TypeSystem, a: &DataType, b: &DataType) -> Option<DataType> {
    let ((d1, s1), (d2, s2)) = decimal_operands(a, b)?;
    let precision = (d1 + s1) + (d2 + s2);
    Some(ts.capped_decimal(precision, s1 + s2))
}

/// Type of `a / b`.
///
/// Keeps at least 6 fractional digits, giving up fractional digits first when
/// the result would exceed the max precision.
pub fn decimal_quotient(ts: &TypeSystem, a: &DataType, b: &DataType) -> Option<DataType> {
    let ((d1, s1), (d2, s2)) = decimal_operands(a, b)?;
    let p2 = d2 + s2;
    let max_precision = ts.max_numeric_precision;

    let int_digits = (d1 + s2).min(max_precision);
    let scale = 6u32
        .max(s1 + p2 + 1)
        .min(max_precision - int_digits)
        .min(ts.max_numeric_scale);

    Some(DataType::decimal(int_digits + scale, scale))
}

/// Type of `MOD(a, b)`.
pub fn decimal_mod(ts: &TypeSystem, a: &DataType, b: &DataType) -> Option<DataType> {
    let ((d1, s1), (d2, s2)) = decimal_operands(a, b)?;
    if s1 == 0 && s2 == 0 {
        return Some(b.clone());
    }
    let scale = s1.max(s2);
    Some(ts.capped_decimal(d1.min(d2) + scale, scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: TypeSystem = TypeSystem::DEFAULT;

    #[test]
    fn sum() {
        assert_eq!(
            Some(DataType::decimal(6, 2)),
            decimal_sum(&TS, &DataType::decimal(5, 2), &DataType::decimal(4, 1))
        );
        assert_eq!(
            Some(DataType::decimal(13, 2)),
            decimal_sum(&TS, &DataType::decimal(5, 2), &DataType::integer())
        );
        assert_eq!(None, decimal_sum(&TS, &DataType::integer(), &DataType::integer()));
        assert_eq!(None, decimal_sum(&TS, &DataType::decimal(5, 2), &DataType::double()));
    }

    #[test]
    fn sum_is_capped() {
        assert_eq!(
            Some(DataType::decimal(19, 0)),
            decimal_sum(&TS, &DataType::decimal(19, 0), &DataType::bigint())
        );
    }

    #[test]
    fn product() {
        assert_eq!(
            Some(DataType::decimal(9, 3)),
            decimal_product(&TS, &DataType::decimal(5, 2), &DataType::decimal(4, 1))
        );
        assert_eq!(
            Some(DataType::decimal(19, 4)),
            decimal_product(&TS, &DataType::decimal(10, 2), &DataType::decimal(12, 2))
        );
    }

    #[test]
    fn quotient() {
        // int digits 5 - 2 + 1 = 4, scale max(6, 2 + 4 + 1) = 7
        assert_eq!(
            Some(DataType::decimal(11, 7)),
            decimal_quotient(&TS, &DataType::decimal(5, 2), &DataType::decimal(4, 1))
        );
        // int digits 19 use the whole precision, no room left for scale.
        assert_eq!(
            Some(DataType::decimal(19, 0)),
            decimal_quotient(&TS, &DataType::decimal(19, 0), &DataType::decimal(5, 3))
        );
    }

    #[test]
    fn modulo() {
        assert_eq!(
            Some(DataType::decimal(5, 0)),
            decimal_mod(&TS, &DataType::integer(), &DataType::decimal(5, 0))
        );
        assert_eq!(
            Some(DataType::decimal(5, 2)),
            decimal_mod(&TS, &DataType::decimal(5, 2), &DataType::decimal(4, 1))
        );
    }
}
