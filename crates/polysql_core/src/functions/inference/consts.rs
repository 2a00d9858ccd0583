//! Commonly used return type strategies.
use polysql_error::Result;

use super::decimal::{decimal_mod, decimal_product, decimal_quotient, decimal_sum};
use super::{ExplicitType, ReturnTypeInference, TypeTransform};
use crate::functions::binding::CallBinding;
use crate::types::{DataType, TypeFamily, TypeName, TypeSystem};

use ReturnTypeInference as R;
use TypeTransform as T;

pub const ARG0: R = R::Arg(0);
pub const ARG1: R = R::Arg(1);
pub const ARG2: R = R::Arg(2);
pub const ARG0_NULLABLE: R = R::Cascade(&ARG0, &[T::ToNullable]);
pub const ARG1_NULLABLE: R = R::Cascade(&ARG1, &[T::ToNullable]);
pub const ARG0_FORCE_NULLABLE: R = R::Cascade(&ARG0, &[T::ForceNullable]);
pub const ARG0_NULLABLE_VARYING: R = R::Cascade(&ARG0, &[T::ToNullable, T::ToVarying]);

pub const BOOLEAN: R = R::explicit(TypeName::Boolean);
pub const BOOLEAN_NULLABLE: R = R::Cascade(&BOOLEAN, &[T::ToNullable]);
pub const BOOLEAN_FORCE_NULLABLE: R = R::Cascade(&BOOLEAN, &[T::ForceNullable]);
pub const BOOLEAN_NOT_NULL: R = R::Cascade(&BOOLEAN, &[T::ToNotNullable]);
pub const INTEGER: R = R::explicit(TypeName::Integer);
pub const INTEGER_NULLABLE: R = R::Cascade(&INTEGER, &[T::ToNullable]);
pub const BIGINT: R = R::explicit(TypeName::BigInt);
pub const BIGINT_NULLABLE: R = R::Cascade(&BIGINT, &[T::ToNullable]);
pub const DOUBLE: R = R::explicit(TypeName::Double);
pub const DOUBLE_NULLABLE: R = R::Cascade(&DOUBLE, &[T::ToNullable]);
pub const DATE: R = R::explicit(TypeName::Date);
pub const VARCHAR_2000: R = R::Explicit(ExplicitType::new(TypeName::Varchar).with_precision(2000));
pub const VARCHAR_2000_NULLABLE: R = R::Cascade(&VARCHAR_2000, &[T::ToNullable]);

pub const LEAST_RESTRICTIVE: R = R::LeastRestrictive;
pub const LEAST_RESTRICTIVE_NULLABLE: R = R::Cascade(&LEAST_RESTRICTIVE, &[T::ToNullable]);
/// COALESCE: not null as soon as one operand is not null.
pub const LEAST_RESTRICTIVE_LEAST_NULLABLE: R =
    R::Cascade(&LEAST_RESTRICTIVE, &[T::LeastNullable]);

/// ARG0 if it's an interval.
pub const ARG0_INTERVAL: R = R::Custom(arg0_interval);
pub const ARG0_INTERVAL_NULLABLE: R = R::Cascade(&ARG0_INTERVAL, &[T::ToNullable]);
/// ARG1 if it's an interval, for `n * INTERVAL`.
pub const ARG1_INTERVAL: R = R::Custom(arg1_interval);
pub const ARG1_INTERVAL_NULLABLE: R = R::Cascade(&ARG1_INTERVAL, &[T::ToNullable]);

pub const DECIMAL_SUM: R = R::Custom(decimal_sum_type);
pub const DECIMAL_SUM_NULLABLE: R = R::Cascade(&DECIMAL_SUM, &[T::ToNullable]);
pub const DECIMAL_PRODUCT: R = R::Custom(decimal_product_type);
pub const DECIMAL_PRODUCT_NULLABLE: R = R::Cascade(&DECIMAL_PRODUCT, &[T::ToNullable]);
pub const DECIMAL_QUOTIENT: R = R::Custom(decimal_quotient_type);
pub const DECIMAL_QUOTIENT_NULLABLE: R = R::Cascade(&DECIMAL_QUOTIENT, &[T::ToNullable]);
pub const DECIMAL_MOD: R = R::Custom(decimal_mod_type);
pub const DECIMAL_MOD_NULLABLE: R = R::Cascade(&DECIMAL_MOD, &[T::ToNullable]);

/// `+` and `-` on numerics.
pub const NULLABLE_SUM: R = R::Chain(&[DECIMAL_SUM_NULLABLE, LEAST_RESTRICTIVE]);
/// `*` on numerics and intervals.
pub const PRODUCT_NULLABLE: R = R::Chain(&[
    DECIMAL_PRODUCT_NULLABLE,
    ARG0_INTERVAL_NULLABLE,
    ARG1_INTERVAL_NULLABLE,
    LEAST_RESTRICTIVE,
]);
/// `/` on numerics and intervals.
pub const QUOTIENT_NULLABLE: R = R::Chain(&[
    DECIMAL_QUOTIENT_NULLABLE,
    ARG0_INTERVAL_NULLABLE,
    LEAST_RESTRICTIVE,
]);
/// `/INT`, integer division.
pub const INTEGER_QUOTIENT_NULLABLE: R = R::Chain(&[ARG0_INTERVAL_NULLABLE, LEAST_RESTRICTIVE]);
pub const NULLABLE_MOD: R = R::Chain(&[DECIMAL_MOD_NULLABLE, ARG1_NULLABLE]);

/// DECIMAL(p, 0) for a DECIMAL(p, s) operand.
pub const DECIMAL_SCALE0: R = R::Custom(decimal_scale0);
/// FLOOR and CEIL.
pub const ARG0_OR_EXACT_NO_SCALE: R = R::Chain(&[DECIMAL_SCALE0, ARG0]);
pub const ARG0_OR_EXACT_NO_SCALE_NULLABLE: R =
    R::Cascade(&ARG0_OR_EXACT_NO_SCALE, &[T::ToNullable]);

/// `a || b`: precisions add up.
pub const DYADIC_STRING_SUM_PRECISION: R = R::Custom(dyadic_string_sum_precision);
pub const DYADIC_STRING_SUM_PRECISION_NULLABLE: R =
    R::Cascade(&DYADIC_STRING_SUM_PRECISION, &[T::ToNullable]);

pub const MULTISET: R = R::Cascade(&ARG0, &[T::ToMultiset]);
pub const MULTISET_NULLABLE: R = R::Cascade(&MULTISET, &[T::ToNullable]);
pub const MULTISET_ELEMENT_NULLABLE: R =
    R::Cascade(&ARG0, &[T::ToMultisetElement, T::ForceNullable]);
/// Component type of an ARRAY or MULTISET operand.
pub const COLLECTION_COMPONENT_NULLABLE: R = R::Custom(collection_component_nullable);

fn interval_at(binding: &CallBinding<'_>, idx: usize) -> Option<DataType> {
    let datatype = binding.operand_types.get(idx)?;
    TypeFamily::DatetimeInterval
        .contains(datatype.name())
        .then(|| datatype.clone())
}

fn arg0_interval(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    Ok(interval_at(binding, 0))
}

fn arg1_interval(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    Ok(interval_at(binding, 1))
}

fn decimal_binary(
    binding: &CallBinding<'_>,
    f: fn(&TypeSystem, &DataType, &DataType) -> Option<DataType>,
) -> Result<Option<DataType>> {
    if binding.operand_count() != 2 {
        return Ok(None);
    }
    let (a, b) = (binding.operand_type(0)?, binding.operand_type(1)?);
    Ok(f(&binding.type_system(), a, b))
}

fn decimal_sum_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    decimal_binary(binding, decimal_sum)
}

fn decimal_product_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    decimal_binary(binding, decimal_product)
}

fn decimal_quotient_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    decimal_binary(binding, decimal_quotient)
}

fn decimal_mod_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    decimal_binary(binding, decimal_mod)
}

fn decimal_scale0(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let datatype = binding.operand_type(0)?;
    if datatype.name() != TypeName::Decimal {
        return Ok(None);
    }
    let precision = datatype
        .precision()
        .unwrap_or(crate::types::datatype::DEFAULT_DECIMAL_PRECISION);
    Ok(Some(
        DataType::decimal(precision, 0).with_nullable(datatype.is_nullable()),
    ))
}

fn dyadic_string_sum_precision(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let (a, b) = (binding.operand_type(0)?, binding.operand_type(1)?);
    if a.is_null_type() {
        return Ok(Some(b.clone().to_varying()));
    }
    if b.is_null_type() {
        return Ok(Some(a.clone().to_varying()));
    }

    let binary = a.family() == TypeFamily::Binary;
    if binary != (b.family() == TypeFamily::Binary) {
        return Ok(None);
    }

    let precision = match (a.precision(), b.precision()) {
        (Some(p1), Some(p2)) => Some(p1 + p2),
        _ => None,
    };
    let fixed = !a.name().is_varying()
        && !b.name().is_varying()
        && a.name() != TypeName::Json
        && b.name() != TypeName::Json
        && precision.is_some();

    let datatype = match (binary, fixed) {
        (false, true) => DataType::char(precision.unwrap_or(1)),
        (false, false) => DataType::varchar(precision),
        (true, true) => DataType::binary(precision.unwrap_or(1)),
        (true, false) => DataType::varbinary(precision),
    };
    Ok(Some(datatype))
}

fn collection_component_nullable(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    Ok(binding
        .operand_type(0)?
        .component()
        .map(|c| c.clone().with_nullable(true)))
}
