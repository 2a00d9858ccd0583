//! Commonly used checkers.
use super::{OperandCountRange, OperandTypeChecker};
use crate::types::{Comparability, TypeFamily};

use OperandTypeChecker as C;
use TypeFamily as F;

pub const NILADIC: C = C::Arity(OperandCountRange::exact(0));
pub const ONE_OR_MORE: C = C::Arity(OperandCountRange::from(1));
pub const VARIADIC: C = C::Arity(OperandCountRange::any());

pub const ANY: C = C::family(&[F::Any]);
pub const ANY_ANY: C = C::family(&[F::Any, F::Any]);

pub const BOOLEAN: C = C::family(&[F::Boolean]);
pub const BOOLEAN_BOOLEAN: C = C::family(&[F::Boolean, F::Boolean]);

pub const NUMERIC: C = C::family(&[F::Numeric]);
pub const NUMERIC_NUMERIC: C = C::family(&[F::Numeric, F::Numeric]);
pub const NUMERIC_INTEGER: C = C::family(&[F::Numeric, F::Integer]);
/// ROUND and TRUNCATE, with an optional number of digits.
pub const NUMERIC_OPTIONAL_INTEGER: C = C::family_optional(&[F::Numeric, F::Integer], 1);
pub const INTEGER: C = C::family(&[F::Integer]);
pub const EXACT_NUMERIC_EXACT_NUMERIC: C = C::family(&[F::ExactNumeric, F::ExactNumeric]);

pub const CHARACTER: C = C::family(&[F::Character]);
pub const STRING: C = C::family(&[F::String]);
pub const STRING_STRING: C = C::family(&[F::String, F::String]);
pub const STRING_STRING_STRING: C = C::family(&[F::String, F::String, F::String]);
pub const STRING_INTEGER: C = C::family(&[F::String, F::Integer]);
pub const STRING_INTEGER_INTEGER: C = C::family(&[F::String, F::Integer, F::Integer]);
pub const STRING_STRING_INTEGER: C = C::family(&[F::String, F::String, F::Integer]);
pub const STRING_STRING_INTEGER_INTEGER: C =
    C::family(&[F::String, F::String, F::Integer, F::Integer]);

pub const DATETIME: C = C::family(&[F::Datetime]);
pub const DATE: C = C::family(&[F::Date]);
pub const TIMESTAMP: C = C::family(&[F::Timestamp]);
pub const INTERVAL: C = C::family(&[F::DatetimeInterval]);
pub const DATETIME_INTERVAL: C = C::family(&[F::Datetime, F::DatetimeInterval]);
pub const INTERVAL_DATETIME: C = C::family(&[F::DatetimeInterval, F::Datetime]);
pub const INTERVAL_NUMERIC: C = C::family(&[F::DatetimeInterval, F::Numeric]);
pub const NUMERIC_INTERVAL: C = C::family(&[F::Numeric, F::DatetimeInterval]);
pub const INTERVAL_INTERVAL: C = C::family(&[F::DatetimeInterval, F::DatetimeInterval]);
pub const DATETIME_INTERVAL_OR_INTERVAL: C = C::Or(&[DATETIME, INTERVAL]);

pub const MULTISET: C = C::family(&[F::Multiset]);
pub const COLLECTION: C = C::family(&[F::Collection]);
pub const COLLECTION_OR_MAP: C = C::Or(&[COLLECTION, C::family(&[F::Map])]);

pub const POSITIVE_INTEGER_LITERAL: C = C::PositiveIntegerLiteral;
pub const UNIT_INTERVAL_NUMERIC_LITERAL: C = C::UnitIntervalLiteral;

/// Two operands of comparable types that can be tested for equality.
pub const COMPARABLE_UNORDERED_COMPARABLE_UNORDERED: C = C::Comparable {
    range: OperandCountRange::exact(2),
    comparability: Comparability::Unordered,
};

/// Two operands of comparable types with a total order.
pub const COMPARABLE_ORDERED_COMPARABLE_ORDERED: C = C::Comparable {
    range: OperandCountRange::exact(2),
    comparability: Comparability::All,
};

/// A single operand with a total order, e.g. the argument of MIN.
pub const COMPARABLE_ORDERED: C = C::Comparable {
    range: OperandCountRange::exact(1),
    comparability: Comparability::All,
};

/// Three operands with a total order, used by BETWEEN.
pub const COMPARABLE_ORDERED_3: C = C::Comparable {
    range: OperandCountRange::exact(3),
    comparability: Comparability::All,
};

pub const SAME_SAME: C = C::SameSame {
    positions: None,
    range: OperandCountRange::exact(2),
};

pub const SAME_SAME_SAME: C = C::SameSame {
    positions: None,
    range: OperandCountRange::exact(3),
};

pub const SAME_VARIADIC: C = C::SameSame {
    positions: None,
    range: OperandCountRange::from(1),
};

pub const STRING_SAME_SAME: C = C::And(&[STRING_STRING, SAME_SAME]);
pub const STRING_SAME_SAME_SAME: C = C::And(&[STRING_STRING_STRING, SAME_SAME_SAME]);

pub const NUMERIC_OR_INTERVAL: C = C::Or(&[NUMERIC, INTERVAL]);
pub const INTERVAL_SAME_SAME: C = C::And(&[INTERVAL_INTERVAL, SAME_SAME]);

pub const PLUS_OPERATOR: C = C::Or(&[
    NUMERIC_NUMERIC,
    INTERVAL_SAME_SAME,
    DATETIME_INTERVAL,
    INTERVAL_DATETIME,
]);

pub const MINUS_OPERATOR: C = C::Or(&[NUMERIC_NUMERIC, INTERVAL_SAME_SAME, DATETIME_INTERVAL]);

pub const MULTIPLY_OPERATOR: C = C::Or(&[NUMERIC_NUMERIC, INTERVAL_NUMERIC, NUMERIC_INTERVAL]);

pub const DIVISION_OPERATOR: C = C::Or(&[NUMERIC_NUMERIC, INTERVAL_NUMERIC]);

/// Datetime difference with a result interval qualifier.
pub const MINUS_DATE_OPERATOR: C = C::And(&[
    C::family(&[F::Datetime, F::Datetime, F::DatetimeInterval]),
    C::SameSame {
        positions: Some(&[0, 1]),
        range: OperandCountRange::exact(3),
    },
]);
