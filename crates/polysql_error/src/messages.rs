//! Constructors for the user-facing validation messages.
//!
//! Keeping the message text in one place keeps diagnostics consistent across
//! the operator catalog.

use crate::{DbError, ErrorKind};

pub fn between_without_and() -> DbError {
    DbError::new(
        ErrorKind::BetweenWithoutAnd,
        "BETWEEN operator has no terminating AND",
    )
}

pub fn malformed_expression(detail: impl AsRef<str>) -> DbError {
    DbError::new(
        ErrorKind::MalformedExpression,
        format!("Malformed expression: {}", detail.as_ref()),
    )
}

pub fn invalid_arg_count(name: &str, expected: usize) -> DbError {
    DbError::new(
        ErrorKind::InvalidArgCount,
        format!("Invalid number of arguments to function '{name}'. Was expecting {expected} arguments"),
    )
}

pub fn wrong_number_of_arguments(name: &str) -> DbError {
    DbError::new(
        ErrorKind::WrongNumberOfArguments,
        format!("Wrong number of arguments to expression '{name}'"),
    )
}

pub fn can_not_apply_op(name: &str, call_signature: &str, allowed: &str) -> DbError {
    DbError::new(
        ErrorKind::CanNotApplyOp,
        format!(
            "Cannot apply '{name}' to arguments of type {call_signature}. Supported form(s): {allowed}"
        ),
    )
    .with_signature(allowed)
}

pub fn type_not_comparable(left: &str, right: &str) -> DbError {
    DbError::new(
        ErrorKind::TypeNotComparable,
        format!("Cannot compare values of types '{left}', '{right}'"),
    )
}

pub fn incompatible_value_types(name: &str) -> DbError {
    DbError::new(
        ErrorKind::IncompatibleValueTypes,
        format!("Values passed to {name} operator must have compatible types"),
    )
}

pub fn cannot_infer_return_type(name: &str) -> DbError {
    DbError::new(
        ErrorKind::CannotInferReturnType,
        format!("Cannot infer return type for {name}"),
    )
}

pub fn illegal_dynamic_param() -> DbError {
    DbError::new(
        ErrorKind::IllegalDynamicParam,
        "Illegal use of dynamic parameter",
    )
}

pub fn argument_must_be_literal(name: &str) -> DbError {
    DbError::new(
        ErrorKind::ArgumentMustBeLiteral,
        format!("Argument to function '{name}' must be a literal"),
    )
}

pub fn argument_must_be_positive_integer(name: &str) -> DbError {
    DbError::new(
        ErrorKind::ArgumentMustBePositiveInteger,
        format!("Argument to function '{name}' must be a positive integer literal"),
    )
}

pub fn argument_must_be_unit_interval(name: &str) -> DbError {
    DbError::new(
        ErrorKind::ArgumentMustBeUnitInterval,
        format!("Argument to function '{name}' must be a numeric literal between 0 and 1"),
    )
}

pub fn argument_must_be_valid_precision(name: &str, min: u32, max: u32) -> DbError {
    DbError::new(
        ErrorKind::ArgumentMustBeValidPrecision,
        format!("Argument to function '{name}' must be a valid precision between '{min}' and '{max}'"),
    )
}

pub fn cannot_cast_value(from: &str, to: &str) -> DbError {
    DbError::new(
        ErrorKind::CannotCastValue,
        format!("Cast function cannot convert value of type {from} to type {to}"),
    )
}

pub fn numeric_literal_out_of_range(literal: &str) -> DbError {
    DbError::new(
        ErrorKind::NumericLiteralOutOfRange,
        format!("Numeric literal '{literal}' out of range"),
    )
}

pub fn charset_mismatch() -> DbError {
    DbError::new(
        ErrorKind::CharsetMismatch,
        "Given character set does not match the character set of the other operands",
    )
}

pub fn grouping_in_non_aggregate_query(name: &str) -> DbError {
    DbError::new(
        ErrorKind::GroupingInNonAggregateQuery,
        format!("{name} operator may only occur in an aggregate query"),
    )
}

pub fn grouping_argument_not_grouped(name: &str) -> DbError {
    DbError::new(
        ErrorKind::GroupingArgumentNotGrouped,
        format!("Argument to {name} operator must be a grouped expression"),
    )
}

pub fn grouping_in_wrong_clause(name: &str) -> DbError {
    DbError::new(
        ErrorKind::GroupingInWrongClause,
        format!("{name} operator may only occur in SELECT, HAVING or ORDER BY clause"),
    )
}

pub fn aggregate_illegal_in_clause(clause: &str) -> DbError {
    DbError::new(
        ErrorKind::AggregateIllegalInClause,
        format!("Aggregate expression is illegal in {clause} clause"),
    )
}

pub fn nested_aggregate() -> DbError {
    DbError::new(
        ErrorKind::NestedAggregate,
        "Aggregate expressions cannot be nested",
    )
}

pub fn string_fragments_on_same_line() -> DbError {
    DbError::new(
        ErrorKind::StringFragmentsOnSameLine,
        "String literal continued on same line",
    )
}

pub fn no_such_function(name: &str, suggestion: Option<&str>) -> DbError {
    let err = DbError::new(
        ErrorKind::NoSuchFunction,
        format!("No match found for function signature {name}"),
    );
    match suggestion {
        Some(suggestion) => err.with_field("did you mean", suggestion),
        None => err,
    }
}

pub fn unknown_identifier(name: &str) -> DbError {
    DbError::new(
        ErrorKind::UnknownIdentifier,
        format!("Column '{name}' not found in any table"),
    )
}

pub fn invalid_setting(name: &str) -> DbError {
    DbError::new(ErrorKind::InvalidSetting, format!("Missing setting for '{name}'"))
}
