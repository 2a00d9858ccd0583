use serde::{Deserialize, Serialize};

/// Discriminator for validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// BETWEEN without a terminating AND.
    BetweenWithoutAnd,
    /// Token sequence could not be reduced into an expression tree.
    MalformedExpression,
    /// Operand count didn't match an operator with a fixed arity.
    InvalidArgCount,
    /// Operand count outside an operator's arity range.
    WrongNumberOfArguments,
    /// Operand types not accepted by any signature of the operator.
    CanNotApplyOp,
    /// Operands can't be compared with each other.
    TypeNotComparable,
    /// Operands that must share a type don't.
    IncompatibleValueTypes,
    /// A return type could not be derived for the call.
    CannotInferReturnType,
    /// A dynamic parameter whose type could not be inferred.
    IllegalDynamicParam,
    /// Operand must be a literal.
    ArgumentMustBeLiteral,
    /// Operand must be a positive integer literal.
    ArgumentMustBePositiveInteger,
    /// Operand must be a numeric literal between 0 and 1.
    ArgumentMustBeUnitInterval,
    /// Operand must be a precision literal within the supported range.
    ArgumentMustBeValidPrecision,
    /// Explicit cast between types that can't be converted.
    CannotCastValue,
    /// Character set mismatch between string operands.
    CharsetMismatch,
    /// Exact numeric literal wider than the supported precision or scale.
    NumericLiteralOutOfRange,
    /// GROUPING, GROUPING_ID or GROUP_ID outside an aggregate query.
    GroupingInNonAggregateQuery,
    /// Argument of a grouping function isn't a GROUP BY expression.
    GroupingArgumentNotGrouped,
    /// Grouping function in a clause other than SELECT, HAVING or ORDER BY.
    GroupingInWrongClause,
    /// Aggregate function in a clause that doesn't allow them.
    AggregateIllegalInClause,
    /// Aggregate function nested inside another aggregate.
    NestedAggregate,
    /// Adjacent string literal fragments on the same source line.
    StringFragmentsOnSameLine,
    /// No operator with the given name and syntax.
    NoSuchFunction,
    /// Identifier not known to the validation scope.
    UnknownIdentifier,
    /// Unknown or invalid configuration setting.
    InvalidSetting,
    /// Broken internal invariant.
    Internal,
}

/// Coarse classification of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Structural errors while reducing token sequences.
    Parse,
    /// Operand count outside an operator's range.
    OperandCount,
    /// Operand types not admitted by an operator.
    OperandType,
    /// Cast or assignment errors.
    Cast,
    /// Errors that depend on the surrounding query structure.
    Context,
    /// Name resolution failures.
    Resolution,
    Configuration,
    Internal,
}

impl ErrorKind {
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::BetweenWithoutAnd | Self::MalformedExpression => ErrorCategory::Parse,
            Self::InvalidArgCount | Self::WrongNumberOfArguments => ErrorCategory::OperandCount,
            Self::CanNotApplyOp
            | Self::TypeNotComparable
            | Self::IncompatibleValueTypes
            | Self::CannotInferReturnType
            | Self::IllegalDynamicParam
            | Self::ArgumentMustBeLiteral
            | Self::ArgumentMustBePositiveInteger
            | Self::ArgumentMustBeUnitInterval
            | Self::ArgumentMustBeValidPrecision => ErrorCategory::OperandType,
            Self::CannotCastValue | Self::CharsetMismatch | Self::NumericLiteralOutOfRange => {
                ErrorCategory::Cast
            }
            Self::GroupingInNonAggregateQuery
            | Self::GroupingArgumentNotGrouped
            | Self::GroupingInWrongClause
            | Self::AggregateIllegalInClause
            | Self::NestedAggregate
            | Self::StringFragmentsOnSameLine => ErrorCategory::Context,
            Self::NoSuchFunction | Self::UnknownIdentifier => ErrorCategory::Resolution,
            Self::InvalidSetting => ErrorCategory::Configuration,
            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// If a failure of this kind should cause the next overload candidate to
    /// be tried before reporting.
    pub const fn is_overload_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::OperandCount | ErrorCategory::OperandType
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BetweenWithoutAnd => "between_without_and",
            Self::MalformedExpression => "malformed_expression",
            Self::InvalidArgCount => "invalid_arg_count",
            Self::WrongNumberOfArguments => "wrong_number_of_arguments",
            Self::CanNotApplyOp => "can_not_apply_op",
            Self::TypeNotComparable => "type_not_comparable",
            Self::IncompatibleValueTypes => "incompatible_value_types",
            Self::CannotInferReturnType => "cannot_infer_return_type",
            Self::IllegalDynamicParam => "illegal_dynamic_param",
            Self::ArgumentMustBeLiteral => "argument_must_be_literal",
            Self::ArgumentMustBePositiveInteger => "argument_must_be_positive_integer",
            Self::ArgumentMustBeUnitInterval => "argument_must_be_unit_interval",
            Self::ArgumentMustBeValidPrecision => "argument_must_be_valid_precision",
            Self::CannotCastValue => "cannot_cast_value",
            Self::CharsetMismatch => "charset_mismatch",
            Self::NumericLiteralOutOfRange => "numeric_literal_out_of_range",
            Self::GroupingInNonAggregateQuery => "grouping_in_non_aggregate_query",
            Self::GroupingArgumentNotGrouped => "grouping_argument_not_grouped",
            Self::GroupingInWrongClause => "grouping_in_wrong_clause",
            Self::AggregateIllegalInClause => "aggregate_illegal_in_clause",
            Self::NestedAggregate => "nested_aggregate",
            Self::StringFragmentsOnSameLine => "string_fragments_on_same_line",
            Self::NoSuchFunction => "no_such_function",
            Self::UnknownIdentifier => "unknown_identifier",
            Self::InvalidSetting => "invalid_setting",
            Self::Internal => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_count_and_type_errors_retry() {
        assert!(ErrorKind::InvalidArgCount.is_overload_retryable());
        assert!(ErrorKind::CanNotApplyOp.is_overload_retryable());
        assert!(!ErrorKind::CannotCastValue.is_overload_retryable());
        assert!(!ErrorKind::NumericLiteralOutOfRange.is_overload_retryable());
        assert!(!ErrorKind::GroupingArgumentNotGrouped.is_overload_retryable());
        assert!(!ErrorKind::BetweenWithoutAnd.is_overload_retryable());
    }
}
