//! GROUPING, GROUPING_ID and GROUP_ID.
//!
//! Placement rules (aggregate query, grouped arguments, allowed clauses) are
//! enforced by the validator for every operator flagged as grouping.
use crate::functions::OperatorKind;
use crate::functions::checker::{NILADIC, ONE_OR_MORE};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{BIGINT, ReturnTypeInference, TypeTransform};
use crate::functions::operator::Operator;

pub static OPERATORS: &[&Operator] = &[&GROUPING, &GROUPING_ID, &GROUP_ID];

const BIGINT_NOT_NULL: ReturnTypeInference =
    ReturnTypeInference::Cascade(&BIGINT, &[TypeTransform::ToNotNullable]);

pub static GROUPING: Operator = Operator::function("GROUPING", OperatorKind::Grouping)
    .with_checker(ONE_OR_MORE)
    .with_return_type(BIGINT_NOT_NULL)
    .with_category(Category::GROUPING_AGGREGATE)
    .grouping()
    .with_doc(&Documentation {
        category: Category::GROUPING_AGGREGATE,
        description: "Bit vector of which arguments are not part of the current grouping set.",
        arguments: &["expr", "..."],
        example: Some(Example {
            example: "GROUPING(a, b)",
            output: "2",
        }),
    });

/// Same as GROUPING, kept for compatibility.
pub static GROUPING_ID: Operator = Operator::function("GROUPING_ID", OperatorKind::GroupingId)
    .with_checker(ONE_OR_MORE)
    .with_return_type(BIGINT_NOT_NULL)
    .with_category(Category::GROUPING_AGGREGATE)
    .grouping();

pub static GROUP_ID: Operator = Operator::function("GROUP_ID", OperatorKind::GroupId)
    .with_checker(NILADIC)
    .with_return_type(BIGINT_NOT_NULL)
    .with_category(Category::GROUPING_AGGREGATE)
    .grouping();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_flags() {
        for op in OPERATORS {
            assert!(op.flags.grouping, "{op}");
            assert!(!op.is_aggregate(), "{op}");
        }
        assert_eq!(None, GROUPING.operand_count_range().max);
        assert_eq!(Some(0), GROUP_ID.operand_count_range().is_exact());
    }
}
