//! Streaming group window functions.
use polysql_error::{DbError, ErrorKind, Result};

use crate::expr::LiteralValue;
use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::OperandTypeChecker;
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::ARG0;
use crate::functions::operator::Operator;
use crate::types::TypeFamily;

use TypeFamily as F;

pub static OPERATORS: &[&Operator] = &[&TUMBLE, &HOP, &SESSION];

const fn group_window(name: &'static str, checker: OperandTypeChecker) -> Operator {
    Operator::function(name, OperatorKind::GroupWindow)
        .with_checker(checker)
        .with_return_type(ARG0)
        .with_category(Category::Window)
        .with_validate(validate_intervals)
        .group_function()
}

/// `TUMBLE(time, size [, align])`
pub static TUMBLE: Operator = group_window(
    "TUMBLE",
    OperandTypeChecker::family_optional(&[F::Datetime, F::DatetimeInterval, F::Time], 1),
)
.with_doc(&Documentation {
    category: Category::Window,
    description: "Assign rows to fixed size, non-overlapping windows.",
    arguments: &["time", "size", "align"],
    example: Some(Example {
        example: "TUMBLE(ts, INTERVAL '1' HOUR)",
        output: "2024-01-01 10:00:00",
    }),
});

/// `HOP(time, slide, size [, align])`
pub static HOP: Operator = group_window(
    "HOP",
    OperandTypeChecker::family_optional(
        &[F::Datetime, F::DatetimeInterval, F::DatetimeInterval, F::Time],
        1,
    ),
);

/// `SESSION(time, gap)`
pub static SESSION: Operator = group_window(
    "SESSION",
    OperandTypeChecker::family(&[F::Datetime, F::DatetimeInterval]),
);

fn is_positive_interval(value: &str, negative: bool) -> bool {
    !negative && value.chars().any(|c| c.is_ascii_digit() && c != '0')
}

/// Interval literals sizing the window must be positive.
fn validate_intervals(binding: &CallBinding<'_>) -> Result<()> {
    for idx in 1..binding.operand_count() {
        let Some(LiteralValue::Interval {
            value, negative, ..
        }) = binding.operand_literal(idx)
        else {
            continue;
        };
        if !is_positive_interval(&value, negative) {
            return Err(binding.new_operand_error(
                idx,
                DbError::new(
                    ErrorKind::ArgumentMustBePositiveInteger,
                    format!(
                        "Interval argument to {} must be positive",
                        binding.operator.name
                    ),
                ),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use polysql_error::ParserPos;

    use super::*;
    use crate::expr::{Literal, Node};
    use crate::functions::binding::with_test_binding;
    use crate::types::{DataType, IntervalQualifier, TimeUnit};

    fn interval(value: &str, negative: bool, col: u32) -> Node {
        Node::Literal(Literal::new(
            LiteralValue::Interval {
                value: value.to_string(),
                negative,
                qualifier: IntervalQualifier::single(TimeUnit::Hour),
            },
            ParserPos::new(1, col),
        ))
    }

    fn validate(op: &'static Operator, size: Node) -> Result<()> {
        let interval_type = DataType::interval(IntervalQualifier::single(TimeUnit::Hour));
        let types = [DataType::timestamp(0), interval_type];
        let operands = vec![Node::identifier("ts", ParserPos::new(1, 8)), size];
        with_test_binding(op, operands, &types, |b| {
            assert!(op.checker.check(b, true).unwrap());
            (op.hooks.validate.unwrap())(b)
        })
    }

    #[test]
    fn positive_interval_accepted() {
        validate(&TUMBLE, interval("1", false, 12)).unwrap();
        validate(&SESSION, interval("00:30", false, 12)).unwrap();
    }

    #[test]
    fn negative_or_zero_interval_rejected() {
        let err = validate(&TUMBLE, interval("1", true, 12)).unwrap_err();
        assert_eq!(ErrorKind::ArgumentMustBePositiveInteger, err.kind());
        assert_eq!(Some(ParserPos::new(1, 12)), err.pos());

        validate(&TUMBLE, interval("0", false, 12)).unwrap_err();
    }

    #[test]
    fn group_window_flags() {
        for op in OPERATORS {
            assert!(op.flags.group_function, "{op}");
        }
    }
}
