use polysql_error::Result;

use super::datetime::add_unit_to_datetime;
use crate::expr::{Call, Monotonicity, Node};
use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::{
    DATETIME_INTERVAL,
    DIVISION_OPERATOR,
    EXACT_NUMERIC_EXACT_NUMERIC,
    MINUS_DATE_OPERATOR,
    MINUS_OPERATOR,
    MULTIPLY_OPERATOR,
    NUMERIC_OR_INTERVAL,
    PLUS_OPERATOR,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{
    ARG0,
    INTEGER_QUOTIENT_NULLABLE,
    NULLABLE_MOD,
    NULLABLE_SUM,
    OperandTypeInference,
    PRODUCT_NULLABLE,
    QUOTIENT_NULLABLE,
    ReturnTypeInference,
};
use crate::functions::operator::Operator;
use crate::types::DataType;
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[
    &PLUS,
    &MINUS,
    &TIMES,
    &DIVIDE,
    &DIVIDE_INTEGER,
    &PERCENT_REMAINDER,
    &PLUS_PREFIX,
    &MINUS_PREFIX,
    &DATETIME_PLUS,
    &MINUS_DATE,
];

pub static PLUS: Operator = Operator::binary("+", OperatorKind::Plus, 40, true)
    .with_checker(PLUS_OPERATOR)
    .with_return_type(NULLABLE_SUM)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::NUMERIC_OPERATOR)
    .with_monotonicity(plus_monotonicity)
    .with_doc(&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Adds two numbers, two intervals, or an interval to a datetime.",
        arguments: &["a", "b"],
        example: Some(Example {
            example: "1.5 + 2",
            output: "3.5",
        }),
    });

pub static MINUS: Operator = Operator::binary("-", OperatorKind::Minus, 40, true)
    .with_checker(MINUS_OPERATOR)
    .with_return_type(NULLABLE_SUM)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::NUMERIC_OPERATOR)
    .with_monotonicity(minus_monotonicity)
    .with_doc(&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Subtracts the right operand from the left.",
        arguments: &["a", "b"],
        example: None,
    });

pub static TIMES: Operator = Operator::binary("*", OperatorKind::Times, 60, true)
    .with_checker(MULTIPLY_OPERATOR)
    .with_return_type(PRODUCT_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::NUMERIC_OPERATOR)
    .with_monotonicity(times_monotonicity)
    .with_doc(&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Multiplies two numbers, or an interval by a number.",
        arguments: &["a", "b"],
        example: Some(Example {
            example: "2 * 3",
            output: "6",
        }),
    });

pub static DIVIDE: Operator = Operator::binary("/", OperatorKind::Divide, 60, true)
    .with_checker(DIVISION_OPERATOR)
    .with_return_type(QUOTIENT_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::NUMERIC_OPERATOR)
    .with_monotonicity(divide_monotonicity)
    .with_doc(&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Divides the left operand by the right.",
        arguments: &["a", "b"],
        example: None,
    });

/// Integer division produced by rewrites, never parsed.
pub static DIVIDE_INTEGER: Operator = Operator::binary("/INT", OperatorKind::DivideInteger, 60, true)
    .with_checker(DIVISION_OPERATOR)
    .with_return_type(INTEGER_QUOTIENT_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::NUMERIC_OPERATOR)
    .with_monotonicity(divide_monotonicity);

pub static PERCENT_REMAINDER: Operator = Operator::binary("%", OperatorKind::Mod, 60, true)
    .with_checker(EXACT_NUMERIC_EXACT_NUMERIC)
    .with_return_type(NULLABLE_MOD)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::NUMERIC_OPERATOR);

pub static PLUS_PREFIX: Operator = Operator::prefix("+", OperatorKind::PlusPrefix, 80)
    .with_checker(NUMERIC_OR_INTERVAL)
    .with_return_type(ARG0)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::NUMERIC_OPERATOR)
    .with_monotonicity(first_monotonicity);

pub static MINUS_PREFIX: Operator = Operator::prefix("-", OperatorKind::MinusPrefix, 80)
    .with_checker(NUMERIC_OR_INTERVAL)
    .with_return_type(ARG0)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::NUMERIC_OPERATOR)
    .with_monotonicity(negated_monotonicity)
    .with_doc(&Documentation {
        category: Category::NUMERIC_OPERATOR,
        description: "Negates a number or an interval.",
        arguments: &["a"],
        example: Some(Example {
            example: "-(1 + 2)",
            output: "-3",
        }),
    });

/// Datetime plus interval, produced when rewriting TIMESTAMPADD and written
/// back as `+`.
pub static DATETIME_PLUS: Operator =
    Operator::special("DATETIME_PLUS", OperatorKind::DatetimePlus, 40, true)
        .with_checker(DATETIME_INTERVAL)
        .with_return_type(ReturnTypeInference::Custom(datetime_plus_type))
        .with_category(Category::NUMERIC_OPERATOR)
        .with_unparse(unparse_as_plus)
        .with_monotonicity(plus_monotonicity);

/// `(d1 - d2) <qualifier>`, the difference of two datetimes as an interval.
///
/// The third operand is the interval type of the result.
pub static MINUS_DATE: Operator = Operator::special("-", OperatorKind::MinusDate, 40, true)
    .with_checker(MINUS_DATE_OPERATOR)
    .with_return_type(ReturnTypeInference::Custom(minus_date_type))
    .with_category(Category::NUMERIC_OPERATOR)
    .with_unparse(unparse_minus_date)
    .with_monotonicity(minus_monotonicity);

fn datetime_plus_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let datetime = binding.operand_type(0)?;
    let interval = binding.operand_type(1)?;
    let datatype = match interval.interval_qualifier() {
        Some(qualifier) => add_unit_to_datetime(qualifier.end_unit(), datetime),
        None => datetime.clone(),
    };
    Ok(Some(datatype.with_nullable(binding.any_operand_nullable())))
}

fn minus_date_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let nullable = binding.operand_type(0)?.is_nullable() || binding.operand_type(1)?.is_nullable();
    Ok(binding
        .operand_type_spec(2)
        .or(binding.operand_types.get(2))
        .map(|t| t.clone().with_nullable(nullable)))
}

fn unparse_as_plus(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, left: u32, right: u32) {
    let [a, b] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    w.write_node(a, left, op.left_prec);
    w.keyword("+");
    w.write_node(b, op.right_prec, right);
}

fn unparse_minus_date(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let [a, b, Node::TypeSpec(spec)] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    w.open_paren();
    w.write_node(a, 0, op.left_prec);
    w.keyword("-");
    w.write_node(b, op.right_prec, 0);
    w.close_paren();
    match spec.datatype.interval_qualifier() {
        Some(qualifier) => w.keyword(&qualifier.to_string()),
        None => w.keyword(&spec.datatype.to_string()),
    }
}

fn first_monotonicity(_: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    operands.first().copied().unwrap_or(Monotonicity::NotMonotonic)
}

fn negated_monotonicity(_: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    operands
        .first()
        .map(|m| m.reverse())
        .unwrap_or(Monotonicity::NotMonotonic)
}

fn plus_monotonicity(_: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    match operands {
        [a, b] => a.plus(*b),
        _ => Monotonicity::NotMonotonic,
    }
}

fn minus_monotonicity(_: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    match operands {
        [a, b, ..] => a.minus(*b),
        _ => Monotonicity::NotMonotonic,
    }
}

/// Sign of a constant numeric literal operand.
fn literal_sign(binding: &CallBinding<'_>, idx: usize) -> Option<i32> {
    let value = binding.operand_literal(idx)?.as_f64()?;
    Some(if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    })
}

fn times_monotonicity(binding: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    let [a, b] = operands else {
        return Monotonicity::NotMonotonic;
    };
    match (a, b) {
        (Monotonicity::Constant, Monotonicity::Constant) => Monotonicity::Constant,
        (Monotonicity::Constant, m) => match literal_sign(binding, 0) {
            Some(sign) => m.scale_by_sign(sign),
            None => Monotonicity::NotMonotonic,
        },
        (m, Monotonicity::Constant) => match literal_sign(binding, 1) {
            Some(sign) => m.scale_by_sign(sign),
            None => Monotonicity::NotMonotonic,
        },
        _ => Monotonicity::NotMonotonic,
    }
}

fn divide_monotonicity(binding: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    let [a, b] = operands else {
        return Monotonicity::NotMonotonic;
    };
    match (a, b) {
        (Monotonicity::Constant, Monotonicity::Constant) => Monotonicity::Constant,
        (m, Monotonicity::Constant) => match literal_sign(binding, 1) {
            Some(sign) if sign != 0 => m.scale_by_sign(sign),
            _ => Monotonicity::NotMonotonic,
        },
        _ => Monotonicity::NotMonotonic,
    }
}

#[cfg(test)]
mod tests {
    use polysql_error::ParserPos;

    use super::*;
    use crate::expr::Literal;
    use crate::functions::binding::{column_operands, with_test_binding};
    use crate::types::{IntervalQualifier, TimeUnit};

    fn ret(op: &'static Operator, types: &[DataType]) -> Option<DataType> {
        with_test_binding(op, column_operands(types.len()), types, |b| {
            assert!(op.checker.check(b, true).unwrap());
            op.return_type.infer(b).unwrap()
        })
    }

    #[test]
    fn decimal_plus_integer() {
        assert_eq!(
            Some(DataType::decimal(13, 2)),
            ret(&PLUS, &[DataType::decimal(5, 2), DataType::integer()])
        );
    }

    #[test]
    fn integer_plus_nullable_bigint() {
        assert_eq!(
            Some(DataType::bigint().with_nullable(true)),
            ret(&PLUS, &[DataType::integer(), DataType::bigint().with_nullable(true)])
        );
    }

    #[test]
    fn date_plus_interval() {
        let interval = DataType::interval(IntervalQualifier::single(TimeUnit::Day));
        assert_eq!(Some(DataType::date()), ret(&PLUS, &[DataType::date(), interval]));
    }

    #[test]
    fn datetime_plus_hours_on_date_is_timestamp() {
        let interval = DataType::interval(IntervalQualifier::single(TimeUnit::Hour));
        assert_eq!(
            Some(DataType::timestamp(0)),
            ret(&DATETIME_PLUS, &[DataType::date(), interval])
        );
    }

    #[test]
    fn minus_rejects_interval_minus_datetime() {
        let interval = DataType::interval(IntervalQualifier::single(TimeUnit::Day));
        let types = [interval, DataType::date()];
        with_test_binding(&MINUS, column_operands(2), &types, |b| {
            assert!(!MINUS.checker.check(b, false).unwrap());
        });
    }

    #[test]
    fn times_by_negative_constant_reverses() {
        let operands = vec![
            Node::identifier("x", ParserPos::new(1, 1)),
            Node::Literal(Literal::integer(-2, ParserPos::new(1, 5))),
        ];
        let types = [DataType::integer(), DataType::integer()];
        let m = with_test_binding(&TIMES, operands, &types, |b| {
            times_monotonicity(b, &[Monotonicity::Increasing, Monotonicity::Constant])
        });
        assert_eq!(Monotonicity::Decreasing, m);
    }

    #[test]
    fn minus_date_takes_qualifier_operand() {
        let qualifier = DataType::interval(IntervalQualifier::range(TimeUnit::Day, TimeUnit::Second));
        let operands = vec![
            Node::identifier("a", ParserPos::new(1, 1)),
            Node::identifier("b", ParserPos::new(1, 5)),
            Node::type_spec(qualifier.clone(), ParserPos::new(1, 9)),
        ];
        let types = [
            DataType::timestamp(0).with_nullable(true),
            DataType::timestamp(0),
            qualifier.clone(),
        ];
        let ret = with_test_binding(&MINUS_DATE, operands, &types, |b| {
            assert!(MINUS_DATE.checker.check(b, true).unwrap());
            MINUS_DATE.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(qualifier.with_nullable(true)), ret);
    }
}
