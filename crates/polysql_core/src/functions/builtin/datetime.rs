use polysql_error::{ParserPos, Result, messages};

use crate::expr::{Call, Literal, Monotonicity, Node};
use crate::functions::binding::CallBinding;
use crate::functions::checker::{
    CustomChecker,
    DATETIME,
    NILADIC,
    OperandCountRange,
    OperandTypeChecker,
    family_accepts,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{DATE, INTEGER_NULLABLE, ReturnTypeInference};
use crate::functions::operator::Operator;
use crate::functions::{OperatorKind, Syntax};
use crate::types::datatype::MAX_DATETIME_PRECISION;
use crate::types::{DataType, TimeUnit, TypeFamily, TypeName};
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[
    &EXTRACT,
    &YEAR,
    &QUARTER,
    &MONTH,
    &WEEK,
    &DAYOFYEAR,
    &DAYOFMONTH,
    &DAYOFWEEK,
    &HOUR,
    &MINUTE,
    &SECOND,
    &TIMESTAMPADD,
    &TIMESTAMPDIFF,
    &CURRENT_DATE,
    &CURRENT_TIME,
    &CURRENT_TIMESTAMP,
    &LOCALTIME,
    &LOCALTIMESTAMP,
];

/// Type of adding an amount of `unit` to a value of type `datetime`.
///
/// Adding a time of day unit to a DATE gives a TIMESTAMP, and sub-second
/// units need a fractional precision.
pub fn add_unit_to_datetime(unit: TimeUnit, datetime: &DataType) -> DataType {
    let fractional = matches!(
        unit,
        TimeUnit::Millisecond | TimeUnit::Microsecond | TimeUnit::Nanosecond
    );
    let time_of_day = is_time_of_day(unit);
    match datetime.name() {
        TypeName::Date if time_of_day => {
            let precision = if fractional { MAX_DATETIME_PRECISION } else { 0 };
            DataType::timestamp(precision).with_nullable(datetime.is_nullable())
        }
        TypeName::Time | TypeName::Timestamp if fractional => {
            let precision = datetime.precision().unwrap_or(0).max(MAX_DATETIME_PRECISION);
            datetime.clone().with_precision(Some(precision))
        }
        _ => datetime.clone(),
    }
}

/// `EXTRACT(unit FROM value)` on datetimes and intervals.
pub static EXTRACT: Operator = Operator::function("EXTRACT", OperatorKind::Extract)
    .with_checker(OperandTypeChecker::Custom(&CustomChecker {
        check: check_extract,
        range: OperandCountRange::exact(2),
        allowed: "$OP(<DATETIME_INTERVAL> FROM <DATETIME>)
                  $OP(<DATETIME_INTERVAL> FROM <DATETIME_INTERVAL>)",
    }))
    .with_return_type(ReturnTypeInference::Custom(extract_type))
    .with_category(Category::TimeDate)
    .with_unparse(unparse_extract)
    .with_monotonicity(extract_monotonicity)
    .with_doc(&Documentation {
        category: Category::TimeDate,
        description: "Get a field of a datetime or interval value.",
        arguments: &["unit", "value"],
        example: Some(Example {
            example: "EXTRACT(YEAR FROM DATE '2024-03-10')",
            output: "2024",
        }),
    });

fn check_extract(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let Some(unit) = binding.operand_time_unit(0) else {
        return fail(binding, throw);
    };
    let value = binding.operand_type(1)?;
    let ok = value.is_null_type()
        || value.name() == TypeName::Any
        || family_accepts(TypeFamily::DatetimeInterval, value)
        || match value.name() {
            TypeName::Date => !is_time_of_day(unit),
            TypeName::Time | TypeName::TimeWithLocalTimeZone => {
                is_time_of_day(unit) || unit == TimeUnit::Epoch
            }
            _ => family_accepts(TypeFamily::Datetime, value),
        };
    if ok { Ok(true) } else { fail(binding, throw) }
}

fn is_time_of_day(unit: TimeUnit) -> bool {
    matches!(
        unit,
        TimeUnit::Hour
            | TimeUnit::Minute
            | TimeUnit::Second
            | TimeUnit::Millisecond
            | TimeUnit::Microsecond
            | TimeUnit::Nanosecond
    )
}

fn fail(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    if throw {
        Err(binding.new_validation_signature_error())
    } else {
        Ok(false)
    }
}

fn extract_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let datatype = match binding.operand_time_unit(0) {
        Some(TimeUnit::Nanosecond) => DataType::bigint(),
        _ => DataType::integer(),
    };
    Ok(Some(datatype.with_nullable(binding.operand_type(1)?.is_nullable())))
}

fn unparse_extract(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let [unit, value] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    w.open_call(op.name);
    w.write_node(unit, 0, 0);
    w.keyword("FROM");
    w.write_node(value, 0, 0);
    w.close_paren();
}

/// Years only move forward with time, every other field wraps around.
fn extract_monotonicity(binding: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    match operands {
        [_, Monotonicity::Constant] => Monotonicity::Constant,
        [_, m] if binding.operand_time_unit(0) == Some(TimeUnit::Year) => m.unstrict(),
        _ => Monotonicity::NotMonotonic,
    }
}

/// Date part function such as `YEAR(d)`, validated as `EXTRACT(YEAR FROM d)`.
const fn date_part(name: &'static str) -> Operator {
    Operator::function(name, OperatorKind::DatePart)
        .with_checker(DATETIME)
        .with_return_type(INTEGER_NULLABLE)
        .with_category(Category::TimeDate)
        .with_rewrite(rewrite_date_part)
}

pub static YEAR: Operator = date_part("YEAR").with_doc(&Documentation {
    category: Category::TimeDate,
    description: "Get the year of a date or timestamp. Same as EXTRACT(YEAR FROM value).",
    arguments: &["value"],
    example: Some(Example {
        example: "year(DATE '2024-03-10')",
        output: "2024",
    }),
});
pub static QUARTER: Operator = date_part("QUARTER");
pub static MONTH: Operator = date_part("MONTH");
pub static WEEK: Operator = date_part("WEEK");
pub static DAYOFYEAR: Operator = date_part("DAYOFYEAR");
pub static DAYOFMONTH: Operator = date_part("DAYOFMONTH");
pub static DAYOFWEEK: Operator = date_part("DAYOFWEEK");
pub static HOUR: Operator = date_part("HOUR");
pub static MINUTE: Operator = date_part("MINUTE");
pub static SECOND: Operator = date_part("SECOND");

fn date_part_unit(name: &str) -> Option<TimeUnit> {
    Some(match name.to_ascii_uppercase().as_str() {
        "YEAR" => TimeUnit::Year,
        "QUARTER" => TimeUnit::Quarter,
        "MONTH" => TimeUnit::Month,
        "WEEK" => TimeUnit::Week,
        "DAYOFYEAR" => TimeUnit::Doy,
        "DAYOFMONTH" => TimeUnit::Day,
        "DAYOFWEEK" => TimeUnit::Dow,
        "HOUR" => TimeUnit::Hour,
        "MINUTE" => TimeUnit::Minute,
        "SECOND" => TimeUnit::Second,
        _ => return None,
    })
}

/// The EXTRACT call keeps the position of the original call.
fn rewrite_date_part(call: &Call) -> Option<Node> {
    let unit = date_part_unit(&call.name)?;
    let [value] = call.operands.as_slice() else {
        return None;
    };
    let operands = vec![
        Node::Literal(Literal::time_unit(unit, ParserPos::ZERO)),
        value.clone(),
    ];
    Some(Call::new(EXTRACT.name, Syntax::Function, operands, call.pos).into())
}

/// `TIMESTAMPADD(unit, count, datetime)`
pub static TIMESTAMPADD: Operator = Operator::function("TIMESTAMPADD", OperatorKind::TimestampAdd)
    .with_checker(OperandTypeChecker::family(&[
        TypeFamily::Symbol,
        TypeFamily::Integer,
        TypeFamily::Datetime,
    ]))
    .with_return_type(ReturnTypeInference::Custom(timestampadd_type))
    .with_category(Category::TimeDate)
    .with_doc(&Documentation {
        category: Category::TimeDate,
        description: "Add a number of units to a datetime.",
        arguments: &["unit", "count", "datetime"],
        example: Some(Example {
            example: "TIMESTAMPADD(DAY, 2, DATE '2024-03-10')",
            output: "2024-03-12",
        }),
    });

fn timestampadd_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let datetime = binding.operand_type(2)?;
    let datatype = match binding.operand_time_unit(0) {
        Some(unit) => add_unit_to_datetime(unit, datetime),
        None => datetime.clone(),
    };
    Ok(Some(datatype.with_nullable(binding.any_operand_nullable())))
}

/// `TIMESTAMPDIFF(unit, start, end)`
pub static TIMESTAMPDIFF: Operator = Operator::function("TIMESTAMPDIFF", OperatorKind::TimestampDiff)
    .with_checker(OperandTypeChecker::family(&[
        TypeFamily::Symbol,
        TypeFamily::Datetime,
        TypeFamily::Datetime,
    ]))
    .with_return_type(ReturnTypeInference::Custom(timestampdiff_type))
    .with_category(Category::TimeDate);

fn timestampdiff_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let datatype = match binding.operand_time_unit(0) {
        Some(TimeUnit::Nanosecond | TimeUnit::Microsecond) => DataType::bigint(),
        _ => DataType::integer(),
    };
    let nullable = binding.operand_type(1)?.is_nullable() || binding.operand_type(2)?.is_nullable();
    Ok(Some(datatype.with_nullable(nullable)))
}

pub static CURRENT_DATE: Operator = Operator::function_id("CURRENT_DATE", OperatorKind::ContextVariable)
    .with_checker(NILADIC)
    .with_return_type(DATE)
    .with_category(Category::TimeDate)
    .with_monotonicity(increasing)
    .dynamic()
    .with_doc(&Documentation {
        category: Category::TimeDate,
        description: "The current date at the start of the statement.",
        arguments: &[],
        example: None,
    });

/// Niladic, or with a literal fractional seconds precision.
const PRECISION_OPERAND: OperandTypeChecker = OperandTypeChecker::Or(&[
    NILADIC,
    OperandTypeChecker::Sequence {
        allowed: "$OP(<INTEGER>)",
        checkers: &[OperandTypeChecker::Literal],
    },
]);

const fn current_with_precision(name: &'static str, ret: fn(&CallBinding<'_>) -> Result<Option<DataType>>) -> Operator {
    Operator::function_id(name, OperatorKind::ContextVariable)
        .with_checker(PRECISION_OPERAND)
        .with_return_type(ReturnTypeInference::Custom(ret))
        .with_category(Category::TimeDate)
        .with_monotonicity(increasing)
        .dynamic()
}

pub static CURRENT_TIME: Operator = current_with_precision("CURRENT_TIME", time_type);
pub static CURRENT_TIMESTAMP: Operator = current_with_precision("CURRENT_TIMESTAMP", timestamp_type)
    .with_doc(&Documentation {
        category: Category::TimeDate,
        description: "The current timestamp, with an optional fractional seconds precision.",
        arguments: &["precision"],
        example: None,
    });
pub static LOCALTIME: Operator = current_with_precision("LOCALTIME", time_type);
pub static LOCALTIMESTAMP: Operator = current_with_precision("LOCALTIMESTAMP", timestamp_type);

fn precision_operand(binding: &CallBinding<'_>) -> Result<u32> {
    if binding.operand_count() == 0 {
        return Ok(0);
    }
    match binding.operand_i64(0) {
        Some(p) if (0..=MAX_DATETIME_PRECISION as i64).contains(&p) => Ok(p as u32),
        _ => Err(binding.new_operand_error(
            0,
            messages::argument_must_be_valid_precision(binding.operator.name, 0, MAX_DATETIME_PRECISION),
        )),
    }
}

fn time_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    Ok(Some(DataType::time(precision_operand(binding)?)))
}

fn timestamp_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    Ok(Some(DataType::timestamp(precision_operand(binding)?)))
}

fn increasing(_: &CallBinding<'_>, _: &[Monotonicity]) -> Monotonicity {
    Monotonicity::Increasing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Symbol;
    use crate::functions::binding::{column_operands, with_test_binding};
    use crate::types::IntervalQualifier;

    fn unit(unit: TimeUnit) -> Node {
        Node::Literal(Literal::time_unit(unit, ParserPos::new(1, 9)))
    }

    fn column(name: &str) -> Node {
        Node::identifier(name, ParserPos::new(1, 20))
    }

    #[test]
    fn extract_nanosecond_is_bigint() {
        let types = [DataType::symbol(), DataType::timestamp(3).with_nullable(true)];
        let ret = with_test_binding(&EXTRACT, vec![unit(TimeUnit::Nanosecond), column("ts")], &types, |b| {
            assert!(EXTRACT.checker.check(b, true).unwrap());
            EXTRACT.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::bigint().with_nullable(true)), ret);

        let ret = with_test_binding(&EXTRACT, vec![unit(TimeUnit::Year), column("ts")], &types, |b| {
            EXTRACT.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::integer().with_nullable(true)), ret);
    }

    #[test]
    fn extract_hour_from_date_fails() {
        let types = [DataType::symbol(), DataType::date()];
        with_test_binding(&EXTRACT, vec![unit(TimeUnit::Hour), column("d")], &types, |b| {
            assert!(!EXTRACT.checker.check(b, false).unwrap());
        });
    }

    #[test]
    fn extract_from_interval() {
        let types = [
            DataType::symbol(),
            DataType::interval(IntervalQualifier::range(TimeUnit::Day, TimeUnit::Second)),
        ];
        with_test_binding(&EXTRACT, vec![unit(TimeUnit::Minute), column("i")], &types, |b| {
            assert!(EXTRACT.checker.check(b, true).unwrap());
        });
    }

    #[test]
    fn date_part_rewrites_to_extract() {
        let call = Call::new("year", Syntax::Function, vec![column("d")], ParserPos::new(3, 7));
        let Some(Node::Call(rewritten)) = rewrite_date_part(&call) else {
            panic!("expected a rewrite");
        };
        assert_eq!("EXTRACT", rewritten.name);
        assert_eq!(ParserPos::new(3, 7), rewritten.pos);
        assert_eq!(
            Some(Symbol::TimeUnit(TimeUnit::Year)),
            rewritten.operands[0].as_literal().and_then(|l| l.value.as_symbol())
        );
        // The rewritten call is an EXTRACT, which has no rewrite.
        assert!(EXTRACT.hooks.rewrite.is_none());
    }

    #[test]
    fn date_part_type_matches_extract() {
        for nullable in [false, true] {
            let ts = DataType::timestamp(0).with_nullable(nullable);
            let declared = with_test_binding(&MONTH, vec![column("ts")], &[ts.clone()], |b| {
                MONTH.return_type.infer(b).unwrap()
            });
            let extracted = with_test_binding(
                &EXTRACT,
                vec![unit(TimeUnit::Month), column("ts")],
                &[DataType::symbol(), ts],
                |b| EXTRACT.return_type.infer(b).unwrap(),
            );
            assert_eq!(Some(DataType::integer().with_nullable(nullable)), declared);
            assert_eq!(declared, extracted);
        }
    }

    #[test]
    fn timestampdiff_microseconds_is_bigint() {
        let types = [DataType::symbol(), DataType::timestamp(0), DataType::timestamp(0)];
        let operands = vec![unit(TimeUnit::Microsecond), column("a"), column("b")];
        let ret = with_test_binding(&TIMESTAMPDIFF, operands, &types, |b| {
            TIMESTAMPDIFF.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::bigint()), ret);
    }

    #[test]
    fn timestampadd_hours_to_date() {
        let types = [DataType::symbol(), DataType::integer(), DataType::date()];
        let operands = vec![unit(TimeUnit::Hour), column("n"), column("d")];
        let ret = with_test_binding(&TIMESTAMPADD, operands, &types, |b| {
            TIMESTAMPADD.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::timestamp(0)), ret);
    }

    #[test]
    fn current_timestamp_precision() {
        let lit = |v| vec![Node::Literal(Literal::integer(v, ParserPos::new(1, 19)))];
        let types = [DataType::integer()];

        let ret = with_test_binding(&CURRENT_TIMESTAMP, lit(2), &types, |b| {
            assert!(CURRENT_TIMESTAMP.checker.check(b, true).unwrap());
            CURRENT_TIMESTAMP.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::timestamp(2)), ret);

        let err = with_test_binding(&CURRENT_TIMESTAMP, lit(7), &types, |b| {
            CURRENT_TIMESTAMP.return_type.infer(b).unwrap_err()
        });
        assert_eq!(polysql_error::ErrorKind::ArgumentMustBeValidPrecision, err.kind());

        let ret = with_test_binding(&CURRENT_TIME, Vec::new(), &[], |b| {
            CURRENT_TIME.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::time(0)), ret);
    }

    #[test]
    fn current_precision_must_be_literal() {
        let types = [DataType::integer()];
        let err = with_test_binding(&CURRENT_TIME, column_operands(1), &types, |b| {
            CURRENT_TIME.checker.check(b, true).unwrap_err()
        });
        assert_eq!(polysql_error::ErrorKind::ArgumentMustBeLiteral, err.kind());
    }
}
