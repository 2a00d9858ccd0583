use crate::expr::{Call, Monotonicity};
use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::{
    EXACT_NUMERIC_EXACT_NUMERIC,
    INTEGER,
    NILADIC,
    NUMERIC,
    NUMERIC_NUMERIC,
    NUMERIC_OPTIONAL_INTEGER,
    NUMERIC_OR_INTERVAL,
    OperandTypeChecker,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{
    ARG0,
    ARG0_NULLABLE,
    ARG0_OR_EXACT_NO_SCALE_NULLABLE,
    DOUBLE,
    DOUBLE_NULLABLE,
    INTEGER as INTEGER_TYPE,
    NULLABLE_MOD,
    OperandTypeInference,
    ReturnTypeInference,
};
use crate::functions::operator::Operator;
use crate::types::TypeFamily;
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[
    &ABS,
    &SQRT,
    &EXP,
    &LN,
    &LOG10,
    &POWER,
    &MOD,
    &SIGN,
    &ROUND,
    &TRUNCATE,
    &FLOOR,
    &CEIL,
    &CEILING,
    &PI,
    &RAND,
    &RAND_INTEGER,
    &SIN,
    &COS,
    &TAN,
    &COT,
    &ASIN,
    &ACOS,
    &ATAN,
    &ATAN2,
    &DEGREES,
    &RADIANS,
];

const fn math(name: &'static str, checker: OperandTypeChecker, ret: ReturnTypeInference) -> Operator {
    Operator::function(name, OperatorKind::OtherFunction)
        .with_checker(checker)
        .with_return_type(ret)
        .with_operand_inference(OperandTypeInference::FirstKnown)
        .with_category(Category::Numeric)
}

/// Double valued function of a single number.
const fn unary_double(name: &'static str) -> Operator {
    math(name, NUMERIC, DOUBLE_NULLABLE)
}

pub static ABS: Operator = math("ABS", NUMERIC_OR_INTERVAL, ARG0).with_doc(&Documentation {
    category: Category::Numeric,
    description: "Compute the absolute value of a number or interval.",
    arguments: &["value"],
    example: Some(Example {
        example: "abs(-5.7)",
        output: "5.7",
    }),
});

pub static SQRT: Operator = unary_double("SQRT").with_doc(&Documentation {
    category: Category::Numeric,
    description: "Compute the square root of a number.",
    arguments: &["value"],
    example: Some(Example {
        example: "sqrt(9)",
        output: "3.0",
    }),
});

pub static EXP: Operator = unary_double("EXP");
pub static LN: Operator = unary_double("LN");
pub static LOG10: Operator = unary_double("LOG10");

pub static POWER: Operator = math("POWER", NUMERIC_NUMERIC, DOUBLE_NULLABLE).with_doc(&Documentation {
    category: Category::Numeric,
    description: "Raise the first number to the power of the second.",
    arguments: &["base", "exponent"],
    example: Some(Example {
        example: "power(2, 10)",
        output: "1024.0",
    }),
});

pub static MOD: Operator = Operator::function("MOD", OperatorKind::Mod)
    .with_checker(EXACT_NUMERIC_EXACT_NUMERIC)
    .with_return_type(NULLABLE_MOD)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::Numeric);

pub static SIGN: Operator = math("SIGN", NUMERIC, ARG0);

pub static ROUND: Operator = math("ROUND", NUMERIC_OPTIONAL_INTEGER, ARG0_NULLABLE).with_doc(&Documentation {
    category: Category::Numeric,
    description: "Round a number to the given number of decimal places, zero if omitted.",
    arguments: &["value", "places"],
    example: Some(Example {
        example: "round(3.14159, 2)",
        output: "3.14",
    }),
});

pub static TRUNCATE: Operator = math("TRUNCATE", NUMERIC_OPTIONAL_INTEGER, ARG0_NULLABLE);

/// FLOOR and CEIL on numbers, intervals, and `datetime TO unit`.
const FLOOR_CEIL_OPERANDS: OperandTypeChecker = OperandTypeChecker::Or(&[
    NUMERIC_OR_INTERVAL,
    OperandTypeChecker::family(&[TypeFamily::Datetime, TypeFamily::Symbol]),
]);

const fn floor_ceil(name: &'static str, kind: OperatorKind) -> Operator {
    Operator::function(name, kind)
        .with_checker(FLOOR_CEIL_OPERANDS)
        .with_return_type(ARG0_OR_EXACT_NO_SCALE_NULLABLE)
        .with_operand_inference(OperandTypeInference::FirstKnown)
        .with_category(Category::Numeric)
        .with_unparse(unparse_floor_ceil)
        .with_monotonicity(unstrict_first)
}

pub static FLOOR: Operator = floor_ceil("FLOOR", OperatorKind::Floor).with_doc(&Documentation {
    category: Category::Numeric,
    description: "Round down to the nearest integer, or truncate a datetime to a unit.",
    arguments: &["value"],
    example: Some(Example {
        example: "floor(-1.5)",
        output: "-2",
    }),
});
pub static CEIL: Operator = floor_ceil("CEIL", OperatorKind::Ceil);
pub static CEILING: Operator = floor_ceil("CEILING", OperatorKind::Ceil);

fn unparse_floor_ceil(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let [value, unit] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    w.open_call(op.name);
    w.write_node(value, 0, 0);
    w.keyword("TO");
    w.write_node(unit, 0, 0);
    w.close_paren();
}

fn unstrict_first(_: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    operands
        .first()
        .map(|m| m.unstrict())
        .unwrap_or(Monotonicity::NotMonotonic)
}

pub static PI: Operator = Operator::function_id("PI", OperatorKind::OtherFunction)
    .with_checker(NILADIC)
    .with_return_type(DOUBLE)
    .with_category(Category::Numeric);

pub static RAND: Operator = Operator::function("RAND", OperatorKind::OtherFunction)
    .with_checker(OperandTypeChecker::Or(&[NILADIC, INTEGER]))
    .with_return_type(DOUBLE)
    .with_category(Category::Numeric)
    .dynamic()
    .non_deterministic()
    .with_doc(&Documentation {
        category: Category::Numeric,
        description: "Random number between 0 and 1, optionally seeded.",
        arguments: &["seed"],
        example: None,
    });

pub static RAND_INTEGER: Operator = Operator::function("RAND_INTEGER", OperatorKind::OtherFunction)
    .with_checker(OperandTypeChecker::Or(&[
        INTEGER,
        OperandTypeChecker::family(&[TypeFamily::Integer, TypeFamily::Integer]),
    ]))
    .with_return_type(INTEGER_TYPE)
    .with_category(Category::Numeric)
    .dynamic()
    .non_deterministic();

pub static SIN: Operator = unary_double("SIN");
pub static COS: Operator = unary_double("COS");
pub static TAN: Operator = unary_double("TAN");
pub static COT: Operator = unary_double("COT");
pub static ASIN: Operator = unary_double("ASIN");
pub static ACOS: Operator = unary_double("ACOS");
pub static ATAN: Operator = unary_double("ATAN");
pub static ATAN2: Operator = math("ATAN2", NUMERIC_NUMERIC, DOUBLE_NULLABLE);
pub static DEGREES: Operator = unary_double("DEGREES");
pub static RADIANS: Operator = unary_double("RADIANS");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::binding::{column_operands, with_test_binding};
    use crate::types::DataType;

    fn ret(op: &'static Operator, types: &[DataType]) -> Option<DataType> {
        with_test_binding(op, column_operands(types.len()), types, |b| {
            assert!(op.checker.check(b, true).unwrap());
            op.return_type.infer(b).unwrap()
        })
    }

    #[test]
    fn floor_drops_decimal_scale() {
        assert_eq!(
            Some(DataType::decimal(7, 0).with_nullable(true)),
            ret(&FLOOR, &[DataType::decimal(7, 2).with_nullable(true)])
        );
        assert_eq!(Some(DataType::double()), ret(&CEIL, &[DataType::double()]));
    }

    #[test]
    fn floor_datetime_to_unit() {
        assert_eq!(
            Some(DataType::timestamp(0)),
            ret(&FLOOR, &[DataType::timestamp(0), DataType::symbol()])
        );
    }

    #[test]
    fn power_is_double() {
        assert_eq!(
            Some(DataType::double().with_nullable(true)),
            ret(&POWER, &[DataType::integer(), DataType::decimal(5, 2).with_nullable(true)])
        );
    }

    #[test]
    fn mod_of_integers() {
        assert_eq!(Some(DataType::bigint()), ret(&MOD, &[DataType::integer(), DataType::bigint()]));
    }

    #[test]
    fn rand_is_dynamic() {
        assert!(RAND.flags.dynamic);
        assert!(!RAND.flags.deterministic);
        assert_eq!(Some(DataType::double()), ret(&RAND, &[]));
    }
}
