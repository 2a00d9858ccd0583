use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::{ANY, BOOLEAN, BOOLEAN_BOOLEAN};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{BOOLEAN_NOT_NULL, BOOLEAN_NULLABLE, OperandTypeInference};
use crate::functions::operator::Operator;
use crate::expr::Monotonicity;

pub static OPERATORS: &[&Operator] = &[
    &AND,
    &OR,
    &NOT,
    &IS_NULL,
    &IS_NOT_NULL,
    &IS_TRUE,
    &IS_NOT_TRUE,
    &IS_FALSE,
    &IS_NOT_FALSE,
    &IS_UNKNOWN,
    &IS_NOT_UNKNOWN,
    &EXISTS,
];

pub static AND: Operator = Operator::binary("AND", OperatorKind::And, 24, true)
    .with_checker(BOOLEAN_BOOLEAN)
    .with_return_type(BOOLEAN_NULLABLE)
    .with_operand_inference(OperandTypeInference::Boolean)
    .with_category(Category::LOGICAL_OPERATOR)
    .with_doc(&Documentation {
        category: Category::LOGICAL_OPERATOR,
        description: "Boolean AND, unknown if either side is unknown and the other isn't false.",
        arguments: &["a", "b"],
        example: Some(Example {
            example: "TRUE AND NULL",
            output: "NULL",
        }),
    });

pub static OR: Operator = Operator::binary("OR", OperatorKind::Or, 22, true)
    .with_checker(BOOLEAN_BOOLEAN)
    .with_return_type(BOOLEAN_NULLABLE)
    .with_operand_inference(OperandTypeInference::Boolean)
    .with_category(Category::LOGICAL_OPERATOR)
    .with_doc(&Documentation {
        category: Category::LOGICAL_OPERATOR,
        description: "Boolean OR, unknown if either side is unknown and the other isn't true.",
        arguments: &["a", "b"],
        example: Some(Example {
            example: "FALSE OR NULL",
            output: "NULL",
        }),
    });

pub static NOT: Operator = Operator::prefix("NOT", OperatorKind::Not, 26)
    .with_checker(BOOLEAN)
    .with_return_type(BOOLEAN_NULLABLE)
    .with_operand_inference(OperandTypeInference::Boolean)
    .with_category(Category::LOGICAL_OPERATOR)
    .with_monotonicity(reversed)
    .with_doc(&Documentation {
        category: Category::LOGICAL_OPERATOR,
        description: "Boolean negation.",
        arguments: &["a"],
        example: None,
    });

fn reversed(_: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    operands
        .first()
        .map(|m| m.reverse())
        .unwrap_or(Monotonicity::NotMonotonic)
}

/// `IS [NOT] NULL` accepts anything, `IS [NOT] TRUE` and friends only
/// booleans. All of them are never null.
const fn is_test(
    name: &'static str,
    kind: OperatorKind,
    boolean_operand: bool,
) -> Operator {
    let op = Operator::postfix(name, kind, 28)
        .with_return_type(BOOLEAN_NOT_NULL)
        .with_category(Category::LOGICAL_OPERATOR);
    if boolean_operand {
        op.with_checker(BOOLEAN)
            .with_operand_inference(OperandTypeInference::Boolean)
    } else {
        op.with_checker(ANY)
    }
}

pub static IS_NULL: Operator = is_test("IS NULL", OperatorKind::IsNull, false);
pub static IS_NOT_NULL: Operator = is_test("IS NOT NULL", OperatorKind::IsNotNull, false);
pub static IS_TRUE: Operator = is_test("IS TRUE", OperatorKind::IsTrue, true);
pub static IS_NOT_TRUE: Operator = is_test("IS NOT TRUE", OperatorKind::IsNotTrue, true);
pub static IS_FALSE: Operator = is_test("IS FALSE", OperatorKind::IsFalse, true);
pub static IS_NOT_FALSE: Operator = is_test("IS NOT FALSE", OperatorKind::IsNotFalse, true);
pub static IS_UNKNOWN: Operator = is_test("IS UNKNOWN", OperatorKind::IsUnknown, true);
pub static IS_NOT_UNKNOWN: Operator =
    is_test("IS NOT UNKNOWN", OperatorKind::IsNotUnknown, true);

pub static EXISTS: Operator = Operator::prefix("EXISTS", OperatorKind::Exists, 40)
    .with_checker(ANY)
    .with_return_type(BOOLEAN_NOT_NULL)
    .with_category(Category::LOGICAL_OPERATOR);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::binding::{column_operands, with_test_binding};
    use crate::types::DataType;

    #[test]
    fn and_is_nullable_when_an_operand_is() {
        let types = [DataType::boolean(), DataType::boolean().with_nullable(true)];
        let ret = with_test_binding(&AND, column_operands(2), &types, |b| {
            AND.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::boolean().with_nullable(true)), ret);
    }

    #[test]
    fn is_null_never_null() {
        let types = [DataType::integer().with_nullable(true)];
        let ret = with_test_binding(&IS_NULL, column_operands(1), &types, |b| {
            assert!(IS_NULL.checker.check(b, true).unwrap());
            IS_NULL.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::boolean()), ret);
    }

    #[test]
    fn is_true_requires_boolean() {
        let types = [DataType::integer()];
        with_test_binding(&IS_TRUE, column_operands(1), &types, |b| {
            assert!(!IS_TRUE.checker.check(b, false).unwrap());
        });
    }
}
