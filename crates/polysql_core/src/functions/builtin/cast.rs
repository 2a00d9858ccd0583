use polysql_error::{Result, messages};

use crate::expr::{Call, Monotonicity, Node};
use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::{CustomChecker, OperandCountRange, OperandTypeChecker};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{OperandTypeInference, ReturnTypeInference};
use crate::functions::operator::Operator;
use crate::types::{DataType, TypeFamily, TypeName, can_convert};
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[&CAST];

/// `CAST(value AS type)`, the second operand is a type spec.
pub static CAST: Operator = Operator::special("CAST", OperatorKind::Cast, 100, true)
    .with_checker(OperandTypeChecker::Custom(&CustomChecker {
        check: check_cast,
        range: OperandCountRange::exact(2),
        allowed: "$OP(<ANY> AS <TYPE>)",
    }))
    .with_return_type(ReturnTypeInference::Custom(cast_type))
    .with_operand_inference(OperandTypeInference::FromOperand(1))
    .with_category(Category::Conditional)
    .with_unparse(unparse_cast)
    .with_monotonicity(cast_monotonicity)
    .with_doc(&Documentation {
        category: Category::Conditional,
        description: "Convert a value to a different type.",
        arguments: &["value", "type"],
        example: Some(Example {
            example: "CAST('42' AS INTEGER)",
            output: "42",
        }),
    });

fn check_cast(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let from = binding.operand_type(0)?;
    let Some(to) = binding.operand_type_spec(1) else {
        if throw {
            return Err(binding.new_validation_signature_error());
        }
        return Ok(false);
    };
    if from.is_null_type() || from.name() == TypeName::Any || can_convert(to, from, true) {
        return Ok(true);
    }
    if throw {
        return Err(binding.new_error(messages::cannot_cast_value(
            &from.full_type_string(),
            &to.full_type_string(),
        )));
    }
    Ok(false)
}

/// The target type, nullable if the value is.
fn cast_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let nullable = binding.operand_type(0)?.is_nullable();
    Ok(binding
        .operand_type_spec(1)
        .map(|to| to.clone().with_nullable(nullable)))
}

fn unparse_cast(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let [value, Node::TypeSpec(spec)] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    w.open_call(op.name);
    w.write_node(value, 0, 0);
    w.keyword("AS");
    w.keyword(&spec.datatype.to_string());
    w.close_paren();
}

/// Casting within a family keeps the order, e.g. INTEGER to BIGINT or DATE
/// to TIMESTAMP.
fn cast_monotonicity(binding: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    let Some(m) = operands.first().copied() else {
        return Monotonicity::NotMonotonic;
    };
    if m.is_constant() {
        return m;
    }
    let (Ok(from), Some(to)) = (binding.operand_type(0), binding.operand_type_spec(1)) else {
        return Monotonicity::NotMonotonic;
    };
    let order_preserving = from.family() == to.family()
        || (TypeFamily::Datetime.contains(from.name()) && TypeFamily::Datetime.contains(to.name()));
    if order_preserving && from.family() != TypeFamily::Character {
        m
    } else {
        Monotonicity::NotMonotonic
    }
}

#[cfg(test)]
mod tests {
    use polysql_error::ParserPos;

    use super::*;
    use crate::functions::binding::with_test_binding;

    fn operands(to: DataType) -> Vec<Node> {
        vec![
            Node::identifier("x", ParserPos::new(1, 6)),
            Node::type_spec(to, ParserPos::new(1, 11)),
        ]
    }

    #[test]
    fn cast_keeps_nullability() {
        let to = DataType::bigint();
        let types = [DataType::integer().with_nullable(true), to.clone()];
        let ret = with_test_binding(&CAST, operands(to), &types, |b| {
            assert!(CAST.checker.check(b, true).unwrap());
            CAST.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::bigint().with_nullable(true)), ret);
    }

    #[test]
    fn cast_boolean_to_date_fails() {
        let to = DataType::date();
        let types = [DataType::boolean(), to.clone()];
        let err = with_test_binding(&CAST, operands(to), &types, |b| {
            CAST.checker.check(b, true).unwrap_err()
        });
        assert_eq!(polysql_error::ErrorKind::CannotCastValue, err.kind());
        assert!(!err.kind().is_overload_retryable());
    }

    #[test]
    fn widening_cast_is_monotonic() {
        let to = DataType::bigint();
        let types = [DataType::integer(), to.clone()];
        let m = with_test_binding(&CAST, operands(to), &types, |b| {
            cast_monotonicity(b, &[Monotonicity::Increasing, Monotonicity::Constant])
        });
        assert_eq!(Monotonicity::Increasing, m);

        let to = DataType::varchar(None);
        let types = [DataType::integer(), to.clone()];
        let m = with_test_binding(&CAST, operands(to), &types, |b| {
            cast_monotonicity(b, &[Monotonicity::Increasing, Monotonicity::Constant])
        });
        assert_eq!(Monotonicity::NotMonotonic, m);
    }
}
