use polysql_error::{ParserPos, Result, messages};

use crate::expr::{Call, Node};
use crate::functions::{OperatorKind, Syntax};
use crate::functions::binding::CallBinding;
use crate::functions::checker::{
    COMPARABLE_UNORDERED_COMPARABLE_UNORDERED,
    CustomChecker,
    OperandCountRange,
    OperandTypeChecker,
    SAME_VARIADIC,
    family_accepts,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{
    ARG0_FORCE_NULLABLE,
    LEAST_RESTRICTIVE_LEAST_NULLABLE,
    OperandTypeInference,
    ReturnTypeInference,
};
use crate::functions::operator::Operator;
use crate::types::{DataType, TypeFamily};
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[&CASE, &COALESCE, &NULLIF];

/// `CASE WHEN c1 THEN v1 ... ELSE e END`
///
/// Operands of the searched form are the WHEN/THEN pairs followed by the
/// ELSE value. The simple form `CASE x WHEN a THEN v ... END` carries the
/// tested value first and is rewritten into the searched form before it's
/// validated. A missing ELSE is an ELSE NULL.
pub static CASE: Operator = Operator::special("CASE", OperatorKind::Case, 200, true)
    .with_checker(OperandTypeChecker::Custom(&CustomChecker {
        check: check_case,
        range: OperandCountRange::from(3),
        allowed: "CASE WHEN <BOOLEAN> THEN <ANY> ... ELSE <ANY> END",
    }))
    .with_return_type(ReturnTypeInference::Custom(case_type))
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::Conditional)
    .with_rewrite(rewrite_simple_case)
    .with_unparse(unparse_case)
    .with_doc(&Documentation {
        category: Category::Conditional,
        description: "Return the value of the first branch whose condition holds.",
        arguments: &["condition", "value", "else"],
        example: Some(Example {
            example: "CASE WHEN 1 > 2 THEN 'a' ELSE 'b' END",
            output: "b",
        }),
    });

fn is_searched(operand_count: usize) -> bool {
    operand_count % 2 == 1
}

/// Indices of the value operands, THEN values and the ELSE value.
fn case_values(operand_count: usize) -> impl Iterator<Item = usize> {
    (1..operand_count.saturating_sub(1))
        .step_by(2)
        .chain([operand_count.saturating_sub(1)])
}

fn rewrite_simple_case(call: &Call) -> Option<Node> {
    if is_searched(call.operands.len()) {
        return None;
    }
    let (value, rest) = call.operands.split_first()?;
    let (else_value, arms) = rest.split_last()?;

    let mut operands = Vec::with_capacity(rest.len());
    for arm in arms.chunks(2) {
        let [when, then] = arm else {
            return None;
        };
        let pos = ParserPos::sum([value.pos(), when.pos()]);
        operands.push(Node::call(
            "=",
            Syntax::Binary,
            vec![value.clone(), when.clone()],
            pos,
        ));
        operands.push(then.clone());
    }
    operands.push(else_value.clone());

    Some(Node::Call(Call::new(call.name.clone(), call.syntax, operands, call.pos)))
}

fn check_case(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let count = binding.operand_count();
    if !is_searched(count) {
        if throw {
            return Err(binding.new_validation_signature_error());
        }
        return Ok(false);
    }

    for idx in (0..count - 1).step_by(2) {
        if !family_accepts(TypeFamily::Boolean, binding.operand_type(idx)?) {
            if throw {
                return Err(binding.new_validation_signature_error().with_pos(binding.operand_pos(idx)));
            }
            return Ok(false);
        }
    }

    let values = value_types(binding);
    let ok = values.iter().all(|t| t.is_null_type())
        || binding.type_system().least_restrictive(&values).is_some();
    if ok {
        return Ok(true);
    }
    if throw {
        return Err(binding.new_error(messages::incompatible_value_types("CASE")));
    }
    Ok(false)
}

fn value_types(binding: &CallBinding<'_>) -> Vec<DataType> {
    case_values(binding.operand_count())
        .filter_map(|idx| binding.operand_types.get(idx).cloned())
        .collect()
}

fn case_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let values = value_types(binding);
    let Some(datatype) = binding.type_system().least_restrictive(&values) else {
        return Ok(None);
    };
    // Only NULL branches, nothing to derive a type from.
    if datatype.is_null_type() {
        return Ok(None);
    }
    Ok(Some(datatype))
}

fn unparse_case(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let count = call.operands.len();
    w.keyword(op.name);
    let arms = if is_searched(count) {
        &call.operands[..count - 1]
    } else {
        match call.operands.split_first() {
            Some((value, _)) => {
                w.write_node(value, 0, 0);
                &call.operands[1..count.saturating_sub(1)]
            }
            None => &call.operands[..],
        }
    };
    for arm in arms.chunks(2) {
        if let [when, then] = arm {
            w.keyword("WHEN");
            w.write_node(when, 0, 0);
            w.keyword("THEN");
            w.write_node(then, 0, 0);
        }
    }
    if let Some(else_value) = call.operands.last().filter(|_| count > 0) {
        w.keyword("ELSE");
        w.write_node(else_value, 0, 0);
    }
    w.keyword("END");
}

pub static COALESCE: Operator = Operator::function("COALESCE", OperatorKind::Coalesce)
    .with_checker(SAME_VARIADIC)
    .with_return_type(LEAST_RESTRICTIVE_LEAST_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::Conditional)
    .with_doc(&Documentation {
        category: Category::Conditional,
        description: "Return the first non-NULL argument.",
        arguments: &["value", "..."],
        example: Some(Example {
            example: "COALESCE(NULL, 2, 3)",
            output: "2",
        }),
    });

pub static NULLIF: Operator = Operator::function("NULLIF", OperatorKind::Nullif)
    .with_checker(COMPARABLE_UNORDERED_COMPARABLE_UNORDERED)
    .with_return_type(ARG0_FORCE_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::Conditional)
    .with_doc(&Documentation {
        category: Category::Conditional,
        description: "Return NULL if both arguments are equal, otherwise the first argument.",
        arguments: &["a", "b"],
        example: None,
    });

#[cfg(test)]
mod tests {
    use polysql_error::ErrorKind;

    use super::*;
    use crate::expr::Literal;
    use crate::functions::binding::{column_operands, with_test_binding};

    #[test]
    fn simple_case_becomes_searched() {
        let pos = ParserPos::new(1, 1);
        let call = Call::new(
            "CASE",
            Syntax::Special,
            vec![
                Node::identifier("x", ParserPos::new(1, 6)),
                Node::Literal(Literal::integer(1, ParserPos::new(1, 13))),
                Node::Literal(Literal::string("one", ParserPos::new(1, 20))),
                Node::Literal(Literal::null(ParserPos::ZERO)),
            ],
            pos,
        );
        let rewritten = rewrite_simple_case(&call).unwrap();
        let rewritten = rewritten.as_call().unwrap();
        assert_eq!(3, rewritten.operands.len());
        let cond = rewritten.operands[0].as_call().unwrap();
        assert!(cond.is_named("="));
        assert_eq!(ParserPos::with_end(1, 6, 1, 13), cond.pos);
        assert_eq!(pos, rewritten.pos);

        // Searched form is left alone.
        assert!(rewrite_simple_case(rewritten).is_none());
    }

    #[test]
    fn case_value_types_unify() {
        let types = [
            DataType::boolean(),
            DataType::integer(),
            DataType::boolean(),
            DataType::decimal(5, 2),
            DataType::null(),
        ];
        let ret = with_test_binding(&CASE, column_operands(5), &types, |b| {
            assert!(CASE.checker.check(b, true).unwrap());
            CASE.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::decimal(12, 2).with_nullable(true)), ret);
    }

    #[test]
    fn case_incompatible_values() {
        let types = [DataType::boolean(), DataType::integer(), DataType::boolean()];
        let err = with_test_binding(&CASE, column_operands(3), &types, |b| {
            CASE.checker.check(b, true).unwrap_err()
        });
        assert_eq!(ErrorKind::IncompatibleValueTypes, err.kind());
    }

    #[test]
    fn case_condition_must_be_boolean() {
        let types = [DataType::integer(), DataType::integer(), DataType::integer()];
        with_test_binding(&CASE, column_operands(3), &types, |b| {
            assert!(!CASE.checker.check(b, false).unwrap());
        });
    }

    #[test]
    fn coalesce_not_null_if_any_not_null() {
        let types = [DataType::integer().with_nullable(true), DataType::bigint()];
        let ret = with_test_binding(&COALESCE, column_operands(2), &types, |b| {
            COALESCE.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::bigint()), ret);
    }

    #[test]
    fn nullif_always_nullable() {
        let types = [DataType::varchar(Some(3)), DataType::varchar(Some(3))];
        let ret = with_test_binding(&NULLIF, column_operands(2), &types, |b| {
            NULLIF.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::varchar(Some(3)).with_nullable(true)), ret);
    }
}
