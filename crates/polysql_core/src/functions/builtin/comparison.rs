use polysql_error::{ParserPos, Result, messages};

use crate::expr::{Call, Node};
use crate::functions::{OperatorKind, Syntax};
use crate::functions::checker::{
    COMPARABLE_ORDERED_3,
    COMPARABLE_ORDERED_COMPARABLE_ORDERED,
    COMPARABLE_UNORDERED_COMPARABLE_UNORDERED,
    OperandCountRange,
    OperandTypeChecker,
    STRING_SAME_SAME,
    STRING_SAME_SAME_SAME,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{BOOLEAN_NOT_NULL, BOOLEAN_NULLABLE, OperandTypeInference};
use crate::functions::operator::Operator;
use crate::reduce::{Reducer, Token};
use crate::types::Comparability;
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[
    &EQUALS,
    &NOT_EQUALS,
    &LESS_THAN,
    &LESS_THAN_OR_EQUAL,
    &GREATER_THAN,
    &GREATER_THAN_OR_EQUAL,
    &IS_DISTINCT_FROM,
    &IS_NOT_DISTINCT_FROM,
    &BETWEEN,
    &NOT_BETWEEN,
    &SYMMETRIC_BETWEEN,
    &SYMMETRIC_NOT_BETWEEN,
    &LIKE,
    &NOT_LIKE,
    &SIMILAR_TO,
    &NOT_SIMILAR_TO,
    &IN,
    &NOT_IN,
];

const fn comparison(
    name: &'static str,
    kind: OperatorKind,
    checker: OperandTypeChecker,
    doc: &'static Documentation,
) -> Operator {
    Operator::binary(name, kind, 30, true)
        .with_checker(checker)
        .with_return_type(BOOLEAN_NULLABLE)
        .with_operand_inference(OperandTypeInference::FirstKnown)
        .with_category(Category::COMPARISON_OPERATOR)
        .with_doc(doc)
}

pub static EQUALS: Operator = comparison(
    "=",
    OperatorKind::Equals,
    COMPARABLE_UNORDERED_COMPARABLE_UNORDERED,
    &Documentation {
        category: Category::COMPARISON_OPERATOR,
        description: "Check if two values are equal.",
        arguments: &["a", "b"],
        example: Some(Example {
            example: "1 = 1",
            output: "TRUE",
        }),
    },
);

pub static NOT_EQUALS: Operator = comparison(
    "<>",
    OperatorKind::NotEquals,
    COMPARABLE_UNORDERED_COMPARABLE_UNORDERED,
    &Documentation {
        category: Category::COMPARISON_OPERATOR,
        description: "Check if two values are not equal.",
        arguments: &["a", "b"],
        example: None,
    },
);

pub static LESS_THAN: Operator = comparison(
    "<",
    OperatorKind::LessThan,
    COMPARABLE_ORDERED_COMPARABLE_ORDERED,
    &Documentation {
        category: Category::COMPARISON_OPERATOR,
        description: "Check if the left value is less than the right.",
        arguments: &["a", "b"],
        example: None,
    },
);

pub static LESS_THAN_OR_EQUAL: Operator = comparison(
    "<=",
    OperatorKind::LessThanOrEqual,
    COMPARABLE_ORDERED_COMPARABLE_ORDERED,
    &Documentation {
        category: Category::COMPARISON_OPERATOR,
        description: "Check if the left value is less than or equal to the right.",
        arguments: &["a", "b"],
        example: None,
    },
);

pub static GREATER_THAN: Operator = comparison(
    ">",
    OperatorKind::GreaterThan,
    COMPARABLE_ORDERED_COMPARABLE_ORDERED,
    &Documentation {
        category: Category::COMPARISON_OPERATOR,
        description: "Check if the left value is greater than the right.",
        arguments: &["a", "b"],
        example: None,
    },
);

pub static GREATER_THAN_OR_EQUAL: Operator = comparison(
    ">=",
    OperatorKind::GreaterThanOrEqual,
    COMPARABLE_ORDERED_COMPARABLE_ORDERED,
    &Documentation {
        category: Category::COMPARISON_OPERATOR,
        description: "Check if the left value is greater than or equal to the right.",
        arguments: &["a", "b"],
        example: None,
    },
);

pub static IS_DISTINCT_FROM: Operator = Operator::binary(
    "IS DISTINCT FROM",
    OperatorKind::IsDistinctFrom,
    30,
    true,
)
.with_checker(COMPARABLE_UNORDERED_COMPARABLE_UNORDERED)
.with_return_type(BOOLEAN_NOT_NULL)
.with_operand_inference(OperandTypeInference::FirstKnown)
.with_category(Category::COMPARISON_OPERATOR)
.with_doc(&Documentation {
    category: Category::COMPARISON_OPERATOR,
    description: "Check if two values are not equal, treating NULLs as equal to each other.",
    arguments: &["a", "b"],
    example: Some(Example {
        example: "NULL IS DISTINCT FROM 1",
        output: "TRUE",
    }),
});

pub static IS_NOT_DISTINCT_FROM: Operator = Operator::binary(
    "IS NOT DISTINCT FROM",
    OperatorKind::IsNotDistinctFrom,
    30,
    true,
)
.with_checker(COMPARABLE_UNORDERED_COMPARABLE_UNORDERED)
.with_return_type(BOOLEAN_NOT_NULL)
.with_operand_inference(OperandTypeInference::FirstKnown)
.with_category(Category::COMPARISON_OPERATOR);

const fn between(name: &'static str) -> Operator {
    Operator::special(name, OperatorKind::Between, 32, true)
        .with_checker(COMPARABLE_ORDERED_3)
        .with_return_type(BOOLEAN_NULLABLE)
        .with_operand_inference(OperandTypeInference::FirstKnown)
        .with_category(Category::COMPARISON_OPERATOR)
        .with_reduce(reduce_between)
        .with_unparse(unparse_between)
}

pub static BETWEEN: Operator = between("BETWEEN").with_doc(&Documentation {
    category: Category::COMPARISON_OPERATOR,
    description: "Check if a value is within a range, bounds included.",
    arguments: &["value", "lower", "upper"],
    example: Some(Example {
        example: "4 BETWEEN 1 AND 5",
        output: "TRUE",
    }),
});
pub static NOT_BETWEEN: Operator = between("NOT BETWEEN");
pub static SYMMETRIC_BETWEEN: Operator = between("BETWEEN SYMMETRIC");
pub static SYMMETRIC_NOT_BETWEEN: Operator = between("NOT BETWEEN SYMMETRIC");

fn is_between_op(name: &str) -> bool {
    matches!(
        name.to_ascii_uppercase().as_str(),
        "BETWEEN" | "NOT BETWEEN" | "BETWEEN SYMMETRIC" | "NOT BETWEEN SYMMETRIC"
    )
}

/// `value BETWEEN lower AND upper`
///
/// The lower bound runs up to the first AND not claimed by a nested BETWEEN,
/// so `a BETWEEN b OR c AND d` has `b OR c` as its lower bound.
fn reduce_between(
    reducer: &mut Reducer<'_>,
    value: Node,
    op: &'static Operator,
    pos: ParserPos,
) -> Result<Node> {
    let mut depth = 0usize;
    let mut and_offset = None;
    for (offset, token) in reducer.remaining().iter().enumerate() {
        let Token::Op { name, .. } = token else {
            continue;
        };
        if is_between_op(name) {
            depth += 1;
        } else if name.eq_ignore_ascii_case("AND") {
            if depth == 0 {
                and_offset = Some(offset);
                break;
            }
            depth -= 1;
        }
    }

    let Some(and_offset) = and_offset else {
        return Err(messages::between_without_and().with_pos(pos));
    };
    if and_offset == 0 {
        return Err(messages::malformed_expression("missing lower bound for BETWEEN").with_pos(pos));
    }

    let lower = reducer.reduce_span(and_offset)?;
    reducer.skip(1);
    let upper = reducer.parse_subexpr(op.right_prec)?;

    let pos = ParserPos::sum([value.pos(), pos, lower.pos(), upper.pos()]);
    Ok(Call::new(op.name, op.syntax, vec![value, lower, upper], pos).into())
}

fn unparse_between(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, left: u32, right: u32) {
    let [value, lower, upper] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };

    w.write_node(value, left, op.left_prec);
    w.keyword(op.name);

    // An AND in the lower bound would be taken as the end of the bound when
    // the text is read again.
    let has_and = lower.contains(&|n| n.as_call().is_some_and(|c| c.is_named("AND")));
    let lower_right = if has_and { 100 } else { 0 };
    w.write_node(lower, 0, lower_right);

    w.keyword("AND");
    w.write_node(upper, op.right_prec, right);
}

const fn pattern(name: &'static str, kind: OperatorKind) -> Operator {
    Operator::special(name, kind, 32, false)
        .with_checker(OperandTypeChecker::Or(&[STRING_SAME_SAME, STRING_SAME_SAME_SAME]))
        .with_return_type(BOOLEAN_NULLABLE)
        .with_operand_inference(OperandTypeInference::FirstKnown)
        .with_category(Category::STRING_OPERATOR)
        .with_reduce(reduce_pattern)
        .with_unparse(unparse_pattern)
}

pub static LIKE: Operator = pattern("LIKE", OperatorKind::Like).with_doc(&Documentation {
    category: Category::STRING_OPERATOR,
    description: "Check if a string matches a pattern, with an optional escape character.",
    arguments: &["string", "pattern", "escape"],
    example: Some(Example {
        example: "'abc' LIKE 'a%'",
        output: "TRUE",
    }),
});
pub static NOT_LIKE: Operator = pattern("NOT LIKE", OperatorKind::Like);
pub static SIMILAR_TO: Operator = pattern("SIMILAR TO", OperatorKind::Similar);
pub static NOT_SIMILAR_TO: Operator = pattern("NOT SIMILAR TO", OperatorKind::Similar);

/// `string LIKE pattern [ESCAPE escape]`
fn reduce_pattern(
    reducer: &mut Reducer<'_>,
    string: Node,
    op: &'static Operator,
    pos: ParserPos,
) -> Result<Node> {
    let pattern = reducer.parse_subexpr(op.right_prec)?;
    let mut operands = vec![string, pattern];
    if reducer.next_is_op("ESCAPE") {
        reducer.skip(1);
        operands.push(reducer.parse_subexpr(op.right_prec)?);
    }
    let pos = ParserPos::sum(operands.iter().map(|n| n.pos()).chain([pos]));
    Ok(Call::new(op.name, op.syntax, operands, pos).into())
}

fn unparse_pattern(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, left: u32, right: u32) {
    match call.operands.as_slice() {
        [string, pattern] => {
            w.write_node(string, left, op.left_prec);
            w.keyword(op.name);
            w.write_node(pattern, op.right_prec, right);
        }
        [string, pattern, escape] => {
            w.write_node(string, left, op.left_prec);
            w.keyword(op.name);
            w.write_node(pattern, op.right_prec, op.right_prec);
            w.keyword("ESCAPE");
            w.write_node(escape, op.right_prec, right);
        }
        _ => w.write_function(op.name, call),
    }
}

/// The value and every list element must be comparable.
const IN_LIST: OperandTypeChecker = OperandTypeChecker::Comparable {
    range: OperandCountRange::from(2),
    comparability: Comparability::Unordered,
};

pub static IN: Operator = Operator::special("IN", OperatorKind::In, 32, true)
    .with_checker(IN_LIST)
    .with_return_type(BOOLEAN_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::COMPARISON_OPERATOR)
    .with_reduce(reduce_in)
    .with_unparse(unparse_in)
    .with_doc(&Documentation {
        category: Category::COMPARISON_OPERATOR,
        description: "Check if a value is equal to any value in a list.",
        arguments: &["value", "list"],
        example: Some(Example {
            example: "2 IN (1, 2, 3)",
            output: "TRUE",
        }),
    });

pub static NOT_IN: Operator = Operator::special("NOT IN", OperatorKind::NotIn, 32, true)
    .with_checker(IN_LIST)
    .with_return_type(BOOLEAN_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::COMPARISON_OPERATOR)
    .with_reduce(reduce_in)
    .with_unparse(unparse_in);

/// `value IN (a, b, ...)`, the list arrives as a single ROW operand.
fn reduce_in(
    reducer: &mut Reducer<'_>,
    value: Node,
    op: &'static Operator,
    pos: ParserPos,
) -> Result<Node> {
    let list = reducer.parse_subexpr(op.right_prec)?;
    let mut operands = vec![value];
    match list {
        Node::Call(call) if call.is_named("ROW") && call.syntax.class() == Syntax::Special => {
            operands.extend(call.operands)
        }
        other => operands.push(other),
    }
    let pos = ParserPos::sum(operands.iter().map(|n| n.pos()).chain([pos]));
    Ok(Call::new(op.name, op.syntax, operands, pos).into())
}

fn unparse_in(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, left: u32, _right: u32) {
    let Some((value, list)) = call.operands.split_first() else {
        w.write_function(op.name, call);
        return;
    };
    w.write_node(value, left, op.left_prec);
    w.keyword(op.name);
    w.open_paren();
    w.write_list(list);
    w.close_paren();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::binding::{column_operands, with_test_binding};
    use crate::types::{DataType, TypeName};

    #[test]
    fn compare_string_with_number() {
        let types = [DataType::varchar(Some(10)), DataType::integer()];
        with_test_binding(&EQUALS, column_operands(2), &types, |b| {
            assert!(EQUALS.checker.check(b, true).unwrap());
        });
    }

    #[test]
    fn compare_boolean_with_integer_fails() {
        let types = [DataType::boolean(), DataType::integer()];
        let err = with_test_binding(&LESS_THAN, column_operands(2), &types, |b| {
            LESS_THAN.checker.check(b, true).unwrap_err()
        });
        assert_eq!(polysql_error::ErrorKind::TypeNotComparable, err.kind());
    }

    #[test]
    fn ordering_requires_total_order() {
        let multiset = DataType::multiset(DataType::integer());
        let types = [multiset.clone(), multiset];
        with_test_binding(&EQUALS, column_operands(2), &types, |b| {
            assert!(EQUALS.checker.check(b, false).unwrap());
        });
        with_test_binding(&GREATER_THAN, column_operands(2), &types, |b| {
            assert!(!GREATER_THAN.checker.check(b, false).unwrap());
        });
    }

    #[test]
    fn distinct_from_never_null() {
        let types = [
            DataType::integer().with_nullable(true),
            DataType::integer().with_nullable(true),
        ];
        let ret = with_test_binding(&IS_DISTINCT_FROM, column_operands(2), &types, |b| {
            IS_DISTINCT_FROM.return_type.infer(b).unwrap()
        });
        assert_eq!(Some(DataType::boolean()), ret);
    }

    #[test]
    fn like_with_escape() {
        let types = [DataType::varchar(None), DataType::char(3), DataType::char(1)];
        with_test_binding(&LIKE, column_operands(3), &types, |b| {
            assert!(LIKE.checker.check(b, true).unwrap());
        });
        let types = [DataType::varchar(None), DataType::integer()];
        with_test_binding(&LIKE, column_operands(2), &types, |b| {
            assert!(!LIKE.checker.check(b, false).unwrap());
        });
    }

    #[test]
    fn in_list_types() {
        let types = [DataType::integer(), DataType::bigint(), DataType::decimal(5, 2)];
        with_test_binding(&IN, column_operands(3), &types, |b| {
            assert!(IN.checker.check(b, true).unwrap());
            assert_eq!(TypeName::Boolean, IN.return_type.infer(b).unwrap().unwrap().name());
        });
    }
}
