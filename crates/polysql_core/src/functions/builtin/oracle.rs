//! Oracle compatible functions, resolved only when enabled in the config.
use polysql_error::Result;

use crate::expr::{Call, Node};
use crate::functions::binding::CallBinding;
use crate::functions::checker::{
    OperandTypeChecker,
    SAME_SAME,
    SAME_VARIADIC,
    STRING,
    STRING_INTEGER,
    STRING_INTEGER_INTEGER,
    STRING_STRING_STRING,
    VARIADIC,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{
    ARG0_NULLABLE_VARYING,
    LEAST_RESTRICTIVE,
    LEAST_RESTRICTIVE_NULLABLE,
    OperandTypeInference,
    ReturnTypeInference,
    TypeTransform,
};
use crate::functions::operator::Operator;
use crate::functions::{OperatorKind, Syntax};
use crate::types::DataType;
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[
    &DECODE,
    &NVL,
    &LTRIM,
    &RTRIM,
    &SUBSTR,
    &GREATEST,
    &LEAST,
    &TRANSLATE3,
    &TRANSLATE,
];

/// `DECODE(value, search1, result1 [, search2, result2 ...] [, default])`
pub static DECODE: Operator = Operator::function("DECODE", OperatorKind::Decode)
    .with_checker(VARIADIC)
    .with_return_type(ReturnTypeInference::Custom(decode_type))
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::Conditional)
    .with_doc(&Documentation {
        category: Category::Conditional,
        description: "Compare a value to each search value and return the matching result.",
        arguments: &["value", "search", "result", "default"],
        example: Some(Example {
            example: "DECODE(2, 1, 'one', 2, 'two', 'many')",
            output: "two",
        }),
    });

/// Indices of the result operands of a DECODE call with `n` operands.
///
/// Every second operand starting at index 2, plus the last operand when it's
/// a default value.
fn decode_result_indices(n: usize) -> impl Iterator<Item = usize> {
    let mut i = 1;
    std::iter::from_fn(move || {
        if i >= n {
            return None;
        }
        if i < n - 1 {
            i += 1;
        }
        let idx = i;
        i += 1;
        Some(idx)
    })
}

fn decode_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let n = binding.operand_count();
    let results: Vec<_> = decode_result_indices(n)
        .map(|idx| binding.operand_type(idx).cloned())
        .collect::<Result<_>>()?;

    let Some(datatype) = binding.type_system().least_restrictive(&results) else {
        return Ok(None);
    };
    // Without a default, no match gives NULL.
    if n % 2 == 1 {
        return Ok(Some(datatype.with_nullable(true)));
    }
    Ok(Some(datatype))
}

pub static NVL: Operator = Operator::function("NVL", OperatorKind::Nvl)
    .with_checker(SAME_SAME)
    .with_return_type(ReturnTypeInference::Cascade(
        &LEAST_RESTRICTIVE,
        &[TypeTransform::ToNullableAll],
    ))
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::Conditional);

pub static LTRIM: Operator = Operator::function("LTRIM", OperatorKind::Trim)
    .with_checker(STRING)
    .with_return_type(ARG0_NULLABLE_VARYING)
    .with_category(Category::String);

pub static RTRIM: Operator = Operator::function("RTRIM", OperatorKind::Trim)
    .with_checker(STRING)
    .with_return_type(ARG0_NULLABLE_VARYING)
    .with_category(Category::String);

pub static SUBSTR: Operator = Operator::function("SUBSTR", OperatorKind::Substring)
    .with_checker(OperandTypeChecker::Or(&[STRING_INTEGER, STRING_INTEGER_INTEGER]))
    .with_return_type(ARG0_NULLABLE_VARYING)
    .with_category(Category::String);

pub static GREATEST: Operator = Operator::function("GREATEST", OperatorKind::Greatest)
    .with_checker(SAME_VARIADIC)
    .with_return_type(LEAST_RESTRICTIVE_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::Conditional);

pub static LEAST: Operator = Operator::function("LEAST", OperatorKind::Least)
    .with_checker(SAME_VARIADIC)
    .with_return_type(LEAST_RESTRICTIVE_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::Conditional);

/// Three-argument TRANSLATE, written as TRANSLATE.
pub static TRANSLATE3: Operator = Operator::function("TRANSLATE3", OperatorKind::OtherFunction)
    .with_checker(STRING_STRING_STRING)
    .with_return_type(ARG0_NULLABLE_VARYING)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::String)
    .with_unparse(unparse_translate3)
    .with_doc(&Documentation {
        category: Category::String,
        description: "Replace each character of the second argument with the character at the same position in the third.",
        arguments: &["string", "from", "to"],
        example: Some(Example {
            example: "translate('abc', 'ab', 'xy')",
            output: "xyc",
        }),
    });

fn unparse_translate3(w: &mut SqlWriter<'_>, call: &Call, _op: &'static Operator, _left: u32, _right: u32) {
    w.write_function(TRANSLATE.name, call);
}

/// `TRANSLATE(string, from, to)` as written, validated as TRANSLATE3.
pub static TRANSLATE: Operator = Operator::function("TRANSLATE", OperatorKind::OtherFunction)
    .with_checker(STRING_STRING_STRING)
    .with_return_type(ARG0_NULLABLE_VARYING)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::String)
    .with_rewrite(rewrite_translate);

fn rewrite_translate(call: &Call) -> Option<Node> {
    if call.operands.len() != 3 {
        return None;
    }
    Some(Call::new(TRANSLATE3.name, Syntax::Function, call.operands.clone(), call.pos).into())
}

#[cfg(test)]
mod tests {
    use polysql_error::ParserPos;

    use super::*;
    use crate::functions::binding::{column_operands, with_test_binding};

    fn decode(types: &[DataType]) -> Option<DataType> {
        with_test_binding(&DECODE, column_operands(types.len()), types, |b| {
            DECODE.return_type.infer(b).unwrap()
        })
    }

    #[test]
    fn translate3_signature() {
        assert_eq!(
            "'TRANSLATE3(<STRING>, <STRING>, <STRING>)'",
            TRANSLATE3.allowed_signatures()
        );
    }

    #[test]
    fn translate_rewrites_to_translate3() {
        let call = Call::new("translate", Syntax::Function, column_operands(3), ParserPos::new(2, 5));
        let Some(Node::Call(rewritten)) = rewrite_translate(&call) else {
            panic!("expected a rewrite");
        };
        assert_eq!("TRANSLATE3", rewritten.name);
        assert_eq!(ParserPos::new(2, 5), rewritten.pos);
        assert!(TRANSLATE3.hooks.rewrite.is_none());

        let short = Call::new("translate", Syntax::Function, column_operands(2), ParserPos::new(2, 5));
        assert!(rewrite_translate(&short).is_none());
    }

    #[test]
    fn result_indices() {
        assert_eq!(vec![2, 4], decode_result_indices(5).collect::<Vec<_>>());
        assert_eq!(vec![2, 4, 5], decode_result_indices(6).collect::<Vec<_>>());
        assert_eq!(vec![2], decode_result_indices(3).collect::<Vec<_>>());
        assert_eq!(vec![2, 3], decode_result_indices(4).collect::<Vec<_>>());
    }

    #[test]
    fn decode_without_default_is_nullable() {
        let types = [
            DataType::integer(),
            DataType::integer(),
            DataType::char(1),
            DataType::integer(),
            DataType::char(1),
        ];
        assert_eq!(Some(DataType::char(1).with_nullable(true)), decode(&types));
    }

    #[test]
    fn decode_with_default() {
        let mut types = vec![
            DataType::integer(),
            DataType::integer(),
            DataType::char(1),
            DataType::integer(),
            DataType::char(1),
            DataType::char(1),
        ];
        assert_eq!(Some(DataType::char(1)), decode(&types));

        types[4] = DataType::char(1).with_nullable(true);
        assert_eq!(Some(DataType::char(1).with_nullable(true)), decode(&types));
    }

    #[test]
    fn nvl_is_not_null_with_one_not_null_operand() {
        let types = [DataType::integer().with_nullable(true), DataType::bigint()];
        let ret = with_test_binding(&NVL, column_operands(2), &types, |b| NVL.return_type.infer(b).unwrap());
        assert_eq!(Some(DataType::bigint()), ret);
    }
}
