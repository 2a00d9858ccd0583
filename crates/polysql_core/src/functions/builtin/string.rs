use crate::expr::{Call, LiteralValue, Monotonicity, Node};
use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::{
    CHARACTER,
    OperandCountRange,
    OperandTypeChecker,
    STRING,
    STRING_INTEGER,
    STRING_INTEGER_INTEGER,
    STRING_SAME_SAME,
    STRING_SAME_SAME_CHARSET,
    STRING_STRING_INTEGER,
    STRING_STRING_INTEGER_INTEGER,
    STRING_STRING_STRING,
};
use crate::functions::documentation::{Category, Documentation, Example};
use crate::functions::inference::{
    ARG0_NULLABLE,
    ARG0_NULLABLE_VARYING,
    DYADIC_STRING_SUM_PRECISION,
    DYADIC_STRING_SUM_PRECISION_NULLABLE,
    INTEGER_NULLABLE,
    OperandTypeInference,
    ReturnTypeInference,
    TypeTransform,
};
use crate::functions::operator::Operator;
use crate::types::TypeFamily;
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[
    &CONCAT,
    &UPPER,
    &LOWER,
    &INITCAP,
    &CHAR_LENGTH,
    &CHARACTER_LENGTH,
    &SUBSTRING,
    &SUBSTRING_FOR,
    &OVERLAY,
    &OVERLAY_FOR,
    &POSITION,
    &POSITION_FROM,
    &TRIM,
    &REPLACE,
    &CONVERT,
];

pub static CONCAT: Operator = Operator::binary("||", OperatorKind::Concat, 60, true)
    .with_checker(STRING_SAME_SAME_CHARSET)
    .with_return_type(DYADIC_STRING_SUM_PRECISION_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::STRING_OPERATOR)
    .with_monotonicity(concat_monotonicity)
    .with_doc(&Documentation {
        category: Category::STRING_OPERATOR,
        description: "Concatenate two strings of the same kind.",
        arguments: &["a", "b"],
        example: Some(Example {
            example: "'ab' || 'cd'",
            output: "abcd",
        }),
    });

/// Appending a constant keeps the order of the left side.
fn concat_monotonicity(_: &CallBinding<'_>, operands: &[Monotonicity]) -> Monotonicity {
    match operands {
        [Monotonicity::Constant, Monotonicity::Constant] => Monotonicity::Constant,
        [m, Monotonicity::Constant] => *m,
        _ => Monotonicity::NotMonotonic,
    }
}

const fn string_function(name: &'static str, checker: OperandTypeChecker, ret: ReturnTypeInference) -> Operator {
    Operator::function(name, OperatorKind::OtherFunction)
        .with_checker(checker)
        .with_return_type(ret)
        .with_operand_inference(OperandTypeInference::FirstKnown)
        .with_category(Category::String)
}

pub static UPPER: Operator = string_function("UPPER", CHARACTER, ARG0_NULLABLE).with_doc(&Documentation {
    category: Category::String,
    description: "Convert a string to upper case.",
    arguments: &["string"],
    example: Some(Example {
        example: "upper('hello')",
        output: "HELLO",
    }),
});

pub static LOWER: Operator = string_function("LOWER", CHARACTER, ARG0_NULLABLE).with_doc(&Documentation {
    category: Category::String,
    description: "Convert a string to lower case.",
    arguments: &["string"],
    example: Some(Example {
        example: "lower('HELLO')",
        output: "hello",
    }),
});

pub static INITCAP: Operator = string_function("INITCAP", CHARACTER, ARG0_NULLABLE);

pub static CHAR_LENGTH: Operator = string_function("CHAR_LENGTH", CHARACTER, INTEGER_NULLABLE)
    .with_doc(&Documentation {
        category: Category::String,
        description: "Number of characters in a string.",
        arguments: &["string"],
        example: Some(Example {
            example: "char_length('hello')",
            output: "5",
        }),
    });

pub static CHARACTER_LENGTH: Operator = string_function("CHARACTER_LENGTH", CHARACTER, INTEGER_NULLABLE);

/// `SUBSTRING(s FROM start)`
pub static SUBSTRING: Operator = Operator::function("SUBSTRING", OperatorKind::Substring)
    .with_checker(STRING_INTEGER)
    .with_return_type(ARG0_NULLABLE_VARYING)
    .with_category(Category::String)
    .with_unparse(unparse_substring)
    .with_doc(&Documentation {
        category: Category::String,
        description: "Get a substring of a string starting at a 1-based position.",
        arguments: &["string", "start"],
        example: Some(Example {
            example: "substring('hello' FROM 2)",
            output: "ello",
        }),
    });

/// `SUBSTRING(s FROM start FOR count)`
pub static SUBSTRING_FOR: Operator = Operator::function("SUBSTRING", OperatorKind::Substring)
    .with_checker(STRING_INTEGER_INTEGER)
    .with_return_type(ARG0_NULLABLE_VARYING)
    .with_category(Category::String)
    .with_unparse(unparse_substring)
    .with_doc(&Documentation {
        category: Category::String,
        description: "Get a substring of a string with a given length.",
        arguments: &["string", "start", "count"],
        example: Some(Example {
            example: "substring('hello' FROM 2 FOR 2)",
            output: "el",
        }),
    });

fn unparse_substring(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    unparse_keyword_operands(w, op.name, &call.operands, &["FROM", "FOR"]);
}

/// `NAME(a KW1 b KW2 c ...)`, keywords between successive operands.
fn unparse_keyword_operands(w: &mut SqlWriter<'_>, name: &str, operands: &[Node], keywords: &[&str]) {
    w.open_call(name);
    for (idx, operand) in operands.iter().enumerate() {
        if idx > 0 {
            match keywords.get(idx - 1) {
                Some(keyword) => w.keyword(keyword),
                None => w.comma(),
            }
        }
        w.write_node(operand, 0, 0);
    }
    w.close_paren();
}

const OVERLAY_RETURN: ReturnTypeInference = ReturnTypeInference::Cascade(
    &DYADIC_STRING_SUM_PRECISION,
    &[TypeTransform::ToNullable, TypeTransform::ToVarying],
);

/// `OVERLAY(s PLACING r FROM start)`
pub static OVERLAY: Operator = Operator::function("OVERLAY", OperatorKind::Overlay)
    .with_checker(STRING_STRING_INTEGER)
    .with_return_type(OVERLAY_RETURN)
    .with_category(Category::String)
    .with_unparse(unparse_overlay);

/// `OVERLAY(s PLACING r FROM start FOR count)`
pub static OVERLAY_FOR: Operator = Operator::function("OVERLAY", OperatorKind::Overlay)
    .with_checker(STRING_STRING_INTEGER_INTEGER)
    .with_return_type(OVERLAY_RETURN)
    .with_category(Category::String)
    .with_unparse(unparse_overlay);

fn unparse_overlay(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    unparse_keyword_operands(w, op.name, &call.operands, &["PLACING", "FROM", "FOR"]);
}

/// `POSITION(needle IN haystack)`
pub static POSITION: Operator = Operator::function("POSITION", OperatorKind::Position)
    .with_checker(STRING_SAME_SAME)
    .with_return_type(INTEGER_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::String)
    .with_unparse(unparse_position);

/// `POSITION(needle IN haystack FROM start)`
pub static POSITION_FROM: Operator = Operator::function("POSITION", OperatorKind::Position)
    .with_checker(OperandTypeChecker::And(&[
        STRING_STRING_INTEGER,
        OperandTypeChecker::SameSame {
            positions: Some(&[0, 1]),
            range: OperandCountRange::exact(3),
        },
    ]))
    .with_return_type(INTEGER_NULLABLE)
    .with_operand_inference(OperandTypeInference::FirstKnown)
    .with_category(Category::String)
    .with_unparse(unparse_position);

fn unparse_position(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    unparse_keyword_operands(w, op.name, &call.operands, &["IN", "FROM"]);
}

/// `TRIM(flag chars FROM string)`, operands are the flag symbol, the
/// characters to remove and the string.
pub static TRIM: Operator = Operator::function("TRIM", OperatorKind::Trim)
    .with_checker(OperandTypeChecker::And(&[
        OperandTypeChecker::family(&[TypeFamily::Symbol, TypeFamily::String, TypeFamily::String]),
        OperandTypeChecker::SameSame {
            positions: Some(&[1, 2]),
            range: OperandCountRange::exact(3),
        },
    ]))
    .with_return_type(ReturnTypeInference::Cascade(
        &ReturnTypeInference::Arg(2),
        &[TypeTransform::ToNullable, TypeTransform::ToVarying],
    ))
    .with_category(Category::String)
    .with_unparse(unparse_trim)
    .with_doc(&Documentation {
        category: Category::String,
        description: "Remove characters from the start, end or both ends of a string.",
        arguments: &["flag", "characters", "string"],
        example: Some(Example {
            example: "trim(BOTH 'x' FROM 'xxaxx')",
            output: "a",
        }),
    });

fn unparse_trim(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let [flag, chars, string] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    w.open_call(op.name);
    w.write_node(flag, 0, 0);
    w.write_node(chars, 0, 0);
    w.keyword("FROM");
    w.write_node(string, 0, 0);
    w.close_paren();
}

pub static REPLACE: Operator = string_function("REPLACE", STRING_STRING_STRING, ARG0_NULLABLE_VARYING);

/// `CONVERT(string USING charset)`, the charset is a string literal.
pub static CONVERT: Operator = Operator::function("CONVERT", OperatorKind::OtherFunction)
    .with_checker(OperandTypeChecker::And(&[
        OperandTypeChecker::family(&[TypeFamily::String, TypeFamily::Character]),
        OperandTypeChecker::Sequence {
            allowed: "$OP(<STRING> USING <CHARSET>)",
            checkers: &[STRING, OperandTypeChecker::Literal],
        },
    ]))
    .with_return_type(ARG0_NULLABLE)
    .with_category(Category::String)
    .with_unparse(unparse_convert);

fn unparse_convert(w: &mut SqlWriter<'_>, call: &Call, op: &'static Operator, _left: u32, _right: u32) {
    let [string, Node::Literal(charset)] = call.operands.as_slice() else {
        w.write_function(op.name, call);
        return;
    };
    w.open_call(op.name);
    w.write_node(string, 0, 0);
    w.keyword("USING");
    match &charset.value {
        LiteralValue::CharString { value, .. } => w.keyword(value),
        other => w.keyword(&other.to_string()),
    }
    w.close_paren();
}

#[cfg(test)]
mod tests {
    use polysql_error::ParserPos;

    use super::*;
    use crate::expr::Literal;
    use crate::functions::binding::{column_operands, with_test_binding};
    use crate::types::DataType;

    fn ret(op: &'static Operator, types: &[DataType]) -> Option<DataType> {
        with_test_binding(op, column_operands(types.len()), types, |b| {
            assert!(op.checker.check(b, true).unwrap());
            op.return_type.infer(b).unwrap()
        })
    }

    #[test]
    fn concat_sums_precision() {
        assert_eq!(
            Some(DataType::char(5)),
            ret(&CONCAT, &[DataType::char(2), DataType::char(3)])
        );
    }

    #[test]
    fn concat_rejects_mixed_families() {
        let types = [DataType::char(2), DataType::binary(3)];
        let err = with_test_binding(&CONCAT, column_operands(2), &types, |b| {
            CONCAT.checker.check(b, true).unwrap_err()
        });
        assert_eq!(polysql_error::ErrorKind::IncompatibleValueTypes, err.kind());
    }

    #[test]
    fn concat_rejects_different_charsets() {
        let lit = |charset: &str, col| {
            Node::Literal(Literal::new(
                LiteralValue::CharString {
                    value: "a".to_string(),
                    charset: Some(charset.to_string()),
                },
                ParserPos::new(1, col),
            ))
        };
        let operands = vec![lit("UTF8", 1), lit("LATIN1", 10)];
        let types = [DataType::char(1), DataType::char(1)];
        let err = with_test_binding(&CONCAT, operands, &types, |b| {
            CONCAT.checker.check(b, true).unwrap_err()
        });
        assert_eq!(polysql_error::ErrorKind::CharsetMismatch, err.kind());
        assert_eq!(Some(ParserPos::new(1, 10)), err.pos());
    }

    #[test]
    fn substring_is_varying() {
        assert_eq!(
            Some(DataType::varchar(Some(10)).with_nullable(true)),
            ret(&SUBSTRING_FOR, &[
                DataType::char(10),
                DataType::integer(),
                DataType::integer().with_nullable(true)
            ])
        );
    }

    #[test]
    fn trim_takes_string_type() {
        assert_eq!(
            Some(DataType::varchar(Some(8))),
            ret(&TRIM, &[DataType::symbol(), DataType::char(1), DataType::char(8)])
        );
    }

    #[test]
    fn position_from_checks_start() {
        let types = [DataType::char(1), DataType::varchar(None), DataType::varchar(None)];
        with_test_binding(&POSITION_FROM, column_operands(3), &types, |b| {
            assert!(!POSITION_FROM.checker.check(b, false).unwrap());
        });
    }
}
