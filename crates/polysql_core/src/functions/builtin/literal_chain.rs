//! Adjacent string literals, `'abc' 'def'`, written on separate lines.
use polysql_error::{Result, messages};

use crate::expr::{Call, LiteralValue, Node};
use crate::functions::OperatorKind;
use crate::functions::binding::CallBinding;
use crate::functions::checker::{CustomChecker, OperandCountRange, OperandTypeChecker};
use crate::functions::documentation::Category;
use crate::functions::inference::ReturnTypeInference;
use crate::functions::operator::Operator;
use crate::types::{DataType, TypeFamily};
use crate::unparse::SqlWriter;

pub static OPERATORS: &[&Operator] = &[&LITERAL_CHAIN];

pub static LITERAL_CHAIN: Operator = Operator::internal("$LiteralChain", OperatorKind::LiteralChain)
    .with_checker(OperandTypeChecker::Custom(&CustomChecker {
        check: check_fragments,
        range: OperandCountRange::from(1),
        allowed: "<STRING> <STRING> ...",
    }))
    .with_return_type(ReturnTypeInference::Custom(chain_type))
    .with_category(Category::Internal)
    .with_validate(validate_fragments)
    .with_unparse(unparse_chain);

fn is_binary(value: &LiteralValue) -> Option<bool> {
    match value {
        LiteralValue::CharString { .. } => Some(false),
        LiteralValue::BinaryString(_) => Some(true),
        _ => None,
    }
}

/// Every fragment is a string literal of the same kind as the first.
fn check_fragments(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let mut kind = None;
    for idx in 0..binding.operand_count() {
        let binary = match &binding.operand(idx) {
            Some(Node::Literal(lit)) => is_binary(&lit.value),
            _ => None,
        };
        let ok = match (binary, kind) {
            (None, _) => false,
            (Some(b), None) => {
                kind = Some(b);
                true
            }
            (Some(b), Some(first)) => b == first,
        };
        if !ok {
            if throw {
                return Err(binding.new_validation_signature_error());
            }
            return Ok(false);
        }
    }
    Ok(true)
}

/// CHAR or BINARY with the summed length of all fragments, never null.
fn chain_type(binding: &CallBinding<'_>) -> Result<Option<DataType>> {
    let first = binding.operand_type(0)?;
    let len = binding
        .operand_types
        .iter()
        .map(|t| t.precision().unwrap_or(0))
        .sum();
    let datatype = if first.family() == TypeFamily::Binary {
        DataType::binary(len)
    } else {
        DataType::char(len)
    };
    Ok(Some(datatype.with_nullable(false)))
}

fn validate_fragments(binding: &CallBinding<'_>) -> Result<()> {
    let mut prev_line = None;
    let mut charset: Option<String> = None;

    for (idx, operand) in binding.call.operands.iter().enumerate() {
        let pos = operand.pos();
        if let Some(prev) = prev_line {
            if !binding.config.literal_chain_same_line_allowed && pos.line <= prev {
                return Err(binding.new_operand_error(idx, messages::string_fragments_on_same_line()));
            }
        }
        prev_line = Some(pos.line);

        let Some(LiteralValue::CharString {
            charset: Some(fragment_charset),
            ..
        }) = operand.as_literal().map(|lit| &lit.value)
        else {
            continue;
        };
        match &charset {
            Some(first) if !first.eq_ignore_ascii_case(fragment_charset) => {
                return Err(binding.new_operand_error(idx, messages::charset_mismatch()));
            }
            Some(_) => (),
            None => charset = Some(fragment_charset.clone()),
        }
    }
    Ok(())
}

fn unparse_chain(w: &mut SqlWriter<'_>, call: &Call, _op: &'static Operator, _left: u32, _right: u32) {
    for fragment in &call.operands {
        w.write_node(fragment, 0, 0);
    }
}
