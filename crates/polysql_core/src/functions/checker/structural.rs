//! Checkers looking at the structure of collection, map and row operands.
use polysql_error::{Result, messages};

use super::{CustomChecker, OperandCountRange, OperandTypeChecker, comparable_types, family_accepts};
use crate::expr::LiteralValue;
use crate::functions::binding::CallBinding;
use crate::types::{TypeFamily, TypeName, least_restrictive};

pub const MULTISET_ONLY: OperandTypeChecker = super::MULTISET;

/// Two multisets with comparable component types.
pub const MULTISET_MULTISET: OperandTypeChecker = OperandTypeChecker::Custom(&CustomChecker {
    check: check_multiset_multiset,
    range: OperandCountRange::exact(2),
    allowed: "<MULTISET> $OP <MULTISET>",
});

/// An element and a multiset whose component type is comparable with it.
pub const MEMBER_OF: OperandTypeChecker = OperandTypeChecker::Custom(&CustomChecker {
    check: check_member_of,
    range: OperandCountRange::exact(2),
    allowed: "<ANY> $OP <MULTISET>",
});

/// Element access on an array, map or row.
pub const ITEM: OperandTypeChecker = OperandTypeChecker::Custom(&CustomChecker {
    check: check_item,
    range: OperandCountRange::exact(2),
    allowed: "<ARRAY>[<INTEGER>]
              <MAP>[<ANY>]
              <ROW>[<CHARACTER>|<INTEGER>]",
});

/// String literals among the operands must share a character set.
pub const STRING_SAME_CHARSET: OperandTypeChecker = OperandTypeChecker::Custom(&CustomChecker {
    check: check_same_charset,
    range: OperandCountRange::any(),
    allowed: "$OP(<STRING>, ...)",
});

/// `a || b` on strings of the same family and character set.
pub const STRING_SAME_SAME_CHARSET: OperandTypeChecker =
    OperandTypeChecker::And(&[super::STRING_SAME_SAME, STRING_SAME_CHARSET]);

fn check_multiset_multiset(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let mut components = Vec::with_capacity(2);
    for idx in 0..2 {
        let datatype = binding.operand_type(idx)?;
        if datatype.is_null_type() {
            continue;
        }
        if !family_accepts(TypeFamily::Multiset, datatype) {
            return super::fail(binding, throw);
        }
        if let Some(component) = datatype.component() {
            components.push(component.clone());
        }
    }

    if components.len() == 2 && least_restrictive(&components).is_none() {
        if throw {
            return Err(binding.new_error(messages::incompatible_value_types(binding.operator.name)));
        }
        return Ok(false);
    }
    Ok(true)
}

fn check_member_of(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let element = binding.operand_type(0)?;
    let multiset = binding.operand_type(1)?;
    if !family_accepts(TypeFamily::Multiset, multiset) {
        return super::fail(binding, throw);
    }
    match multiset.component() {
        Some(component) if !comparable_types(element, component) => {
            if throw {
                return Err(binding.new_operand_error(
                    0,
                    messages::type_not_comparable(&element.to_string(), &component.to_string()),
                ));
            }
            Ok(false)
        }
        _ => Ok(true),
    }
}

fn check_item(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let container = binding.operand_type(0)?;
    let index = binding.operand_type(1)?;
    let ok = match container.name() {
        TypeName::Array => family_accepts(TypeFamily::Integer, index),
        TypeName::Map => container
            .key_type()
            .is_some_and(|key| comparable_types(key, index)),
        TypeName::Row => {
            family_accepts(TypeFamily::Integer, index)
                || family_accepts(TypeFamily::Character, index)
        }
        TypeName::Any | TypeName::Null => true,
        _ => false,
    };
    if ok {
        Ok(true)
    } else {
        super::fail(binding, throw)
    }
}

fn check_same_charset(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let mut seen: Option<String> = None;
    for idx in 0..binding.operand_count() {
        let Some(LiteralValue::CharString {
            charset: Some(charset),
            ..
        }) = binding.operand_literal(idx)
        else {
            continue;
        };
        match &seen {
            Some(prev) if !prev.eq_ignore_ascii_case(&charset) => {
                if throw {
                    return Err(binding.new_operand_error(idx, messages::charset_mismatch()));
                }
                return Ok(false);
            }
            Some(_) => (),
            None => seen = Some(charset),
        }
    }
    Ok(true)
}
