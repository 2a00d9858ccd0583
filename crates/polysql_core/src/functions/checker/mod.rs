//! Operand type checkers.
//!
//! Checkers are plain data composed in constant contexts. A check either
//! passes, fails quietly (`Ok(false)`) so the next overload can be tried, or,
//! when asked to throw, fails with an error describing what's wrong.
mod consts;
mod structural;

use std::fmt;

pub use consts::*;
use polysql_error::{Result, messages};
pub use structural::*;

use super::binding::CallBinding;
use super::operator::Operator;
use crate::types::{Comparability, DataType, TypeFamily, TypeName};

/// Number of operands an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperandCountRange {
    pub min: usize,
    /// Upper bound, `None` for variadic operators.
    pub max: Option<usize>,
}

impl OperandCountRange {
    pub const fn exact(n: usize) -> Self {
        OperandCountRange {
            min: n,
            max: Some(n),
        }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        OperandCountRange {
            min,
            max: Some(max),
        }
    }

    pub const fn from(min: usize) -> Self {
        OperandCountRange { min, max: None }
    }

    pub const fn any() -> Self {
        Self::from(0)
    }

    pub const fn contains(&self, n: usize) -> bool {
        if n < self.min {
            return false;
        }
        match self.max {
            Some(max) => n <= max,
            None => true,
        }
    }

    pub const fn is_exact(&self) -> Option<usize> {
        match self.max {
            Some(max) if max == self.min => Some(max),
            _ => None,
        }
    }
}

impl fmt::Display for OperandCountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{} to {max}", self.min),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// A checker with its own logic.
#[derive(Debug)]
pub struct CustomChecker {
    pub check: fn(&CallBinding<'_>, bool) -> Result<bool>,
    pub range: OperandCountRange,
    /// Allowed signatures, one per line. `$OP` is replaced by the operator
    /// name.
    pub allowed: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum OperandTypeChecker {
    /// Operand `i` must belong to `families[i]`. The last `optional`
    /// operands may be omitted.
    Family {
        families: &'static [TypeFamily],
        optional: usize,
    },
    /// Operands at `positions` (all operands if `None`) must have mutually
    /// comparable types.
    SameSame {
        positions: Option<&'static [usize]>,
        range: OperandCountRange,
    },
    /// All operands must be comparable with each other with at least the
    /// given comparability.
    Comparable {
        range: OperandCountRange,
        comparability: Comparability,
    },
    /// Only checks the operand count.
    Arity(OperandCountRange),
    /// All checkers must pass.
    And(&'static [OperandTypeChecker]),
    /// At least one checker must pass.
    Or(&'static [OperandTypeChecker]),
    /// Checker `i` checks operand `i` on its own.
    Sequence {
        allowed: &'static str,
        checkers: &'static [OperandTypeChecker],
    },
    /// The same checker applied to every operand.
    Repeat {
        range: OperandCountRange,
        checker: &'static OperandTypeChecker,
    },
    /// A single literal operand.
    Literal,
    /// A single positive integer literal operand.
    PositiveIntegerLiteral,
    /// A single numeric literal operand between 0 and 1.
    UnitIntervalLiteral,
    Custom(&'static CustomChecker),
}

impl OperandTypeChecker {
    pub const fn family(families: &'static [TypeFamily]) -> Self {
        OperandTypeChecker::Family {
            families,
            optional: 0,
        }
    }

    pub const fn family_optional(families: &'static [TypeFamily], optional: usize) -> Self {
        OperandTypeChecker::Family { families, optional }
    }

    pub const fn repeat(range: OperandCountRange, checker: &'static OperandTypeChecker) -> Self {
        OperandTypeChecker::Repeat { range, checker }
    }

    pub fn range(&self) -> OperandCountRange {
        match self {
            Self::Family { families, optional } => {
                OperandCountRange::between(families.len().saturating_sub(*optional), families.len())
            }
            Self::SameSame { range, .. } | Self::Comparable { range, .. } | Self::Repeat { range, .. } => {
                *range
            }
            Self::Arity(range) => *range,
            Self::And(rules) => {
                let min = rules.iter().map(|r| r.range().min).max().unwrap_or(0);
                let max = rules.iter().filter_map(|r| r.range().max).min();
                OperandCountRange { min, max }
            }
            Self::Or(rules) => {
                let min = rules.iter().map(|r| r.range().min).min().unwrap_or(0);
                let max = rules
                    .iter()
                    .map(|r| r.range().max)
                    .try_fold(0, |acc, max| max.map(|m| acc.max(m)));
                OperandCountRange { min, max }
            }
            Self::Sequence { checkers, .. } => OperandCountRange::exact(checkers.len()),
            Self::Literal | Self::PositiveIntegerLiteral | Self::UnitIntervalLiteral => {
                OperandCountRange::exact(1)
            }
            Self::Custom(custom) => custom.range,
        }
    }

    /// Check all operands of the call.
    pub fn check(&self, binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
        let count = binding.operand_count();
        match self {
            Self::Family { families, .. } => {
                if !self.range().contains(count) {
                    return Ok(false);
                }
                for (idx, family) in families.iter().take(count).enumerate() {
                    if !check_family(binding, *family, idx, throw)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::SameSame { positions, range } => {
                if !range.contains(count) {
                    return Ok(false);
                }
                check_same(binding, *positions, throw)
            }
            Self::Comparable { range, .. } => {
                if !range.contains(count) {
                    return Ok(false);
                }
                for idx in 0..count {
                    if !self.check_single(binding, idx, throw)? {
                        return Ok(false);
                    }
                }
                check_comparable_pairs(binding, throw)
            }
            Self::Arity(range) => Ok(range.contains(count)),
            Self::And(rules) => {
                for rule in rules.iter() {
                    if !rule.check(binding, false)? {
                        if throw {
                            rule.check(binding, true)?;
                            return Err(binding.new_validation_signature_error());
                        }
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(rules) => {
                for rule in rules.iter() {
                    if rule.check(binding, false)? {
                        return Ok(true);
                    }
                }
                if throw {
                    // Surface the most specific error any rule reports.
                    for rule in rules.iter() {
                        rule.check(binding, true)?;
                    }
                    return Err(binding.new_validation_signature_error());
                }
                Ok(false)
            }
            Self::Sequence { checkers, .. } => {
                if count != checkers.len() {
                    return Ok(false);
                }
                for (idx, checker) in checkers.iter().enumerate() {
                    if !checker.check_single(binding, idx, throw)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Repeat { range, checker } => {
                if !range.contains(count) {
                    return Ok(false);
                }
                for idx in 0..count {
                    if !checker.check_single(binding, idx, throw)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Literal | Self::PositiveIntegerLiteral | Self::UnitIntervalLiteral => {
                if count != 1 {
                    return Ok(false);
                }
                self.check_single(binding, 0, throw)
            }
            Self::Custom(custom) => {
                if !custom.range.contains(count) {
                    return Ok(false);
                }
                (custom.check)(binding, throw)
            }
        }
    }

    /// Check a single operand in isolation.
    pub fn check_single(&self, binding: &CallBinding<'_>, idx: usize, throw: bool) -> Result<bool> {
        match self {
            Self::Family { families, .. } => {
                let family = families.first().copied().unwrap_or(TypeFamily::Any);
                check_family(binding, family, idx, throw)
            }
            Self::Comparable { comparability, .. } => {
                let datatype = binding.operand_type(idx)?;
                if datatype.is_null_type() || datatype.comparability() >= *comparability {
                    return Ok(true);
                }
                fail(binding, throw)
            }
            Self::SameSame { .. } | Self::Arity(_) | Self::Sequence { .. } | Self::Custom(_) => {
                Ok(true)
            }
            Self::And(rules) => {
                for rule in rules.iter() {
                    if !rule.check_single(binding, idx, throw)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(rules) => {
                for rule in rules.iter() {
                    if rule.check_single(binding, idx, false)? {
                        return Ok(true);
                    }
                }
                fail(binding, throw)
            }
            Self::Repeat { checker, .. } => checker.check_single(binding, idx, throw),
            Self::Literal => {
                if binding.is_operand_literal(idx, false) {
                    return Ok(true);
                }
                fail_with(binding, idx, throw, messages::argument_must_be_literal)
            }
            Self::PositiveIntegerLiteral => {
                if !binding.is_operand_literal(idx, false) {
                    return fail_with(binding, idx, throw, messages::argument_must_be_literal);
                }
                match binding.operand_i64(idx) {
                    Some(v) if v > 0 => Ok(true),
                    _ => fail_with(binding, idx, throw, messages::argument_must_be_positive_integer),
                }
            }
            Self::UnitIntervalLiteral => {
                if !binding.is_operand_literal(idx, false) {
                    return fail_with(binding, idx, throw, messages::argument_must_be_literal);
                }
                let value = binding.operand_literal(idx).and_then(|v| v.as_f64());
                match value {
                    Some(v) if (0.0..=1.0).contains(&v) => Ok(true),
                    _ => fail_with(binding, idx, throw, messages::argument_must_be_unit_interval),
                }
            }
        }
    }

    /// Allowed signatures for `op`, one per line, each quoted.
    pub fn allowed_signatures(&self, op: &Operator) -> String {
        match self {
            Self::Family { families, optional } => {
                let min = families.len().saturating_sub(*optional);
                (min..=families.len())
                    .map(|n| {
                        let descs: Vec<_> = families[..n].iter().map(|f| format!("<{f}>")).collect();
                        signature_line(op, &descs)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Self::SameSame { range, .. } => repeated_signature(op, *range, "<EQUIVALENT_TYPE>"),
            Self::Comparable { range, .. } => repeated_signature(op, *range, "<COMPARABLE_TYPE>"),
            Self::Arity(range) => repeated_signature(op, *range, "<ANY>"),
            Self::And(rules) => rules
                .first()
                .map(|r| r.allowed_signatures(op))
                .unwrap_or_default(),
            Self::Or(rules) => {
                let mut lines: Vec<String> = Vec::new();
                for rule in rules.iter() {
                    for line in rule.allowed_signatures(op).lines() {
                        if !lines.iter().any(|l| l == line) {
                            lines.push(line.to_string());
                        }
                    }
                }
                lines.join("\n")
            }
            Self::Sequence { allowed, .. } => expand_template(op, allowed),
            Self::Repeat { range, checker } => {
                let desc = match checker {
                    Self::Family { families, .. } => families
                        .first()
                        .map(|f| format!("<{f}>"))
                        .unwrap_or_else(|| "<ANY>".to_string()),
                    _ => "<ANY>".to_string(),
                };
                repeated_signature(op, *range, &desc)
            }
            Self::Literal => signature_line(op, &["<LITERAL>".to_string()]),
            Self::PositiveIntegerLiteral => signature_line(op, &["<INTEGER>".to_string()]),
            Self::UnitIntervalLiteral => signature_line(op, &["<NUMERIC>".to_string()]),
            Self::Custom(custom) => expand_template(op, custom.allowed),
        }
    }
}

fn signature_line(op: &Operator, operands: &[String]) -> String {
    format!("'{}'", op.syntax.signature(op.name, operands))
}

fn repeated_signature(op: &Operator, range: OperandCountRange, desc: &str) -> String {
    let mut operands: Vec<String> = (0..range.min.max(1)).map(|_| desc.to_string()).collect();
    match range.max {
        Some(0) => operands.clear(),
        Some(_) => (),
        None => operands.push("...".to_string()),
    }
    if let Some(max) = range.max {
        operands.truncate(max);
    }
    signature_line(op, &operands)
}

fn expand_template(op: &Operator, template: &str) -> String {
    template
        .lines()
        .map(|line| format!("'{}'", line.trim().replace("$OP", op.name)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn fail(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    if throw {
        Err(binding.new_validation_signature_error())
    } else {
        Ok(false)
    }
}

fn fail_with(
    binding: &CallBinding<'_>,
    idx: usize,
    throw: bool,
    err: fn(&str) -> polysql_error::DbError,
) -> Result<bool> {
    if throw {
        Err(binding.new_operand_error(idx, err(binding.operator.name)))
    } else {
        Ok(false)
    }
}

/// Returns if an operand of type `datatype` is accepted by `family`.
///
/// NULL and ANY typed operands are accepted by every family, their actual
/// type is only known at execution.
pub fn family_accepts(family: TypeFamily, datatype: &DataType) -> bool {
    datatype.is_null_type()
        || matches!(datatype.name(), TypeName::Any | TypeName::DynamicStar)
        || family.contains(datatype.name())
}

fn check_family(binding: &CallBinding<'_>, family: TypeFamily, idx: usize, throw: bool) -> Result<bool> {
    let datatype = binding.operand_type(idx)?;
    if family_accepts(family, datatype) {
        return Ok(true);
    }
    fail(binding, throw)
}

/// Returns if values of the two types can be compared with each other.
///
/// Character strings are implicitly converted when compared with numbers,
/// booleans, datetimes and intervals.
pub fn comparable_types(a: &DataType, b: &DataType) -> bool {
    if a.name() == TypeName::Row || b.name() == TypeName::Row {
        return a.name() == b.name()
            && a.fields().len() == b.fields().len()
            && a.fields()
                .iter()
                .zip(b.fields())
                .all(|(fa, fb)| comparable_types(&fa.datatype, &fb.datatype));
    }

    let (fa, fb) = (a.family(), b.family());
    if fa == fb {
        return true;
    }
    if matches!(fa, TypeFamily::Any | TypeFamily::Null) || matches!(fb, TypeFamily::Any | TypeFamily::Null) {
        return true;
    }
    (fa == TypeFamily::Character && string_converts_in_compare(fb))
        || (fb == TypeFamily::Character && string_converts_in_compare(fa))
}

const fn string_converts_in_compare(family: TypeFamily) -> bool {
    matches!(
        family,
        TypeFamily::Date
            | TypeFamily::Time
            | TypeFamily::Timestamp
            | TypeFamily::IntervalDayTime
            | TypeFamily::IntervalYearMonth
            | TypeFamily::Numeric
            | TypeFamily::Boolean
    )
}

/// Returns if both types share a natural family.
pub fn same_family(a: &DataType, b: &DataType) -> bool {
    if a.name() == TypeName::Row && b.name() == TypeName::Row {
        return a.fields().len() == b.fields().len()
            && a.fields()
                .iter()
                .zip(b.fields())
                .all(|(fa, fb)| same_family(&fa.datatype, &fb.datatype));
    }
    let (fa, fb) = (a.family(), b.family());
    fa == fb || fa == TypeFamily::Any || fb == TypeFamily::Any
}

fn check_same(
    binding: &CallBinding<'_>,
    positions: Option<&'static [usize]>,
    throw: bool,
) -> Result<bool> {
    let indices: Vec<usize> = match positions {
        Some(positions) => positions
            .iter()
            .copied()
            .filter(|idx| *idx < binding.operand_count())
            .collect(),
        None => (0..binding.operand_count()).collect(),
    };

    let mut prev: Option<&DataType> = None;
    for idx in indices {
        let datatype = binding.operand_type(idx)?;
        if datatype.is_null_type() {
            continue;
        }
        if let Some(prev) = prev {
            if !same_family(prev, datatype) {
                if throw {
                    return Err(binding.new_operand_error(
                        idx,
                        messages::incompatible_value_types(binding.operator.name),
                    ));
                }
                return Ok(false);
            }
        }
        prev = Some(datatype);
    }
    Ok(true)
}

fn check_comparable_pairs(binding: &CallBinding<'_>, throw: bool) -> Result<bool> {
    let mut prev: Option<&DataType> = None;
    for idx in 0..binding.operand_count() {
        let datatype = binding.operand_type(idx)?;
        if datatype.is_null_type() {
            continue;
        }
        if let Some(prev) = prev {
            if !comparable_types(prev, datatype) {
                if throw {
                    return Err(binding.new_operand_error(
                        idx,
                        messages::type_not_comparable(&prev.to_string(), &datatype.to_string()),
                    ));
                }
                return Ok(false);
            }
        }
        prev = Some(datatype);
    }
    Ok(true)
}
