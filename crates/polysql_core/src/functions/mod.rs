// Operators, checkers and inference strategies are built in constant
// contexts and never through a Default implementation.
#![allow(clippy::new_without_default)]

pub mod binding;
pub mod builtin;
pub mod checker;
pub mod documentation;
pub mod inference;
pub mod operator;

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a call is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Syntax {
    /// `NAME(a, b)`
    Function,
    /// `NAME(*)` or `NAME(a)`, e.g. COUNT.
    FunctionStar,
    /// Niladic function written without parentheses, e.g. CURRENT_DATE.
    FunctionId,
    /// Infix operator, `a NAME b`.
    Binary,
    /// `NAME a`
    Prefix,
    /// `a NAME`
    Postfix,
    /// Operator with its own syntax, e.g. BETWEEN or CASE.
    Special,
    /// Operators that only appear after parsing.
    Internal,
}

impl Syntax {
    /// Class used for operator lookup.
    ///
    /// All function-like syntaxes share a class since the parser can't
    /// always tell them apart.
    pub const fn class(&self) -> Syntax {
        match self {
            Self::Function | Self::FunctionStar | Self::FunctionId => Self::Function,
            other => *other,
        }
    }

    pub const fn is_function(&self) -> bool {
        matches!(self.class(), Self::Function)
    }

    /// Format a signature with the given operand descriptions.
    pub fn signature(&self, name: &str, operands: &[String]) -> String {
        match (self, operands) {
            (Self::FunctionId, []) => name.to_string(),
            (Self::FunctionStar, []) => format!("{name}(*)"),
            (Self::Binary, [left, right]) => format!("{left} {name} {right}"),
            (Self::Prefix, [operand]) => format!("{name} {operand}"),
            (Self::Postfix, [operand]) => format!("{operand} {name}"),
            _ => format!("{name}({})", operands.join(", ")),
        }
    }
}

/// Semantic tag for an operator.
///
/// Multiple operators may share a kind (e.g. the BETWEEN variants), the
/// name and syntax tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    And,
    Or,
    Not,
    IsNull,
    IsNotNull,
    IsTrue,
    IsNotTrue,
    IsFalse,
    IsNotFalse,
    IsUnknown,
    IsNotUnknown,
    IsDistinctFrom,
    IsNotDistinctFrom,
    Exists,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Between,
    Like,
    Similar,
    In,
    NotIn,
    Plus,
    Minus,
    Times,
    Divide,
    DivideInteger,
    Mod,
    PlusPrefix,
    MinusPrefix,
    DatetimePlus,
    MinusDate,
    Concat,
    Extract,
    Floor,
    Ceil,
    Trim,
    Position,
    Overlay,
    Substring,
    Cast,
    Case,
    Coalesce,
    Nullif,
    Decode,
    Nvl,
    Greatest,
    Least,
    Row,
    ArrayConstructor,
    MultisetConstructor,
    MapConstructor,
    Item,
    Dot,
    Cardinality,
    Element,
    MemberOf,
    Submultiset,
    IsASet,
    IsEmpty,
    MultisetSetOp,
    TimestampAdd,
    TimestampDiff,
    DatePart,
    ContextVariable,
    Aggregate,
    WindowFunction,
    Grouping,
    GroupingId,
    GroupId,
    GroupWindow,
    Json,
    IsJson,
    LiteralChain,
    OtherFunction,
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Function => "FUNCTION",
            Self::FunctionStar => "FUNCTION_STAR",
            Self::FunctionId => "FUNCTION_ID",
            Self::Binary => "BINARY",
            Self::Prefix => "PREFIX",
            Self::Postfix => "POSTFIX",
            Self::Special => "SPECIAL",
            Self::Internal => "INTERNAL",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_formats() {
        let ops = vec!["<NUMERIC>".to_string(), "<NUMERIC>".to_string()];
        assert_eq!("<NUMERIC> + <NUMERIC>", Syntax::Binary.signature("+", &ops));
        assert_eq!(
            "POWER(<NUMERIC>, <NUMERIC>)",
            Syntax::Function.signature("POWER", &ops)
        );
        assert_eq!("CURRENT_DATE", Syntax::FunctionId.signature("CURRENT_DATE", &[]));
        assert_eq!(
            "<BOOLEAN> IS NULL",
            Syntax::Postfix.signature("IS NULL", &["<BOOLEAN>".to_string()])
        );
    }

    #[test]
    fn function_syntaxes_share_class() {
        assert_eq!(Syntax::Function, Syntax::FunctionId.class());
        assert_eq!(Syntax::Function, Syntax::FunctionStar.class());
        assert_eq!(Syntax::Binary, Syntax::Binary.class());
    }
}
