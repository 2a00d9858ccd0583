use std::fmt;

use polysql_error::ParserPos;
use serde::{Deserialize, Serialize};

use super::literal::{Literal, LiteralValue};
use crate::functions::Syntax;
use crate::types::DataType;

/// Untyped expression tree as handed over by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Call(Call),
    Literal(Literal),
    Identifier(Identifier),
    DynamicParam(DynamicParam),
    /// A type used as an operand, e.g. the target of a CAST.
    TypeSpec(TypeSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionQuantifier {
    Distinct,
    All,
}

impl FunctionQuantifier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Operator name as written, resolved case-insensitively.
    pub name: String,
    pub syntax: Syntax,
    pub operands: Vec<Node>,
    pub pos: ParserPos,
    pub quantifier: Option<FunctionQuantifier>,
    /// FILTER (WHERE ...) of an aggregate call.
    pub filter: Option<Box<Node>>,
}

impl Call {
    pub fn new(name: impl Into<String>, syntax: Syntax, operands: Vec<Node>, pos: ParserPos) -> Self {
        Call {
            name: name.into(),
            syntax,
            operands,
            pos,
            quantifier: None,
            filter: None,
        }
    }

    pub fn with_quantifier(mut self, quantifier: FunctionQuantifier) -> Self {
        self.quantifier = Some(quantifier);
        self
    }

    pub fn with_filter(mut self, filter: Node) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn operand(&self, idx: usize) -> Option<&Node> {
        self.operands.get(idx)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub names: Vec<String>,
    pub pos: ParserPos,
}

impl Identifier {
    pub fn simple(name: impl Into<String>, pos: ParserPos) -> Self {
        Identifier {
            names: vec![name.into()],
            pos,
        }
    }

    pub fn compound<S: Into<String>>(names: impl IntoIterator<Item = S>, pos: ParserPos) -> Self {
        Identifier {
            names: names.into_iter().map(Into::into).collect(),
            pos,
        }
    }

    /// Last component of the name.
    pub fn last(&self) -> &str {
        self.names.last().map(|s| s.as_str()).unwrap_or("")
    }

    /// Compare ignoring case.
    pub fn matches(&self, other: &Identifier) -> bool {
        self.names.len() == other.names.len()
            && self
                .names
                .iter()
                .zip(&other.names)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names.join("."))
    }
}

/// A `?` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicParam {
    pub index: usize,
    pub pos: ParserPos,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSpec {
    pub datatype: DataType,
    pub pos: ParserPos,
}

impl Node {
    pub fn call(name: impl Into<String>, syntax: Syntax, operands: Vec<Node>, pos: ParserPos) -> Self {
        Node::Call(Call::new(name, syntax, operands, pos))
    }

    pub fn identifier(name: impl Into<String>, pos: ParserPos) -> Self {
        Node::Identifier(Identifier::simple(name, pos))
    }

    pub fn literal(value: LiteralValue, pos: ParserPos) -> Self {
        Node::Literal(Literal::new(value, pos))
    }

    pub fn param(index: usize, pos: ParserPos) -> Self {
        Node::DynamicParam(DynamicParam { index, pos })
    }

    pub fn type_spec(datatype: DataType, pos: ParserPos) -> Self {
        Node::TypeSpec(TypeSpec { datatype, pos })
    }

    pub fn pos(&self) -> ParserPos {
        match self {
            Self::Call(c) => c.pos,
            Self::Literal(l) => l.pos,
            Self::Identifier(i) => i.pos,
            Self::DynamicParam(p) => p.pos,
            Self::TypeSpec(t) => t.pos,
        }
    }

    pub fn as_call(&self) -> Option<&Call> {
        match self {
            Self::Call(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Self::Identifier(i) => Some(i),
            _ => None,
        }
    }

    /// Returns if this is an untyped NULL literal.
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Self::Literal(Literal { value: LiteralValue::Null, .. }))
    }

    /// Returns if this node or any node below it satisfies `pred`.
    ///
    /// Doesn't descend into aggregate filters.
    pub fn contains(&self, pred: &impl Fn(&Node) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Self::Call(call) => call.operands.iter().any(|op| op.contains(pred)),
            _ => false,
        }
    }

    /// Structural equality ignoring source positions.
    pub fn same_shape(&self, other: &Node) -> bool {
        match (self, other) {
            (Self::Call(a), Self::Call(b)) => {
                a.name.eq_ignore_ascii_case(&b.name)
                    && a.syntax.class() == b.syntax.class()
                    && a.quantifier == b.quantifier
                    && a.operands.len() == b.operands.len()
                    && a.operands
                        .iter()
                        .zip(&b.operands)
                        .all(|(x, y)| x.same_shape(y))
            }
            (Self::Literal(a), Self::Literal(b)) => a.value == b.value,
            (Self::Identifier(a), Self::Identifier(b)) => a.matches(b),
            (Self::DynamicParam(a), Self::DynamicParam(b)) => a.index == b.index,
            (Self::TypeSpec(a), Self::TypeSpec(b)) => a.datatype == b.datatype,
            _ => false,
        }
    }
}

impl From<Call> for Node {
    fn from(call: Call) -> Self {
        Node::Call(call)
    }
}

impl From<Literal> for Node {
    fn from(lit: Literal) -> Self {
        Node::Literal(lit)
    }
}

impl From<Identifier> for Node {
    fn from(ident: Identifier) -> Self {
        Node::Identifier(ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(col: u32) -> ParserPos {
        ParserPos::new(1, col)
    }

    #[test]
    fn contains_finds_nested_call() {
        let node = Node::call(
            "OR",
            Syntax::Binary,
            vec![
                Node::identifier("a", pos(1)),
                Node::call(
                    "AND",
                    Syntax::Binary,
                    vec![Node::identifier("b", pos(6)), Node::identifier("c", pos(12))],
                    pos(6),
                ),
            ],
            pos(1),
        );
        let is_and = |n: &Node| n.as_call().is_some_and(|c| c.is_named("and"));
        assert!(node.contains(&is_and));
        assert!(!Node::identifier("x", pos(1)).contains(&is_and));
    }

    #[test]
    fn same_shape_ignores_positions() {
        let a = Node::call("upper", Syntax::Function, vec![Node::identifier("X", pos(7))], pos(1));
        let b = Node::call("UPPER", Syntax::Function, vec![Node::identifier("x", pos(3))], pos(9));
        assert!(a.same_shape(&b));
        assert_ne!(a, b);
    }
}
