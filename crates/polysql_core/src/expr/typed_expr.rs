use polysql_error::ParserPos;
use serde::{Serialize, Serializer};

use super::literal::{Literal, LiteralValue};
use super::monotonicity::Monotonicity;
use super::node::{Call, FunctionQuantifier, Identifier, Node};
use crate::functions::operator::Operator;
use crate::types::DataType;

/// A validated expression with its resolved type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub datatype: DataType,
    pub monotonicity: Monotonicity,
    pub pos: ParserPos,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedExprKind {
    Call(TypedCall),
    Literal(LiteralValue),
    Column(Identifier),
    Parameter { index: usize },
    TypeSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypedCall {
    #[serde(serialize_with = "serialize_operator")]
    pub operator: &'static Operator,
    pub operands: Vec<TypedExpr>,
    pub quantifier: Option<FunctionQuantifier>,
    pub filter: Option<Box<TypedExpr>>,
}

impl PartialEq for TypedCall {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.operator, other.operator)
            && self.operands == other.operands
            && self.quantifier == other.quantifier
            && self.filter == other.filter
    }
}

fn serialize_operator<S: Serializer>(op: &&'static Operator, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(op.name)
}

impl TypedExpr {
    pub fn as_call(&self) -> Option<&TypedCall> {
        match &self.kind {
            TypedExprKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Operator of a call expression.
    pub fn operator(&self) -> Option<&'static Operator> {
        self.as_call().map(|c| c.operator)
    }

    /// Returns if this expression or any expression below it satisfies `pred`.
    pub fn any(&self, pred: &impl Fn(&TypedExpr) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match &self.kind {
            TypedExprKind::Call(call) => {
                call.operands.iter().any(|e| e.any(pred))
                    || call.filter.as_ref().is_some_and(|f| f.any(pred))
            }
            _ => false,
        }
    }

    /// Returns if the result of this expression may be reused across
    /// executions.
    ///
    /// Expressions containing dynamic or non-deterministic functions (e.g.
    /// CURRENT_DATE, RAND, USER) are never cacheable.
    pub fn is_cacheable(&self) -> bool {
        !self.any(&|e| {
            e.operator()
                .is_some_and(|op| op.flags.dynamic || !op.flags.deterministic)
        })
    }

    /// Convert back into an untyped tree, e.g. for rendering.
    pub fn to_node(&self) -> Node {
        match &self.kind {
            TypedExprKind::Call(call) => Node::Call(Call {
                name: call.operator.name.to_string(),
                syntax: call.operator.syntax,
                operands: call.operands.iter().map(|e| e.to_node()).collect(),
                pos: self.pos,
                quantifier: call.quantifier,
                filter: call.filter.as_ref().map(|f| Box::new(f.to_node())),
            }),
            TypedExprKind::Literal(value) => Node::Literal(Literal::new(value.clone(), self.pos)),
            TypedExprKind::Column(ident) => Node::Identifier(ident.clone()),
            TypedExprKind::Parameter { index } => Node::param(*index, self.pos),
            TypedExprKind::TypeSpec => Node::type_spec(self.datatype.clone(), self.pos),
        }
    }
}
