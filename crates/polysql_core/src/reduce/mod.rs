//! Reduce a flat run of operands and operator names into a call tree.
//!
//! The parser leaves expressions built from infix, prefix, postfix and
//! special operators as a token run. Reduction is precedence climbing over
//! the binding powers in the operator table. Special operators with their
//! own syntax (BETWEEN ... AND, LIKE ... ESCAPE, ITEM, DOT) consume tokens
//! through their reduce hook.
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

use polysql_error::{ParserPos, Result, messages};
use tracing::trace;

use crate::expr::{Call, Node};
use crate::functions::Syntax;
use crate::functions::operator::Operator;
use crate::registry::OperatorTable;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Operand(Node),
    /// Operator as written, e.g. `+` or `NOT BETWEEN SYMMETRIC`.
    Op { name: String, pos: ParserPos },
}

impl Token {
    pub fn op(name: impl Into<String>, pos: ParserPos) -> Self {
        Token::Op {
            name: name.into(),
            pos,
        }
    }

    pub fn pos(&self) -> ParserPos {
        match self {
            Self::Operand(node) => node.pos(),
            Self::Op { pos, .. } => *pos,
        }
    }
}

/// Reduce a complete token run to a single expression.
pub fn reduce(table: &OperatorTable, tokens: Vec<Token>) -> Result<Node> {
    let node = Reducer::new(table, tokens).reduce_all()?;
    trace!(?node, "reduced token run");
    Ok(node)
}

#[derive(Debug)]
pub struct Reducer<'a> {
    table: &'a OperatorTable,
    tokens: Vec<Token>,
    /// Index of the next unconsumed token.
    idx: usize,
}

impl<'a> Reducer<'a> {
    pub fn new(table: &'a OperatorTable, tokens: Vec<Token>) -> Self {
        Reducer {
            table,
            tokens,
            idx: 0,
        }
    }

    /// Tokens not consumed yet.
    pub fn remaining(&self) -> &[Token] {
        &self.tokens[self.idx..]
    }

    pub fn skip(&mut self, n: usize) {
        self.idx = (self.idx + n).min(self.tokens.len());
    }

    /// Returns if the next token is the operator `name`.
    pub fn next_is_op(&self, name: &str) -> bool {
        matches!(self.remaining().first(), Some(Token::Op { name: next, .. }) if next.eq_ignore_ascii_case(name))
    }

    /// Consume the next token, which must be an operand.
    pub fn next_operand(&mut self) -> Result<Node> {
        match self.remaining().first() {
            Some(Token::Operand(node)) => {
                let node = node.clone();
                self.idx += 1;
                Ok(node)
            }
            Some(Token::Op { name, pos }) => {
                Err(messages::malformed_expression(format!("unexpected '{name}'")).with_pos(*pos))
            }
            None => Err(messages::malformed_expression("expression ends unexpectedly")),
        }
    }

    /// Reduce the next `len` tokens on their own, e.g. the lower bound of a
    /// BETWEEN.
    pub fn reduce_span(&mut self, len: usize) -> Result<Node> {
        let end = (self.idx + len).min(self.tokens.len());
        let tokens = self.tokens[self.idx..end].to_vec();
        self.idx = end;
        Reducer::new(self.table, tokens).reduce_all()
    }

    fn reduce_all(&mut self) -> Result<Node> {
        if self.tokens.is_empty() {
            return Err(messages::malformed_expression("empty expression"));
        }
        let node = self.parse_subexpr(0)?;
        match self.remaining().first() {
            None => Ok(node),
            Some(Token::Op { name, pos }) => {
                Err(messages::malformed_expression(format!("unexpected '{name}'")).with_pos(*pos))
            }
            Some(Token::Operand(operand)) => {
                Err(messages::malformed_expression("missing operator between operands")
                    .with_pos(operand.pos()))
            }
        }
    }

    /// Reduce operators binding tighter than `min_prec` to the left.
    pub fn parse_subexpr(&mut self, min_prec: u32) -> Result<Node> {
        let mut expr = self.parse_prefix()?;

        loop {
            let Some(Token::Op { name, pos }) = self.remaining().first() else {
                break;
            };
            let (name, pos) = (name.clone(), *pos);
            let Some(op) = self.infix_operator(&name) else {
                // Keywords such as AND of a BETWEEN or ESCAPE are left to the
                // operator that owns them.
                break;
            };
            if op.left_prec <= min_prec {
                break;
            }
            self.idx += 1;

            expr = match (op.hooks.reduce, op.syntax) {
                (Some(reduce), _) => reduce(self, expr, op, pos)?,
                (None, Syntax::Postfix) => make_call(op, vec![expr], pos),
                (None, _) => {
                    let right = self.parse_subexpr(op.right_prec)?;
                    make_call(op, vec![expr, right], pos)
                }
            };
        }

        Ok(expr)
    }

    fn parse_prefix(&mut self) -> Result<Node> {
        match self.remaining().first() {
            Some(Token::Operand(_)) => self.next_operand(),
            Some(Token::Op { name, pos }) => {
                let (name, pos) = (name.clone(), *pos);
                let Some(op) = self.table.lookup_first(&name, Syntax::Prefix) else {
                    return Err(
                        messages::malformed_expression(format!("unexpected '{name}'")).with_pos(pos)
                    );
                };
                self.idx += 1;
                let operand = self.parse_subexpr(op.right_prec)?;
                Ok(make_call(op, vec![operand], pos))
            }
            None => Err(messages::malformed_expression("expression ends unexpectedly")),
        }
    }

    fn infix_operator(&self, name: &str) -> Option<&'static Operator> {
        [Syntax::Binary, Syntax::Postfix, Syntax::Special]
            .into_iter()
            .find_map(|syntax| self.table.lookup_first(name, syntax))
    }
}

fn make_call(op: &'static Operator, operands: Vec<Node>, pos: ParserPos) -> Node {
    let pos = ParserPos::sum(operands.iter().map(|n| n.pos()).chain([pos]));
    Call::new(op.name, op.syntax, operands, pos).into()
}

#[cfg(test)]
mod tests {
    use polysql_error::ErrorKind;

    use super::testutil::parse_expr;
    use super::*;

    fn table() -> &'static OperatorTable {
        OperatorTable::standard()
    }

    /// Render a tree with every call in function form.
    fn sexpr(node: &Node) -> String {
        match node {
            Node::Call(call) => {
                let operands: Vec<_> = call.operands.iter().map(sexpr).collect();
                format!("({} {})", call.name, operands.join(" "))
            }
            Node::Identifier(ident) => ident.to_string(),
            Node::Literal(lit) => lit.value.to_string(),
            Node::DynamicParam(_) => "?".to_string(),
            Node::TypeSpec(spec) => spec.datatype.to_string(),
        }
    }

    fn reduced(text: &str) -> String {
        sexpr(&parse_expr(table(), text).unwrap())
    }

    #[test]
    fn precedence() {
        assert_eq!("(+ a (* b c))", reduced("a + b * c"));
        assert_eq!("(- (- a b) c)", reduced("a - b - c"));
        assert_eq!("(OR a (AND b c))", reduced("a OR b AND c"));
        assert_eq!("(AND (NOT a) b)", reduced("NOT a AND b"));
        assert_eq!("(= (+ a 1) (- 2))", reduced("a + 1 = -2"));
    }

    #[test]
    fn postfix() {
        assert_eq!("(OR (IS NULL a) (IS NOT NULL b))", reduced("a IS NULL OR b IS NOT NULL"));
        assert_eq!("(IS TRUE (= a b))", reduced("a = b IS TRUE"));
    }

    #[test]
    fn between_takes_first_free_and() {
        assert_eq!(
            "(OR (BETWEEN a (OR b c) d) (AND e f))",
            reduced("a BETWEEN b OR c AND d OR e AND f")
        );
        assert_eq!(
            "(AND (BETWEEN a b c) d)",
            reduced("a BETWEEN b AND c AND d")
        );
    }

    #[test]
    fn nested_between() {
        assert_eq!(
            "(BETWEEN a (BETWEEN b c d) e)",
            reduced("a BETWEEN b BETWEEN c AND d AND e")
        );
    }

    #[test]
    fn between_without_and() {
        let err = parse_expr(table(), "a BETWEEN b").unwrap_err();
        assert_eq!(ErrorKind::BetweenWithoutAnd, err.kind());
        assert_eq!(Some(ParserPos::new(1, 3)), err.pos().map(|p| ParserPos::new(p.line, p.column)));
    }

    #[test]
    fn like_escape() {
        assert_eq!("(LIKE a 'x%' '!')", reduced("a LIKE 'x%' ESCAPE '!'"));
        assert_eq!("(AND (NOT LIKE a 'x') b)", reduced("a NOT LIKE 'x' AND b"));
    }

    #[test]
    fn in_list() {
        assert_eq!("(IN a 1 2 3)", reduced("a IN (1, 2, 3)"));
    }

    #[test]
    fn item_and_dot() {
        assert_eq!("(ITEM (ITEM a 1) 2)", reduced("a[1][2]"));
        assert_eq!("(DOT r 'f')", reduced("r.f"));
        assert_eq!("(+ (ITEM a 1) 1)", reduced("a[1] + 1"));
    }

    #[test]
    fn malformed() {
        let err = parse_expr(table(), "a +").unwrap_err();
        assert_eq!(ErrorKind::MalformedExpression, err.kind());
        let err = parse_expr(table(), "a b").unwrap_err();
        assert_eq!(ErrorKind::MalformedExpression, err.kind());
    }
}
