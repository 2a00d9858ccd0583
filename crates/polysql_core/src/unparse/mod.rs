//! Render expression trees back to SQL text.
//!
//! Calls are parenthesized only where the surrounding operators would
//! otherwise bind differently when the text is reduced again.
use crate::config::ValidatorConfig;
use crate::expr::{Call, Node};
use crate::functions::Syntax;
use crate::functions::operator::Operator;
use crate::registry::OperatorTable;

/// Render `node` with the operators in `table`.
pub fn unparse(table: &OperatorTable, node: &Node) -> String {
    let mut writer = SqlWriter::new(table);
    writer.write_node(node, 0, 0);
    writer.finish()
}

/// Render `node` honoring the rendering settings in `config`.
pub fn unparse_with_config(table: &OperatorTable, config: &ValidatorConfig, node: &Node) -> String {
    let mut writer = SqlWriter::new(table).with_always_parenthesize(config.always_parenthesize);
    writer.write_node(node, 0, 0);
    writer.finish()
}

#[derive(Debug)]
pub struct SqlWriter<'a> {
    table: &'a OperatorTable,
    buf: String,
    /// No space before the next item, e.g. right after `(`.
    tight: bool,
    always_parenthesize: bool,
    /// Number of calls being written.
    depth: usize,
}

impl<'a> SqlWriter<'a> {
    pub fn new(table: &'a OperatorTable) -> Self {
        SqlWriter {
            table,
            buf: String::new(),
            tight: true,
            always_parenthesize: false,
            depth: 0,
        }
    }

    /// Parenthesize every nested operator expression.
    pub fn with_always_parenthesize(mut self, always: bool) -> Self {
        self.always_parenthesize = always;
        self
    }

    pub fn finish(self) -> String {
        self.buf
    }

    /// Separate the next item from the previous one. Items are kept apart
    /// even when tight if joining them would start a comment, e.g. `- -x`.
    fn space(&mut self, next: &str) {
        let starts_comment = matches!(
            (self.buf.chars().last(), next.chars().next()),
            (Some('-'), Some('-')) | (Some('/'), Some('*'))
        );
        if !self.tight || starts_comment {
            self.buf.push(' ');
        }
        self.tight = false;
    }

    pub fn keyword(&mut self, keyword: &str) {
        self.space(keyword);
        self.buf.push_str(keyword);
    }

    pub fn comma(&mut self) {
        self.buf.push(',');
        self.tight = false;
    }

    pub fn open_paren(&mut self) {
        self.space("(");
        self.buf.push('(');
        self.tight = true;
    }

    pub fn close_paren(&mut self) {
        self.buf.push(')');
        self.tight = false;
    }

    /// `NAME(`
    pub fn open_call(&mut self, name: &str) {
        self.space(name);
        self.buf.push_str(name);
        self.buf.push('(');
        self.tight = true;
    }

    /// `[` directly after the preceding item.
    pub fn open_bracket(&mut self) {
        self.buf.push('[');
        self.tight = true;
    }

    pub fn close_bracket(&mut self) {
        self.buf.push(']');
        self.tight = false;
    }

    /// `.` between a record and a field name.
    pub fn dot(&mut self) {
        self.buf.push('.');
        self.tight = true;
    }

    /// A symbol written directly before its operand, e.g. unary `-`.
    pub fn prefix_symbol(&mut self, symbol: &str) {
        self.space(symbol);
        self.buf.push_str(symbol);
        self.tight = true;
    }

    /// An identifier, quoted unless it's a plain word.
    pub fn identifier(&mut self, name: &str) {
        self.space(name);
        let plain = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if plain {
            self.buf.push_str(name);
        } else {
            self.buf.push('"');
            self.buf.push_str(&name.replace('"', "\"\""));
            self.buf.push('"');
        }
    }

    pub fn write_list(&mut self, nodes: &[Node]) {
        for (idx, node) in nodes.iter().enumerate() {
            if idx > 0 {
                self.comma();
            }
            self.write_node(node, 0, 0);
        }
    }

    /// `NAME([DISTINCT] args) [FILTER (WHERE cond)]`, `NAME(*)`, or a bare
    /// `NAME` for niladic functions written without parentheses.
    pub fn write_function(&mut self, name: &str, call: &Call) {
        match (call.syntax, call.operands.is_empty()) {
            (Syntax::FunctionId, true) => self.keyword(name),
            (Syntax::FunctionStar, true) => {
                self.open_call(name);
                self.buf.push('*');
                self.close_paren();
            }
            _ => {
                self.open_call(name);
                if let Some(quantifier) = call.quantifier {
                    self.keyword(quantifier.as_str());
                }
                self.write_list(&call.operands);
                self.close_paren();
            }
        }

        if let Some(filter) = &call.filter {
            self.keyword("FILTER");
            self.open_paren();
            self.keyword("WHERE");
            self.write_node(filter, 0, 0);
            self.close_paren();
        }
    }

    /// Write a node between operators binding with `left` and `right`
    /// precedence.
    pub fn write_node(&mut self, node: &Node, left: u32, right: u32) {
        match node {
            Node::Call(call) => self.write_call(call, left, right),
            Node::Literal(lit) => self.keyword(&lit.value.to_string()),
            Node::Identifier(ident) => {
                for (idx, name) in ident.names.iter().enumerate() {
                    if idx > 0 {
                        self.dot();
                    }
                    self.identifier(name);
                }
            }
            Node::DynamicParam(_) => self.keyword("?"),
            Node::TypeSpec(spec) => self.keyword(&spec.datatype.to_string()),
        }
    }

    fn resolve(&self, call: &Call) -> Option<&'static Operator> {
        self.table
            .lookup_for_arity(&call.name, call.syntax, call.operands.len())
            .first()
            .copied()
            .or_else(|| self.table.lookup_first(&call.name, call.syntax))
    }

    fn write_call(&mut self, call: &Call, left: u32, right: u32) {
        let Some(op) = self.resolve(call) else {
            let name = call.name.to_ascii_uppercase();
            self.write_function(&name, call);
            return;
        };

        let needs_parens = op.is_expression_operator()
            && ((op.left_prec != 0 && left > op.left_prec)
                || (op.right_prec != 0 && right != 0 && op.right_prec <= right)
                || (self.always_parenthesize && self.depth > 0));

        self.depth += 1;
        if needs_parens {
            self.open_paren();
            self.write_operator(call, op, 0, 0);
            self.close_paren();
        } else {
            self.write_operator(call, op, left, right);
        }
        self.depth -= 1;
    }

    fn write_operator(&mut self, call: &Call, op: &'static Operator, left: u32, right: u32) {
        if let Some(unparse) = op.hooks.unparse {
            unparse(self, call, op, left, right);
            return;
        }

        match (op.syntax, call.operands.as_slice()) {
            (Syntax::Binary, [lhs, rhs]) => {
                self.write_node(lhs, left, op.left_prec);
                self.keyword(op.name);
                self.write_node(rhs, op.right_prec, right);
            }
            (Syntax::Prefix, [operand]) => {
                if op.name.chars().all(|c| c.is_ascii_alphabetic()) {
                    self.keyword(op.name);
                } else {
                    self.prefix_symbol(op.name);
                }
                self.write_node(operand, op.right_prec, right);
            }
            (Syntax::Postfix, [operand]) => {
                self.write_node(operand, left, op.left_prec);
                self.keyword(op.name);
            }
            _ => self.write_function(op.name, call),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::testutil::parse_expr;

    fn table() -> &'static OperatorTable {
        OperatorTable::standard()
    }

    /// Reduce, render, and check the rendered text reduces to the same tree.
    fn round_trip(text: &str) -> String {
        let node = parse_expr(table(), text).unwrap();
        let rendered = unparse(table(), &node);
        let again = parse_expr(table(), &rendered).unwrap();
        assert!(node.same_shape(&again), "{text} rendered as {rendered}");
        rendered
    }

    #[test]
    fn minimal_parentheses() {
        assert_eq!("a + b * c", round_trip("a + b * c"));
        assert_eq!("(a + b) * c", round_trip("(a + b) * c"));
        assert_eq!("a - (b - c)", round_trip("a - (b - c)"));
        assert_eq!("a - b - c", round_trip("(a - b) - c"));
        assert_eq!("NOT (a AND b)", round_trip("NOT (a AND b)"));
        assert_eq!("-x * 2", round_trip("-x * 2"));
    }

    #[test]
    fn nested_prefix_symbols_stay_apart() {
        assert_eq!("- -x", round_trip("-(-x)"));
        assert_eq!("- -x * 2", round_trip("-(-x) * 2"));
        assert_eq!("-(x - y)", round_trip("-(x - y)"));
        assert_eq!("a - -1", round_trip("a - (-1)"));
    }

    #[test]
    fn postfix_operators() {
        assert_eq!("a IS NULL AND b", round_trip("a IS NULL AND b"));
        assert_eq!("(a AND b) IS TRUE", round_trip("(a AND b) IS TRUE"));
    }

    #[test]
    fn functions() {
        assert_eq!("UPPER(s)", round_trip("upper(s)"));
        assert_eq!("COUNT(*)", round_trip("count(*)"));
        assert_eq!("COUNT(DISTINCT a, b)", round_trip("count(distinct a, b)"));
        assert_eq!("SUM(x) FILTER (WHERE x > 1)", round_trip("sum(x) filter (where x > 1)"));
        assert_eq!("CURRENT_DATE", round_trip("current_date"));
    }

    #[test]
    fn special_operators() {
        assert_eq!("a BETWEEN 1 AND 2", round_trip("a between 1 and 2"));
        assert_eq!("a NOT LIKE 'x' ESCAPE '!'", round_trip("a not like 'x' escape '!'"));
        assert_eq!("a IN (1, 2)", round_trip("a in (1, 2)"));
        assert_eq!("CAST(x AS VARCHAR(5))", round_trip("cast(x as varchar(5))"));
        assert_eq!(
            "CASE WHEN a THEN 1 ELSE 2 END",
            round_trip("case when a then 1 else 2 end")
        );
        assert_eq!("ARRAY[1, 2][1]", round_trip("array[1, 2][1]"));
        assert_eq!("r.f", round_trip("r.f"));
    }

    #[test]
    fn translate3_renders_as_translate() {
        let table = OperatorTable::standard_with_oracle();
        let node = parse_expr(table, "translate3(a, 'x', 'y')").unwrap();
        assert_eq!("TRANSLATE(a, 'x', 'y')", unparse(table, &node));
    }

    #[test]
    fn always_parenthesize() {
        let node = parse_expr(table(), "a + b * c AND d").unwrap();
        let config = ValidatorConfig {
            always_parenthesize: true,
            ..Default::default()
        };
        assert_eq!("(a + (b * c)) AND d", unparse_with_config(table(), &config, &node));
        assert_eq!("a + b * c AND d", unparse(table(), &node));
    }
}
