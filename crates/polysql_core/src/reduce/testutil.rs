//! Expression scanner used by tests.
//!
//! Turns expression text into the token run a parser would hand over for
//! reduction. Covers literals, identifiers, `?` parameters, multi-word
//! operators, function calls (with DISTINCT, `*` and FILTER), CASE, CAST,
//! ROW and the collection constructors. Adjacent string literals become a
//! literal chain.
use polysql_error::{ParserPos, Result, messages};

use super::{Token, reduce};
use crate::expr::{Call, FunctionQuantifier, Literal, LiteralValue, Node};
use crate::functions::Syntax;
use crate::functions::builtin::literal_chain::LITERAL_CHAIN;
use crate::registry::OperatorTable;
use crate::types::{DataType, IntervalQualifier, TimeUnit};

/// Operators spelled with one or more words. Longer matches win.
const PHRASES: &[&str] = &[
    "IS NOT DISTINCT FROM",
    "IS DISTINCT FROM",
    "IS NOT NULL",
    "IS NULL",
    "IS NOT TRUE",
    "IS TRUE",
    "IS NOT FALSE",
    "IS FALSE",
    "IS NOT UNKNOWN",
    "IS UNKNOWN",
    "IS NOT A SET",
    "IS A SET",
    "IS NOT EMPTY",
    "IS EMPTY",
    "IS NOT JSON VALUE",
    "IS JSON VALUE",
    "IS NOT JSON OBJECT",
    "IS JSON OBJECT",
    "IS NOT JSON ARRAY",
    "IS JSON ARRAY",
    "IS NOT JSON SCALAR",
    "IS JSON SCALAR",
    "NOT BETWEEN SYMMETRIC",
    "NOT BETWEEN",
    "BETWEEN SYMMETRIC",
    "BETWEEN",
    "NOT LIKE",
    "LIKE",
    "NOT SIMILAR TO",
    "SIMILAR TO",
    "NOT IN",
    "IN",
    "MEMBER OF",
    "NOT SUBMULTISET OF",
    "SUBMULTISET OF",
    "MULTISET UNION ALL",
    "MULTISET UNION DISTINCT",
    "MULTISET UNION",
    "MULTISET INTERSECT ALL",
    "MULTISET INTERSECT DISTINCT",
    "MULTISET INTERSECT",
    "MULTISET EXCEPT ALL",
    "MULTISET EXCEPT DISTINCT",
    "MULTISET EXCEPT",
    "NOT",
    "AND",
    "OR",
    "EXISTS",
    "ESCAPE",
];

const SYMBOLS: &[&str] = &[
    "<=", ">=", "<>", "!=", "||", "+", "-", "*", "/", "%", "=", "<", ">", "(", ")", "[", "]", ",", ".",
];

/// Scan `text` into a token run.
pub fn tokens(table: &OperatorTable, text: &str) -> Result<Vec<Token>> {
    let mut scanner = Scanner {
        table,
        lexed: lex(text)?,
        idx: 0,
        params: 0,
    };
    let tokens = scanner.scan_until(&|_| false)?;
    Ok(tokens)
}

/// Scan and reduce `text` into an expression tree.
pub fn parse_expr(table: &OperatorTable, text: &str) -> Result<Node> {
    reduce(table, tokens(table, text)?)
}

#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Number(String),
    Str(String),
    Word(String),
    Param,
    Symbol(&'static str),
}

#[derive(Debug, Clone)]
struct Lexed {
    lexeme: Lexeme,
    pos: ParserPos,
}

fn is_word(lexeme: &Lexeme, word: &str) -> bool {
    matches!(lexeme, Lexeme::Word(w) if w.eq_ignore_ascii_case(word))
}

fn is_symbol(lexeme: &Lexeme, symbol: &str) -> bool {
    matches!(lexeme, Lexeme::Symbol(s) if *s == symbol)
}

fn lex(text: &str) -> Result<Vec<Lexed>> {
    let chars: Vec<char> = text.chars().collect();
    let mut lexed = Vec::new();
    let (mut i, mut line, mut col) = (0, 1u32, 1u32);

    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            i += 1;
            line += 1;
            col = 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            col += 1;
            continue;
        }
        // Line comment.
        if c == '-' && chars.get(i + 1) == Some(&'-') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        let start = i;
        let lexeme = if c == '\'' {
            let mut value = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                        value.push('\'');
                        i += 2;
                    }
                    Some('\'') => {
                        i += 1;
                        break;
                    }
                    Some(c) => {
                        value.push(*c);
                        i += 1;
                    }
                    None => {
                        return Err(messages::malformed_expression("unterminated string literal")
                            .with_pos(ParserPos::new(line, col)));
                    }
                }
            }
            Lexeme::Str(value)
        } else if c.is_ascii_digit() {
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            Lexeme::Number(chars[start..i].iter().collect())
        } else if c.is_alphabetic() || c == '_' || c == '$' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
                i += 1;
            }
            Lexeme::Word(chars[start..i].iter().collect())
        } else if c == '?' {
            i += 1;
            Lexeme::Param
        } else {
            let rest: String = chars[i..(i + 2).min(chars.len())].iter().collect();
            let Some(symbol) = SYMBOLS.iter().find(|s| rest.starts_with(**s)) else {
                return Err(messages::malformed_expression(format!("unexpected character '{c}'"))
                    .with_pos(ParserPos::new(line, col)));
            };
            i += symbol.chars().count();
            Lexeme::Symbol(symbol)
        };

        let len = (i - start) as u32;
        lexed.push(Lexed {
            lexeme,
            pos: ParserPos::with_end(line, col, line, col + len - 1),
        });
        col += len;
    }

    Ok(lexed)
}

struct Scanner<'a> {
    table: &'a OperatorTable,
    lexed: Vec<Lexed>,
    idx: usize,
    params: usize,
}

type Stop<'s> = &'s dyn Fn(&Lexeme) -> bool;

impl Scanner<'_> {
    fn peek(&self, offset: usize) -> Option<&Lexeme> {
        self.lexed.get(self.idx + offset).map(|l| &l.lexeme)
    }

    fn peek_word(&self, offset: usize, word: &str) -> bool {
        self.peek(offset).is_some_and(|l| is_word(l, word))
    }

    fn peek_symbol(&self, offset: usize, symbol: &str) -> bool {
        self.peek(offset).is_some_and(|l| is_symbol(l, symbol))
    }

    fn next(&mut self) -> Option<Lexed> {
        let lexed = self.lexed.get(self.idx).cloned();
        if lexed.is_some() {
            self.idx += 1;
        }
        lexed
    }

    fn unexpected(&self) -> polysql_error::DbError {
        match self.lexed.get(self.idx) {
            Some(lexed) => messages::malformed_expression(format!("unexpected {:?}", lexed.lexeme))
                .with_pos(lexed.pos),
            None => messages::malformed_expression("expression ends unexpectedly"),
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<ParserPos> {
        if !self.peek_symbol(0, symbol) {
            return Err(self.unexpected());
        }
        let pos = self.lexed[self.idx].pos;
        self.idx += 1;
        Ok(pos)
    }

    fn expect_word(&mut self, word: &str) -> Result<ParserPos> {
        if !self.peek_word(0, word) {
            return Err(self.unexpected());
        }
        let pos = self.lexed[self.idx].pos;
        self.idx += 1;
        Ok(pos)
    }

    fn scan_until(&mut self, stop: Stop<'_>) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(lexeme) = self.peek(0) {
            if stop(lexeme) {
                break;
            }
            self.scan_one(&mut tokens)?;
        }
        Ok(tokens)
    }

    fn expr_until(&mut self, stop: Stop<'_>) -> Result<Node> {
        let tokens = self.scan_until(stop)?;
        reduce(self.table, tokens)
    }

    /// Comma separated expressions up to `close`, which is consumed.
    fn list(&mut self, close: &'static str) -> Result<(Vec<Node>, ParserPos)> {
        let mut items = Vec::new();
        if self.peek_symbol(0, close) {
            return Ok((items, self.expect_symbol(close)?));
        }
        loop {
            items.push(self.expr_until(&|l| is_symbol(l, ",") || is_symbol(l, close))?);
            if self.peek_symbol(0, ",") {
                self.idx += 1;
                continue;
            }
            let end = self.expect_symbol(close)?;
            return Ok((items, end));
        }
    }

    fn scan_one(&mut self, tokens: &mut Vec<Token>) -> Result<()> {
        let Some(Lexed { lexeme, pos }) = self.next() else {
            return Ok(());
        };
        match lexeme {
            Lexeme::Number(s) => tokens.push(Token::Operand(number_literal(&s, pos)?)),
            Lexeme::Str(s) => {
                let mut fragments = vec![Node::Literal(Literal::string(s, pos))];
                while let Some(Lexed {
                    lexeme: Lexeme::Str(s),
                    pos,
                }) = self.lexed.get(self.idx).cloned()
                {
                    self.idx += 1;
                    fragments.push(Node::Literal(Literal::string(s, pos)));
                }
                let node = match fragments.len() {
                    1 => fragments.remove(0),
                    _ => {
                        let pos = ParserPos::sum(fragments.iter().map(|f| f.pos()));
                        Node::call(LITERAL_CHAIN.name, Syntax::Internal, fragments, pos)
                    }
                };
                tokens.push(Token::Operand(node));
            }
            Lexeme::Param => {
                tokens.push(Token::Operand(Node::param(self.params, pos)));
                self.params += 1;
            }
            Lexeme::Symbol("(") => {
                let (mut items, end) = self.list(")")?;
                let pos = pos.plus(end);
                let node = match items.len() {
                    0 => return Err(messages::malformed_expression("empty parentheses").with_pos(pos)),
                    1 => items.remove(0),
                    _ => Node::call("ROW", Syntax::Special, items, pos),
                };
                tokens.push(Token::Operand(node));
            }
            Lexeme::Symbol("[") => {
                let index = self.expr_until(&|l| is_symbol(l, "]"))?;
                self.expect_symbol("]")?;
                tokens.push(Token::op("ITEM", pos));
                tokens.push(Token::Operand(index));
            }
            Lexeme::Symbol(".") => tokens.push(Token::op("DOT", pos)),
            Lexeme::Symbol("!=") => tokens.push(Token::op("<>", pos)),
            Lexeme::Symbol(s @ (")" | "]" | ",")) => {
                return Err(messages::malformed_expression(format!("unexpected '{s}'")).with_pos(pos));
            }
            Lexeme::Symbol(s) => tokens.push(Token::op(s, pos)),
            Lexeme::Word(word) => self.scan_word(word, pos, tokens)?,
        }
        Ok(())
    }

    /// Longest operator phrase starting at the word just consumed.
    fn match_phrase(&self, first: &str) -> Option<(&'static str, usize)> {
        PHRASES.iter().find_map(|phrase| {
            let words: Vec<_> = phrase.split(' ').collect();
            if !words[0].eq_ignore_ascii_case(first) {
                return None;
            }
            let rest_matches = words[1..]
                .iter()
                .enumerate()
                .all(|(offset, word)| self.peek_word(offset, word));
            rest_matches.then_some((*phrase, words.len() - 1))
        })
    }

    fn scan_word(&mut self, word: String, pos: ParserPos, tokens: &mut Vec<Token>) -> Result<()> {
        let upper = word.to_ascii_uppercase();
        let followed_by = |s: &Self, symbol| s.peek_symbol(0, symbol);

        // MULTISET[...] is a constructor, not a set operator.
        if !(upper == "MULTISET" && followed_by(self, "[")) {
            if let Some((phrase, extra_words)) = self.match_phrase(&upper) {
                let end = match extra_words {
                    0 => pos,
                    n => self.lexed[self.idx + n - 1].pos,
                };
                self.idx += extra_words;
                let name = phrase.strip_suffix(" DISTINCT").unwrap_or(phrase);
                tokens.push(Token::op(name, pos.plus(end)));
                return Ok(());
            }
        }

        let node = match upper.as_str() {
            "NULL" => Literal::null(pos).into(),
            "TRUE" => Literal::boolean(true, pos).into(),
            "FALSE" => Literal::boolean(false, pos).into(),
            "CASE" => self.scan_case(pos)?,
            "CAST" if followed_by(self, "(") => self.scan_cast(pos)?,
            "ROW" if followed_by(self, "(") => {
                self.idx += 1;
                let (items, end) = self.list(")")?;
                Node::call("ROW", Syntax::Special, items, pos.plus(end))
            }
            "ARRAY" | "MULTISET" | "MAP" if followed_by(self, "[") => {
                self.idx += 1;
                let (items, end) = self.list("]")?;
                Node::call(upper.clone(), Syntax::Special, items, pos.plus(end))
            }
            "INTERVAL" | "DATE" | "TIME" | "TIMESTAMP" if matches!(self.peek(0), Some(Lexeme::Str(_))) => {
                self.scan_typed_literal(&upper, pos)?
            }
            _ if followed_by(self, "(") => self.scan_function(upper.clone(), pos)?,
            _ if self.is_function_id(&upper) => {
                Node::call(upper.clone(), Syntax::FunctionId, Vec::new(), pos)
            }
            _ => Node::identifier(word, pos),
        };
        tokens.push(Token::Operand(node));
        Ok(())
    }

    fn is_function_id(&self, name: &str) -> bool {
        self.table
            .lookup(name, Syntax::Function)
            .iter()
            .any(|op| op.syntax == Syntax::FunctionId)
    }

    fn scan_function(&mut self, name: String, pos: ParserPos) -> Result<Node> {
        self.expect_symbol("(")?;

        if self.peek_symbol(0, "*") && self.peek_symbol(1, ")") {
            self.idx += 1;
            let end = self.expect_symbol(")")?;
            let call = Call::new(name, Syntax::FunctionStar, Vec::new(), pos.plus(end));
            return self.scan_filter(call);
        }

        let quantifier = if self.peek_word(0, "DISTINCT") {
            self.idx += 1;
            Some(FunctionQuantifier::Distinct)
        } else if self.peek_word(0, "ALL") {
            self.idx += 1;
            Some(FunctionQuantifier::All)
        } else {
            None
        };

        let (operands, end) = if name == "EXTRACT" && self.peek_word(1, "FROM") {
            let unit = self.scan_time_unit()?;
            self.expect_word("FROM")?;
            let value = self.expr_until(&|l| is_symbol(l, ")"))?;
            let end = self.expect_symbol(")")?;
            (vec![unit, value], end)
        } else {
            self.list(")")?
        };

        let mut call = Call::new(name, Syntax::Function, operands, pos.plus(end));
        call.quantifier = quantifier;
        self.scan_filter(call)
    }

    /// `FILTER (WHERE condition)` after an aggregate call.
    fn scan_filter(&mut self, call: Call) -> Result<Node> {
        if !(self.peek_word(0, "FILTER") && self.peek_symbol(1, "(") && self.peek_word(2, "WHERE")) {
            return Ok(call.into());
        }
        self.idx += 3;
        let filter = self.expr_until(&|l| is_symbol(l, ")"))?;
        self.expect_symbol(")")?;
        Ok(call.with_filter(filter).into())
    }

    fn next_time_unit(&mut self) -> Result<(TimeUnit, ParserPos)> {
        match self.next() {
            Some(Lexed {
                lexeme: Lexeme::Word(word),
                pos,
            }) => match TimeUnit::from_name(&word) {
                Some(unit) => Ok((unit, pos)),
                None => Err(messages::malformed_expression(format!("unknown time unit '{word}'"))
                    .with_pos(pos)),
            },
            _ => Err(messages::malformed_expression("expected a time unit")),
        }
    }

    fn scan_time_unit(&mut self) -> Result<Node> {
        let (unit, pos) = self.next_time_unit()?;
        Ok(Literal::time_unit(unit, pos).into())
    }

    /// `CASE [value] WHEN a THEN b ... [ELSE c] END`
    ///
    /// A missing ELSE is a NULL.
    fn scan_case(&mut self, pos: ParserPos) -> Result<Node> {
        let mut operands = Vec::new();
        if !self.peek_word(0, "WHEN") {
            operands.push(self.expr_until(&|l| is_word(l, "WHEN"))?);
        }
        while self.peek_word(0, "WHEN") {
            self.idx += 1;
            operands.push(self.expr_until(&|l| is_word(l, "THEN"))?);
            self.expect_word("THEN")?;
            operands.push(self.expr_until(&|l| {
                is_word(l, "WHEN") || is_word(l, "ELSE") || is_word(l, "END")
            })?);
        }
        if self.peek_word(0, "ELSE") {
            self.idx += 1;
            operands.push(self.expr_until(&|l| is_word(l, "END"))?);
        } else {
            operands.push(Literal::null(ParserPos::ZERO).into());
        }
        let end = self.expect_word("END")?;
        Ok(Node::call("CASE", Syntax::Special, operands, pos.plus(end)))
    }

    /// `CAST(value AS type)`
    fn scan_cast(&mut self, pos: ParserPos) -> Result<Node> {
        self.expect_symbol("(")?;
        let value = self.expr_until(&|l| is_word(l, "AS"))?;
        self.expect_word("AS")?;
        let type_pos = self.lexed.get(self.idx).map(|l| l.pos).unwrap_or(pos);
        let datatype = self.scan_type()?;
        let end = self.expect_symbol(")")?;
        Ok(Node::call(
            "CAST",
            Syntax::Special,
            vec![value, Node::type_spec(datatype, type_pos)],
            pos.plus(end),
        ))
    }

    fn scan_type(&mut self) -> Result<DataType> {
        let Some(Lexed {
            lexeme: Lexeme::Word(name),
            pos,
        }) = self.next()
        else {
            return Err(messages::malformed_expression("expected a type name"));
        };

        let mut params = Vec::new();
        if self.peek_symbol(0, "(") {
            self.idx += 1;
            loop {
                match self.next() {
                    Some(Lexed {
                        lexeme: Lexeme::Number(n),
                        pos,
                    }) => params.push(n.parse::<u32>().map_err(|_| {
                        messages::malformed_expression(format!("invalid type parameter '{n}'"))
                            .with_pos(pos)
                    })?),
                    _ => return Err(messages::malformed_expression("expected a type parameter")),
                }
                if self.peek_symbol(0, ",") {
                    self.idx += 1;
                    continue;
                }
                self.expect_symbol(")")?;
                break;
            }
        }

        let first = params.first().copied();
        let datatype = match name.to_ascii_uppercase().as_str() {
            "BOOLEAN" => DataType::boolean(),
            "INT" | "INTEGER" => DataType::integer(),
            "BIGINT" => DataType::bigint(),
            "DOUBLE" => DataType::double(),
            "DATE" => DataType::date(),
            "TIME" => DataType::time(first.unwrap_or(0)),
            "TIMESTAMP" => DataType::timestamp(first.unwrap_or(0)),
            "CHAR" => DataType::char(first.unwrap_or(1)),
            "VARCHAR" => DataType::varchar(first),
            "DECIMAL" => DataType::decimal(
                first.unwrap_or(crate::types::datatype::DEFAULT_DECIMAL_PRECISION),
                params.get(1).copied().unwrap_or(0),
            ),
            other => {
                return Err(messages::malformed_expression(format!("unknown type '{other}'"))
                    .with_pos(pos));
            }
        };
        Ok(datatype)
    }

    /// `INTERVAL '1' DAY`, `DATE '2020-01-01'`, ...
    fn scan_typed_literal(&mut self, kind: &str, pos: ParserPos) -> Result<Node> {
        let Some(Lexed {
            lexeme: Lexeme::Str(value),
            pos: end,
        }) = self.next()
        else {
            return Err(self.unexpected());
        };
        let (value, pos) = match kind {
            "INTERVAL" => {
                let (unit, unit_pos) = self.next_time_unit()?;
                let (negative, digits) = match value.strip_prefix('-') {
                    Some(digits) => (true, digits.to_string()),
                    None => (false, value),
                };
                let qualifier = IntervalQualifier::single(unit);
                (
                    LiteralValue::Interval {
                        value: digits,
                        negative,
                        qualifier,
                    },
                    pos.plus(unit_pos),
                )
            }
            "DATE" => (LiteralValue::Date(value), pos.plus(end)),
            "TIME" => (LiteralValue::Time(value), pos.plus(end)),
            _ => (LiteralValue::Timestamp(value), pos.plus(end)),
        };
        Ok(Node::literal(value, pos))
    }
}

fn number_literal(text: &str, pos: ParserPos) -> Result<Node> {
    let invalid = || messages::malformed_expression(format!("invalid number '{text}'")).with_pos(pos);
    let literal = match text.split_once('.') {
        Some((int, frac)) => {
            let unscaled = format!("{int}{frac}").parse::<i128>().map_err(|_| invalid())?;
            Literal::decimal(unscaled, frac.len() as u32, pos)
        }
        None => match text.parse::<i64>() {
            Ok(v) => Literal::integer(v, pos),
            Err(_) => Literal::decimal(text.parse::<i128>().map_err(|_| invalid())?, 0, pos),
        },
    };
    Ok(literal.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static OperatorTable {
        OperatorTable::standard()
    }

    #[test]
    fn multi_word_operators() {
        let toks = tokens(table(), "a IS NOT DISTINCT FROM b").unwrap();
        assert_eq!(3, toks.len());
        assert!(matches!(&toks[1], Token::Op { name, .. } if name == "IS NOT DISTINCT FROM"));

        let toks = tokens(table(), "m MULTISET UNION DISTINCT n").unwrap();
        assert!(matches!(&toks[1], Token::Op { name, .. } if name == "MULTISET UNION"));
    }

    #[test]
    fn positions() {
        let toks = tokens(table(), "ab +\n  cd").unwrap();
        assert_eq!(ParserPos::with_end(1, 1, 1, 2), toks[0].pos());
        assert_eq!(ParserPos::new(1, 4), toks[1].pos());
        assert_eq!(ParserPos::with_end(2, 3, 2, 4), toks[2].pos());
    }

    #[test]
    fn function_calls() {
        let node = parse_expr(table(), "count(*)").unwrap();
        let call = node.as_call().unwrap();
        assert_eq!(Syntax::FunctionStar, call.syntax);
        assert!(call.operands.is_empty());

        let node = parse_expr(table(), "SUM(DISTINCT x) FILTER (WHERE x > 1)").unwrap();
        let call = node.as_call().unwrap();
        assert_eq!(Some(FunctionQuantifier::Distinct), call.quantifier);
        assert!(call.filter.is_some());

        let node = parse_expr(table(), "CURRENT_DATE").unwrap();
        assert_eq!(Syntax::FunctionId, node.as_call().unwrap().syntax);
    }

    #[test]
    fn literal_chain() {
        let node = parse_expr(table(), "'ab'\n'cd'").unwrap();
        let call = node.as_call().unwrap();
        assert_eq!(Syntax::Internal, call.syntax);
        assert_eq!(2, call.operands.len());
    }

    #[test]
    fn case_without_else() {
        let node = parse_expr(table(), "CASE WHEN a THEN 1 END").unwrap();
        let call = node.as_call().unwrap();
        assert_eq!(3, call.operands.len());
        assert!(call.operands[2].is_null_literal());
    }

    #[test]
    fn cast_and_extract() {
        let node = parse_expr(table(), "CAST(x AS DECIMAL(5, 2))").unwrap();
        let call = node.as_call().unwrap();
        assert!(matches!(&call.operands[1], Node::TypeSpec(spec) if spec.datatype == DataType::decimal(5, 2)));

        let node = parse_expr(table(), "EXTRACT(YEAR FROM d)").unwrap();
        let call = node.as_call().unwrap();
        assert_eq!(2, call.operands.len());
    }
}
