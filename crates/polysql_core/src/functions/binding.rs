use polysql_error::{DbError, OptionExt, ParserPos, Result, messages};

use super::operator::Operator;
use crate::config::ValidatorConfig;
use crate::expr::{Call, LiteralValue, Node, Symbol};
use crate::types::{DataType, TimeUnit, TypeSystem};

/// A call bound to a candidate operator, with its operand types resolved.
///
/// Checkers and inference strategies only see the call through this.
#[derive(Debug, Clone, Copy)]
pub struct CallBinding<'a> {
    pub operator: &'static Operator,
    pub call: &'a Call,
    pub operand_types: &'a [DataType],
    /// Number of GROUP BY expressions of the enclosing query, zero if the
    /// query isn't grouped.
    pub group_count: usize,
    /// If the aggregate call has a FILTER clause.
    pub has_filter: bool,
    pub config: &'a ValidatorConfig,
}

impl<'a> CallBinding<'a> {
    pub fn new(
        operator: &'static Operator,
        call: &'a Call,
        operand_types: &'a [DataType],
        config: &'a ValidatorConfig,
    ) -> Self {
        CallBinding {
            operator,
            call,
            operand_types,
            group_count: 1,
            has_filter: call.filter.is_some(),
            config,
        }
    }

    pub fn with_group_count(mut self, group_count: usize) -> Self {
        self.group_count = group_count;
        self
    }

    pub fn type_system(&self) -> TypeSystem {
        self.config.type_system()
    }

    pub fn operand_count(&self) -> usize {
        self.operand_types.len()
    }

    pub fn operand_type(&self, idx: usize) -> Result<&'a DataType> {
        self.operand_types.get(idx).required("operand type")
    }

    pub fn operand(&self, idx: usize) -> Option<&'a Node> {
        self.call.operands.get(idx)
    }

    pub fn operand_pos(&self, idx: usize) -> ParserPos {
        self.operand(idx).map(|n| n.pos()).unwrap_or(self.call.pos)
    }

    /// Literal value of an operand.
    ///
    /// A negated numeric literal counts as a literal.
    pub fn operand_literal(&self, idx: usize) -> Option<LiteralValue> {
        match self.operand(idx)? {
            Node::Literal(lit) => Some(lit.value.clone()),
            Node::Call(call)
                if call.name == "-"
                    && matches!(call.syntax, super::Syntax::Prefix)
                    && call.operands.len() == 1 =>
            {
                match &call.operands[0] {
                    Node::Literal(lit) => lit.value.negate(),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn is_operand_literal(&self, idx: usize, allow_null: bool) -> bool {
        match self.operand_literal(idx) {
            Some(LiteralValue::Null) => allow_null,
            Some(_) => true,
            None => false,
        }
    }

    /// Returns if the operand is an untyped NULL literal.
    pub fn is_operand_null(&self, idx: usize) -> bool {
        self.operand(idx).is_some_and(|n| n.is_null_literal())
    }

    pub fn operand_symbol(&self, idx: usize) -> Option<Symbol> {
        self.operand_literal(idx)?.as_symbol()
    }

    pub fn operand_time_unit(&self, idx: usize) -> Option<TimeUnit> {
        match self.operand_symbol(idx)? {
            Symbol::TimeUnit(unit) => Some(unit),
            _ => None,
        }
    }

    pub fn operand_i64(&self, idx: usize) -> Option<i64> {
        self.operand_literal(idx)?.as_i64()
    }

    /// Type given as a type operand, e.g. the target of a CAST.
    pub fn operand_type_spec(&self, idx: usize) -> Option<&'a DataType> {
        match self.operand(idx)? {
            Node::TypeSpec(spec) => Some(&spec.datatype),
            _ => None,
        }
    }

    pub fn any_operand_nullable(&self) -> bool {
        self.operand_types.iter().any(|t| t.is_nullable())
    }

    pub fn all_operands_nullable(&self) -> bool {
        self.operand_types.iter().all(|t| t.is_nullable())
    }

    /// The call with actual operand types, e.g. `'UPPER(<INTEGER>)'`.
    pub fn call_signature(&self) -> String {
        let operands: Vec<_> = self
            .operand_types
            .iter()
            .map(|t| format!("<{t}>"))
            .collect();
        format!("'{}'", self.operator.syntax.signature(self.operator.name, &operands))
    }

    /// Error for operand types not matching any allowed signature.
    pub fn new_validation_signature_error(&self) -> DbError {
        messages::can_not_apply_op(
            self.operator.name,
            &self.call_signature(),
            &self.operator.allowed_signatures(),
        )
        .with_pos(self.call.pos)
    }

    /// Attach the call position to an error unless it has a more precise one.
    pub fn new_error(&self, err: DbError) -> DbError {
        err.or_pos(self.call.pos)
    }

    /// Like [`Self::new_error`], positioned at an operand.
    pub fn new_operand_error(&self, idx: usize, err: DbError) -> DbError {
        err.or_pos(self.operand_pos(idx))
    }
}

/// Build a binding for `op` over `operands` typed as `types` and run `f` with
/// it.
#[cfg(test)]
pub(crate) fn with_test_binding<R>(
    op: &'static Operator,
    operands: Vec<Node>,
    types: &[DataType],
    f: impl FnOnce(&CallBinding<'_>) -> R,
) -> R {
    let config = ValidatorConfig::default();
    let call = Call::new(op.name, op.syntax, operands, ParserPos::new(1, 1));
    let binding = CallBinding::new(op, &call, types, &config);
    f(&binding)
}

/// Identifier operands `c0`, `c1`, ... for `n` operands.
#[cfg(test)]
pub(crate) fn column_operands(n: usize) -> Vec<Node> {
    (0..n)
        .map(|i| Node::identifier(format!("c{i}"), ParserPos::new(1, 10 + i as u32 * 4)))
        .collect()
}
