use std::fmt;

use polysql_error::{ParserPos, Result};

use super::binding::CallBinding;
use super::checker::{OperandCountRange, OperandTypeChecker};
use super::documentation::{Category, Documentation};
use super::inference::{OperandTypeInference, ReturnTypeInference};
use super::{OperatorKind, Syntax};
use crate::expr::{Call, Monotonicity, Node};
use crate::reduce::Reducer;
use crate::unparse::SqlWriter;

/// Rewrite a call into a different expression before it's validated.
///
/// Returns `None` if the call should be validated as is. The rewritten
/// expression must not trigger the same rewrite again.
pub type RewriteFn = fn(&Call) -> Option<Node>;

/// Reduce an infix operator from a token run. Receives the already reduced
/// left operand.
pub type ReduceFn = fn(&mut Reducer<'_>, Node, &'static Operator, ParserPos) -> Result<Node>;

/// Render a call given the precedence of the surrounding operators on the
/// left and right. Parentheses around the call itself have already been
/// written when needed, in which case both precedences are zero.
pub type UnparseFn = fn(&mut SqlWriter<'_>, &Call, &'static Operator, u32, u32);

/// Extra validation run after the return type has been inferred.
pub type ValidateFn = fn(&CallBinding<'_>) -> Result<()>;

/// Derive a call's monotonicity from its operands' monotonicity.
pub type MonotonicityFn = fn(&CallBinding<'_>, &[Monotonicity]) -> Monotonicity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorFlags {
    /// Value depends on the session or time of execution.
    pub dynamic: bool,
    /// Same operands always give the same result.
    pub deterministic: bool,
    pub aggregate: bool,
    /// Aggregate accepts a FILTER clause.
    pub allows_filter: bool,
    /// Only valid with an OVER clause (RANK, LEAD, ...).
    pub requires_over: bool,
    /// Group window function (TUMBLE, HOP, SESSION).
    pub group_function: bool,
    /// GROUPING, GROUPING_ID and GROUP_ID.
    pub grouping: bool,
}

impl OperatorFlags {
    pub const DEFAULT: OperatorFlags = OperatorFlags {
        dynamic: false,
        deterministic: true,
        aggregate: false,
        allows_filter: false,
        requires_over: false,
        group_function: false,
        grouping: false,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct OperatorHooks {
    pub rewrite: Option<RewriteFn>,
    pub reduce: Option<ReduceFn>,
    pub unparse: Option<UnparseFn>,
    pub validate: Option<ValidateFn>,
    pub monotonicity: Option<MonotonicityFn>,
}

impl OperatorHooks {
    pub const NONE: OperatorHooks = OperatorHooks {
        rewrite: None,
        reduce: None,
        unparse: None,
        validate: None,
        monotonicity: None,
    };
}

/// Catalog record describing one operator overload.
///
/// Overloads are identified by name, syntax class and operand count range,
/// so e.g. SUBSTRING with two and with three operands are separate records.
#[derive(Debug, Clone, Copy)]
pub struct Operator {
    pub name: &'static str,
    pub kind: OperatorKind,
    pub syntax: Syntax,
    /// Binding power towards the left operand.
    pub left_prec: u32,
    /// Binding power towards the right operand.
    pub right_prec: u32,
    pub checker: OperandTypeChecker,
    pub return_type: ReturnTypeInference,
    pub operand_inference: Option<OperandTypeInference>,
    pub category: Category,
    pub flags: OperatorFlags,
    pub hooks: OperatorHooks,
    pub doc: Option<&'static Documentation>,
}

/// Precedence used for function calls.
pub const FUNCTION_PRECEDENCE: u32 = 100;

const fn left_prec(prec: u32, left_assoc: bool) -> u32 {
    if left_assoc { prec } else { prec + 1 }
}

const fn right_prec(prec: u32, left_assoc: bool) -> u32 {
    if left_assoc { prec + 1 } else { prec }
}

impl Operator {
    const fn base(name: &'static str, kind: OperatorKind, syntax: Syntax) -> Self {
        Operator {
            name,
            kind,
            syntax,
            left_prec: FUNCTION_PRECEDENCE,
            right_prec: FUNCTION_PRECEDENCE,
            checker: OperandTypeChecker::Arity(OperandCountRange::any()),
            return_type: ReturnTypeInference::ANY,
            operand_inference: None,
            category: Category::System,
            flags: OperatorFlags::DEFAULT,
            hooks: OperatorHooks::NONE,
            doc: None,
        }
    }

    /// Function written as `NAME(...)`.
    pub const fn function(name: &'static str, kind: OperatorKind) -> Self {
        Self::base(name, kind, Syntax::Function)
    }

    /// Function written without parentheses when it has no operands.
    pub const fn function_id(name: &'static str, kind: OperatorKind) -> Self {
        Self::base(name, kind, Syntax::FunctionId)
    }

    /// Function accepting `*` as its only operand.
    pub const fn function_star(name: &'static str, kind: OperatorKind) -> Self {
        Self::base(name, kind, Syntax::FunctionStar)
    }

    /// Infix operator with an even precedence.
    pub const fn binary(name: &'static str, kind: OperatorKind, prec: u32, left_assoc: bool) -> Self {
        Operator {
            left_prec: left_prec(prec, left_assoc),
            right_prec: right_prec(prec, left_assoc),
            ..Self::base(name, kind, Syntax::Binary)
        }
    }

    pub const fn prefix(name: &'static str, kind: OperatorKind, prec: u32) -> Self {
        Operator {
            left_prec: 0,
            right_prec: prec,
            ..Self::base(name, kind, Syntax::Prefix)
        }
    }

    pub const fn postfix(name: &'static str, kind: OperatorKind, prec: u32) -> Self {
        Operator {
            left_prec: prec,
            right_prec: 0,
            ..Self::base(name, kind, Syntax::Postfix)
        }
    }

    /// Operator with its own syntax and an even precedence.
    pub const fn special(name: &'static str, kind: OperatorKind, prec: u32, left_assoc: bool) -> Self {
        Operator {
            left_prec: left_prec(prec, left_assoc),
            right_prec: right_prec(prec, left_assoc),
            ..Self::base(name, kind, Syntax::Special)
        }
    }

    pub const fn internal(name: &'static str, kind: OperatorKind) -> Self {
        Self::base(name, kind, Syntax::Internal)
    }

    pub const fn with_checker(mut self, checker: OperandTypeChecker) -> Self {
        self.checker = checker;
        self
    }

    pub const fn with_return_type(mut self, return_type: ReturnTypeInference) -> Self {
        self.return_type = return_type;
        self
    }

    pub const fn with_operand_inference(mut self, inference: OperandTypeInference) -> Self {
        self.operand_inference = Some(inference);
        self
    }

    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub const fn with_doc(mut self, doc: &'static Documentation) -> Self {
        self.doc = Some(doc);
        self
    }

    pub const fn dynamic(mut self) -> Self {
        self.flags.dynamic = true;
        self
    }

    pub const fn non_deterministic(mut self) -> Self {
        self.flags.deterministic = false;
        self
    }

    pub const fn aggregate(mut self) -> Self {
        self.flags.aggregate = true;
        self.flags.allows_filter = true;
        self
    }

    /// Aggregate only usable as a window function.
    pub const fn window(mut self) -> Self {
        self.flags.aggregate = true;
        self.flags.requires_over = true;
        self
    }

    pub const fn group_function(mut self) -> Self {
        self.flags.group_function = true;
        self
    }

    pub const fn grouping(mut self) -> Self {
        self.flags.grouping = true;
        self
    }

    pub const fn with_rewrite(mut self, f: RewriteFn) -> Self {
        self.hooks.rewrite = Some(f);
        self
    }

    pub const fn with_reduce(mut self, f: ReduceFn) -> Self {
        self.hooks.reduce = Some(f);
        self
    }

    pub const fn with_unparse(mut self, f: UnparseFn) -> Self {
        self.hooks.unparse = Some(f);
        self
    }

    pub const fn with_validate(mut self, f: ValidateFn) -> Self {
        self.hooks.validate = Some(f);
        self
    }

    pub const fn with_monotonicity(mut self, f: MonotonicityFn) -> Self {
        self.hooks.monotonicity = Some(f);
        self
    }

    pub fn operand_count_range(&self) -> OperandCountRange {
        self.checker.range()
    }

    /// Allowed signatures, one per line, each quoted.
    pub fn allowed_signatures(&self) -> String {
        self.checker.allowed_signatures(self)
    }

    /// Returns if this and `other` are the same overload.
    pub fn same_identity(&self, other: &Operator) -> bool {
        self.name.eq_ignore_ascii_case(other.name)
            && self.syntax.class() == other.syntax.class()
            && self.operand_count_range() == other.operand_count_range()
    }

    pub fn is_aggregate(&self) -> bool {
        self.flags.aggregate
    }

    /// Returns if a call to this operator is written with operator syntax
    /// rather than a function call.
    pub fn is_expression_operator(&self) -> bool {
        matches!(
            self.syntax,
            Syntax::Binary | Syntax::Prefix | Syntax::Postfix | Syntax::Special
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
