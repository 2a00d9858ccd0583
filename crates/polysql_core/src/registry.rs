//! Operator tables.
//!
//! A table is built once and never mutated afterwards. The standard tables
//! are memoized so every validator shares the same instance.
use std::sync::OnceLock;

use ahash::RandomState;
use hashbrown::HashMap;
use polysql_error::{DbError, Result};
use tracing::debug;

use crate::config::ValidatorConfig;
use crate::functions::Syntax;
use crate::functions::builtin::{STANDARD_GROUPS, oracle};
use crate::functions::documentation::Documentation;
use crate::functions::operator::Operator;

pub(crate) const LOOKUP_RANDOM_STATE: RandomState = RandomState::with_seeds(0, 0, 0, 0);

/// Names scoring below this aren't suggested for a misspelled function.
const SIMILARITY_THRESHOLD: f64 = 0.7;

type LookupMap = HashMap<(String, Syntax), Vec<&'static Operator>, RandomState>;

/// Overloads registered under one name, as returned by
/// [`OperatorTable::describe`].
#[derive(Debug, Clone)]
pub struct OperatorDescription {
    pub name: &'static str,
    pub syntax: Syntax,
    /// Allowed signatures, one per line.
    pub signatures: String,
    pub doc: Option<&'static Documentation>,
}

#[derive(Debug, Clone)]
pub struct OperatorTable {
    /// All operators in registration order.
    operators: Vec<&'static Operator>,
    /// Overloads keyed by upper case name and syntax class.
    lookup: LookupMap,
}

impl OperatorTable {
    pub fn new() -> Self {
        OperatorTable {
            operators: Vec::new(),
            lookup: HashMap::with_hasher(LOOKUP_RANDOM_STATE),
        }
    }

    /// Build a table from groups of operators.
    pub fn try_from_groups(groups: &[&[&'static Operator]]) -> Result<Self> {
        let mut table = Self::new();
        for group in groups {
            for op in group.iter() {
                table.try_register(op)?;
            }
        }
        Ok(table)
    }

    /// Add an operator, erroring if an overload with the same identity is
    /// already registered.
    pub fn try_register(&mut self, op: &'static Operator) -> Result<()> {
        let key = lookup_key(op.name, op.syntax);
        let overloads = self.lookup.entry(key).or_default();
        if let Some(existing) = overloads.iter().find(|existing| existing.same_identity(op)) {
            return Err(DbError::internal(format!(
                "Duplicate operator '{}' with {} operands",
                existing.name,
                existing.operand_count_range()
            )));
        }
        overloads.push(op);
        self.operators.push(op);
        Ok(())
    }

    /// Overloads with the given name and syntax class.
    pub fn lookup(&self, name: &str, syntax: Syntax) -> &[&'static Operator] {
        self.lookup
            .get(&lookup_key(name, syntax))
            .map(|ops| ops.as_slice())
            .unwrap_or(&[])
    }

    /// Overloads accepting `operand_count` operands.
    pub fn lookup_for_arity(
        &self,
        name: &str,
        syntax: Syntax,
        operand_count: usize,
    ) -> Vec<&'static Operator> {
        self.lookup(name, syntax)
            .iter()
            .copied()
            .filter(|op| op.operand_count_range().contains(operand_count))
            .collect()
    }

    /// First overload with the name and syntax class, for callers that only
    /// need precedence.
    pub fn lookup_first(&self, name: &str, syntax: Syntax) -> Option<&'static Operator> {
        self.lookup(name, syntax).first().copied()
    }

    pub fn operators(&self) -> &[&'static Operator] {
        &self.operators
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Closest function name to a misspelled one.
    pub fn suggest(&self, name: &str) -> Option<&'static str> {
        let upper = name.to_ascii_uppercase();
        let mut best: Option<(f64, &'static str)> = None;
        for op in &self.operators {
            if !op.syntax.is_function() {
                continue;
            }
            let score = strsim::jaro(op.name, &upper);
            if score <= SIMILARITY_THRESHOLD {
                continue;
            }
            match best {
                Some((best_score, _)) if best_score >= score => (),
                _ => best = Some((score, op.name)),
            }
        }
        best.map(|(_, name)| name)
    }

    /// Every overload registered under `name`, in any syntax class.
    pub fn describe(&self, name: &str) -> Vec<OperatorDescription> {
        self.operators
            .iter()
            .filter(|op| op.name.eq_ignore_ascii_case(name))
            .map(|op| OperatorDescription {
                name: op.name,
                syntax: op.syntax,
                signatures: op.allowed_signatures(),
                doc: op.doc,
            })
            .collect()
    }

    /// A table resolving operators of `self` first, then of `other`.
    ///
    /// Operators present in both are kept once.
    pub fn chain(&self, other: &OperatorTable) -> OperatorTable {
        let mut table = self.clone();
        for op in &other.operators {
            if table.operators.iter().any(|existing| std::ptr::eq(*existing, *op)) {
                continue;
            }
            table
                .lookup
                .entry(lookup_key(op.name, op.syntax))
                .or_default()
                .push(op);
            table.operators.push(op);
        }
        table
    }

    /// The SQL standard operators.
    pub fn standard() -> &'static OperatorTable {
        static STANDARD: OnceLock<OperatorTable> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let table = builtin_table(STANDARD_GROUPS);
            debug!(operators = table.len(), "built standard operator table");
            table
        })
    }

    /// Oracle functions resolved before the standard operators.
    pub fn standard_with_oracle() -> &'static OperatorTable {
        static WITH_ORACLE: OnceLock<OperatorTable> = OnceLock::new();
        WITH_ORACLE.get_or_init(|| {
            let table = builtin_table(&[oracle::OPERATORS]).chain(Self::standard());
            debug!(operators = table.len(), "built operator table with oracle functions");
            table
        })
    }

    pub fn for_config(config: &ValidatorConfig) -> &'static OperatorTable {
        if config.enable_oracle_functions {
            Self::standard_with_oracle()
        } else {
            Self::standard()
        }
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup_key(name: &str, syntax: Syntax) -> (String, Syntax) {
    (name.to_ascii_uppercase(), syntax.class())
}

/// Build a table from the static catalog.
///
/// # Panics
///
/// Panics if the catalog registers the same overload twice.
fn builtin_table(groups: &[&[&'static Operator]]) -> OperatorTable {
    match OperatorTable::try_from_groups(groups) {
        Ok(table) => table,
        Err(e) => panic!("invalid builtin operator catalog: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use polysql_error::ErrorKind;

    use super::*;
    use crate::functions::builtin::{arith, oracle, string};

    #[test]
    fn standard_has_no_oracle_functions() {
        let table = OperatorTable::standard();
        assert!(table.lookup("DECODE", Syntax::Function).is_empty());
        assert!(!table.lookup("SUBSTRING", Syntax::Function).is_empty());

        let table = OperatorTable::standard_with_oracle();
        assert_eq!(1, table.lookup("decode", Syntax::Function).len());
    }

    #[test]
    fn lookup_by_syntax_class() {
        let table = OperatorTable::standard();
        let binary = table.lookup("-", Syntax::Binary);
        let prefix = table.lookup("-", Syntax::Prefix);
        assert!(binary.iter().any(|op| std::ptr::eq(*op, &arith::MINUS)));
        assert!(prefix.iter().any(|op| std::ptr::eq(*op, &arith::MINUS_PREFIX)));
        // FunctionId and FunctionStar operators are found as functions.
        assert!(!table.lookup("CURRENT_DATE", Syntax::Function).is_empty());
        assert!(!table.lookup("COUNT", Syntax::Function).is_empty());
    }

    #[test]
    fn lookup_for_arity_picks_overload() {
        let table = OperatorTable::standard();
        let ops = table.lookup_for_arity("SUBSTRING", Syntax::Function, 3);
        assert_eq!(1, ops.len());
        assert!(std::ptr::eq(ops[0], &string::SUBSTRING_FOR));
        assert!(table.lookup_for_arity("SUBSTRING", Syntax::Function, 5).is_empty());
    }

    #[test]
    fn duplicate_identity_rejected() {
        let mut table = OperatorTable::new();
        table.try_register(&string::SUBSTRING).unwrap();
        table.try_register(&string::SUBSTRING_FOR).unwrap();
        let err = table.try_register(&string::SUBSTRING).unwrap_err();
        assert_eq!(ErrorKind::Internal, err.kind());
    }

    #[test]
    fn chain_prefers_first_table() {
        let standard = OperatorTable::standard();
        let oracle_table = OperatorTable::try_from_groups(&[oracle::OPERATORS]).unwrap();
        let table = oracle_table.chain(standard).chain(standard);
        let translate = table.lookup("TRANSLATE3", Syntax::Function);
        assert_eq!(1, translate.len());
        assert_eq!(standard.len() + oracle::OPERATORS.len(), table.len());

        assert!(standard.lookup("TRANSLATE3", Syntax::Function).is_empty());
        assert!(standard.lookup("TRANSLATE", Syntax::Function).is_empty());
    }

    #[test]
    fn suggest_similar_name() {
        let table = OperatorTable::standard();
        assert_eq!(Some("SUBSTRING"), table.suggest("substrng"));
        assert_eq!(None, table.suggest("qqqqqq"));
    }

    #[test]
    fn describe_lists_overloads() {
        let table = OperatorTable::standard();
        let descriptions = table.describe("substring");
        assert_eq!(2, descriptions.len());
        assert!(descriptions.iter().any(|d| d.doc.is_some()));
    }

    #[test]
    fn every_context_variable_is_dynamic() {
        use crate::functions::OperatorKind;
        let table = OperatorTable::standard();
        let vars: Vec<_> = table
            .operators()
            .iter()
            .filter(|op| op.kind == OperatorKind::ContextVariable)
            .collect();
        assert!(!vars.is_empty());
        assert!(vars.iter().all(|op| op.flags.dynamic));
    }
}
