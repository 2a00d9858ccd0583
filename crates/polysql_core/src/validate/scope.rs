use std::fmt;

use ahash::RandomState;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::expr::{Identifier, Monotonicity, Node};
use crate::registry::LOOKUP_RANDOM_STATE;
use crate::types::DataType;

/// Clause of the query an expression appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clause {
    Select,
    Where,
    GroupBy,
    Having,
    OrderBy,
}

impl Clause {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Where => "WHERE",
            Self::GroupBy => "GROUP BY",
            Self::Having => "HAVING",
            Self::OrderBy => "ORDER BY",
        }
    }

    /// Returns if aggregate calls may appear in this clause.
    pub const fn allows_aggregates(&self) -> bool {
        !matches!(self, Self::Where | Self::GroupBy)
    }

    /// Returns if GROUPING and friends may appear in this clause.
    pub const fn allows_grouping_functions(&self) -> bool {
        matches!(self, Self::Select | Self::Having | Self::OrderBy)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub datatype: DataType,
    /// Known ordering of the column, e.g. when the input is sorted on it.
    pub monotonicity: Monotonicity,
}

/// What the validator knows about the query surrounding an expression.
#[derive(Debug, Clone)]
pub struct Scope {
    pub clause: Clause,
    /// If the query aggregates, either through GROUP BY or aggregate calls
    /// in the select list.
    pub aggregate: bool,
    pub group_by: Vec<Node>,
    /// Columns keyed by upper case name.
    columns: HashMap<String, ColumnInfo, RandomState>,
}

impl Scope {
    pub fn new(clause: Clause) -> Self {
        Scope {
            clause,
            aggregate: false,
            group_by: Vec::new(),
            columns: HashMap::with_hasher(LOOKUP_RANDOM_STATE),
        }
    }

    pub fn with_column(self, name: &str, datatype: DataType) -> Self {
        self.with_sorted_column(name, datatype, Monotonicity::NotMonotonic)
    }

    pub fn with_sorted_column(
        mut self,
        name: &str,
        datatype: DataType,
        monotonicity: Monotonicity,
    ) -> Self {
        self.columns.insert(
            name.to_ascii_uppercase(),
            ColumnInfo {
                datatype,
                monotonicity,
            },
        );
        self
    }

    /// Mark the query as aggregating without grouping expressions, e.g.
    /// `SELECT COUNT(*) FROM t`.
    pub fn aggregating(mut self) -> Self {
        self.aggregate = true;
        self
    }

    pub fn with_group_by(mut self, exprs: Vec<Node>) -> Self {
        self.aggregate = true;
        self.group_by = exprs;
        self
    }

    pub fn in_clause(mut self, clause: Clause) -> Self {
        self.clause = clause;
        self
    }

    pub fn group_count(&self) -> usize {
        self.group_by.len()
    }

    /// Resolve an identifier, trying the qualified name first and then the
    /// bare column name.
    pub fn column(&self, ident: &Identifier) -> Option<&ColumnInfo> {
        let full = ident.to_string().to_ascii_uppercase();
        self.columns
            .get(&full)
            .or_else(|| self.columns.get(&ident.last().to_ascii_uppercase()))
    }

    /// Returns if `node` is one of the GROUP BY expressions.
    pub fn is_grouped(&self, node: &Node) -> bool {
        self.group_by.iter().any(|expr| expr.same_shape(node))
    }
}
