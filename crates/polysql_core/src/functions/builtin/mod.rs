//! The builtin operator catalog.
//!
//! Each module holds one group of operators as `pub static` records (the
//! registry and typed trees compare operators by address) plus an
//! `OPERATORS` list registered by the standard table.
pub mod aggregate;
pub mod arith;
pub mod cast;
pub mod collection;
pub mod comparison;
pub mod conditional;
pub mod context;
pub mod datetime;
pub mod grouping;
pub mod json;
pub mod literal_chain;
pub mod logical;
pub mod numeric;
pub mod oracle;
pub mod string;
pub mod window;

use super::operator::Operator;

/// Operator groups making up the standard table, in registration order.
pub static STANDARD_GROUPS: &[&[&Operator]] = &[
    logical::OPERATORS,
    comparison::OPERATORS,
    arith::OPERATORS,
    numeric::OPERATORS,
    string::OPERATORS,
    datetime::OPERATORS,
    context::OPERATORS,
    conditional::OPERATORS,
    cast::OPERATORS,
    collection::OPERATORS,
    aggregate::OPERATORS,
    grouping::OPERATORS,
    window::OPERATORS,
    json::OPERATORS,
    literal_chain::OPERATORS,
];
