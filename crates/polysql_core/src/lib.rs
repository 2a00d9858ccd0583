//! Operator type inference and validation for SQL expressions.
//!
//! Expressions come in as untyped [`expr::Node`] trees (or flat token runs
//! that still need [`reduce`]-ing), get checked against the operator catalog
//! in an [`registry::OperatorTable`], and come out as typed
//! [`expr::TypedExpr`] trees.
pub mod config;
pub mod expr;
pub mod functions;
pub mod reduce;
pub mod registry;
pub mod types;
pub mod unparse;
pub mod validate;
