//! Untyped input trees and typed output trees.
pub mod literal;
pub mod monotonicity;
pub mod node;
pub mod typed_expr;

pub use literal::{JsonBehavior, JsonWrapper, Literal, LiteralValue, Symbol, TrimFlag};
pub use monotonicity::Monotonicity;
pub use node::{Call, DynamicParam, FunctionQuantifier, Identifier, Node, TypeSpec};
pub use typed_expr::{TypedCall, TypedExpr, TypedExprKind};
