//! SQL type model: type kinds, families and unification rules.
pub mod assignment;
pub mod datatype;
pub mod family;
pub mod time_unit;
pub mod type_name;
pub mod type_system;

pub use assignment::{can_assign_from, can_cast_from, can_convert};
pub use datatype::{Comparability, DataType, Field, TypeMeta, derived_field_name};
pub use family::TypeFamily;
pub use time_unit::{IntervalQualifier, TimeUnit};
pub use type_name::TypeName;
pub use type_system::{TypeSystem, least_restrictive};
