//! Return type and operand type inference.
mod consts;
pub mod decimal;

pub use consts::*;
use polysql_error::Result;

use super::binding::CallBinding;
use crate::types::{DataType, TypeName};

/// A type spelled out in a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplicitType {
    pub name: TypeName,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub nullable: bool,
}

impl ExplicitType {
    pub const fn new(name: TypeName) -> Self {
        ExplicitType {
            name,
            precision: None,
            scale: None,
            nullable: false,
        }
    }

    pub const fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub const fn with_scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn to_datatype(&self) -> DataType {
        let datatype = match self.name {
            TypeName::Decimal => DataType::decimal(
                self.precision.unwrap_or(crate::types::datatype::DEFAULT_DECIMAL_PRECISION),
                self.scale.unwrap_or(0),
            ),
            TypeName::Varchar | TypeName::Varbinary => {
                DataType::new(self.name).with_precision(self.precision)
            }
            name => match self.precision {
                Some(precision) => DataType::new(name).with_precision(Some(precision)),
                None => DataType::new(name),
            },
        };
        datatype.with_nullable(self.nullable)
    }
}

/// Adjusts a type derived by another strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTransform {
    /// Nullable if any operand is nullable.
    ToNullable,
    /// Nullable exactly when all operands are nullable.
    ToNullableAll,
    ForceNullable,
    ToNotNullable,
    /// Not null if any operand is not null, otherwise unchanged.
    LeastNullable,
    /// CHAR to VARCHAR, BINARY to VARBINARY.
    ToVarying,
    ToMultiset,
    ToArray,
    /// Component type of a multiset.
    ToMultisetElement,
    /// Type of the single field of a row.
    OnlyColumn,
}

impl TypeTransform {
    pub fn apply(&self, binding: &CallBinding<'_>, datatype: DataType) -> Option<DataType> {
        Some(match self {
            Self::ToNullable => {
                let nullable = datatype.is_nullable() || binding.any_operand_nullable();
                datatype.with_nullable(nullable)
            }
            Self::ToNullableAll => datatype.with_nullable(binding.all_operands_nullable()),
            Self::ForceNullable => datatype.with_nullable(true),
            Self::ToNotNullable => datatype.with_nullable(false),
            Self::LeastNullable => {
                if binding.all_operands_nullable() {
                    datatype
                } else {
                    datatype.with_nullable(false)
                }
            }
            Self::ToVarying => datatype.to_varying(),
            Self::ToMultiset => DataType::multiset(datatype),
            Self::ToArray => DataType::array(datatype),
            Self::ToMultisetElement => datatype.component()?.clone(),
            Self::OnlyColumn => match datatype.fields() {
                [field] => field.datatype.clone(),
                _ => datatype,
            },
        })
    }
}

/// Strategy deriving the type of a call from its operands.
#[derive(Debug, Clone, Copy)]
pub enum ReturnTypeInference {
    Explicit(ExplicitType),
    /// Type of the operand at the index.
    Arg(usize),
    /// Least restrictive type of all operands.
    LeastRestrictive,
    /// Derive with the base strategy, then apply transforms in order.
    Cascade(&'static ReturnTypeInference, &'static [TypeTransform]),
    /// First strategy returning a type wins.
    Chain(&'static [ReturnTypeInference]),
    Custom(fn(&CallBinding<'_>) -> Result<Option<DataType>>),
}

impl ReturnTypeInference {
    pub const ANY: ReturnTypeInference =
        ReturnTypeInference::Explicit(ExplicitType::new(TypeName::Any).nullable());

    pub const fn explicit(name: TypeName) -> Self {
        ReturnTypeInference::Explicit(ExplicitType::new(name))
    }

    /// Returns `Ok(None)` if this strategy doesn't apply to the operand
    /// types.
    pub fn infer(&self, binding: &CallBinding<'_>) -> Result<Option<DataType>> {
        match self {
            Self::Explicit(t) => Ok(Some(t.to_datatype())),
            Self::Arg(idx) => Ok(binding.operand_types.get(*idx).cloned()),
            Self::LeastRestrictive => Ok(binding.type_system().least_restrictive(binding.operand_types)),
            Self::Cascade(base, transforms) => {
                let mut datatype = match base.infer(binding)? {
                    Some(datatype) => datatype,
                    None => return Ok(None),
                };
                for transform in transforms.iter() {
                    datatype = match transform.apply(binding, datatype) {
                        Some(datatype) => datatype,
                        None => return Ok(None),
                    };
                }
                Ok(Some(datatype))
            }
            Self::Chain(strategies) => {
                for strategy in strategies.iter() {
                    if let Some(datatype) = strategy.infer(binding)? {
                        return Ok(Some(datatype));
                    }
                }
                Ok(None)
            }
            Self::Custom(f) => f(binding),
        }
    }
}

/// Strategy for typing operands whose type isn't known from the operand
/// itself: dynamic parameters and untyped NULLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandTypeInference {
    /// Type of the first operand with a known type.
    FirstKnown,
    Boolean,
    Explicit(ExplicitType),
    /// Type of the operand at the index, e.g. the target of a CAST.
    FromOperand(usize),
}

impl OperandTypeInference {
    /// Type for operands that are unknown (`None`) or NULL.
    pub fn infer(&self, operand_types: &[Option<DataType>]) -> Option<DataType> {
        let known = |t: &&Option<DataType>| t.as_ref().is_some_and(|t| !t.is_null_type());
        let datatype = match self {
            Self::FirstKnown => operand_types.iter().find(known)?.clone()?,
            Self::Boolean => DataType::boolean(),
            Self::Explicit(t) => t.to_datatype(),
            Self::FromOperand(idx) => operand_types.get(*idx).filter(known)?.clone()?,
        };
        Some(datatype.with_nullable(true))
    }
}
