use std::fmt;

use serde::{Deserialize, Serialize};

use super::family::TypeFamily;
use super::time_unit::{IntervalQualifier, TimeUnit};
use super::type_name::TypeName;

pub const DEFAULT_CHAR_PRECISION: u32 = 1;
pub const DEFAULT_DATETIME_PRECISION: u32 = 0;
pub const MAX_DATETIME_PRECISION: u32 = 3;
pub const DEFAULT_DECIMAL_PRECISION: u32 = 19;
pub const DEFAULT_DECIMAL_SCALE: u32 = 0;

/// How values of a type may be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Comparability {
    /// Values can't be compared at all.
    None,
    /// Values can be tested for equality only.
    Unordered,
    /// Values have a total order.
    All,
}

/// A named field of a row type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub datatype: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Field {
            name: name.into(),
            datatype,
        }
    }
}

/// Kind-specific attributes of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeMeta {
    None,
    /// ARRAY or MULTISET.
    Collection {
        component: Box<DataType>,
        /// Declared number of dimensions (arrays only).
        dimension: Option<u32>,
        /// Declared max number of elements (arrays only).
        cardinality: Option<u32>,
    },
    Map {
        key: Box<DataType>,
        value: Box<DataType>,
    },
    Row(Vec<Field>),
    Interval(IntervalQualifier),
}

/// Immutable descriptor of the shape of a SQL value.
///
/// The type name determines which of the optional attributes are meaningful.
/// Constructors keep attributes and name consistent, so there's no way to
/// e.g. build an INTEGER with a component type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    name: TypeName,
    nullable: bool,
    precision: Option<u32>,
    scale: Option<u32>,
    meta: TypeMeta,
}

impl DataType {
    /// Create a not null type with default attributes for `name`.
    ///
    /// Structured kinds get ANY components and an empty field list, use the
    /// dedicated constructors to get something more specific.
    pub fn new(name: TypeName) -> Self {
        let (precision, scale) = match name {
            TypeName::Char | TypeName::Binary => (Some(DEFAULT_CHAR_PRECISION), None),
            TypeName::Decimal => (
                Some(DEFAULT_DECIMAL_PRECISION),
                Some(DEFAULT_DECIMAL_SCALE),
            ),
            TypeName::Time
            | TypeName::TimeWithLocalTimeZone
            | TypeName::Timestamp
            | TypeName::TimestampWithLocalTimeZone => (Some(DEFAULT_DATETIME_PRECISION), None),
            _ => (None, None),
        };

        let meta = match name {
            TypeName::Array | TypeName::Multiset => TypeMeta::Collection {
                component: Box::new(DataType::any()),
                dimension: None,
                cardinality: None,
            },
            TypeName::Map => TypeMeta::Map {
                key: Box::new(DataType::any()),
                value: Box::new(DataType::any()),
            },
            TypeName::Row => TypeMeta::Row(Vec::new()),
            TypeName::IntervalYearMonth => {
                TypeMeta::Interval(IntervalQualifier::range(TimeUnit::Year, TimeUnit::Month))
            }
            TypeName::IntervalDayTime => {
                TypeMeta::Interval(IntervalQualifier::range(TimeUnit::Day, TimeUnit::Second))
            }
            _ => TypeMeta::None,
        };

        DataType {
            name,
            nullable: matches!(name, TypeName::Null),
            precision,
            scale,
            meta,
        }
    }

    pub fn boolean() -> Self {
        Self::new(TypeName::Boolean)
    }

    pub fn tinyint() -> Self {
        Self::new(TypeName::TinyInt)
    }

    pub fn smallint() -> Self {
        Self::new(TypeName::SmallInt)
    }

    pub fn integer() -> Self {
        Self::new(TypeName::Integer)
    }

    pub fn bigint() -> Self {
        Self::new(TypeName::BigInt)
    }

    pub fn real() -> Self {
        Self::new(TypeName::Real)
    }

    pub fn float() -> Self {
        Self::new(TypeName::Float)
    }

    pub fn double() -> Self {
        Self::new(TypeName::Double)
    }

    pub fn decimal(precision: u32, scale: u32) -> Self {
        DataType {
            precision: Some(precision),
            scale: Some(scale),
            ..Self::new(TypeName::Decimal)
        }
    }

    pub fn date() -> Self {
        Self::new(TypeName::Date)
    }

    pub fn time(precision: u32) -> Self {
        Self::new(TypeName::Time).with_precision(Some(precision))
    }

    pub fn timestamp(precision: u32) -> Self {
        Self::new(TypeName::Timestamp).with_precision(Some(precision))
    }

    pub fn char(len: u32) -> Self {
        Self::new(TypeName::Char).with_precision(Some(len))
    }

    /// A varchar type, `None` for unbounded length.
    pub fn varchar(len: Option<u32>) -> Self {
        Self::new(TypeName::Varchar).with_precision(len)
    }

    pub fn binary(len: u32) -> Self {
        Self::new(TypeName::Binary).with_precision(Some(len))
    }

    pub fn varbinary(len: Option<u32>) -> Self {
        Self::new(TypeName::Varbinary).with_precision(len)
    }

    /// The type of an untyped NULL literal. Always nullable.
    pub fn null() -> Self {
        Self::new(TypeName::Null)
    }

    pub fn any() -> Self {
        Self::new(TypeName::Any)
    }

    pub fn symbol() -> Self {
        Self::new(TypeName::Symbol)
    }

    pub fn json() -> Self {
        Self::new(TypeName::Json)
    }

    pub fn interval(qualifier: IntervalQualifier) -> Self {
        DataType {
            meta: TypeMeta::Interval(qualifier),
            ..Self::new(qualifier.type_name())
        }
    }

    pub fn array(component: DataType) -> Self {
        Self::array_bounded(component, None, None)
    }

    pub fn array_bounded(
        component: DataType,
        dimension: Option<u32>,
        cardinality: Option<u32>,
    ) -> Self {
        DataType {
            meta: TypeMeta::Collection {
                component: Box::new(component),
                dimension,
                cardinality,
            },
            ..Self::new(TypeName::Array)
        }
    }

    pub fn multiset(component: DataType) -> Self {
        DataType {
            meta: TypeMeta::Collection {
                component: Box::new(component),
                dimension: None,
                cardinality: None,
            },
            ..Self::new(TypeName::Multiset)
        }
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        DataType {
            meta: TypeMeta::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
            ..Self::new(TypeName::Map)
        }
    }

    pub fn row(fields: Vec<Field>) -> Self {
        DataType {
            meta: TypeMeta::Row(fields),
            ..Self::new(TypeName::Row)
        }
    }

    /// Row type with positional field names (`EXPR$0`, `EXPR$1`, ...).
    pub fn row_from_types(types: impl IntoIterator<Item = DataType>) -> Self {
        let fields = types
            .into_iter()
            .enumerate()
            .map(|(idx, datatype)| Field::new(derived_field_name(idx), datatype))
            .collect();
        Self::row(fields)
    }

    /// Return a copy with a different nullability.
    ///
    /// NULL types are always nullable.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable || matches!(self.name, TypeName::Null);
        self
    }

    /// Return a copy with a different precision.
    ///
    /// Ignored for kinds that don't take a precision.
    pub fn with_precision(mut self, precision: Option<u32>) -> Self {
        if self.name.allows_precision() {
            self.precision = precision;
        }
        self
    }

    /// Return a copy with the type name switched to its varying counterpart.
    pub fn to_varying(mut self) -> Self {
        self.name = self.name.to_varying();
        self
    }

    pub fn name(&self) -> TypeName {
        self.name
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    pub fn scale(&self) -> Option<u32> {
        self.scale
    }

    pub fn meta(&self) -> &TypeMeta {
        &self.meta
    }

    pub fn family(&self) -> TypeFamily {
        self.name.family()
    }

    pub fn is_null_type(&self) -> bool {
        matches!(self.name, TypeName::Null)
    }

    pub fn component(&self) -> Option<&DataType> {
        match &self.meta {
            TypeMeta::Collection { component, .. } => Some(component),
            _ => None,
        }
    }

    pub fn dimension(&self) -> Option<u32> {
        match &self.meta {
            TypeMeta::Collection { dimension, .. } => *dimension,
            _ => None,
        }
    }

    pub fn cardinality(&self) -> Option<u32> {
        match &self.meta {
            TypeMeta::Collection { cardinality, .. } => *cardinality,
            _ => None,
        }
    }

    pub fn key_type(&self) -> Option<&DataType> {
        match &self.meta {
            TypeMeta::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn value_type(&self) -> Option<&DataType> {
        match &self.meta {
            TypeMeta::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn fields(&self) -> &[Field] {
        match &self.meta {
            TypeMeta::Row(fields) => fields,
            _ => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields()
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn interval_qualifier(&self) -> Option<IntervalQualifier> {
        match &self.meta {
            TypeMeta::Interval(q) => Some(*q),
            _ => None,
        }
    }

    /// Integer digits and scale of an exact numeric type.
    ///
    /// Integers report the digits needed to hold their full range.
    pub fn exact_digits(&self) -> Option<(u32, u32)> {
        if let Some(digits) = self.name.integer_digits() {
            return Some((digits, 0));
        }
        if self.name == TypeName::Decimal {
            let precision = self.precision.unwrap_or(DEFAULT_DECIMAL_PRECISION);
            let scale = self.scale.unwrap_or(DEFAULT_DECIMAL_SCALE);
            return Some((precision.saturating_sub(scale), scale));
        }
        None
    }

    /// Comparability derived from the type kind.
    pub fn comparability(&self) -> Comparability {
        match self.name {
            TypeName::Multiset | TypeName::Map | TypeName::Array | TypeName::Json => {
                Comparability::Unordered
            }
            TypeName::Row => self
                .fields()
                .iter()
                .map(|f| f.datatype.comparability())
                .min()
                .unwrap_or(Comparability::All),
            TypeName::Symbol
            | TypeName::Cursor
            | TypeName::ColumnList
            | TypeName::Geometry
            | TypeName::File
            | TypeName::Image
            | TypeName::Video
            | TypeName::Audio => Comparability::None,
            _ => Comparability::All,
        }
    }

    /// Type string including nullability, e.g. `INTEGER NOT NULL`.
    pub fn full_type_string(&self) -> String {
        if self.nullable {
            self.to_string()
        } else {
            format!("{self} NOT NULL")
        }
    }

    /// Compare ignoring nullability at every level.
    pub fn equals_ignore_nullability(&self, other: &DataType) -> bool {
        self.clone().with_nullable(true).strip_nested_nullability()
            == other.clone().with_nullable(true).strip_nested_nullability()
    }

    fn strip_nested_nullability(mut self) -> Self {
        self.meta = match self.meta {
            TypeMeta::Collection {
                component,
                dimension,
                cardinality,
            } => TypeMeta::Collection {
                component: Box::new(component.with_nullable(true).strip_nested_nullability()),
                dimension,
                cardinality,
            },
            TypeMeta::Map { key, value } => TypeMeta::Map {
                key: Box::new(key.with_nullable(true).strip_nested_nullability()),
                value: Box::new(value.with_nullable(true).strip_nested_nullability()),
            },
            TypeMeta::Row(fields) => TypeMeta::Row(
                fields
                    .into_iter()
                    .map(|f| {
                        Field::new(f.name, f.datatype.with_nullable(true).strip_nested_nullability())
                    })
                    .collect(),
            ),
            other => other,
        };
        self
    }
}

/// Name used for row fields without an alias.
pub fn derived_field_name(ordinal: usize) -> String {
    format!("EXPR${ordinal}")
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.meta {
            TypeMeta::Collection { component, .. } => write!(f, "{component} {}", self.name),
            TypeMeta::Map { key, value } => write!(f, "({key}, {value}) MAP"),
            TypeMeta::Row(fields) => {
                write!(f, "RecordType(")?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", field.datatype, field.name)?;
                }
                write!(f, ")")
            }
            TypeMeta::Interval(q) => write!(f, "INTERVAL {q}"),
            TypeMeta::None => match (self.precision, self.scale) {
                (Some(p), Some(s)) if self.name.allows_scale() => {
                    write!(f, "{}({p}, {s})", self.name)
                }
                (Some(p), _) if self.name.allows_precision() => write!(f, "{}({p})", self.name),
                _ => write!(f, "{}", self.name),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_types() {
        assert_eq!("INTEGER", DataType::integer().to_string());
        assert_eq!("DECIMAL(10, 2)", DataType::decimal(10, 2).to_string());
        assert_eq!("VARCHAR", DataType::varchar(None).to_string());
        assert_eq!("CHAR(3)", DataType::char(3).to_string());
        assert_eq!(
            "INTEGER ARRAY",
            DataType::array(DataType::integer()).to_string()
        );
        assert_eq!(
            "(VARCHAR(5), DOUBLE) MAP",
            DataType::map(DataType::varchar(Some(5)), DataType::double()).to_string()
        );
        assert_eq!(
            "RecordType(INTEGER EXPR$0, BOOLEAN EXPR$1)",
            DataType::row_from_types([DataType::integer(), DataType::boolean()]).to_string()
        );
        assert_eq!(
            "INTERVAL YEAR TO MONTH",
            DataType::new(TypeName::IntervalYearMonth).to_string()
        );
        assert_eq!("BOOLEAN NOT NULL", DataType::boolean().full_type_string());
    }

    #[test]
    fn null_type_always_nullable() {
        let t = DataType::null().with_nullable(false);
        assert!(t.is_nullable());
    }

    #[test]
    fn precision_ignored_for_kinds_without_one() {
        let t = DataType::integer().with_precision(Some(5));
        assert_eq!(None, t.precision());
    }

    #[test]
    fn comparability_is_derived() {
        assert_eq!(Comparability::All, DataType::integer().comparability());
        assert_eq!(
            Comparability::Unordered,
            DataType::multiset(DataType::integer()).comparability()
        );
        assert_eq!(
            Comparability::None,
            DataType::row(vec![
                Field::new("a", DataType::integer()),
                Field::new("b", DataType::new(TypeName::Image)),
            ])
            .comparability()
        );
    }

    #[test]
    fn exact_digits() {
        assert_eq!(Some((10, 0)), DataType::integer().exact_digits());
        assert_eq!(Some((3, 2)), DataType::decimal(5, 2).exact_digits());
        assert_eq!(None, DataType::double().exact_digits());
    }

    #[test]
    fn equals_ignoring_nullability() {
        let a = DataType::array(DataType::integer().with_nullable(true));
        let b = DataType::array(DataType::integer()).with_nullable(true);
        assert_ne!(a, b);
        assert!(a.equals_ignore_nullability(&b));
    }
}
