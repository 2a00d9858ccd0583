use std::fmt;

use serde::{Deserialize, Serialize};

use super::family::TypeFamily;

/// The concrete kind of a SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeName {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Real,
    Float,
    Double,
    Date,
    Time,
    TimeWithLocalTimeZone,
    Timestamp,
    TimestampWithLocalTimeZone,
    IntervalYearMonth,
    IntervalDayTime,
    Char,
    Varchar,
    Binary,
    Varbinary,
    Null,
    Any,
    Symbol,
    Multiset,
    Array,
    Map,
    Row,
    Json,
    Geometry,
    File,
    Image,
    Video,
    Audio,
    Cursor,
    ColumnList,
    DynamicStar,
}

impl TypeName {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Decimal => "DECIMAL",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::TimeWithLocalTimeZone => "TIME_WITH_LOCAL_TIME_ZONE",
            Self::Timestamp => "TIMESTAMP",
            Self::TimestampWithLocalTimeZone => "TIMESTAMP_WITH_LOCAL_TIME_ZONE",
            Self::IntervalYearMonth => "INTERVAL_YEAR_MONTH",
            Self::IntervalDayTime => "INTERVAL_DAY_TIME",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Binary => "BINARY",
            Self::Varbinary => "VARBINARY",
            Self::Null => "NULL",
            Self::Any => "ANY",
            Self::Symbol => "SYMBOL",
            Self::Multiset => "MULTISET",
            Self::Array => "ARRAY",
            Self::Map => "MAP",
            Self::Row => "ROW",
            Self::Json => "JSON",
            Self::Geometry => "GEOMETRY",
            Self::File => "FILE",
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Audio => "AUDIO",
            Self::Cursor => "CURSOR",
            Self::ColumnList => "COLUMN_LIST",
            Self::DynamicStar => "DYNAMIC_STAR",
        }
    }

    /// Parse a type name as written in SQL, e.g. in a CAST target.
    pub fn from_sql_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        Some(match upper.as_str() {
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "TINYINT" => Self::TinyInt,
            "SMALLINT" => Self::SmallInt,
            "INTEGER" | "INT" => Self::Integer,
            "BIGINT" => Self::BigInt,
            "DECIMAL" | "DEC" | "NUMERIC" => Self::Decimal,
            "REAL" => Self::Real,
            "FLOAT" => Self::Float,
            "DOUBLE" | "DOUBLE PRECISION" => Self::Double,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "TIMESTAMP" => Self::Timestamp,
            "CHAR" | "CHARACTER" => Self::Char,
            "VARCHAR" | "CHARACTER VARYING" => Self::Varchar,
            "BINARY" => Self::Binary,
            "VARBINARY" | "BINARY VARYING" => Self::Varbinary,
            "JSON" => Self::Json,
            "GEOMETRY" => Self::Geometry,
            "FILE" => Self::File,
            "IMAGE" => Self::Image,
            "VIDEO" => Self::Video,
            "AUDIO" | "SOUND" => Self::Audio,
            "ANY" => Self::Any,
            _ => return None,
        })
    }

    pub const fn allows_precision(&self) -> bool {
        matches!(
            self,
            Self::Decimal
                | Self::Char
                | Self::Varchar
                | Self::Binary
                | Self::Varbinary
                | Self::Time
                | Self::TimeWithLocalTimeZone
                | Self::Timestamp
                | Self::TimestampWithLocalTimeZone
        )
    }

    pub const fn allows_scale(&self) -> bool {
        matches!(self, Self::Decimal)
    }

    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt
        )
    }

    pub const fn is_exact_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::Decimal)
    }

    pub const fn is_approximate_numeric(&self) -> bool {
        matches!(self, Self::Real | Self::Float | Self::Double)
    }

    pub const fn is_numeric(&self) -> bool {
        self.is_exact_numeric() || self.is_approximate_numeric()
    }

    pub const fn is_character(&self) -> bool {
        matches!(self, Self::Char | Self::Varchar)
    }

    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Binary | Self::Varbinary)
    }

    pub const fn is_datetime(&self) -> bool {
        matches!(
            self,
            Self::Date
                | Self::Time
                | Self::TimeWithLocalTimeZone
                | Self::Timestamp
                | Self::TimestampWithLocalTimeZone
        )
    }

    pub const fn is_interval(&self) -> bool {
        matches!(self, Self::IntervalYearMonth | Self::IntervalDayTime)
    }

    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Array | Self::Multiset)
    }

    pub const fn is_multimedia(&self) -> bool {
        matches!(self, Self::File | Self::Image | Self::Video | Self::Audio)
    }

    /// Position in the numeric widening order.
    ///
    /// TINYINT < SMALLINT < INTEGER < BIGINT < DECIMAL < REAL < FLOAT < DOUBLE
    pub const fn numeric_rank(&self) -> Option<u8> {
        Some(match self {
            Self::TinyInt => 0,
            Self::SmallInt => 1,
            Self::Integer => 2,
            Self::BigInt => 3,
            Self::Decimal => 4,
            Self::Real => 5,
            Self::Float => 6,
            Self::Double => 7,
            _ => return None,
        })
    }

    /// Number of decimal digits needed to hold any value of an integer type.
    pub const fn integer_digits(&self) -> Option<u32> {
        Some(match self {
            Self::TinyInt => 3,
            Self::SmallInt => 5,
            Self::Integer => 10,
            Self::BigInt => 19,
            _ => return None,
        })
    }

    /// Varying counterpart of a fixed length type.
    pub const fn to_varying(&self) -> Self {
        match self {
            Self::Char => Self::Varchar,
            Self::Binary => Self::Varbinary,
            other => *other,
        }
    }

    pub const fn is_varying(&self) -> bool {
        matches!(self, Self::Varchar | Self::Varbinary)
    }

    /// The family this type naturally belongs to.
    ///
    /// Two types unify only when their natural families match.
    pub const fn family(&self) -> TypeFamily {
        match self {
            Self::Boolean => TypeFamily::Boolean,
            Self::TinyInt
            | Self::SmallInt
            | Self::Integer
            | Self::BigInt
            | Self::Decimal
            | Self::Real
            | Self::Float
            | Self::Double => TypeFamily::Numeric,
            Self::Date => TypeFamily::Date,
            Self::Time | Self::TimeWithLocalTimeZone => TypeFamily::Time,
            Self::Timestamp | Self::TimestampWithLocalTimeZone => TypeFamily::Timestamp,
            Self::IntervalYearMonth => TypeFamily::IntervalYearMonth,
            Self::IntervalDayTime => TypeFamily::IntervalDayTime,
            Self::Char | Self::Varchar | Self::Json => TypeFamily::Character,
            Self::Binary | Self::Varbinary => TypeFamily::Binary,
            Self::Null => TypeFamily::Null,
            Self::Any | Self::DynamicStar => TypeFamily::Any,
            Self::Symbol => TypeFamily::Symbol,
            Self::Multiset => TypeFamily::Multiset,
            Self::Array => TypeFamily::Array,
            Self::Map => TypeFamily::Map,
            Self::Row => TypeFamily::Row,
            Self::Geometry => TypeFamily::Geo,
            Self::File | Self::Image | Self::Video | Self::Audio => TypeFamily::Multimedia,
            Self::Cursor => TypeFamily::Cursor,
            Self::ColumnList => TypeFamily::ColumnList,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
