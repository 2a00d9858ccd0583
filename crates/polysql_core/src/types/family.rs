use std::fmt;

use serde::{Deserialize, Serialize};

use super::type_name::TypeName;

/// Classification used for operand compatibility checks.
///
/// Some families are "natural" families returned by [`TypeName::family`],
/// others (e.g. `String`, `Datetime`, `ExactNumeric`) are only used as
/// predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeFamily {
    Character,
    Binary,
    Numeric,
    Date,
    Time,
    Timestamp,
    Boolean,
    IntervalYearMonth,
    IntervalDayTime,
    Multiset,
    Array,
    Map,
    Row,
    Null,
    Any,
    Symbol,
    Cursor,
    ColumnList,
    Geo,
    Multimedia,

    // Predicate families.
    String,
    ExactNumeric,
    Integer,
    ApproximateNumeric,
    Datetime,
    DatetimeInterval,
    /// Arrays or multisets.
    Collection,
}

impl TypeFamily {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Character => "CHARACTER",
            Self::Binary => "BINARY",
            Self::Numeric => "NUMERIC",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Boolean => "BOOLEAN",
            Self::IntervalYearMonth => "INTERVAL_YEAR_MONTH",
            Self::IntervalDayTime => "INTERVAL_DAY_TIME",
            Self::Multiset => "MULTISET",
            Self::Array => "ARRAY",
            Self::Map => "MAP",
            Self::Row => "ROW",
            Self::Null => "NULL",
            Self::Any => "ANY",
            Self::Symbol => "SYMBOL",
            Self::Cursor => "CURSOR",
            Self::ColumnList => "COLUMN_LIST",
            Self::Geo => "GEO",
            Self::Multimedia => "MULTIMEDIA",
            Self::String => "STRING",
            Self::ExactNumeric => "EXACT_NUMERIC",
            Self::Integer => "INTEGER",
            Self::ApproximateNumeric => "APPROXIMATE_NUMERIC",
            Self::Datetime => "DATETIME",
            Self::DatetimeInterval => "DATETIME_INTERVAL",
            Self::Collection => "COLLECTION",
        }
    }

    /// Returns if values of type `name` belong to this family.
    pub const fn contains(&self, name: TypeName) -> bool {
        match self {
            Self::Any => true,
            Self::Character => name.is_character() || matches!(name, TypeName::Json),
            Self::Binary => name.is_binary(),
            Self::String => {
                name.is_character() || name.is_binary() || matches!(name, TypeName::Json)
            }
            Self::Numeric => name.is_numeric(),
            Self::ExactNumeric => name.is_exact_numeric(),
            Self::Integer => name.is_integer(),
            Self::ApproximateNumeric => name.is_approximate_numeric(),
            Self::Datetime => name.is_datetime(),
            Self::Date => matches!(name, TypeName::Date),
            Self::Time => matches!(name, TypeName::Time | TypeName::TimeWithLocalTimeZone),
            Self::Timestamp => matches!(
                name,
                TypeName::Timestamp | TypeName::TimestampWithLocalTimeZone
            ),
            Self::DatetimeInterval => name.is_interval(),
            Self::IntervalYearMonth => matches!(name, TypeName::IntervalYearMonth),
            Self::IntervalDayTime => matches!(name, TypeName::IntervalDayTime),
            Self::Boolean => matches!(name, TypeName::Boolean),
            Self::Multiset => matches!(name, TypeName::Multiset),
            Self::Array => matches!(name, TypeName::Array),
            Self::Collection => name.is_collection(),
            Self::Map => matches!(name, TypeName::Map),
            Self::Row => matches!(name, TypeName::Row),
            Self::Null => matches!(name, TypeName::Null),
            Self::Symbol => matches!(name, TypeName::Symbol),
            Self::Cursor => matches!(name, TypeName::Cursor),
            Self::ColumnList => matches!(name, TypeName::ColumnList),
            Self::Geo => matches!(name, TypeName::Geometry),
            Self::Multimedia => name.is_multimedia(),
        }
    }
}

impl fmt::Display for TypeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_many_to_one() {
        // One concrete kind, several family predicates.
        let name = TypeName::Integer;
        assert_eq!(TypeFamily::Numeric, name.family());
        assert!(TypeFamily::Numeric.contains(name));
        assert!(TypeFamily::ExactNumeric.contains(name));
        assert!(TypeFamily::Integer.contains(name));
        assert!(!TypeFamily::ApproximateNumeric.contains(name));
        assert!(!TypeFamily::Character.contains(name));
    }

    #[test]
    fn datetime_contains_subfamilies() {
        for name in [TypeName::Date, TypeName::Time, TypeName::Timestamp] {
            assert!(TypeFamily::Datetime.contains(name));
        }
        assert!(!TypeFamily::Datetime.contains(TypeName::IntervalDayTime));
        assert!(TypeFamily::DatetimeInterval.contains(TypeName::IntervalDayTime));
    }

    #[test]
    fn natural_families_contain_their_members() {
        let names = [
            TypeName::Boolean,
            TypeName::Decimal,
            TypeName::Double,
            TypeName::Date,
            TypeName::TimestampWithLocalTimeZone,
            TypeName::Varchar,
            TypeName::Varbinary,
            TypeName::Array,
            TypeName::Image,
        ];
        for name in names {
            assert!(name.family().contains(name), "{name}");
        }
    }
}
