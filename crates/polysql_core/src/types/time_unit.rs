use std::fmt;

use serde::{Deserialize, Serialize};

use super::type_name::TypeName;

/// Units used by EXTRACT, TIMESTAMPADD/TIMESTAMPDIFF and interval qualifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeUnit {
    Millennium,
    Century,
    Decade,
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
    Dow,
    Doy,
    IsoDow,
    IsoYear,
    Epoch,
}

impl TimeUnit {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Millennium => "MILLENNIUM",
            Self::Century => "CENTURY",
            Self::Decade => "DECADE",
            Self::Year => "YEAR",
            Self::Quarter => "QUARTER",
            Self::Month => "MONTH",
            Self::Week => "WEEK",
            Self::Day => "DAY",
            Self::Hour => "HOUR",
            Self::Minute => "MINUTE",
            Self::Second => "SECOND",
            Self::Millisecond => "MILLISECOND",
            Self::Microsecond => "MICROSECOND",
            Self::Nanosecond => "NANOSECOND",
            Self::Dow => "DOW",
            Self::Doy => "DOY",
            Self::IsoDow => "ISODOW",
            Self::IsoYear => "ISOYEAR",
            Self::Epoch => "EPOCH",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        Some(match upper.as_str() {
            "MILLENNIUM" => Self::Millennium,
            "CENTURY" => Self::Century,
            "DECADE" => Self::Decade,
            "YEAR" => Self::Year,
            "QUARTER" => Self::Quarter,
            "MONTH" => Self::Month,
            "WEEK" => Self::Week,
            "DAY" => Self::Day,
            "HOUR" => Self::Hour,
            "MINUTE" => Self::Minute,
            "SECOND" => Self::Second,
            "MILLISECOND" => Self::Millisecond,
            "MICROSECOND" => Self::Microsecond,
            "NANOSECOND" => Self::Nanosecond,
            "DOW" => Self::Dow,
            "DOY" => Self::Doy,
            "ISODOW" => Self::IsoDow,
            "ISOYEAR" => Self::IsoYear,
            "EPOCH" => Self::Epoch,
            _ => return None,
        })
    }

    /// Units stored in year-month intervals.
    pub const fn is_year_month(&self) -> bool {
        matches!(
            self,
            Self::Millennium | Self::Century | Self::Decade | Self::Year | Self::Quarter | Self::Month
        )
    }

    /// Units that may start or end an interval qualifier.
    pub const fn is_interval_field(&self) -> bool {
        matches!(
            self,
            Self::Year | Self::Month | Self::Day | Self::Hour | Self::Minute | Self::Second
        )
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `<start> [TO <end>]` part of an interval type or literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalQualifier {
    pub start: TimeUnit,
    pub end: Option<TimeUnit>,
}

impl IntervalQualifier {
    pub const fn single(unit: TimeUnit) -> Self {
        IntervalQualifier {
            start: unit,
            end: None,
        }
    }

    pub const fn range(start: TimeUnit, end: TimeUnit) -> Self {
        IntervalQualifier {
            start,
            end: Some(end),
        }
    }

    pub fn end_unit(&self) -> TimeUnit {
        self.end.unwrap_or(self.start)
    }

    pub const fn is_year_month(&self) -> bool {
        self.start.is_year_month()
    }

    pub const fn type_name(&self) -> TypeName {
        if self.is_year_month() {
            TypeName::IntervalYearMonth
        } else {
            TypeName::IntervalDayTime
        }
    }

    /// Smallest qualifier spanning both qualifiers.
    pub fn union(&self, other: &IntervalQualifier) -> IntervalQualifier {
        let start = self.start.min(other.start);
        let end = self.end_unit().max(other.end_unit());
        if start == end {
            IntervalQualifier::single(start)
        } else {
            IntervalQualifier::range(start, end)
        }
    }
}

impl fmt::Display for IntervalQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) if end != self.start => write!(f, "{} TO {}", self.start, end),
            _ => write!(f, "{}", self.start),
        }
    }
}
