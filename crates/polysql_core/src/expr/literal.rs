use std::fmt;

use polysql_error::ParserPos;
use serde::{Deserialize, Serialize};

use crate::types::datatype::MAX_DATETIME_PRECISION;
use crate::types::{DataType, IntervalQualifier, TimeUnit};

/// Flag for TRIM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrimFlag {
    Both,
    Leading,
    Trailing,
}

impl TrimFlag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Both => "BOTH",
            Self::Leading => "LEADING",
            Self::Trailing => "TRAILING",
        }
    }
}

/// Behavior of the JSON functions on an empty result or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonBehavior {
    Error,
    Null,
    /// Followed by a default value operand.
    Default,
    EmptyArray,
    EmptyObject,
    True,
    False,
    Unknown,
}

impl JsonBehavior {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Null => "NULL",
            Self::Default => "DEFAULT",
            Self::EmptyArray => "EMPTY ARRAY",
            Self::EmptyObject => "EMPTY OBJECT",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Array wrapper behavior for JSON_QUERY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonWrapper {
    WithoutArray,
    WithConditionalArray,
    WithUnconditionalArray,
}

impl JsonWrapper {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WithoutArray => "WITHOUT ARRAY",
            Self::WithConditionalArray => "WITH CONDITIONAL ARRAY",
            Self::WithUnconditionalArray => "WITH UNCONDITIONAL ARRAY",
        }
    }
}

/// Keyword-like operand values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    TimeUnit(TimeUnit),
    Trim(TrimFlag),
    JsonBehavior(JsonBehavior),
    JsonWrapper(JsonWrapper),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeUnit(unit) => write!(f, "{unit}"),
            Self::Trim(flag) => f.write_str(flag.as_str()),
            Self::JsonBehavior(b) => f.write_str(b.as_str()),
            Self::JsonWrapper(w) => f.write_str(w.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    /// Untyped NULL.
    Null,
    Boolean(bool),
    /// Exact numeric, value is `unscaled * 10^-scale`.
    Exact { unscaled: i128, scale: u32 },
    Approximate(f64),
    CharString {
        value: String,
        charset: Option<String>,
    },
    BinaryString(Vec<u8>),
    Date(String),
    Time(String),
    Timestamp(String),
    Interval {
        value: String,
        negative: bool,
        qualifier: IntervalQualifier,
    },
    Symbol(Symbol),
}

impl LiteralValue {
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Null => DataType::null(),
            Self::Boolean(_) => DataType::boolean(),
            Self::Exact { unscaled, scale } => {
                if *scale == 0 {
                    if i32::try_from(*unscaled).is_ok() {
                        return DataType::integer();
                    }
                    if i64::try_from(*unscaled).is_ok() {
                        return DataType::bigint();
                    }
                }
                let digits = decimal_digits(*unscaled);
                DataType::decimal(digits.max(*scale), *scale)
            }
            Self::Approximate(_) => DataType::double(),
            Self::CharString { value, .. } => DataType::char(value.chars().count() as u32),
            Self::BinaryString(bytes) => DataType::binary(bytes.len() as u32),
            Self::Date(_) => DataType::date(),
            Self::Time(s) => DataType::time(fractional_precision(s)),
            Self::Timestamp(s) => DataType::timestamp(fractional_precision(s)),
            Self::Interval { qualifier, .. } => DataType::interval(*qualifier),
            Self::Symbol(_) => DataType::symbol(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer value of an exact literal without a fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Exact { unscaled, scale: 0 } => i64::try_from(*unscaled).ok(),
            _ => None,
        }
    }

    /// Value of a numeric literal as a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Exact { unscaled, scale } => Some(*unscaled as f64 / 10f64.powi(*scale as i32)),
            Self::Approximate(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Self::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    pub fn negate(&self) -> Option<LiteralValue> {
        match self {
            Self::Exact { unscaled, scale } => Some(Self::Exact {
                unscaled: -unscaled,
                scale: *scale,
            }),
            Self::Approximate(v) => Some(Self::Approximate(-v)),
            Self::Interval {
                value,
                negative,
                qualifier,
            } => Some(Self::Interval {
                value: value.clone(),
                negative: !negative,
                qualifier: *qualifier,
            }),
            _ => None,
        }
    }
}

fn decimal_digits(v: i128) -> u32 {
    let mut v = v.unsigned_abs();
    let mut digits = 1;
    while v >= 10 {
        v /= 10;
        digits += 1;
    }
    digits
}

fn fractional_precision(s: &str) -> u32 {
    match s.rsplit_once('.') {
        Some((_, frac)) => {
            let digits = frac.chars().take_while(|c| c.is_ascii_digit()).count() as u32;
            digits.min(MAX_DATETIME_PRECISION)
        }
        None => 0,
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(true) => write!(f, "TRUE"),
            Self::Boolean(false) => write!(f, "FALSE"),
            Self::Exact { unscaled, scale: 0 } => write!(f, "{unscaled}"),
            Self::Exact { unscaled, scale } => {
                let digits = unscaled.unsigned_abs().to_string();
                let scale = *scale as usize;
                let padded = format!("{digits:0>width$}", width = scale + 1);
                let (int, frac) = padded.split_at(padded.len() - scale);
                let sign = if *unscaled < 0 { "-" } else { "" };
                write!(f, "{sign}{int}.{frac}")
            }
            Self::Approximate(v) => write!(f, "{v:E}"),
            Self::CharString { value, charset } => {
                if let Some(charset) = charset {
                    write!(f, "_{charset}")?;
                }
                write!(f, "'{}'", value.replace('\'', "''"))
            }
            Self::BinaryString(bytes) => {
                write!(f, "X'")?;
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                write!(f, "'")
            }
            Self::Date(s) => write!(f, "DATE '{s}'"),
            Self::Time(s) => write!(f, "TIME '{s}'"),
            Self::Timestamp(s) => write!(f, "TIMESTAMP '{s}'"),
            Self::Interval {
                value,
                negative,
                qualifier,
            } => {
                let sign = if *negative { "-" } else { "" };
                write!(f, "INTERVAL {sign}'{value}' {qualifier}")
            }
            Self::Symbol(s) => write!(f, "{s}"),
        }
    }
}

/// A literal operand with its source position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub value: LiteralValue,
    pub pos: ParserPos,
}

impl Literal {
    pub fn new(value: LiteralValue, pos: ParserPos) -> Self {
        Literal { value, pos }
    }

    pub fn null(pos: ParserPos) -> Self {
        Self::new(LiteralValue::Null, pos)
    }

    pub fn boolean(v: bool, pos: ParserPos) -> Self {
        Self::new(LiteralValue::Boolean(v), pos)
    }

    pub fn integer(v: i64, pos: ParserPos) -> Self {
        Self::new(
            LiteralValue::Exact {
                unscaled: v as i128,
                scale: 0,
            },
            pos,
        )
    }

    pub fn decimal(unscaled: i128, scale: u32, pos: ParserPos) -> Self {
        Self::new(LiteralValue::Exact { unscaled, scale }, pos)
    }

    pub fn double(v: f64, pos: ParserPos) -> Self {
        Self::new(LiteralValue::Approximate(v), pos)
    }

    pub fn string(v: impl Into<String>, pos: ParserPos) -> Self {
        Self::new(
            LiteralValue::CharString {
                value: v.into(),
                charset: None,
            },
            pos,
        )
    }

    pub fn symbol(symbol: Symbol, pos: ParserPos) -> Self {
        Self::new(LiteralValue::Symbol(symbol), pos)
    }

    pub fn time_unit(unit: TimeUnit, pos: ParserPos) -> Self {
        Self::symbol(Symbol::TimeUnit(unit), pos)
    }

    pub fn datatype(&self) -> DataType {
        self.value.datatype()
    }
}
