use std::collections::HashMap;
use std::sync::LazyLock;

use polysql_error::{DbError, ErrorKind, Result, messages};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::TypeSystem;

/// How unquoted identifiers are stored.
///
/// Lookups are always case insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierCase {
    Upper,
    Lower,
    Unchanged,
}

impl IdentifierCase {
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::Upper => name.to_ascii_uppercase(),
            Self::Lower => name.to_ascii_lowercase(),
            Self::Unchanged => name.to_string(),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Conformance flags for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub enable_oracle_functions: bool,
    pub identifier_case: IdentifierCase,
    pub max_numeric_precision: u32,
    pub max_numeric_scale: u32,
    /// Type parameters that can't be inferred as ANY instead of erroring.
    pub allow_unknown_parameter_types: bool,
    /// Allow string literal fragments to continue on the same line.
    pub literal_chain_same_line_allowed: bool,
    /// Parenthesize every nested expression when rendering.
    pub always_parenthesize: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            enable_oracle_functions: false,
            identifier_case: IdentifierCase::Upper,
            max_numeric_precision: TypeSystem::DEFAULT.max_numeric_precision,
            max_numeric_scale: TypeSystem::DEFAULT.max_numeric_scale,
            allow_unknown_parameter_types: false,
            literal_chain_same_line_allowed: false,
            always_parenthesize: false,
        }
    }
}

impl ValidatorConfig {
    pub fn type_system(&self) -> TypeSystem {
        TypeSystem {
            max_numeric_precision: self.max_numeric_precision,
            max_numeric_scale: self.max_numeric_scale,
            ..TypeSystem::DEFAULT
        }
    }

    pub fn set(&mut self, name: &str, value: &Value) -> Result<()> {
        let func = get_setting(name)?;
        (func.set)(value, self)
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        let func = get_setting(name)?;
        Ok((func.get)(self))
    }

    pub fn reset(&mut self, name: &str) -> Result<()> {
        let def_conf = Self::default();
        let func = get_setting(name)?;
        let value = (func.get)(&def_conf);
        (func.set)(&value, self)
    }

    /// Names and descriptions of all settings, sorted by name.
    pub fn settings() -> Vec<(&'static str, &'static str)> {
        let mut settings: Vec<_> = GET_SET_FUNCTIONS
            .iter()
            .map(|(name, func)| (*name, func.description))
            .collect();
        settings.sort_unstable();
        settings
    }
}

fn get_setting(name: &str) -> Result<&'static SettingFunctions> {
    let lower = name.to_ascii_lowercase();
    GET_SET_FUNCTIONS.get(lower.as_str()).ok_or_else(|| {
        let err = messages::invalid_setting(name);
        match suggest_setting(&lower) {
            Some(suggestion) => err.with_field("did you mean", suggestion),
            None => err,
        }
    })
}

fn suggest_setting(name: &str) -> Option<&'static str> {
    GET_SET_FUNCTIONS
        .keys()
        .map(|candidate| (*candidate, strsim::jaro_winkler(name, candidate)))
        .filter(|(_, score)| *score > 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

struct SettingFunctions {
    set: fn(value: &Value, conf: &mut ValidatorConfig) -> Result<()>,
    get: fn(conf: &ValidatorConfig) -> Value,
    description: &'static str,
}

impl SettingFunctions {
    const fn new<S: ValidatorSetting>() -> Self {
        SettingFunctions {
            set: S::set_from_value as _,
            get: S::get_as_value as _,
            description: S::DESCRIPTION,
        }
    }
}

fn insert_setting<S: ValidatorSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<EnableOracleFunctions>(&mut map);
    insert_setting::<IdentifierCaseSetting>(&mut map);
    insert_setting::<MaxNumericPrecision>(&mut map);
    insert_setting::<MaxNumericScale>(&mut map);
    insert_setting::<AllowUnknownParameterTypes>(&mut map);
    insert_setting::<LiteralChainSameLineAllowed>(&mut map);
    insert_setting::<AlwaysParenthesize>(&mut map);

    map
});

pub trait ValidatorSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_value(value: &Value, conf: &mut ValidatorConfig) -> Result<()>;
    fn get_as_value(conf: &ValidatorConfig) -> Value;
}

fn invalid_value(name: &str, value: &Value, expected: &str) -> DbError {
    DbError::new(
        ErrorKind::InvalidSetting,
        format!("Invalid value {value} for setting '{name}', expected {expected}"),
    )
}

fn value_as_bool(name: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| invalid_value(name, value, "a boolean"))
}

fn value_as_u32(name: &str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| invalid_value(name, value, "a non-negative integer"))
}

pub struct EnableOracleFunctions;

impl ValidatorSetting for EnableOracleFunctions {
    const NAME: &'static str = "enable_oracle_functions";
    const DESCRIPTION: &'static str = "Resolve Oracle functions such as DECODE and NVL";

    fn set_from_value(value: &Value, conf: &mut ValidatorConfig) -> Result<()> {
        conf.enable_oracle_functions = value_as_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_value(conf: &ValidatorConfig) -> Value {
        conf.enable_oracle_functions.into()
    }
}

pub struct IdentifierCaseSetting;

impl ValidatorSetting for IdentifierCaseSetting {
    const NAME: &'static str = "identifier_case";
    const DESCRIPTION: &'static str = "How unquoted identifiers are stored (upper, lower, unchanged)";

    fn set_from_value(value: &Value, conf: &mut ValidatorConfig) -> Result<()> {
        let case = match value.as_str().map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("upper") => IdentifierCase::Upper,
            Some("lower") => IdentifierCase::Lower,
            Some("unchanged") => IdentifierCase::Unchanged,
            _ => return Err(invalid_value(Self::NAME, value, "upper, lower or unchanged")),
        };
        conf.identifier_case = case;
        Ok(())
    }

    fn get_as_value(conf: &ValidatorConfig) -> Value {
        conf.identifier_case.as_str().into()
    }
}

const MIN_NUMERIC_PRECISION: u32 = 1;
const MAX_NUMERIC_PRECISION: u32 = 38;

pub struct MaxNumericPrecision;

impl MaxNumericPrecision {
    pub fn validate_value(val: u32) -> Result<()> {
        if !(MIN_NUMERIC_PRECISION..=MAX_NUMERIC_PRECISION).contains(&val) {
            return Err(DbError::new(
                ErrorKind::InvalidSetting,
                format!(
                    "Max numeric precision must be between {MIN_NUMERIC_PRECISION} and {MAX_NUMERIC_PRECISION}"
                ),
            ));
        }
        Ok(())
    }
}

impl ValidatorSetting for MaxNumericPrecision {
    const NAME: &'static str = "max_numeric_precision";
    const DESCRIPTION: &'static str = "Max precision of derived DECIMAL types";

    fn set_from_value(value: &Value, conf: &mut ValidatorConfig) -> Result<()> {
        let val = value_as_u32(Self::NAME, value)?;
        Self::validate_value(val)?;
        conf.max_numeric_precision = val;
        Ok(())
    }

    fn get_as_value(conf: &ValidatorConfig) -> Value {
        conf.max_numeric_precision.into()
    }
}

pub struct MaxNumericScale;

impl ValidatorSetting for MaxNumericScale {
    const NAME: &'static str = "max_numeric_scale";
    const DESCRIPTION: &'static str = "Max scale of derived DECIMAL types";

    fn set_from_value(value: &Value, conf: &mut ValidatorConfig) -> Result<()> {
        let val = value_as_u32(Self::NAME, value)?;
        if val > MAX_NUMERIC_PRECISION {
            return Err(invalid_value(Self::NAME, value, "a scale no larger than 38"));
        }
        conf.max_numeric_scale = val;
        Ok(())
    }

    fn get_as_value(conf: &ValidatorConfig) -> Value {
        conf.max_numeric_scale.into()
    }
}

pub struct AllowUnknownParameterTypes;

impl ValidatorSetting for AllowUnknownParameterTypes {
    const NAME: &'static str = "allow_unknown_parameter_types";
    const DESCRIPTION: &'static str = "Type parameters that can't be inferred as ANY";

    fn set_from_value(value: &Value, conf: &mut ValidatorConfig) -> Result<()> {
        conf.allow_unknown_parameter_types = value_as_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_value(conf: &ValidatorConfig) -> Value {
        conf.allow_unknown_parameter_types.into()
    }
}

pub struct LiteralChainSameLineAllowed;

impl ValidatorSetting for LiteralChainSameLineAllowed {
    const NAME: &'static str = "literal_chain_same_line_allowed";
    const DESCRIPTION: &'static str = "Allow string literal fragments on the same line";

    fn set_from_value(value: &Value, conf: &mut ValidatorConfig) -> Result<()> {
        conf.literal_chain_same_line_allowed = value_as_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_value(conf: &ValidatorConfig) -> Value {
        conf.literal_chain_same_line_allowed.into()
    }
}

pub struct AlwaysParenthesize;

impl ValidatorSetting for AlwaysParenthesize {
    const NAME: &'static str = "always_parenthesize";
    const DESCRIPTION: &'static str = "Parenthesize every nested expression when rendering SQL";

    fn set_from_value(value: &Value, conf: &mut ValidatorConfig) -> Result<()> {
        conf.always_parenthesize = value_as_bool(Self::NAME, value)?;
        Ok(())
    }

    fn get_as_value(conf: &ValidatorConfig) -> Value {
        conf.always_parenthesize.into()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn set_and_get() {
        let mut conf = ValidatorConfig::default();
        conf.set("enable_oracle_functions", &json!(true)).unwrap();
        assert!(conf.enable_oracle_functions);
        assert_eq!(json!(true), conf.get("ENABLE_ORACLE_FUNCTIONS").unwrap());

        conf.set("identifier_case", &json!("lower")).unwrap();
        assert_eq!(IdentifierCase::Lower, conf.identifier_case);
        assert_eq!("abc", conf.identifier_case.apply("AbC"));
    }

    #[test]
    fn reset_restores_default() {
        let mut conf = ValidatorConfig::default();
        conf.set("max_numeric_precision", &json!(28)).unwrap();
        assert_eq!(28, conf.type_system().max_numeric_precision);

        conf.reset("max_numeric_precision").unwrap();
        assert_eq!(ValidatorConfig::default(), conf);
    }

    #[test]
    fn invalid_values() {
        let mut conf = ValidatorConfig::default();
        let err = conf.set("max_numeric_precision", &json!(0)).unwrap_err();
        assert_eq!(ErrorKind::InvalidSetting, err.kind());

        let err = conf.set("always_parenthesize", &json!("yes")).unwrap_err();
        assert_eq!(ErrorKind::InvalidSetting, err.kind());
    }

    #[test]
    fn unknown_setting_suggests() {
        let mut conf = ValidatorConfig::default();
        let err = conf.set("enable_oracle_function", &json!(true)).unwrap_err();
        assert_eq!(ErrorKind::InvalidSetting, err.kind());
        assert_eq!(Some("enable_oracle_functions"), err.get_field("did you mean"));
    }

    #[test]
    fn deserialize_partial() {
        let conf: ValidatorConfig =
            serde_json::from_str(r#"{"enable_oracle_functions": true, "identifier_case": "unchanged"}"#)
                .unwrap();
        assert!(conf.enable_oracle_functions);
        assert_eq!(IdentifierCase::Unchanged, conf.identifier_case);
        assert_eq!(19, conf.max_numeric_precision);
    }

    #[test]
    fn settings_are_listed() {
        let settings = ValidatorConfig::settings();
        assert_eq!(7, settings.len());
        assert!(settings.iter().any(|(name, _)| *name == "always_parenthesize"));
    }
}
