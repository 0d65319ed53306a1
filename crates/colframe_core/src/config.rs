use std::collections::HashMap;
use std::sync::LazyLock;

use colframe_error::{DbError, Result};

use crate::convert::{DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT};
use crate::scalar::ScalarValue;

pub const DEFAULT_ACCUMULATOR_CAPACITY: usize = 1024;
pub const DEFAULT_DISPLAY_ROWS: usize = 3;

/// Engine wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub accumulator_capacity: usize,
    pub display_rows: usize,
    pub date_format: String,
    pub datetime_format: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            accumulator_capacity: DEFAULT_ACCUMULATOR_CAPACITY,
            display_rows: DEFAULT_DISPLAY_ROWS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn set_from_scalar(&mut self, name: &str, value: ScalarValue) -> Result<()> {
        let func = lookup(name)?;
        (func.set)(value, self)
    }

    pub fn get_as_scalar(&self, name: &str) -> Result<ScalarValue> {
        let func = lookup(name)?;
        Ok((func.get)(self))
    }

    /// Reset a single setting to its default.
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let func = lookup(name)?;
        let default = (func.get)(&Self::default());
        (func.set)(default, self)
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Names of all settings.
    pub fn setting_names() -> impl Iterator<Item = &'static str> {
        GET_SET_FUNCTIONS.keys().copied()
    }
}

fn lookup(name: &str) -> Result<&'static SettingFunctions> {
    GET_SET_FUNCTIONS
        .get(name)
        .ok_or_else(|| DbError::name_not_found(format!("Missing setting for '{name}'")))
}

struct SettingFunctions {
    set: fn(scalar: ScalarValue, conf: &mut EngineConfig) -> Result<()>,
    get: fn(conf: &EngineConfig) -> ScalarValue,
}

impl SettingFunctions {
    const fn new<S: EngineSetting>() -> Self {
        SettingFunctions {
            set: S::set_from_scalar as _,
            get: S::get_as_scalar as _,
        }
    }
}

fn insert_setting<S: EngineSetting>(map: &mut HashMap<&'static str, SettingFunctions>) {
    if map.insert(S::NAME, SettingFunctions::new::<S>()).is_some() {
        panic!("Duplicate settings names: {}", S::NAME);
    }
}

static GET_SET_FUNCTIONS: LazyLock<HashMap<&'static str, SettingFunctions>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    insert_setting::<AccumulatorCapacity>(&mut map);
    insert_setting::<DisplayRows>(&mut map);
    insert_setting::<DateFormat>(&mut map);
    insert_setting::<DateTimeFormat>(&mut map);

    map
});

pub trait EngineSetting: Sync + Send + 'static {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn set_from_scalar(scalar: ScalarValue, conf: &mut EngineConfig) -> Result<()>;
    fn get_as_scalar(conf: &EngineConfig) -> ScalarValue;
}

fn try_as_usize(scalar: &ScalarValue) -> Result<usize> {
    let v = scalar.try_as_i64()?;
    usize::try_from(v)
        .map_err(|_| DbError::unsupported_conversion(format!("Expected a non-negative value, got {v}")))
}

pub struct AccumulatorCapacity;

impl EngineSetting for AccumulatorCapacity {
    const NAME: &'static str = "accumulator_capacity";
    const DESCRIPTION: &'static str = "Initial capacity of accumulators used when collecting columns";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut EngineConfig) -> Result<()> {
        conf.accumulator_capacity = try_as_usize(&scalar)?;
        Ok(())
    }

    fn get_as_scalar(conf: &EngineConfig) -> ScalarValue {
        (conf.accumulator_capacity as i64).into()
    }
}

pub struct DisplayRows;

impl EngineSetting for DisplayRows {
    const NAME: &'static str = "display_rows";
    const DESCRIPTION: &'static str = "Number of rows shown when formatting a frame";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut EngineConfig) -> Result<()> {
        conf.display_rows = try_as_usize(&scalar)?;
        Ok(())
    }

    fn get_as_scalar(conf: &EngineConfig) -> ScalarValue {
        (conf.display_rows as i64).into()
    }
}

pub struct DateFormat;

impl EngineSetting for DateFormat {
    const NAME: &'static str = "date_format";
    const DESCRIPTION: &'static str = "Default format used when parsing dates";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut EngineConfig) -> Result<()> {
        conf.date_format = scalar.try_as_str()?.to_string();
        Ok(())
    }

    fn get_as_scalar(conf: &EngineConfig) -> ScalarValue {
        conf.date_format.clone().into()
    }
}

pub struct DateTimeFormat;

impl EngineSetting for DateTimeFormat {
    const NAME: &'static str = "datetime_format";
    const DESCRIPTION: &'static str = "Default format used when parsing timestamps";

    fn set_from_scalar(scalar: ScalarValue, conf: &mut EngineConfig) -> Result<()> {
        conf.datetime_format = scalar.try_as_str()?.to_string();
        Ok(())
    }

    fn get_as_scalar(conf: &EngineConfig) -> ScalarValue {
        conf.datetime_format.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use colframe_error::ErrorKind;

    use super::*;

    #[test]
    fn set_get_reset() {
        let mut conf = EngineConfig::default();

        conf.set_from_scalar("display_rows", ScalarValue::Int64(10)).unwrap();
        assert_eq!(10, conf.display_rows);
        assert_eq!(ScalarValue::Int64(10), conf.get_as_scalar("display_rows").unwrap());

        conf.reset("display_rows").unwrap();
        assert_eq!(DEFAULT_DISPLAY_ROWS, conf.display_rows);
    }

    #[test]
    fn string_setting() {
        let mut conf = EngineConfig::default();
        conf.set_from_scalar("date_format", "%d.%m.%Y".into()).unwrap();
        assert_eq!("%d.%m.%Y", conf.date_format);

        conf.reset_all();
        assert_eq!(EngineConfig::default(), conf);
    }

    #[test]
    fn unknown_setting() {
        let mut conf = EngineConfig::default();
        let err = conf.set_from_scalar("nope", ScalarValue::Int64(1)).unwrap_err();
        assert_eq!(ErrorKind::NameNotFound, err.kind());
    }

    #[test]
    fn wrong_type() {
        let mut conf = EngineConfig::default();
        let err = conf
            .set_from_scalar("accumulator_capacity", "many".into())
            .unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());

        let err = conf
            .set_from_scalar("accumulator_capacity", ScalarValue::Int64(-1))
            .unwrap_err();
        assert_eq!(ErrorKind::UnsupportedConversion, err.kind());
    }

    #[test]
    fn all_settings_listed() {
        let mut names: Vec<_> = EngineConfig::setting_names().collect();
        names.sort();
        assert_eq!(
            vec!["accumulator_capacity", "date_format", "datetime_format", "display_rows"],
            names
        );
    }
}
