use std::{env, str::FromStr};

use thiserror::Error;

use crate::table::NAME_CAPACITY;

/// Name length bound of the reference table layout (32 byte slots with a
/// terminator).
pub const DEFAULT_MAX_NAME_LEN: usize = 31;
/// Distinct stations in the reference data set.
pub const EXPECTED_STATIONS: usize = 413;
/// A full benchmark run has a billion lines.
pub const DEFAULT_EXPECTED_LINES: u64 = 1_000_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown {var} value {value:?}")]
    UnknownValue { var: &'static str, value: String },
    #[error("{var} must be an integer, got {value:?}")]
    NotANumber { var: &'static str, value: String },
    #[error("BRC_MAX_NAME_LEN must be in 1..={max}, got {value}")]
    NameLenOutOfRange { value: usize, max: usize },
}

/// How much the scanner trusts the input format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Only the trailing newline and the name length bound are checked.
    #[default]
    Trusted,
    /// Every line is checked against `<name>;-?d{1,2}.d\n`.
    Validated,
}

/// What the station table does when two names share a slot key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// The first name seen owns the slot; later names are merged into it.
    #[default]
    FirstSeenWins,
    /// Names are compared on every access and mismatches go to an overflow map.
    Verify,
}

impl FromStr for CollisionPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "first-seen" => Ok(CollisionPolicy::FirstSeenWins),
            "verify" => Ok(CollisionPolicy::Verify),
            _ => Err(ConfigError::UnknownValue {
                var: "BRC_COLLISIONS",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HashStrategy {
    #[default]
    Rolling,
    Fx,
}

impl FromStr for HashStrategy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "rolling" => Ok(HashStrategy::Rolling),
            "fx" => Ok(HashStrategy::Fx),
            _ => Err(ConfigError::UnknownValue {
                var: "BRC_HASH",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub input_mode: InputMode,
    pub collision_policy: CollisionPolicy,
    pub hash: HashStrategy,
    pub max_name_len: usize,
    /// Line count below which the summary flags the run as "too few".
    pub expected_lines: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_mode: InputMode::default(),
            collision_policy: CollisionPolicy::default(),
            hash: HashStrategy::default(),
            max_name_len: DEFAULT_MAX_NAME_LEN,
            expected_lines: DEFAULT_EXPECTED_LINES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build a config from `BRC_*` variables resolved through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if lookup("BRC_VALIDATE").is_some_and(|x| x == "1") {
            config.input_mode = InputMode::Validated;
        }
        if let Some(value) = lookup("BRC_COLLISIONS") {
            config.collision_policy = value.parse()?;
        }
        if let Some(value) = lookup("BRC_HASH") {
            config.hash = value.parse()?;
        }
        if let Some(value) = lookup("BRC_MAX_NAME_LEN") {
            let len = parse_number("BRC_MAX_NAME_LEN", &value)?;
            config.max_name_len = len as usize;
        }
        if let Some(value) = lookup("BRC_EXPECTED_LINES") {
            config.expected_lines = parse_number("BRC_EXPECTED_LINES", &value)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_name_len == 0 || self.max_name_len > NAME_CAPACITY {
            return Err(ConfigError::NameLenOutOfRange {
                value: self.max_name_len,
                max: NAME_CAPACITY,
            });
        }
        Ok(())
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: value.to_string(),
    })
}
