//! Run configuration.
//!
//! The output location is fixed. Batch size and verbosity come from the
//! environment, optionally via a `.env` file in the working directory:
//!
//! | Variable               | Default | Meaning                         |
//! |------------------------|---------|---------------------------------|
//! | `DATESPLIT_BATCH_SIZE` | 10000   | Rows read per batch             |
//! | `DATESPLIT_VERBOSE`    | off     | Log progress to stderr          |

use serde::Serialize;
use std::env;

use crate::error::{ConfigError, ConfigResult};

/// Output file, written to the current working directory.
pub const OUTPUT_FILE: &str = "processed.csv";

/// Rows per batch unless overridden.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

pub const BATCH_SIZE_VAR: &str = "DATESPLIT_BATCH_SIZE";
pub const VERBOSE_VAR: &str = "DATESPLIT_VERBOSE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Rows read, transformed and written per batch
    pub batch_size: usize,

    /// Log progress to stderr
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            verbose: false,
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(BATCH_SIZE_VAR) {
            config.batch_size = parse_batch_size(&raw)?;
        }
        if let Some(raw) = lookup(VERBOSE_VAR) {
            config.verbose = parse_flag(VERBOSE_VAR, &raw)?;
        }

        Ok(config)
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

fn parse_batch_size(raw: &str) -> ConfigResult<usize> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        name: BATCH_SIZE_VAR,
        value: raw.to_string(),
        message: message.to_string(),
    };
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(invalid("must be greater than zero")),
        Ok(n) => Ok(n),
        Err(_) => Err(invalid("expected a positive integer")),
    }
}

fn parse_flag(name: &'static str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            message: "expected true or false".to_string(),
        }),
    }
}
