//! Plugin arguments and configuration.
//!
//! The engine passes plugin arguments as `key=value` strings:
//!
//! ```text
//! low=<hex>    first guest address to count (default 0)
//! high=<hex>   last guest address to count, inclusive (default all ones)
//! ```

use std::path::PathBuf;

use insncounts_disas::{AddressWindow, parse_hex_u64};
use insncounts_table::{DEFAULT_SHM_ROOT, TableLayout};
use thiserror::Error;

/// Malformed plugin argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("{0}: expected key=value")]
    MissingValue(String),
    #[error("{0}: unknown option")]
    UnknownKey(String),
    #[error("{option}: invalid hex address")]
    InvalidAddress { option: String },
}

/// Parsed plugin arguments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PluginOptions {
    pub window: AddressWindow,
}

impl PluginOptions {
    /// Parse `key=value` arguments. Later keys override earlier ones.
    ///
    /// # Errors
    ///
    /// Returns an error for an argument without `=`, an unknown key, or a
    /// value that is not a hex address.
    pub fn parse<I, S>(args: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| OptionError::MissingValue(arg.to_string()))?;
            let bound = || {
                parse_hex_u64(value).map_err(|_| OptionError::InvalidAddress {
                    option: arg.to_string(),
                })
            };
            match key {
                "low" => options.window.low = bound()?,
                "high" => options.window.high = bound()?,
                _ => return Err(OptionError::UnknownKey(arg.to_string())),
            }
        }
        Ok(options)
    }
}

/// Everything the plugin needs at install time.
#[derive(Clone, Debug)]
pub struct PluginConfig {
    pub options: PluginOptions,
    /// Directory holding the backing file.
    pub shm_root: PathBuf,
    pub layout: TableLayout,
}

impl PluginConfig {
    #[must_use]
    pub fn new(options: PluginOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_shm_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.shm_root = root.into();
        self
    }

    #[must_use]
    pub const fn with_layout(mut self, layout: TableLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            options: PluginOptions::default(),
            shm_root: PathBuf::from(DEFAULT_SHM_ROOT),
            layout: TableLayout::default(),
        }
    }
}
