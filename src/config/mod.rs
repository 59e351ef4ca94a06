// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

pub mod conversation;
pub mod math;
pub mod typeset;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use conversation::{Conversation, FieldOffset};
pub use math::{DelimiterPair, Math, SplitMode};
pub use typeset::Typeset;

pub const DEFAULT_CONFIG_PATH: &str = "./Qatex.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("at least one math delimiter pair is required")]
    NoDelimiters,

    #[error("math delimiter pair {index} has an empty side")]
    EmptyDelimiter { index: usize },

    #[error("marker `{marker}` also appears in delimiter `{delimiter}`")]
    MarkerCollision { marker: char, delimiter: String },
}

#[derive(Deserialize, Debug, Default, Serialize)]
pub struct Config {
    #[serde(default)]
    pub conversation: Conversation,

    #[serde(default)]
    pub math: Math,

    #[serde(default)]
    pub typeset: Typeset,
}

impl Config {
    /// The marker must never be mistaken for part of a delimiter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.math.delimiters.is_empty() {
            return Err(ConfigError::NoDelimiters);
        }
        for (index, pair) in self.math.delimiters.iter().enumerate() {
            if pair.open().is_empty() || pair.close().is_empty() {
                return Err(ConfigError::EmptyDelimiter { index });
            }
            for side in [pair.open(), pair.close()] {
                if side.contains(self.math.marker) {
                    return Err(ConfigError::MarkerCollision {
                        marker: self.math.marker,
                        delimiter: side.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// An explicit `toml_file` is used as given. Left at [`DEFAULT_CONFIG_PATH`],
/// a `Qatex.toml` beside the input is preferred over the working directory.
/// A missing file is not an error: every section has defaults.
pub fn find_config(toml_file: &Utf8Path, input: &Utf8Path) -> Option<Utf8PathBuf> {
    if toml_file == Utf8Path::new(DEFAULT_CONFIG_PATH) {
        if let Some(parent) = input.parent() {
            let beside = parent.join(DEFAULT_CONFIG_PATH);
            if beside.exists() {
                return Some(beside);
            }
        }
    }
    toml_file.exists().then(|| toml_file.to_owned())
}

pub fn parse_config(config: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(config)?;
    config.validate()?;
    Ok(config)
}
