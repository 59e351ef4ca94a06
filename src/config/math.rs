// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use serde::{Deserialize, Serialize};

pub const DEFAULT_MARKER: char = '$';

/// An opening and closing delimiter, e.g. `\(` and `\)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct DelimiterPair(pub String, pub String);

impl DelimiterPair {
    pub fn new<S: Into<String>, T: Into<String>>(open: S, close: T) -> Self {
        Self(open.into(), close.into())
    }

    pub fn open(&self) -> &str {
        &self.0
    }

    pub fn close(&self) -> &str {
        &self.1
    }

    /// Parenthesis-style and bracket-style LaTeX inline delimiters.
    pub fn defaults() -> Vec<DelimiterPair> {
        vec![
            DelimiterPair::new(r"\(", r"\)"),
            DelimiterPair::new(r"\[", r"\]"),
        ]
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, clap::ValueEnum, Default, Deserialize, Serialize)]
pub enum SplitMode {
    #[default]
    #[serde(rename = "alternating")]
    Alternating,

    #[serde(rename = "extract-only")]
    ExtractOnly,
}

#[derive(Deserialize, Debug, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Math {
    pub marker: char,
    pub delimiters: Vec<DelimiterPair>,
    /// Policy for `qatex split`. Rendering always needs the alternating split.
    pub mode: SplitMode,
}

impl Default for Math {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            delimiters: DelimiterPair::defaults(),
            mode: SplitMode::default(),
        }
    }
}
