// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which tuple positions hold the question and the answer.
///
/// Two upstream schemas exist: `[question, answer, ...]` and
/// `[id, question, answer, ...]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FieldOffset {
    #[default]
    Zero,
    One,
}

impl FieldOffset {
    pub fn question(self) -> usize {
        match self {
            FieldOffset::Zero => 0,
            FieldOffset::One => 1,
        }
    }

    pub fn answer(self) -> usize {
        self.question() + 1
    }
}

#[derive(Debug)]
pub struct ParseFieldOffsetError(pub String);

impl std::fmt::Display for ParseFieldOffsetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field offset must be 0 or 1, found `{}`", self.0)
    }
}

impl std::error::Error for ParseFieldOffsetError {}

impl TryFrom<u8> for FieldOffset {
    type Error = ParseFieldOffsetError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FieldOffset::Zero),
            1 => Ok(FieldOffset::One),
            n => Err(ParseFieldOffsetError(n.to_string())),
        }
    }
}

impl From<FieldOffset> for u8 {
    fn from(value: FieldOffset) -> Self {
        value.question() as u8
    }
}

impl FromStr for FieldOffset {
    type Err = ParseFieldOffsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(FieldOffset::Zero),
            "1" => Ok(FieldOffset::One),
            _ => Err(ParseFieldOffsetError(s.to_string())),
        }
    }
}

impl std::fmt::Display for FieldOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.question())
    }
}

#[derive(Deserialize, Debug, Default, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Conversation {
    pub field_offset: FieldOffset,
}
