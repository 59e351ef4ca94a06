// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::config::FieldOffset;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid conversation JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("conversation must be a JSON array, found {0}")]
    NotAnArray(&'static str),
}

/// A list element that could not be read as a question/answer tuple.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum UnitFault {
    #[error("entry {index} is not an array")]
    NotATuple { index: usize },

    #[error("entry {index} holds a nested value at position {position}")]
    NonTextField { index: usize, position: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationUnit {
    pub question: String,
    pub answer: String,
}

/// One slot per input element, in input order.
pub type ConversationList = Vec<Result<ConversationUnit, UnitFault>>;

pub fn parse_conversation(raw: &str, offset: FieldOffset) -> Result<ConversationList, ParseError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| {
        warn!("failed to parse conversation: {}", err);
        ParseError::from(err)
    })?;

    let Value::Array(entries) = value else {
        let err = ParseError::NotAnArray(kind_of(&value));
        warn!("{}", err);
        return Err(err);
    };

    Ok(entries
        .iter()
        .enumerate()
        .map(|(index, entry)| to_unit(index, entry, offset))
        .collect())
}

fn to_unit(index: usize, entry: &Value, offset: FieldOffset) -> Result<ConversationUnit, UnitFault> {
    let Value::Array(fields) = entry else {
        return Err(UnitFault::NotATuple { index });
    };
    let field = |position: usize| match fields.get(position) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => {
            Err(UnitFault::NonTextField { index, position })
        }
    };

    Ok(ConversationUnit {
        question: field(offset.question())?,
        answer: field(offset.answer())?,
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
