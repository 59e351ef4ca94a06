// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use serde::Serialize;

use crate::{
    conversation::{ConversationList, ConversationUnit, UnitFault},
    tokenizer::{Token, Tokenizer},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderNode {
    PlainText {
        content: String,
    },
    MathExpression {
        expression: String,
        /// Delimiter-wrapped source, kept in the output but not displayed.
        hidden_raw: String,
        /// Expression wrapped in the marker, read by the typeset engine.
        marked_raw: String,
    },
}

impl RenderNode {
    pub fn from_token(token: Token<'_>, marker: char) -> Self {
        match token {
            Token::Text(content) => RenderNode::PlainText {
                content: content.to_string(),
            },
            Token::Math { expression, raw } => RenderNode::MathExpression {
                expression: expression.to_string(),
                hidden_raw: raw.to_string(),
                marked_raw: format!("{marker}{expression}{marker}"),
            },
        }
    }

    pub fn is_math(&self) -> bool {
        matches!(self, RenderNode::MathExpression { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationRow {
    pub question: Vec<RenderNode>,
    pub answer: Vec<RenderNode>,
    pub has_math: bool,
}

pub type RenderRow = Result<ConversationRow, UnitFault>;

/// Inline math delimiters handed to the typeset engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MathContext {
    pub left: char,
    pub right: char,
}

impl MathContext {
    pub fn new(marker: char) -> Self {
        Self {
            left: marker,
            right: marker,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RenderTree {
    /// The raw value could not be read as a conversation.
    Error { message: String },

    /// No math anywhere: rendered without a math context.
    Plain { rows: Vec<RenderRow> },

    Math {
        context: MathContext,
        rows: Vec<RenderRow>,
    },
}

impl RenderTree {
    pub fn rows(&self) -> &[RenderRow] {
        match self {
            RenderTree::Error { .. } => &[],
            RenderTree::Plain { rows } | RenderTree::Math { rows, .. } => rows,
        }
    }

    pub fn needs_typeset(&self) -> bool {
        matches!(self, RenderTree::Math { .. })
    }
}

pub struct RowBuilder<'t> {
    tokenizer: &'t Tokenizer,
    marker: char,
}

impl<'t> RowBuilder<'t> {
    pub fn new(tokenizer: &'t Tokenizer, marker: char) -> Self {
        Self { tokenizer, marker }
    }

    fn field(&self, field: &str) -> (Vec<RenderNode>, bool) {
        let mut has_math = false;
        let nodes = self
            .tokenizer
            .tokenize(field)
            .into_iter()
            .inspect(|token| has_math |= token.is_math())
            .map(|token| RenderNode::from_token(token, self.marker))
            .collect();
        (nodes, has_math)
    }

    pub fn row(&self, unit: &ConversationUnit) -> ConversationRow {
        let (question, question_math) = self.field(&unit.question);
        let (answer, answer_math) = self.field(&unit.answer);
        ConversationRow {
            question,
            answer,
            has_math: question_math || answer_math,
        }
    }

    pub fn build(&self, list: &ConversationList) -> RenderTree {
        let rows: Vec<RenderRow> = list
            .iter()
            .map(|unit| unit.as_ref().map(|unit| self.row(unit)).map_err(Clone::clone))
            .collect();

        let has_math = rows.iter().flatten().any(|row| row.has_math);
        if has_math {
            RenderTree::Math {
                context: MathContext::new(self.marker),
                rows,
            }
        } else {
            RenderTree::Plain { rows }
        }
    }
}
