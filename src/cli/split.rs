// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use eyre::WrapErr;
use serde::Serialize;

use qatex::{
    config::{Config, SplitMode},
    conversation::{parse_conversation, ConversationUnit, UnitFault},
    tokenizer::{Extraction, Token, Tokenizer, Tokens},
};

use super::InputArgs;

/// Print how each field is split, as JSON.
#[derive(clap::Args)]
pub struct SplitCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Tokenizer policy; overrides `math.mode`.
    #[arg(long, value_enum)]
    pub mode: Option<SplitMode>,
}

impl SplitCommand {
    fn tokenizer(&self, config: &Config) -> Tokenizer {
        let tokenizer = Tokenizer::from_config(&config.math);
        match self.mode {
            Some(mode) => tokenizer.with_mode(mode),
            None => tokenizer,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum FieldSplit<'s> {
    /// Alternating text and math segments.
    Segments(Vec<&'s str>),
    /// Extracted expressions, `null` when the field has none.
    Extracted(Extraction<'s>),
}

#[derive(Serialize)]
#[serde(untagged)]
enum UnitSplit<'s> {
    Unit {
        question: FieldSplit<'s>,
        answer: FieldSplit<'s>,
    },
    Fault {
        fault: &'s UnitFault,
    },
}

fn split_field<'s>(tokenizer: &Tokenizer, field: &'s str) -> FieldSplit<'s> {
    match tokenizer.run(field) {
        Tokens::Alternating(tokens) => FieldSplit::Segments(
            tokens
                .into_iter()
                .map(|token| match token {
                    Token::Text(text) => text,
                    Token::Math { expression, .. } => expression,
                })
                .collect(),
        ),
        Tokens::Extracted(extraction) => FieldSplit::Extracted(extraction),
    }
}

fn split_unit<'s>(tokenizer: &Tokenizer, unit: &'s ConversationUnit) -> UnitSplit<'s> {
    UnitSplit::Unit {
        question: split_field(tokenizer, &unit.question),
        answer: split_field(tokenizer, &unit.answer),
    }
}

pub fn split(command: &SplitCommand) -> eyre::Result<()> {
    let config = command.input.load_config()?;
    let raw = command.input.read_input()?;
    let list = parse_conversation(&raw, config.conversation.field_offset)
        .wrap_err_with(|| format!("failed to read `{}`", command.input.input))?;

    let tokenizer = command.tokenizer(&config);
    let units: Vec<UnitSplit<'_>> = list
        .iter()
        .map(|unit| match unit {
            Ok(unit) => split_unit(&tokenizer, unit),
            Err(fault) => UnitSplit::Fault { fault },
        })
        .collect();

    let serialized =
        serde_json::to_string_pretty(&units).wrap_err("failed to serialize split fields")?;
    println!("{}", serialized);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Split {
        #[command(flatten)]
        split: SplitCommand,
    }

    fn parse(args: &[&str]) -> SplitCommand {
        Split::try_parse_from(args).unwrap().split
    }

    #[test]
    fn test_mode_flag_selects_policy() {
        let command = parse(&["split", "qa.json", "--mode", "extract-only"]);
        let tokenizer = command.tokenizer(&Config::default());
        assert_eq!(tokenizer.mode(), SplitMode::ExtractOnly);

        assert!(matches!(
            split_field(&tokenizer, "no math here"),
            FieldSplit::Extracted(Extraction::NoMath)
        ));
    }

    #[test]
    fn test_config_mode_without_flag() {
        let command = parse(&["split", "qa.json"]);
        let mut config = Config::default();
        config.math.mode = SplitMode::ExtractOnly;
        assert_eq!(command.tokenizer(&config).mode(), SplitMode::ExtractOnly);

        config.math.mode = SplitMode::Alternating;
        let tokenizer = command.tokenizer(&config);
        let FieldSplit::Segments(segments) = split_field(&tokenizer, r"a \(b\) c") else {
            panic!("expected alternating segments");
        };
        assert_eq!(segments, vec!["a ", "b", " c"]);
    }
}
