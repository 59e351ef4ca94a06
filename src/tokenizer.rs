// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

//! Splitting text fields into plain text and delimiter-wrapped math.
//!
//! Both policies sit on top of [`MathScanner`], a two-state scanner
//! (`OutsideMath`, `InsideMath`) walking the field code point by code point.

use serde::Serialize;

use crate::config::{DelimiterPair, Math, SplitMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'s> {
    Text(&'s str),

    /// `raw` is the exact source slice including both delimiters.
    Math { expression: &'s str, raw: &'s str },
}

impl<'s> Token<'s> {
    pub fn is_math(&self) -> bool {
        matches!(self, Token::Math { .. })
    }
}

/// Result of the extract-only policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Extraction<'s> {
    /// The field holds no delimited math at all.
    NoMath,
    Expressions(Vec<&'s str>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tokens<'s> {
    Alternating(Vec<Token<'s>>),
    Extracted(Extraction<'s>),
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    OutsideMath,
    InsideMath {
        pair: usize,
        open_at: usize,
        body_at: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct Span {
    open_at: usize,
    body_at: usize,
    body_end: usize,
    end: usize,
}

/// Yields `Text, Math, Text, ..., Text`: always an odd number of tokens.
pub struct MathScanner<'s, 'd> {
    input: &'s str,
    delimiters: &'d [DelimiterPair],
    /// Delimiter indices, longest opener first.
    order: Vec<usize>,
    /// Pairs whose opener was seen without a closer up to end of input.
    unterminated: Vec<bool>,
    cursor: usize,
    pending: Option<Token<'s>>,
    finished: bool,
}

impl<'s, 'd> MathScanner<'s, 'd> {
    pub fn new(input: &'s str, delimiters: &'d [DelimiterPair]) -> Self {
        let mut order: Vec<usize> = (0..delimiters.len())
            .filter(|&i| !delimiters[i].open().is_empty() && !delimiters[i].close().is_empty())
            .collect();
        order.sort_by_key(|&i| std::cmp::Reverse(delimiters[i].open().len()));

        Self {
            input,
            delimiters,
            order,
            unterminated: vec![false; delimiters.len()],
            cursor: 0,
            pending: None,
            finished: false,
        }
    }

    fn opener_at(&self, at: usize) -> Option<usize> {
        let rest = &self.input[at..];
        self.order
            .iter()
            .copied()
            .filter(|&i| !self.unterminated[i])
            .find(|&i| rest.starts_with(self.delimiters[i].open()))
    }

    fn find_span(&mut self, from: usize) -> Option<Span> {
        let mut state = ScanState::OutsideMath;
        let mut at = from;

        loop {
            let Some(c) = self.input[at..].chars().next() else {
                let ScanState::InsideMath { pair, open_at, .. } = state else {
                    return None;
                };
                // No closer anywhere after this opener, so this pair can
                // never match again. Rescan with the opener as plain text.
                self.unterminated[pair] = true;
                state = ScanState::OutsideMath;
                at = open_at;
                continue;
            };

            match state {
                ScanState::OutsideMath => {
                    if let Some(pair) = self.opener_at(at) {
                        let body_at = at + self.delimiters[pair].open().len();
                        state = ScanState::InsideMath {
                            pair,
                            open_at: at,
                            body_at,
                        };
                        at = body_at;
                        continue;
                    }
                }
                ScanState::InsideMath {
                    pair,
                    open_at,
                    body_at,
                } => {
                    let close = self.delimiters[pair].close();
                    if self.input[at..].starts_with(close) {
                        return Some(Span {
                            open_at,
                            body_at,
                            body_end: at,
                            end: at + close.len(),
                        });
                    }
                }
            }
            at += c.len_utf8();
        }
    }
}

impl<'s, 'd> Iterator for MathScanner<'s, 'd> {
    type Item = Token<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }
        if self.finished {
            return None;
        }

        let start = self.cursor;
        match self.find_span(start) {
            Some(span) => {
                self.pending = Some(Token::Math {
                    expression: &self.input[span.body_at..span.body_end],
                    raw: &self.input[span.open_at..span.end],
                });
                self.cursor = span.end;
                Some(Token::Text(&self.input[start..span.open_at]))
            }
            None => {
                self.finished = true;
                Some(Token::Text(&self.input[start..]))
            }
        }
    }
}

/// Alternating split: even positions are text, odd positions are math.
pub fn tokenize<'s>(input: &'s str, delimiters: &[DelimiterPair]) -> Vec<Token<'s>> {
    MathScanner::new(input, delimiters).collect()
}

/// Extract-only: the interiors of every delimited span, in order.
pub fn extract<'s>(input: &'s str, delimiters: &[DelimiterPair]) -> Extraction<'s> {
    let expressions: Vec<&str> = MathScanner::new(input, delimiters)
        .filter_map(|token| match token {
            Token::Math { expression, .. } => Some(expression),
            Token::Text(_) => None,
        })
        .collect();

    if expressions.is_empty() {
        Extraction::NoMath
    } else {
        Extraction::Expressions(expressions)
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    delimiters: Vec<DelimiterPair>,
    mode: SplitMode,
}

impl Tokenizer {
    pub fn new(delimiters: Vec<DelimiterPair>, mode: SplitMode) -> Self {
        Self { delimiters, mode }
    }

    pub fn from_config(math: &Math) -> Self {
        Self::new(math.delimiters.clone(), math.mode)
    }

    pub fn with_mode(mut self, mode: SplitMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    pub fn tokenize<'s>(&self, field: &'s str) -> Vec<Token<'s>> {
        tokenize(field, &self.delimiters)
    }

    pub fn extract<'s>(&self, field: &'s str) -> Extraction<'s> {
        extract(field, &self.delimiters)
    }

    pub fn run<'s>(&self, field: &'s str) -> Tokens<'s> {
        match self.mode {
            SplitMode::Alternating => Tokens::Alternating(self.tokenize(field)),
            SplitMode::ExtractOnly => Tokens::Extracted(self.extract(field)),
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(DelimiterPair::defaults(), SplitMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(input: &str) -> Vec<&str> {
        Tokenizer::default()
            .tokenize(input)
            .into_iter()
            .map(|token| match token {
                Token::Text(s) => s,
                Token::Math { expression, .. } => expression,
            })
            .collect()
    }

    #[test]
    fn test_no_math() {
        assert_eq!(split("No math"), vec!["No math"]);
        assert_eq!(split(""), vec![""]);
    }

    #[test]
    fn test_inline_math() {
        assert_eq!(split(r"What is \(2+2\)?"), vec!["What is ", "2+2", "?"]);
    }

    #[test]
    fn test_both_pairs_and_alternation() {
        let tokens = Tokenizer::default().tokenize(r"\(a\)\[b\] end");
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0], Token::Text(""));
        assert_eq!(
            tokens[1],
            Token::Math {
                expression: "a",
                raw: r"\(a\)"
            }
        );
        assert_eq!(tokens[2], Token::Text(""));
        assert_eq!(
            tokens[3],
            Token::Math {
                expression: "b",
                raw: r"\[b\]"
            }
        );
        assert_eq!(tokens[4], Token::Text(" end"));
        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.is_math(), i % 2 == 1);
        }
    }

    #[test]
    fn test_line_breaks_inside_math() {
        assert_eq!(
            split("sum \\[\n\\sum_i x_i\n\\] done"),
            vec!["sum ", "\n\\sum_i x_i\n", " done"]
        );
    }

    #[test]
    fn test_closer_must_match_opener() {
        assert_eq!(split(r"\(a\] b\)"), vec!["", r"a\] b", ""]);
    }

    #[test]
    fn test_unterminated_opener_is_text() {
        assert_eq!(split(r"cost \(x and more"), vec![r"cost \(x and more"]);
        assert_eq!(split(r"\(x then \[y\]"), vec![r"\(x then ", "y", ""]);
    }

    #[test]
    fn test_first_closer_ends_span() {
        assert_eq!(split(r"\(a \(b\) c\)"), vec!["", r"a \(b", r" c\)"]);
    }

    #[test]
    fn test_longest_opener_wins() {
        let delimiters = vec![DelimiterPair::new("$", "$"), DelimiterPair::new("$$", "$$")];
        let tokens = tokenize("a $$x$$ b", &delimiters);
        assert_eq!(
            tokens[1],
            Token::Math {
                expression: "x",
                raw: "$$x$$"
            }
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(split(r"α \(β^2\) γ"), vec!["α ", "β^2", " γ"]);
    }

    #[test]
    fn test_raw_round_trip() {
        let field = "Let \\(x\\) and \\[\ny = x^2\n\\] hold.";
        let rebuilt: String = tokenize(field, &DelimiterPair::defaults())
            .into_iter()
            .map(|token| match token {
                Token::Text(s) => s,
                Token::Math { raw, .. } => raw,
            })
            .collect();
        assert_eq!(rebuilt, field);
    }

    #[test]
    fn test_extract() {
        let tokenizer = Tokenizer::default();
        assert_eq!(
            tokenizer.extract(r"\(a\) and \(b\)"),
            Extraction::Expressions(vec!["a", "b"])
        );
        assert_eq!(tokenizer.extract("no math"), Extraction::NoMath);
        assert_eq!(
            tokenizer.extract(r"\(\)"),
            Extraction::Expressions(vec![""])
        );
    }

    #[test]
    fn test_run_follows_mode() {
        let tokenizer = Tokenizer::default().with_mode(SplitMode::ExtractOnly);
        assert_eq!(
            tokenizer.run("plain"),
            Tokens::Extracted(Extraction::NoMath)
        );
        let tokenizer = tokenizer.with_mode(SplitMode::Alternating);
        assert_eq!(
            tokenizer.run("plain"),
            Tokens::Alternating(vec![Token::Text("plain")])
        );
    }
}
