// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use crate::{
    config::Config,
    conversation::parse_conversation,
    render::{MathContext, RenderTree, RowBuilder},
    tokenizer::Tokenizer,
    typeset::{TypesetEngine, TypesetScheduler},
};

/// How the host should place the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Render into the main document. Math typesetting needs this.
    Inline,
    /// The host's default isolated frame.
    Frame,
}

/// Converts a raw conversation value to a render tree, without a surface.
pub fn render_value(raw: &str, config: &Config) -> RenderTree {
    let tokenizer = Tokenizer::from_config(&config.math);
    render_with(raw, config, &tokenizer)
}

fn render_with(raw: &str, config: &Config, tokenizer: &Tokenizer) -> RenderTree {
    match parse_conversation(raw, config.conversation.field_offset) {
        Ok(list) => RowBuilder::new(tokenizer, config.math.marker).build(&list),
        Err(err) => RenderTree::Error {
            message: err.to_string(),
        },
    }
}

/// One question/answer display surface with its own typeset scheduler.
pub struct QaView<E> {
    config: Config,
    tokenizer: Tokenizer,
    scheduler: TypesetScheduler<E>,
}

impl<E: TypesetEngine + 'static> QaView<E> {
    pub fn new(config: Config, engine: E) -> Self {
        let tokenizer = Tokenizer::from_config(&config.math);
        let scheduler = TypesetScheduler::from_config(engine, &config.typeset);
        Self {
            config,
            tokenizer,
            scheduler,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> Layout {
        Layout::Inline
    }

    /// Delimiters to register with the typeset engine.
    pub fn math_context(&self) -> MathContext {
        MathContext::new(self.config.math.marker)
    }

    pub fn render(&self, raw: &str) -> RenderTree {
        render_with(raw, &self.config, &self.tokenizer)
    }

    /// Mount hook: call once `tree` is attached to the surface.
    ///
    /// A tree with math spawns the debounce task with
    /// [`tokio::task::spawn_local`], so this must run inside a
    /// [`tokio::task::LocalSet`] or it panics.
    pub fn mounted(&self, tree: &RenderTree) {
        if tree.needs_typeset() {
            self.scheduler.trigger();
        }
    }

    pub fn scheduler(&self) -> &TypesetScheduler<E> {
        &self.scheduler
    }
}
