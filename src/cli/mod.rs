// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

pub mod render;
pub mod split;
pub mod watch;

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{eyre, WrapErr};

use qatex::config::{self, Config, FieldOffset};

/// Options shared by every subcommand reading a conversation file.
#[derive(clap::Args)]
pub struct InputArgs {
    /// JSON file holding an array of question/answer tuples.
    pub input: Utf8PathBuf,

    /// Path to the configuration file (e.g., "Qatex.toml").
    #[arg(short, long, default_value_t = config::DEFAULT_CONFIG_PATH.into())]
    pub config: Utf8PathBuf,

    /// Tuple position of the question; overrides `conversation.field-offset`.
    #[arg(long)]
    pub offset: Option<FieldOffset>,

    /// Inline math marker; overrides `math.marker`.
    #[arg(long)]
    pub marker: Option<char>,
}

impl InputArgs {
    pub fn load_config(&self) -> eyre::Result<Config> {
        let mut config = match config::find_config(&self.config, &self.input) {
            Some(path) => {
                let source = std::fs::read_to_string(&path)
                    .wrap_err_with(|| eyre!("failed to read config file `{}`", path))?;
                config::parse_config(&source)
                    .wrap_err_with(|| eyre!("invalid config file `{}`", path))?
            }
            None => Config::default(),
        };

        if let Some(offset) = self.offset {
            config.conversation.field_offset = offset;
        }
        if let Some(marker) = self.marker {
            config.math.marker = marker;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn read_input(&self) -> eyre::Result<String> {
        std::fs::read_to_string(&self.input)
            .wrap_err_with(|| eyre!("failed to read conversation file `{}`", self.input))
    }

    /// `qa.json` renders to `qa.html` unless an output path is given.
    pub fn output_path(&self, output: Option<&Utf8Path>) -> Utf8PathBuf {
        output
            .map(Utf8Path::to_owned)
            .unwrap_or_else(|| self.input.with_extension("html"))
    }

    pub fn title(&self) -> &str {
        self.input.file_stem().unwrap_or("conversation")
    }
}

/// Single-threaded runtime for the typeset scheduler.
pub fn block_on_local<F: std::future::Future>(future: F) -> eyre::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to start async runtime")?;
    Ok(tokio::task::LocalSet::new().block_on(&runtime, future))
}
