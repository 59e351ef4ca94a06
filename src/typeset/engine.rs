// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use std::process::Stdio;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Typeset;

#[derive(Debug, Error)]
pub enum TypesetError {
    #[error("failed to start typeset command `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("typeset command exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("typeset engine rejected the request: {0}")]
    Rejected(String),
}

/// The external math engine as seen by the scheduler.
#[async_trait(?Send)]
pub trait TypesetEngine {
    /// Whether the asynchronous typeset entry point can be called yet.
    fn is_ready(&self) -> bool;

    async fn typeset(&self) -> Result<(), TypesetError>;

    /// Drop whatever the engine cached from earlier renders.
    fn clear_cache(&self);
}

/// Runs an external program as the typeset call, e.g. a KaTeX prerender
/// script pointed at the written document.
#[derive(Debug)]
pub struct CommandEngine {
    command: Vec<String>,
    cache_dir: Option<Utf8PathBuf>,
}

impl CommandEngine {
    pub fn new(command: Vec<String>, cache_dir: Option<Utf8PathBuf>) -> Self {
        Self { command, cache_dir }
    }

    /// `<output>` in the configured arguments is replaced by `output`.
    pub fn from_config(typeset: &Typeset, output: &str) -> Self {
        let command = typeset
            .command
            .iter()
            .map(|arg| arg.replace("<output>", output))
            .collect();
        Self::new(command, typeset.cache_dir.as_ref().map(Utf8PathBuf::from))
    }
}

#[async_trait(?Send)]
impl TypesetEngine for CommandEngine {
    fn is_ready(&self) -> bool {
        !self.command.is_empty()
    }

    async fn typeset(&self) -> Result<(), TypesetError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(TypesetError::Rejected("no typeset command configured".into()));
        };
        debug!(program = %program, ?args, "running typeset command");

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| TypesetError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TypesetError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn clear_cache(&self) {
        let Some(cache_dir) = &self.cache_dir else {
            return;
        };
        if !cache_dir.exists() {
            return;
        }
        match std::fs::remove_dir_all(cache_dir) {
            Ok(()) => debug!("cleared typeset cache `{}`", cache_dir),
            Err(err) => warn!("failed to clear typeset cache `{}`: {}", cache_dir, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_placeholder() {
        let typeset = Typeset {
            command: vec!["prerender".into(), "--in".into(), "<output>".into()],
            ..Typeset::default()
        };
        let engine = CommandEngine::from_config(&typeset, "site/qa.html");
        assert_eq!(engine.command, vec!["prerender", "--in", "site/qa.html"]);
        assert!(engine.is_ready());
    }

    #[test]
    fn test_empty_command_is_not_ready() {
        let engine = CommandEngine::from_config(&Typeset::default(), "qa.html");
        assert!(!engine.is_ready());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let engine = CommandEngine::new(vec!["qatex-no-such-program".into()], None);
        let err = engine.typeset().await.unwrap_err();
        assert!(matches!(err, TypesetError::Spawn { .. }));
    }
}
