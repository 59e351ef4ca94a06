// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use camino::Utf8PathBuf;
use eyre::{eyre, WrapErr};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

use qatex::{typeset::CommandEngine, view::QaView};

use super::{block_on_local, render::render_to, InputArgs};

#[derive(clap::Args)]
pub struct WatchCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path to the HTML file to write. Defaults to the input with `.html`.
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,
}

/// Re-render whenever the input changes, typesetting after every write.
pub fn watch(command: &WatchCommand) -> eyre::Result<()> {
    let config = command.input.load_config()?;
    let output = command.input.output_path(command.output.as_deref());
    let engine = CommandEngine::from_config(&config.typeset, output.as_str());
    let view = QaView::new(config, engine);

    let input = command
        .input
        .input
        .canonicalize_utf8()
        .wrap_err_with(|| eyre!("failed to resolve `{}`", command.input.input))?;
    let watched = input
        .parent()
        .ok_or_else(|| eyre!("`{}` has no parent directory", input))?
        .to_owned();

    block_on_local(async move {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(watched.as_std_path(), RecursiveMode::NonRecursive)?;
        color_print::cprintln!("<c>[watch]</> \"{}\"\n\nPress Ctrl+C to stop watching.\n", input);

        let tree = render_to(&view, &command.input, &output)?;
        view.mounted(&tree);

        while let Some(res) = rx.recv().await {
            let event: notify::Event = match res {
                Ok(event) => event,
                Err(error) => {
                    color_print::ceprintln!("<r>[watch] Error: {:?}</>", error);
                    continue;
                }
            };
            // notify-rs only reports `Modify(Any)` on some platforms, and
            // editors often save by replacing the file.
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                continue;
            }
            if !event.paths.iter().any(|path| path == input.as_std_path()) {
                continue;
            }

            debug!("change: {:?}", event.paths);
            match render_to(&view, &command.input, &output) {
                Ok(tree) => view.mounted(&tree),
                Err(err) => color_print::ceprintln!("<r>[watch] Error: {:?}</>", err),
            }
        }
        Ok::<(), eyre::Report>(())
    })?
}
