// Copyright (c) 2025 Qatex Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Qatex contributors

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{eyre, WrapErr};
use tracing::warn;

use qatex::{
    html_flake,
    render::RenderTree,
    typeset::{CommandEngine, TypesetEngine},
    view::QaView,
};

use super::{block_on_local, InputArgs};

#[derive(clap::Args)]
pub struct RenderCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path to the HTML file to write. Defaults to the input with `.html`.
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,
}

pub fn render(command: &RenderCommand) -> eyre::Result<()> {
    let config = command.input.load_config()?;
    let output = command.input.output_path(command.output.as_deref());
    let engine = CommandEngine::from_config(&config.typeset, output.as_str());
    let view = QaView::new(config, engine);

    let tree = render_to(&view, &command.input, &output)?;

    // Without a typeset command the page typesets itself on load.
    if tree.needs_typeset() && view.scheduler().engine().is_ready() {
        block_on_local(async {
            view.mounted(&tree);
            view.scheduler().settle().await;
        })?;
    }
    Ok(())
}

/// Reads the input, writes the document and returns the tree that was written.
pub fn render_to<E: TypesetEngine + 'static>(
    view: &QaView<E>,
    input: &InputArgs,
    output: &Utf8Path,
) -> eyre::Result<RenderTree> {
    let raw = input.read_input()?;
    let tree = view.render(&raw);
    if let RenderTree::Error { message } = &tree {
        warn!("{} rendered as an error: {}", input.input, message);
    }

    let html = html_flake::html_doc(&tree, input.title());
    std::fs::write(output, html)
        .wrap_err_with(|| eyre!("failed to write HTML file to `{}`", output))?;

    let faults = tree.rows().iter().filter(|row| row.is_err()).count();
    if faults > 0 {
        color_print::ceprintln!("<y>Warning: {} malformed entries in `{}`.</>", faults, input.input);
    }
    color_print::cprintln!("<g>Wrote</> {} ({} rows)", output, tree.rows().len());
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Render {
        #[command(flatten)]
        render: RenderCommand,
    }

    #[test]
    fn test_render_args() {
        let command = Render::try_parse_from(["render", "qa.json", "--offset", "1", "-o", "out.html"])
            .unwrap()
            .render;
        assert_eq!(command.output.as_deref(), Some(Utf8Path::new("out.html")));
        assert_eq!(command.input.output_path(command.output.as_deref()), "out.html");
    }

    #[test]
    fn test_render_has_no_mode_flag() {
        assert!(Render::try_parse_from(["render", "qa.json", "--mode", "extract-only"]).is_err());
    }
}
