use crate::session::Session;
use anyhow::{bail, Result};
use clap::Args;
use std::path::Path;
use tiddly_wikifier::{to_html_with, HtmlOptions};

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Tiddler to render
    pub title: String,

    /// Indent the HTML output
    #[arg(long)]
    pub pretty: bool,

    /// Print the output tree as JSON instead of HTML
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    /// Wrap matches of this pattern in highlight spans
    #[arg(long)]
    pub highlight: Option<String>,
}

pub fn render(args: RenderArgs, cwd: &str, page: &Path) -> Result<()> {
    let mut session = Session::open(cwd, page)?;
    if session.wiki.store().get(&args.title).is_none() {
        bail!("Tiddler '{}' not found", args.title);
    }

    let view = session
        .wiki
        .display_highlighted(&args.title, args.highlight.as_deref());
    let view = view.borrow();

    if args.json {
        println!("{}", serde_json::to_string_pretty(view.nodes())?);
    } else {
        let options = HtmlOptions {
            pretty: args.pretty,
            ..HtmlOptions::default()
        };
        println!("{}", to_html_with(view.nodes(), options));
    }
    Ok(())
}
