use crate::session::Session;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Tiddler whose revisions to show
    pub title: String,

    /// Print each revision's text too
    #[arg(long)]
    pub text: bool,
}

pub fn history(args: HistoryArgs, cwd: &str, page: &Path) -> Result<()> {
    let session = Session::open(cwd, page)?;
    let gateway = session.gateway()?;

    let Some(row) = gateway.load(&args.title)? else {
        bail!("Tiddler '{}' has no stored row", args.title);
    };
    let revisions = gateway.history(row.id)?;
    if revisions.is_empty() {
        println!("{} No revisions recorded for {}", "⚠️".yellow(), args.title);
        return Ok(());
    }

    for revision in &revisions {
        println!(
            "{} v{} {} by {} ({})",
            "•".bright_blue(),
            revision.version,
            revision.title.bright_white(),
            revision.modifier,
            revision.timestamp.format("%Y-%m-%d %H:%M")
        );
        if args.text {
            for line in revision.text().lines() {
                println!("    {}", line.dimmed());
            }
        }
    }
    Ok(())
}
