use crate::session::Session;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Tiddler to delete
    pub title: String,
}

pub fn delete(args: DeleteArgs, cwd: &str, page: &Path) -> Result<()> {
    let mut session = Session::open(cwd, page)?;
    if !session.wiki.delete_tiddler(&args.title) {
        bail!("Tiddler '{}' not found", args.title);
    }
    session.write_page()?;
    println!("{} Deleted {}", "✓".green(), args.title.bright_white());
    Ok(())
}
