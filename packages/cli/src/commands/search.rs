use crate::session::Session;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text (or regular expression with --regex) to look for
    pub pattern: String,

    /// Match case exactly
    #[arg(short, long)]
    pub case_sensitive: bool,

    /// Treat the pattern as a regular expression
    #[arg(short, long)]
    pub regex: bool,
}

pub fn search(args: SearchArgs, cwd: &str, page: &Path) -> Result<()> {
    let session = Session::open(cwd, page)?;
    let titles = session
        .wiki
        .search(&args.pattern, args.case_sensitive, args.regex)?;

    if titles.is_empty() {
        eprintln!("{} No tiddlers match '{}'", "✗".red(), args.pattern);
        return Ok(());
    }
    for title in &titles {
        println!("{}", title);
    }
    eprintln!("{} {} match(es)", "✓".green(), titles.len());
    Ok(())
}
