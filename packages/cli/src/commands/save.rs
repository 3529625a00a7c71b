use crate::session::Session;
use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Title to save under
    pub title: String,

    /// Tiddler text
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the tiddler text from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Space separated tags, [[bracketed]] when they contain spaces
    #[arg(long)]
    pub tags: Option<String>,

    /// Rename this tiddler to TITLE
    #[arg(long)]
    pub from: Option<String>,
}

pub fn save(args: SaveArgs, cwd: &str, page: &Path) -> Result<()> {
    let mut session = Session::open(cwd, page)?;
    let old_title = args.from.clone().unwrap_or_else(|| args.title.clone());
    let existing = session.wiki.store().tiddler(&old_title).cloned();

    if args.from.is_some() && existing.is_none() {
        bail!("Tiddler '{}' not found", old_title);
    }

    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => {
            let path = Path::new(cwd).join(path);
            fs::read_to_string(&path)
                .with_context(|| format!("Cannot read {}", path.display()))?
        }
        (None, None) => existing.as_ref().map(|t| t.text.clone()).unwrap_or_default(),
    };
    let tags = match args.tags {
        Some(tags) => tags,
        None => existing.as_ref().map(|t| t.tag_list()).unwrap_or_default(),
    };

    if !session
        .wiki
        .save_tiddler(&old_title, &args.title, &text, &tags)?
    {
        println!("{} {} is unchanged", "✓".green(), args.title.bright_white());
        return Ok(());
    }
    session.write_page()?;

    if let Some(forwarder) = session.wiki.forwarder() {
        if forwarder.failed() > 0 {
            eprintln!("{} Database save failed (see log)", "⚠️".yellow());
        }
    }
    println!(
        "{} Saved {} → {}",
        "✓".green(),
        args.title.bright_white(),
        session.page_path().display()
    );
    Ok(())
}
