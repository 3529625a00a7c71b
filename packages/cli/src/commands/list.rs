use crate::session::Session;
use anyhow::{bail, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    /// Every listed tiddler
    All,
    /// Tiddlers carrying --tag
    Tag,
    /// Link targets that don't exist
    Missing,
    /// Tiddlers nothing links to
    Orphans,
    /// Shadow tiddlers
    Shadowed,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Which titles to list
    #[arg(value_enum, default_value = "all")]
    pub kind: ListKind,

    /// Tag to filter on (with `tag`)
    #[arg(short, long)]
    pub tag: Option<String>,
}

pub fn list(args: ListArgs, cwd: &str, page: &Path) -> Result<()> {
    let session = Session::open(cwd, page)?;
    let wiki = &session.wiki;

    let titles = match args.kind {
        ListKind::All => wiki.list_all(),
        ListKind::Tag => match args.tag.as_deref() {
            Some(tag) => wiki.list_by_tag(tag),
            None => bail!("`list tag` needs --tag <TAG>"),
        },
        ListKind::Missing => wiki.list_missing(),
        ListKind::Orphans => wiki.list_orphans(),
        ListKind::Shadowed => wiki.list_shadowed(),
    };

    for title in &titles {
        println!("{}", title);
    }
    eprintln!("{} {} tiddler(s)", "✓".green(), titles.len());
    Ok(())
}
