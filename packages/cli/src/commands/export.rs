use crate::session::Session;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Where to write the page (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn export(args: ExportArgs, cwd: &str, page: &Path) -> Result<()> {
    let session = Session::open(cwd, page)?;
    let exported = session.exported_page()?;

    match args.output {
        Some(output) => {
            let output = Path::new(cwd).join(output);
            fs::write(&output, exported)?;
            println!(
                "{} {} tiddler(s) → {}",
                "✓".green(),
                session.wiki.store().len(),
                output.display()
            );
        }
        None => print!("{}", exported),
    }
    Ok(())
}
