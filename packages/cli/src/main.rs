mod commands;
mod session;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use commands::{
    delete, export, history, init, list, render, save, search, DeleteArgs, ExportArgs,
    HistoryArgs, InitArgs, ListArgs, RenderArgs, SaveArgs, SearchArgs,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Tiddly CLI - render, query and edit a single-page wiki
#[derive(Parser, Debug)]
#[command(name = "tiddly")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Wiki page holding the store area
    #[arg(short, long, global = true, default_value = session::DEFAULT_PAGE)]
    page: PathBuf,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and an empty wiki page
    Init(InitArgs),

    /// Render a tiddler to HTML
    Render(RenderArgs),

    /// List titles
    List(ListArgs),

    /// Search titles and text
    Search(SearchArgs),

    /// Create, edit or rename a tiddler
    Save(SaveArgs),

    /// Delete a tiddler
    Delete(DeleteArgs),

    /// Show the stored revisions of a tiddler
    History(HistoryArgs),

    /// Write the page with its store area regenerated
    Export(ExportArgs),
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Render(args) => render(args, &cwd, &cli.page),
        Command::List(args) => list(args, &cwd, &cli.page),
        Command::Search(args) => search(args, &cwd, &cli.page),
        Command::Save(args) => save(args, &cwd, &cli.page),
        Command::Delete(args) => delete(args, &cwd, &cli.page),
        Command::History(args) => history(args, &cwd, &cli.page),
        Command::Export(args) => export(args, &cwd, &cli.page),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
