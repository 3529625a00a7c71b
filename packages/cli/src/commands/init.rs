use crate::session::DEFAULT_PAGE;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use tiddly_workspace::{WikiConfig, DEFAULT_CONFIG_NAME};

const BLANK_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>My TiddlyWiki</title></head>
<body>
<div id="storeArea">
</div>
</body>
</html>
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Name edits are signed with
    #[arg(short, long, default_value = "YourName")]
    pub user_name: String,

    /// SQLite database for revision history
    #[arg(short, long)]
    pub database: Option<String>,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    println!("{}", "📝 Initializing wiki...".bright_blue().bold());

    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
    } else {
        let config = WikiConfig {
            user_name: args.user_name,
            database: args.database,
            ..WikiConfig::default()
        };
        fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
        println!("  {} {}", "✓".green(), DEFAULT_CONFIG_NAME);
    }

    let page_path = PathBuf::from(cwd).join(DEFAULT_PAGE);
    if page_path.exists() && !args.force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            "⚠️".yellow(),
            DEFAULT_PAGE.bright_white()
        );
    } else {
        fs::write(&page_path, BLANK_PAGE)?;
        println!("  {} {}", "✓".green(), DEFAULT_PAGE);
    }

    Ok(())
}
