use crate::config::{Config, DEFAULT_CONFIG_NAME, DEFAULT_SESSION_FILE};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Base URL of the REST API
    #[arg(long, default_value = cms_client::DEFAULT_API_URL)]
    pub api_url: String,

    /// Session file location
    #[arg(long, default_value = DEFAULT_SESSION_FILE)]
    pub session_file: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = cms_client::DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        api_url: args.api_url,
        session_file: args.session_file,
        timeout_secs: args.timeout_secs,
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("Next steps:");
    println!("  1. Run: cms login --email <email> --password <password>");
    println!("  2. Run: cms pages list");

    Ok(())
}
