mod commands;
mod config;
mod context;
mod prompt;
mod render;
mod repl;
mod session_file;

use std::path::Path;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{edit, init, login, logout, pages, EditArgs, InitArgs, LoginArgs, PagesCommand};
use context::Context;
use tracing_subscriber::EnvFilter;

/// CMS admin client - manage pages, sections, documents and annexes
#[derive(Parser, Debug)]
#[command(name = "cms")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the REST API (overrides cms.config.json)
    #[arg(long, global = true, env = "CMS_API_URL")]
    api_url: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log requests and editor activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a cms.config.json in the current directory
    Init(InitArgs),

    /// Sign in and remember the session
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// List, show, create and delete pages
    Pages {
        #[command(subcommand)]
        command: PagesCommand,
    },

    /// Edit a page interactively
    Edit(EditArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, cwd: &Path) -> Result<()> {
    let Cli {
        command,
        api_url,
        json,
        ..
    } = cli;

    match command {
        Command::Init(args) => init(args, cwd),
        Command::Login(args) => login(args, &mut Context::load(cwd, api_url, json)?).await,
        Command::Logout => logout(&mut Context::load(cwd, api_url, json)?),
        Command::Pages { command } => pages(command, &mut Context::load(cwd, api_url, json)?).await,
        Command::Edit(args) => edit(args, &mut Context::load(cwd, api_url, json)?).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match std::env::current_dir().context("Cannot get current directory") {
        Ok(cwd) => run(cli, &cwd).await,
        Err(e) => Err(e),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
