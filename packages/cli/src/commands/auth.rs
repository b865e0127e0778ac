use anyhow::{Context as _, Result};
use clap::Args;
use cms_client::login as authenticate;
use cms_model::Credentials;
use colored::Colorize;
use tracing::info;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long, env = "CMS_EMAIL")]
    pub email: String,

    /// Account password
    #[arg(short, long, env = "CMS_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn login(args: LoginArgs, ctx: &mut Context) -> Result<()> {
    let credentials = Credentials::new(args.email, args.password);

    let session = authenticate(ctx.store.as_ref(), &credentials)
        .await
        .context("Login failed")?;
    ctx.start_session(session)?;

    info!(email = %credentials.email, api_url = %ctx.config.api_url, "logged in");
    println!(
        "{} Logged in as {}",
        "✓".green(),
        credentials.email.bright_white()
    );
    Ok(())
}

pub fn logout(ctx: &mut Context) -> Result<()> {
    if ctx.end_session()? {
        println!("{} Logged out", "✓".green());
    } else {
        println!("Not logged in");
    }
    Ok(())
}
