use std::io;

use anyhow::{Context as _, Result};
use clap::Args;
use cms_model::Page;

use crate::context::Context;
use crate::repl::Repl;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Page id
    pub id: String,
}

pub async fn edit(args: EditArgs, ctx: &mut Context) -> Result<()> {
    ctx.require_login()?;

    let result = ctx.store.get_page(&ctx.session, &args.id).await;
    let page = ctx
        .check(result)
        .with_context(|| format!("Could not load page {}", args.id))?;

    edit_page(ctx, page).await
}

/// Open `page` in the interactive editor on stdin/stdout
pub async fn edit_page(ctx: &mut Context, page: Page) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Repl::new(ctx, page)
        .run(&mut stdin.lock(), &mut stdout.lock())
        .await
}
