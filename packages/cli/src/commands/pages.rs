use std::io::{self, Write};

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use cms_model::{validate_new_page, NewPage};
use colored::Colorize;
use serde::Serialize;

use crate::commands::edit::edit_page;
use crate::context::Context;
use crate::prompt::confirm;
use crate::render;

#[derive(Debug, Subcommand)]
pub enum PagesCommand {
    /// List all pages
    List,

    /// Print a page's sections, documents and annexes
    Show {
        /// Page id
        id: String,
    },

    /// Create a page with no sections
    Create(CreateArgs),

    /// Delete a page
    Delete {
        /// Page id
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Page title
    #[arg(short, long)]
    pub title: String,

    /// URL slug (e.g. minha-nova-pagina)
    #[arg(short, long)]
    pub slug: String,

    /// Open the new page in the editor
    #[arg(long)]
    pub edit: bool,
}

pub async fn pages(command: PagesCommand, ctx: &mut Context) -> Result<()> {
    ctx.require_login()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        PagesCommand::List => list(ctx, &mut out).await,
        PagesCommand::Show { id } => show(ctx, &id, &mut out).await,
        PagesCommand::Create(args) => create(ctx, args, &mut out).await,
        PagesCommand::Delete { id, yes } => {
            let stdin = io::stdin();
            delete(ctx, &id, yes, &mut stdin.lock(), &mut out).await
        }
    }
}

fn print_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

async fn list(ctx: &mut Context, out: &mut dyn Write) -> Result<()> {
    let result = ctx.store.list_pages(&ctx.session).await;
    let pages = ctx.check(result).context("Could not load pages")?;

    if ctx.json {
        print_json(out, &pages)
    } else {
        render::summaries(out, &pages)?;
        Ok(())
    }
}

async fn show(ctx: &mut Context, id: &str, out: &mut dyn Write) -> Result<()> {
    let result = ctx.store.get_page(&ctx.session, id).await;
    let page = ctx
        .check(result)
        .with_context(|| format!("Could not load page {}", id))?;

    if ctx.json {
        print_json(out, &page)
    } else {
        render::page(out, &page)?;
        Ok(())
    }
}

async fn create(ctx: &mut Context, args: CreateArgs, out: &mut dyn Write) -> Result<()> {
    let new_page = NewPage::new(args.title, args.slug);
    validate_new_page(&new_page)?;

    let result = ctx.store.create_page(&ctx.session, &new_page).await;
    let page = ctx
        .check(result)
        .context("Could not create the page. Check whether the slug is already in use")?;

    if ctx.json {
        print_json(out, &page)?;
    } else {
        writeln!(
            out,
            "{} Created {} ({})",
            "✓".green(),
            page.title.bold(),
            page.id
        )?;
    }

    if args.edit {
        edit_page(ctx, page).await?;
    }
    Ok(())
}

async fn delete(
    ctx: &mut Context,
    id: &str,
    yes: bool,
    input: &mut dyn io::BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    let result = ctx.store.get_page(&ctx.session, id).await;
    let page = ctx
        .check(result)
        .with_context(|| format!("Could not load page {}", id))?;

    if !yes {
        let question = format!("Delete page {:?}?", page.title);
        if !confirm(&question, input, out)? {
            writeln!(out, "Cancelled")?;
            return Ok(());
        }
    }

    let result = ctx.store.delete_page(&ctx.session, id).await;
    let confirmation = ctx.check(result).context("Could not delete the page")?;
    if !confirmation.deleted {
        bail!("The server did not delete page {}", id);
    }

    if ctx.json {
        print_json(out, &confirmation)
    } else {
        writeln!(out, "{} Deleted {}", "✓".green(), page.title.bold())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::memory_context;
    use cms_model::SEED_PAGE_IDS;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_list_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = memory_context(dir.path()).await;
        ctx.json = true;

        let mut out = Vec::new();
        list(&mut ctx, &mut out).await.unwrap();

        let pages: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(pages.as_array().unwrap().len(), 2);
        assert_eq!(pages[0]["_id"], SEED_PAGE_IDS[0]);
    }

    #[tokio::test]
    async fn test_show_renders_tree() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = memory_context(dir.path()).await;

        let mut out = Vec::new();
        show(&mut ctx, SEED_PAGE_IDS[0], &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("/editais-e-legislacoes-mock"));
        assert!(text.contains("[sections.0.documents.0.annexes.1] Anexo II"));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_slug_locally() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = memory_context(dir.path()).await;

        let args = CreateArgs {
            title: "Nova".to_string(),
            slug: "Nova Página".to_string(),
            edit: false,
        };
        assert!(create(&mut ctx, args, &mut Vec::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_asks_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = memory_context(dir.path()).await;

        let mut out = Vec::new();
        delete(&mut ctx, SEED_PAGE_IDS[1], false, &mut Cursor::new("n\n"), &mut out)
            .await
            .unwrap();
        assert_eq!(ctx.store.list_pages(&ctx.session).await.unwrap().len(), 2);

        delete(&mut ctx, SEED_PAGE_IDS[1], false, &mut Cursor::new("y\n"), &mut out)
            .await
            .unwrap();
        assert_eq!(ctx.store.list_pages(&ctx.session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_page_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = memory_context(dir.path()).await;

        let result = delete(&mut ctx, "missing", true, &mut Cursor::new(""), &mut Vec::new()).await;
        assert!(result.is_err());
        assert_eq!(ctx.store.list_pages(&ctx.session).await.unwrap().len(), 2);
    }
}
