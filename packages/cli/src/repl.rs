//! Line-oriented page editor.
//!
//! Reads one command per line and applies it to an [`EditSession`]. Paths
//! are the dotted form understood by `cms_editor` (`sections.0.title`,
//! `sections[0].documents[1]`).

use std::io::{BufRead, Write};

use anyhow::{Context as _, Result};
use cms_client::login;
use cms_editor::{
    get_field, get_node, list_len, parse_segments, EditSession, FieldPath, ItemPath, ListPath,
    Mutation, NodePath, NodeRef, PathError,
};
use cms_model::{Credentials, Page};
use colored::Colorize;
use thiserror::Error;
use tracing::debug;

use crate::context::Context;
use crate::prompt::confirm;
use crate::render;

pub const HELP: &str = "\
Commands:
  show [path]          Print the page, a node, a list or a field
  set <path> <value>   Set a field (title, slug, type, url, description)
  clear <path>         Remove an optional description
  add <list> [title]   Append a new section, document or annex
  rm <item-path>       Remove a section, document or annex
  undo / redo          Step through the edit history
  save                 Send the page to the server
  login <email> <pw>   Sign in again after the session expired
  quit / exit          Leave the editor
  help                 Show this message

Paths: sections.0.title, sections.0.documents, sections[0].documents[1].annexes.2";

/// What `show` should print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(NodePath),
    List(ListPath),
    Field(FieldPath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Show(Option<Target>),
    Set { path: FieldPath, value: String },
    Clear(FieldPath),
    Add {
        list: ListPath,
        title: Option<String>,
    },
    Remove(ItemPath),
    Undo,
    Redo,
    Save,
    Login(Credentials),
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command {0:?} (type `help` for a list)")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Path(#[from] PathError),
}

impl ReplCommand {
    /// Parse one input line. `None` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim_start()),
            None => (line, ""),
        };

        let command = match name {
            "show" | "ls" => {
                if rest.is_empty() {
                    ReplCommand::Show(None)
                } else {
                    ReplCommand::Show(Some(parse_target(rest)?))
                }
            }
            "set" => {
                let (path, value) = match rest.split_once(char::is_whitespace) {
                    Some((path, value)) => (path, value),
                    None if !rest.is_empty() => (rest, ""),
                    None => return Err(ParseError::Usage("set <path> <value>")),
                };
                ReplCommand::Set {
                    path: path.parse()?,
                    value: value.to_string(),
                }
            }
            "clear" => ReplCommand::Clear(required(rest, "clear <path>")?.parse()?),
            "add" => {
                let (list, title) = match required(rest, "add <list-path> [title]")?
                    .split_once(char::is_whitespace)
                {
                    Some((list, title)) => (list, Some(title.trim().to_string())),
                    None => (rest, None),
                };
                ReplCommand::Add {
                    list: list.parse()?,
                    title,
                }
            }
            "rm" | "remove" => ReplCommand::Remove(required(rest, "rm <item-path>")?.parse()?),
            "undo" => ReplCommand::Undo,
            "redo" => ReplCommand::Redo,
            "save" => ReplCommand::Save,
            "login" => match rest.split_once(char::is_whitespace) {
                Some((email, password)) if !password.trim().is_empty() => {
                    ReplCommand::Login(Credentials::new(email, password.trim()))
                }
                _ => return Err(ParseError::Usage("login <email> <password>")),
            },
            "help" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn required<'a>(rest: &'a str, usage: &'static str) -> Result<&'a str, ParseError> {
    if rest.is_empty() {
        Err(ParseError::Usage(usage))
    } else {
        Ok(rest)
    }
}

fn parse_target(raw: &str) -> Result<Target, PathError> {
    if raw == "page" {
        return Ok(Target::Node(NodePath::Page));
    }

    let segments = parse_segments(raw)?;
    match NodePath::from_segments(&segments) {
        Ok(node) => return Ok(Target::Node(node)),
        Err(PathError::NotANode(_)) => {}
        Err(e) => return Err(e),
    }
    match ListPath::from_segments(&segments) {
        Ok(list) => return Ok(Target::List(list)),
        Err(PathError::NotAList(_)) => {}
        Err(e) => return Err(e),
    }
    FieldPath::from_segments(&segments).map(Target::Field)
}

pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl<'a> {
    ctx: &'a mut Context,
    editor: EditSession,
}

impl<'a> Repl<'a> {
    pub fn new(ctx: &'a mut Context, page: Page) -> Self {
        let mut editor = EditSession::new();
        editor.load(page);
        Self { ctx, editor }
    }

    /// Read and execute commands until `quit` or end of input
    pub async fn run<R: BufRead, W: Write>(&mut self, input: &mut R, out: &mut W) -> Result<()> {
        if let Some(page) = self.editor.page() {
            render::page(out, page)?;
        }
        writeln!(out, "{}", "Type `help` for commands.".dimmed())?;

        loop {
            let marker = if self.editor.is_dirty() { "*" } else { "" };
            write!(out, "{} ", format!("cms{}>", marker).cyan().bold())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                if self.editor.is_dirty() {
                    writeln!(out, "{} Unsaved changes discarded", "⚠️".yellow())?;
                }
                return Ok(());
            }

            match ReplCommand::parse(&line) {
                Ok(None) => {}
                Ok(Some(command)) => {
                    if let Flow::Quit = self.execute(command, input, out).await? {
                        return Ok(());
                    }
                }
                Err(err) => writeln!(out, "{} {}", "✗".red(), err)?,
            }
        }
    }

    /// Execute one command.
    ///
    /// Edit and store failures are reported and leave the page as it was;
    /// only broken output ends the editor with an error.
    pub async fn execute(
        &mut self,
        command: ReplCommand,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
    ) -> Result<Flow> {
        debug!(?command, "repl command");

        let Some(page) = self.editor.page() else {
            writeln!(out, "{} No page loaded", "✗".red())?;
            return Ok(Flow::Quit);
        };

        match command {
            ReplCommand::Show(target) => show(out, page, target)?,

            ReplCommand::Set { path, value } => {
                match self.editor.set_field(path, value.as_str()) {
                    Ok(_) => writeln!(out, "{} {} = {:?}", "✓".green(), path, value)?,
                    Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
                }
            }

            ReplCommand::Clear(path) => match self.editor.apply(Mutation::ClearField { path }) {
                Ok(_) => writeln!(out, "{} {} cleared", "✓".green(), path)?,
                Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
            },

            ReplCommand::Add { list, title } => {
                let result = match title {
                    Some(title) => self.editor.add_titled_child(list, title),
                    None => self.editor.add_child(list),
                };
                match result {
                    Ok(_) => {
                        let index = self
                            .editor
                            .page()
                            .and_then(|page| list_len(page, &list).ok())
                            .unwrap_or(1)
                            .saturating_sub(1);
                        writeln!(
                            out,
                            "{} Added {} at {}",
                            "✓".green(),
                            list.child_kind(),
                            list.item(index)
                        )?;
                    }
                    Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
                }
            }

            ReplCommand::Remove(at) => {
                let title = match get_node(page, &at.node()) {
                    Ok(node) => node_title(node),
                    Err(e) => {
                        writeln!(out, "{} {}", "✗".red(), e)?;
                        return Ok(Flow::Continue);
                    }
                };

                let question = format!("Remove {} {:?}?", at.list.child_kind(), title);
                if !confirm(&question, input, out)? {
                    writeln!(out, "Cancelled")?;
                    return Ok(Flow::Continue);
                }

                match self.editor.remove_child(at) {
                    Ok(_) => writeln!(out, "{} Removed {}", "✓".green(), at)?,
                    Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
                }
            }

            ReplCommand::Undo => {
                let step = step_name(self.editor.history().undo_description());
                match self.editor.undo() {
                    Ok(true) => writeln!(out, "{} Undone{}", "✓".green(), step)?,
                    Ok(false) => writeln!(out, "Nothing to undo")?,
                    Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
                }
            }

            ReplCommand::Redo => {
                let step = step_name(self.editor.history().redo_description());
                match self.editor.redo() {
                    Ok(true) => writeln!(out, "{} Redone{}", "✓".green(), step)?,
                    Ok(false) => writeln!(out, "Nothing to redo")?,
                    Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
                }
            }

            ReplCommand::Save => self.save(out).await?,

            ReplCommand::Login(credentials) => {
                let result = login(self.ctx.store.as_ref(), &credentials).await;
                match result.context("Login failed") {
                    Ok(session) => {
                        self.ctx.start_session(session)?;
                        writeln!(out, "{} Logged in as {}", "✓".green(), credentials.email)?;
                    }
                    Err(e) => writeln!(out, "{} {:#}", "✗".red(), e)?,
                }
            }

            ReplCommand::Help => writeln!(out, "{}", HELP)?,

            ReplCommand::Quit => {
                if self.editor.is_dirty()
                    && !confirm("Discard unsaved changes?", input, out)?
                {
                    return Ok(Flow::Continue);
                }
                return Ok(Flow::Quit);
            }
        }

        Ok(Flow::Continue)
    }

    async fn save(&mut self, out: &mut dyn Write) -> Result<()> {
        let (Some(id), Ok(payload)) = (self.editor.page_id(), self.editor.payload()) else {
            return Ok(());
        };
        let id = id.to_string();

        let result = self.ctx.store.update_page(&self.ctx.session, &id, &payload).await;
        match self.ctx.check(result) {
            Ok(stored) => {
                self.editor.mark_saved(Some(stored));
                writeln!(out, "{} Page saved", "✓".green())?;
                Ok(())
            }
            Err(e) => {
                let next = if self.ctx.session.is_authenticated() {
                    "fix the problem"
                } else {
                    "`login <email> <password>`"
                };
                writeln!(out, "{} Failed to save page: {:#}", "✗".red(), e)?;
                writeln!(out, "  Local edits are kept; {} and `save` again.", next)?;
                Ok(())
            }
        }
    }
}

fn step_name(description: Option<&str>) -> String {
    description
        .map(|description| format!(": {}", description))
        .unwrap_or_default()
}

fn node_title(node: NodeRef<'_>) -> String {
    match node {
        NodeRef::Page(page) => page.title.clone(),
        NodeRef::Section(section) => section.title.clone(),
        NodeRef::Document(document) => document.title.clone(),
        NodeRef::Annex(annex) => annex.title.clone(),
    }
}

fn show(out: &mut dyn Write, page: &Page, target: Option<Target>) -> Result<()> {
    match target {
        None => render::page(out, page)?,
        Some(Target::Node(path)) => match get_node(page, &path) {
            Ok(node) => render::node(out, path, node)?,
            Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
        },
        Some(Target::List(list)) => match list_len(page, &list) {
            Ok(len) => {
                writeln!(out, "{} ({} {}s)", list, len, list.child_kind())?;
                for index in 0..len {
                    let at = list.item(index);
                    if let Ok(node) = get_node(page, &at.node()) {
                        writeln!(out, "  {} {}", format!("[{}]", at).cyan(), node_title(node))?;
                    }
                }
            }
            Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
        },
        Some(Target::Field(path)) => match get_field(page, &path) {
            Ok(Some(value)) => writeln!(out, "{}", value)?,
            Ok(None) => writeln!(out, "{}", "(empty)".dimmed())?,
            Err(e) => writeln!(out, "{} {}", "✗".red(), e)?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::memory_context;
    use cms_editor::{DocumentField, SectionField};
    use cms_client::{DEFAULT_EMAIL, DEFAULT_PASSWORD};
    use cms_model::SEED_PAGE_IDS;
    use std::io::Cursor;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("   ").unwrap(), None);
        assert_eq!(ReplCommand::parse("undo").unwrap(), Some(ReplCommand::Undo));
        assert_eq!(ReplCommand::parse("exit").unwrap(), Some(ReplCommand::Quit));
        assert_eq!(
            ReplCommand::parse("login ana@ufsj.edu.br segredo").unwrap(),
            Some(ReplCommand::Login(Credentials::new("ana@ufsj.edu.br", "segredo")))
        );
        assert_eq!(
            ReplCommand::parse("login ana@ufsj.edu.br"),
            Err(ParseError::Usage("login <email> <password>"))
        );
        assert_eq!(
            ReplCommand::parse("add sections.0.documents").unwrap(),
            Some(ReplCommand::Add {
                list: ListPath::Documents { section: 0 },
                title: None
            })
        );
        assert_eq!(
            ReplCommand::parse("add sections Resultados  2025").unwrap(),
            Some(ReplCommand::Add {
                list: ListPath::Sections,
                title: Some("Resultados  2025".to_string())
            })
        );
        assert_eq!(
            ReplCommand::parse("rm sections[1]").unwrap(),
            Some(ReplCommand::Remove(ListPath::Sections.item(1)))
        );
    }

    #[test]
    fn test_parse_set_keeps_spaces_in_value() {
        let command = ReplCommand::parse("set sections.0.title Editais  UFSJ 2025").unwrap();
        assert_eq!(
            command,
            Some(ReplCommand::Set {
                path: FieldPath::Section {
                    section: 0,
                    field: SectionField::Title,
                },
                value: "Editais  UFSJ 2025".to_string(),
            })
        );

        let empty = ReplCommand::parse("set sections.0.documents.0.description").unwrap();
        assert_eq!(
            empty,
            Some(ReplCommand::Set {
                path: FieldPath::Document {
                    section: 0,
                    document: 0,
                    field: DocumentField::Description,
                },
                value: String::new(),
            })
        );
    }

    #[test]
    fn test_parse_show_targets() {
        assert_eq!(
            ReplCommand::parse("show").unwrap(),
            Some(ReplCommand::Show(None))
        );
        assert_eq!(
            ReplCommand::parse("show page").unwrap(),
            Some(ReplCommand::Show(Some(Target::Node(NodePath::Page))))
        );
        assert_eq!(
            ReplCommand::parse("show sections.1").unwrap(),
            Some(ReplCommand::Show(Some(Target::Node(NodePath::Section {
                section: 1
            }))))
        );
        assert_eq!(
            ReplCommand::parse("show sections").unwrap(),
            Some(ReplCommand::Show(Some(Target::List(ListPath::Sections))))
        );
        assert!(matches!(
            ReplCommand::parse("show slug").unwrap(),
            Some(ReplCommand::Show(Some(Target::Field(_))))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ReplCommand::parse("frobnicate"),
            Err(ParseError::UnknownCommand(_))
        ));
        assert_eq!(
            ReplCommand::parse("add"),
            Err(ParseError::Usage("add <list-path> [title]"))
        );
        assert_eq!(ReplCommand::parse("set"), Err(ParseError::Usage("set <path> <value>")));
        assert!(matches!(
            ReplCommand::parse("rm sections.0.title"),
            Err(ParseError::Path(PathError::NotAnItem(_)))
        ));
        assert!(matches!(
            ReplCommand::parse("set sections.0.colour red"),
            Err(ParseError::Path(PathError::UnknownField { .. }))
        ));
    }

    async fn run_script(script: &str) -> (Context, String, tempfile::TempDir) {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = memory_context(dir.path()).await;
        let page = ctx.store.get_page(&ctx.session, SEED_PAGE_IDS[0]).await.unwrap();

        let mut out = Vec::new();
        Repl::new(&mut ctx, page)
            .run(&mut Cursor::new(script.to_string()), &mut out)
            .await
            .unwrap();

        (ctx, String::from_utf8(out).unwrap(), dir)
    }

    #[tokio::test]
    async fn test_edit_and_save() {
        let script = "\
set sections.0.title Editais 2025
add sections.1.documents
set sections.1.documents.0.url https://ufsj.edu.br/edital.pdf
rm sections.0.documents.0.annexes.1
y
save
quit
";
        let (ctx, output, _dir) = run_script(script).await;
        assert!(output.contains("Page saved"));

        let stored = ctx
            .store
            .get_page(&ctx.session, SEED_PAGE_IDS[0])
            .await
            .unwrap();
        assert_eq!(stored.sections[0].title, "Editais 2025");
        assert_eq!(stored.sections[0].documents[0].annexes.len(), 1);
        assert_eq!(
            stored.sections[1].documents[0].url,
            "https://ufsj.edu.br/edital.pdf"
        );
        assert!(stored.sections[1].documents[0].id.is_some());
    }

    #[tokio::test]
    async fn test_declined_removal_keeps_node() {
        let script = "rm sections.1\nn\nsave\nquit\n";
        let (ctx, output, _dir) = run_script(script).await;
        assert!(output.contains("Cancelled"));

        let stored = ctx
            .store
            .get_page(&ctx.session, SEED_PAGE_IDS[0])
            .await
            .unwrap();
        assert_eq!(stored.sections.len(), 2);
    }

    #[tokio::test]
    async fn test_bad_paths_are_reported_not_fatal() {
        let script = "rm sections.7\nset sections.3.title x\nshow sections.0.documents.9\nquit\n";
        let (_ctx, output, _dir) = run_script(script).await;
        assert_eq!(output.matches("out of range").count(), 3);
    }

    #[tokio::test]
    async fn test_undo_before_save() {
        let script = "set title Outro\nundo\nundo\nsave\nquit\n";
        let (ctx, output, _dir) = run_script(script).await;
        assert!(output.contains("Nothing to undo"));

        let stored = ctx
            .store
            .get_page(&ctx.session, SEED_PAGE_IDS[0])
            .await
            .unwrap();
        assert_eq!(stored.title, "Editais e Legislações (Mock)");
    }

    #[tokio::test]
    async fn test_titled_add_undoes_in_one_step() {
        let script = "add sections.1.documents Resultado\nshow sections.1.documents.0.title\nundo\nshow sections.1.documents\nquit\n";
        let (_ctx, output, _dir) = run_script(script).await;

        assert!(output.contains("> Resultado\n"));
        assert!(output.contains("Undone: Add document"));
        assert!(output.contains("(0 documents)"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_local_edits() {
        // An invalid slug is rejected by the store
        let script = "set slug Não Vale\nsave\nshow slug\nquit\ny\n";
        let (ctx, output, _dir) = run_script(script).await;

        assert!(output.contains("Failed to save page"));
        assert!(output.contains("Não Vale"));
        assert!(ctx.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_rejected_save_keeps_edits_until_login() {
        colored::control::set_override(false);
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = memory_context(dir.path()).await;
        let page = ctx.store.get_page(&ctx.session, SEED_PAGE_IDS[0]).await.unwrap();
        ctx.session = cms_client::Session::from_token("expired");

        let script = format!(
            "set title Editado\nsave\nshow title\nlogin {} wrong\nlogin {} {}\nsave\nquit\n",
            DEFAULT_EMAIL, DEFAULT_EMAIL, DEFAULT_PASSWORD
        );
        let mut out = Vec::new();
        Repl::new(&mut ctx, page)
            .run(&mut Cursor::new(script), &mut out)
            .await
            .unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("cms login"));
        assert!(output.contains("Local edits are kept"));
        assert!(output.contains("> Editado\n"));
        assert!(output.contains("Login failed"));
        assert!(output.contains("Page saved"));
        assert!(ctx.session.is_authenticated());

        let stored = ctx
            .store
            .get_page(&ctx.session, SEED_PAGE_IDS[0])
            .await
            .unwrap();
        assert_eq!(stored.title, "Editado");
    }
}
