//! Human-readable output for pages and tree nodes.

use std::io::{self, Write};

use cms_editor::{ItemPath, ListPath, NodePath, NodeRef};
use cms_model::{Annex, Document, Page, PageSummary, Section};
use colored::Colorize;

pub fn summaries(out: &mut dyn Write, pages: &[PageSummary]) -> io::Result<()> {
    if pages.is_empty() {
        return writeln!(out, "{}", "No pages yet".dimmed());
    }

    for page in pages {
        writeln!(
            out,
            "{}  {}  {}",
            page.id.dimmed(),
            page.title.bold(),
            format!("/{}", page.slug).bright_black()
        )?;
    }
    Ok(())
}

pub fn page(out: &mut dyn Write, page: &Page) -> io::Result<()> {
    writeln!(
        out,
        "{}  {}  {}",
        page.title.bold(),
        format!("/{}", page.slug).bright_black(),
        page.id.dimmed()
    )?;

    if page.sections.is_empty() {
        return writeln!(out, "  {}", "(no sections)".dimmed());
    }
    for (index, section) in page.sections.iter().enumerate() {
        self::section(out, ListPath::Sections.item(index), section, 1)?;
    }
    Ok(())
}

/// Render the subtree at `path`
pub fn node(out: &mut dyn Write, path: NodePath, node: NodeRef<'_>) -> io::Result<()> {
    match (node, path.as_item()) {
        (NodeRef::Page(root), _) => page(out, root),
        (NodeRef::Section(section), Some(at)) => self::section(out, at, section, 0),
        (NodeRef::Document(document), Some(at)) => self::document(out, at, document, 0),
        (NodeRef::Annex(annex), Some(at)) => self::annex(out, at, annex, 0),
        // Only the page has no position
        (_, None) => Ok(()),
    }
}

fn label(at: ItemPath) -> String {
    format!("[{}]", at)
}

fn section(out: &mut dyn Write, at: ItemPath, section: &Section, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    writeln!(
        out,
        "{}{} {} {}",
        indent,
        label(at).cyan(),
        section.title.bold(),
        format!("({})", section.kind).dimmed()
    )?;

    let section_index = at.index;
    for (index, document) in section.documents.iter().enumerate() {
        let at = ListPath::Documents {
            section: section_index,
        }
        .item(index);
        self::document(out, at, document, depth + 1)?;
    }
    Ok(())
}

fn document(out: &mut dyn Write, at: ItemPath, document: &Document, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    writeln!(
        out,
        "{}{} {}  {}",
        indent,
        label(at).cyan(),
        document.title,
        document.url.underline()
    )?;
    if let Some(description) = document.description.as_deref().filter(|d| !d.is_empty()) {
        writeln!(out, "{}  {}", indent, description.dimmed())?;
    }

    let ListPath::Documents { section } = at.list else {
        return Ok(());
    };
    for (index, annex) in document.annexes.iter().enumerate() {
        let at = ListPath::Annexes {
            section,
            document: at.index,
        }
        .item(index);
        self::annex(out, at, annex, depth + 1)?;
    }
    Ok(())
}

fn annex(out: &mut dyn Write, at: ItemPath, annex: &Annex, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    writeln!(
        out,
        "{}{} {}  {}",
        indent,
        label(at).cyan(),
        annex.title,
        annex.url.underline()
    )?;
    if let Some(description) = annex.description.as_deref().filter(|d| !d.is_empty()) {
        writeln!(out, "{}  {}", indent, description.dimmed())?;
    }
    Ok(())
}
