//! # Tree Operations
//!
//! Pure functions over [`Page`] values. None of them mutates its input:
//! each returns a new page that shares every subtree it did not touch.
//!
//! ## Copy-on-write
//!
//! ```text
//! page ──┬── sections[0] ── documents[0] ── annexes[1]   (copied spine)
//!        ├── sections[1]                                 (shared)
//!        └── sections[2]                                 (shared)
//! ```
//!
//! Cloning a `Page` only clones the `Arc` handles of its sections. Walking
//! down with `Arc::make_mut` then copies exactly the nodes on the path to
//! the target, because every one of them is still referenced by the input.

use std::sync::Arc;

use cms_model::{Annex, Document, Page, Section, SectionKind};
use serde::{Deserialize, Serialize};

use crate::mutations::MutationError;
use crate::path::{
    AnnexField, DocumentField, FieldPath, ItemPath, ListPath, NodeKind, NodePath, PageField,
    SectionField,
};

/// A detached tree node, ready to be inserted into a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "node", rename_all = "camelCase")]
pub enum Node {
    Section(Arc<Section>),
    Document(Arc<Document>),
    Annex(Arc<Annex>),
}

impl Node {
    /// Fresh node with default values for the elements of `list`
    pub fn blank_for(list: &ListPath) -> Node {
        match list {
            ListPath::Sections => Node::Section(Arc::new(Section::blank())),
            ListPath::Documents { .. } => Node::Document(Arc::new(Document::blank())),
            ListPath::Annexes { .. } => Node::Annex(Arc::new(Annex::blank())),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Section(_) => NodeKind::Section,
            Node::Document(_) => NodeKind::Document,
            Node::Annex(_) => NodeKind::Annex,
        }
    }

    /// Whether the store has already assigned an id to this node
    pub fn has_identity(&self) -> bool {
        match self {
            Node::Section(section) => section.id.is_some(),
            Node::Document(document) => document.id.is_some(),
            Node::Annex(annex) => annex.id.is_some(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Node::Section(section) => &section.title,
            Node::Document(document) => &document.title,
            Node::Annex(annex) => &annex.title,
        }
    }
}

impl From<Section> for Node {
    fn from(section: Section) -> Self {
        Node::Section(Arc::new(section))
    }
}

impl From<Document> for Node {
    fn from(document: Document) -> Self {
        Node::Document(Arc::new(document))
    }
}

impl From<Annex> for Node {
    fn from(annex: Annex) -> Self {
        Node::Annex(Arc::new(annex))
    }
}

/// Borrowed view of any node in a page
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Page(&'a Page),
    Section(&'a Arc<Section>),
    Document(&'a Arc<Document>),
    Annex(&'a Arc<Annex>),
}

impl NodeRef<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Page(_) => NodeKind::Page,
            NodeRef::Section(_) => NodeKind::Section,
            NodeRef::Document(_) => NodeKind::Document,
            NodeRef::Annex(_) => NodeKind::Annex,
        }
    }

    /// Owned copy of a list element. `None` for the page itself.
    pub fn to_node(&self) -> Option<Node> {
        match self {
            NodeRef::Page(_) => None,
            NodeRef::Section(section) => Some(Node::Section(Arc::clone(section))),
            NodeRef::Document(document) => Some(Node::Document(Arc::clone(document))),
            NodeRef::Annex(annex) => Some(Node::Annex(Arc::clone(annex))),
        }
    }
}

// ============================================================================
// Reads
// ============================================================================

pub fn get_section(page: &Page, section: usize) -> Result<&Arc<Section>, MutationError> {
    page.sections
        .get(section)
        .ok_or_else(|| out_of_range(ListPath::Sections, section, page.sections.len()))
}

pub fn get_document(
    page: &Page,
    section: usize,
    document: usize,
) -> Result<&Arc<Document>, MutationError> {
    let parent = get_section(page, section)?;
    parent.documents.get(document).ok_or_else(|| {
        out_of_range(
            ListPath::Documents { section },
            document,
            parent.documents.len(),
        )
    })
}

pub fn get_annex(
    page: &Page,
    section: usize,
    document: usize,
    annex: usize,
) -> Result<&Arc<Annex>, MutationError> {
    let parent = get_document(page, section, document)?;
    parent.annexes.get(annex).ok_or_else(|| {
        out_of_range(
            ListPath::Annexes { section, document },
            annex,
            parent.annexes.len(),
        )
    })
}

pub fn get_node<'a>(page: &'a Page, path: &NodePath) -> Result<NodeRef<'a>, MutationError> {
    let node = match *path {
        NodePath::Page => NodeRef::Page(page),
        NodePath::Section { section } => NodeRef::Section(get_section(page, section)?),
        NodePath::Document { section, document } => {
            NodeRef::Document(get_document(page, section, document)?)
        }
        NodePath::Annex {
            section,
            document,
            annex,
        } => NodeRef::Annex(get_annex(page, section, document, annex)?),
    };
    Ok(node)
}

/// Current value of a scalar field. `None` only for an absent description.
pub fn get_field(page: &Page, path: &FieldPath) -> Result<Option<String>, MutationError> {
    let value = match *path {
        FieldPath::Page { field } => Some(match field {
            PageField::Title => page.title.clone(),
            PageField::Slug => page.slug.clone(),
        }),
        FieldPath::Section { section, field } => {
            let section = get_section(page, section)?;
            Some(match field {
                SectionField::Title => section.title.clone(),
                SectionField::Kind => section.kind.to_string(),
            })
        }
        FieldPath::Document {
            section,
            document,
            field,
        } => {
            let document = get_document(page, section, document)?;
            match field {
                DocumentField::Title => Some(document.title.clone()),
                DocumentField::Url => Some(document.url.clone()),
                DocumentField::Description => document.description.clone(),
            }
        }
        FieldPath::Annex {
            section,
            document,
            annex,
            field,
        } => {
            let annex = get_annex(page, section, document, annex)?;
            match field {
                AnnexField::Title => Some(annex.title.clone()),
                AnnexField::Url => Some(annex.url.clone()),
                AnnexField::Description => annex.description.clone(),
            }
        }
    };
    Ok(value)
}

pub fn list_len(page: &Page, list: &ListPath) -> Result<usize, MutationError> {
    let len = match *list {
        ListPath::Sections => page.sections.len(),
        ListPath::Documents { section } => get_section(page, section)?.documents.len(),
        ListPath::Annexes { section, document } => {
            get_document(page, section, document)?.annexes.len()
        }
    };
    Ok(len)
}

// ============================================================================
// Writes
// ============================================================================

/// Return a copy of `page` with the field at `path` set to `value`
pub fn set_field(
    page: &Page,
    path: &FieldPath,
    value: impl Into<String>,
) -> Result<Page, MutationError> {
    write_field(page, path, Some(value.into()))
}

/// Return a copy of `page` with the optional field at `path` removed
pub fn clear_field(page: &Page, path: &FieldPath) -> Result<Page, MutationError> {
    if !path.is_optional() {
        return Err(MutationError::NotOptional(path.to_string()));
    }
    write_field(page, path, None)
}

fn write_field(page: &Page, path: &FieldPath, value: Option<String>) -> Result<Page, MutationError> {
    let mut next = page.clone();

    // Required fields always receive `Some`; `clear_field` checks optionality.
    let required = |value: Option<String>| value.unwrap_or_default();

    match *path {
        FieldPath::Page { field } => match field {
            PageField::Title => next.title = required(value),
            PageField::Slug => next.slug = required(value),
        },
        FieldPath::Section { section, field } => {
            let section = section_mut(&mut next, section)?;
            match field {
                SectionField::Title => section.title = required(value),
                SectionField::Kind => section.kind = SectionKind::from(required(value)),
            }
        }
        FieldPath::Document {
            section,
            document,
            field,
        } => {
            let document = document_mut(&mut next, section, document)?;
            match field {
                DocumentField::Title => document.title = required(value),
                DocumentField::Url => document.url = required(value),
                DocumentField::Description => document.description = value,
            }
        }
        FieldPath::Annex {
            section,
            document,
            annex,
            field,
        } => {
            let annex = annex_mut(&mut next, section, document, annex)?;
            match field {
                AnnexField::Title => annex.title = required(value),
                AnnexField::Url => annex.url = required(value),
                AnnexField::Description => annex.description = value,
            }
        }
    }

    Ok(next)
}

/// Append a freshly created node to the list at `parent`.
///
/// The node must match the element kind of the list and must not carry an
/// identity: ids are assigned by the store when the page is saved.
pub fn insert_child(page: &Page, parent: &ListPath, node: Node) -> Result<Page, MutationError> {
    if node.has_identity() {
        return Err(MutationError::AssignedIdentity(node.kind()));
    }
    let len = list_len(page, parent)?;
    insert_child_at(page, &parent.item(len), node)
}

/// Insert `node` at a given position, shifting later siblings up.
///
/// Unlike [`insert_child`] this accepts nodes with an identity, so that a
/// removed node can be put back exactly where it was.
pub fn insert_child_at(page: &Page, at: &ItemPath, node: Node) -> Result<Page, MutationError> {
    let mut next = page.clone();
    let index = at.index;

    match (at.list, node) {
        (ListPath::Sections, Node::Section(section)) => {
            insert_into(&mut next.sections, at.list, index, section)?
        }
        (ListPath::Documents { section }, Node::Document(document)) => {
            let parent = section_mut(&mut next, section)?;
            insert_into(&mut parent.documents, at.list, index, document)?
        }
        (ListPath::Annexes { section, document }, Node::Annex(annex)) => {
            let parent = document_mut(&mut next, section, document)?;
            insert_into(&mut parent.annexes, at.list, index, annex)?
        }
        (list, node) => {
            return Err(MutationError::KindMismatch {
                expected: list.child_kind(),
                found: node.kind(),
            })
        }
    }

    Ok(next)
}

/// Return a copy of `page` without the element at `at`
pub fn remove_child(page: &Page, at: &ItemPath) -> Result<Page, MutationError> {
    take_child(page, at).map(|(next, _)| next)
}

/// Like [`remove_child`], also handing back the removed node
pub fn take_child(page: &Page, at: &ItemPath) -> Result<(Page, Node), MutationError> {
    let mut next = page.clone();
    let index = at.index;

    let removed = match at.list {
        ListPath::Sections => Node::Section(remove_from(&mut next.sections, at.list, index)?),
        ListPath::Documents { section } => {
            let parent = section_mut(&mut next, section)?;
            Node::Document(remove_from(&mut parent.documents, at.list, index)?)
        }
        ListPath::Annexes { section, document } => {
            let parent = document_mut(&mut next, section, document)?;
            Node::Annex(remove_from(&mut parent.annexes, at.list, index)?)
        }
    };

    Ok((next, removed))
}

fn section_mut(page: &mut Page, section: usize) -> Result<&mut Section, MutationError> {
    let len = page.sections.len();
    let slot = page
        .sections
        .get_mut(section)
        .ok_or_else(|| out_of_range(ListPath::Sections, section, len))?;
    Ok(Arc::make_mut(slot))
}

fn document_mut(
    page: &mut Page,
    section: usize,
    document: usize,
) -> Result<&mut Document, MutationError> {
    let parent = section_mut(page, section)?;
    let len = parent.documents.len();
    let slot = parent
        .documents
        .get_mut(document)
        .ok_or_else(|| out_of_range(ListPath::Documents { section }, document, len))?;
    Ok(Arc::make_mut(slot))
}

fn annex_mut(
    page: &mut Page,
    section: usize,
    document: usize,
    annex: usize,
) -> Result<&mut Annex, MutationError> {
    let parent = document_mut(page, section, document)?;
    let len = parent.annexes.len();
    let slot = parent
        .annexes
        .get_mut(annex)
        .ok_or_else(|| out_of_range(ListPath::Annexes { section, document }, annex, len))?;
    Ok(Arc::make_mut(slot))
}

fn insert_into<T>(
    items: &mut Vec<Arc<T>>,
    list: ListPath,
    index: usize,
    item: Arc<T>,
) -> Result<(), MutationError> {
    if index > items.len() {
        return Err(out_of_range(list, index, items.len()));
    }
    items.insert(index, item);
    Ok(())
}

fn remove_from<T>(
    items: &mut Vec<Arc<T>>,
    list: ListPath,
    index: usize,
) -> Result<Arc<T>, MutationError> {
    if index >= items.len() {
        return Err(out_of_range(list, index, items.len()));
    }
    // Order-preserving: later siblings shift down by one.
    Ok(items.remove(index))
}

fn out_of_range(list: ListPath, index: usize, len: usize) -> MutationError {
    MutationError::IndexOutOfRange { list, index, len }
}
