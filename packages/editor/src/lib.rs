//! # CMS Editor
//!
//! Path-addressed editing of a page tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ path: typed addresses (+ dotted-string form)│
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ tree: pure read / set / insert / remove     │
//! │  - copy-on-write along the edited spine     │
//! │  - untouched subtrees shared by Arc         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutations + undo stack + edit session       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cms_editor::{EditSession, FieldPath, ListPath};
//!
//! let mut session = EditSession::new();
//! session.load(page);
//!
//! session.add_child(ListPath::Sections)?;
//! session.set_field("sections.0.title".parse::<FieldPath>()?, "Editais 2025")?;
//! session.undo()?;
//!
//! let payload = session.payload()?;
//! ```

mod errors;
mod mutations;
mod path;
mod session;
mod tree;
mod undo_stack;

pub use errors::EditorError;
pub use mutations::{Mutation, MutationError, MutationResult};
pub use path::{
    parse_segments, AnnexField, DocumentField, FieldPath, ItemPath, ListPath, NodeKind, NodePath,
    PageField, PathError, SectionField, Segment,
};
pub use session::EditSession;
pub use tree::{
    clear_field, get_annex, get_document, get_field, get_node, get_section, insert_child,
    insert_child_at, list_len, remove_child, set_field, take_child, Node, NodeRef,
};
pub use undo_stack::{MutationBatch, UndoStack};
