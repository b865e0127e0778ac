//! # Page Mutations
//!
//! Semantic operations on a page tree.
//!
//! ## Design Principles
//!
//! 1. **Pure**: applying a mutation returns a new page; the input is untouched
//! 2. **Validated**: a mutation either applies fully or fails with a structured error
//! 3. **Invertible**: every mutation can produce its inverse against the pre-state
//!
//! ## Mutation Semantics
//!
//! ### SetField / ClearField
//! - Atomic replacement of one scalar field
//! - Setting the current value again yields an equal page
//!
//! ### InsertChild
//! - Appends a fresh node (no identity) to a child list
//! - The node kind must match the list
//!
//! ### RemoveChild
//! - Removes one element; later siblings shift down
//! - Out-of-range indexes are errors, never silent no-ops

use cms_model::Page;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::{FieldPath, ItemPath, ListPath, NodeKind};
use crate::tree::{self, Node};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Overwrite a scalar field
    SetField { path: FieldPath, value: String },

    /// Remove an optional field (descriptions)
    ClearField { path: FieldPath },

    /// Append a new node to a list
    InsertChild { parent: ListPath, node: Node },

    /// Insert a node at a position (used to undo removals)
    InsertChildAt { at: ItemPath, node: Node },

    /// Remove the element at a position
    RemoveChild { at: ItemPath },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Index {index} out of range for {list} (length {len})")]
    IndexOutOfRange {
        list: ListPath,
        index: usize,
        len: usize,
    },

    #[error("Cannot insert a {found} into a list of {expected}s")]
    KindMismatch { expected: NodeKind, found: NodeKind },

    #[error("New {0} must not carry an id")]
    AssignedIdentity(NodeKind),

    #[error("Field {0} cannot be cleared")]
    NotOptional(String),
}

impl Mutation {
    /// Convenience constructor for appending a default node to `parent`
    pub fn insert_blank(parent: ListPath) -> Self {
        Mutation::InsertChild {
            node: Node::blank_for(&parent),
            parent,
        }
    }

    /// Apply mutation to a page, producing the next page
    pub fn apply(&self, page: &Page) -> Result<Page, MutationError> {
        match self {
            Mutation::SetField { path, value } => tree::set_field(page, path, value.as_str()),
            Mutation::ClearField { path } => tree::clear_field(page, path),
            Mutation::InsertChild { parent, node } => {
                tree::insert_child(page, parent, node.clone())
            }
            Mutation::InsertChildAt { at, node } => tree::insert_child_at(page, at, node.clone()),
            Mutation::RemoveChild { at } => tree::remove_child(page, at),
        }
    }

    /// Apply and return the inverse, computed against the pre-state
    pub fn apply_with_inverse(&self, page: &Page) -> Result<(Page, Mutation), MutationError> {
        match self {
            // Removal hands back the node, so the inverse costs nothing extra
            Mutation::RemoveChild { at } => {
                let (next, node) = tree::take_child(page, at)?;
                Ok((next, Mutation::InsertChildAt { at: *at, node }))
            }
            _ => {
                let inverse = self.to_inverse(page)?;
                let next = self.apply(page)?;
                Ok((next, inverse))
            }
        }
    }

    /// Validate without applying
    pub fn validate(&self, page: &Page) -> Result<(), MutationError> {
        match self {
            Mutation::SetField { path, .. } => {
                tree::get_field(page, path)?;
                Ok(())
            }
            Mutation::ClearField { path } => {
                if !path.is_optional() {
                    return Err(MutationError::NotOptional(path.to_string()));
                }
                tree::get_field(page, path)?;
                Ok(())
            }
            Mutation::InsertChild { parent, node } => {
                if node.has_identity() {
                    return Err(MutationError::AssignedIdentity(node.kind()));
                }
                check_kind(parent, node)?;
                tree::list_len(page, parent)?;
                Ok(())
            }
            Mutation::InsertChildAt { at, node } => {
                check_kind(&at.list, node)?;
                let len = tree::list_len(page, &at.list)?;
                if at.index > len {
                    return Err(MutationError::IndexOutOfRange {
                        list: at.list,
                        index: at.index,
                        len,
                    });
                }
                Ok(())
            }
            Mutation::RemoveChild { at } => {
                tree::get_node(page, &at.node())?;
                Ok(())
            }
        }
    }

    /// Create the inverse mutation for undo
    pub fn to_inverse(&self, page: &Page) -> Result<Mutation, MutationError> {
        self.validate(page)?;

        let inverse = match self {
            Mutation::SetField { path, .. } | Mutation::ClearField { path } => {
                match tree::get_field(page, path)? {
                    Some(value) => Mutation::SetField { path: *path, value },
                    None => Mutation::ClearField { path: *path },
                }
            }
            Mutation::InsertChild { parent, .. } => {
                let len = tree::list_len(page, parent)?;
                Mutation::RemoveChild {
                    at: parent.item(len),
                }
            }
            Mutation::InsertChildAt { at, .. } => Mutation::RemoveChild { at: *at },
            Mutation::RemoveChild { at } => {
                let node = tree::get_node(page, &at.node())?
                    .to_node()
                    .ok_or(MutationError::KindMismatch {
                        expected: at.list.child_kind(),
                        found: NodeKind::Page,
                    })?;
                Mutation::InsertChildAt { at: *at, node }
            }
        };
        Ok(inverse)
    }

    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetField { .. } => "set_field",
            Mutation::ClearField { .. } => "clear_field",
            Mutation::InsertChild { .. } => "insert_child",
            Mutation::InsertChildAt { .. } => "insert_child_at",
            Mutation::RemoveChild { .. } => "remove_child",
        }
    }
}

fn check_kind(list: &ListPath, node: &Node) -> Result<(), MutationError> {
    if list.child_kind() == node.kind() {
        Ok(())
    } else {
        Err(MutationError::KindMismatch {
            expected: list.child_kind(),
            found: node.kind(),
        })
    }
}

/// Result of applying a mutation through a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    /// Version number after the call
    pub version: u64,

    /// False when there was no page to edit
    pub applied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{DocumentField, SectionField};
    use cms_model::seed_pages;

    fn sample() -> Page {
        seed_pages().remove(0)
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::SetField {
            path: "sections.0.title".parse().unwrap(),
            value: "Nova".to_string(),
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_insert_blank_serializes_node_kind() {
        let mutation = Mutation::insert_blank(ListPath::Documents { section: 1 });
        let value = serde_json::to_value(&mutation).unwrap();
        assert_eq!(value["type"], "insertChild");
        assert_eq!(value["node"]["kind"], "document");
        assert_eq!(value["node"]["node"]["title"], "Novo Documento");
    }

    #[test]
    fn test_validation_rejects_missing_targets() {
        let page = sample();
        let mutation = Mutation::RemoveChild {
            at: ListPath::Documents { section: 1 }.item(0),
        };
        assert!(mutation.validate(&page).is_err());
        assert!(mutation.to_inverse(&page).is_err());
    }

    #[test]
    fn test_set_field_inverse_restores_value() {
        let page = sample();
        let mutation = Mutation::SetField {
            path: crate::FieldPath::Section {
                section: 0,
                field: SectionField::Title,
            },
            value: "Nova".to_string(),
        };

        let (next, inverse) = mutation.apply_with_inverse(&page).unwrap();
        assert_eq!(next.sections[0].title, "Nova");
        assert_eq!(inverse.apply(&next).unwrap(), page);
    }

    #[test]
    fn test_inverse_of_setting_absent_description_clears_it() {
        let page = sample();
        let path = crate::FieldPath::Annex {
            section: 0,
            document: 0,
            annex: 0,
            field: crate::AnnexField::Description,
        };
        let mutation = Mutation::SetField {
            path,
            value: "Cronograma".to_string(),
        };

        let inverse = mutation.to_inverse(&page).unwrap();
        assert_eq!(inverse, Mutation::ClearField { path });

        let next = mutation.apply(&page).unwrap();
        assert_eq!(inverse.apply(&next).unwrap(), page);
    }

    #[test]
    fn test_insert_inverse_removes_the_new_node() {
        let page = sample();
        let mutation = Mutation::insert_blank(ListPath::Sections);
        let (next, inverse) = mutation.apply_with_inverse(&page).unwrap();

        assert_eq!(
            inverse,
            Mutation::RemoveChild {
                at: ListPath::Sections.item(2)
            }
        );
        assert_eq!(inverse.apply(&next).unwrap(), page);
    }

    #[test]
    fn test_remove_inverse_restores_position() {
        let page = sample();
        let mutation = Mutation::RemoveChild {
            at: ListPath::Documents { section: 0 }.item(0),
        };
        let (next, inverse) = mutation.apply_with_inverse(&page).unwrap();

        assert_eq!(next.sections[0].documents.len(), 1);
        assert_eq!(inverse.apply(&next).unwrap(), page);
        assert_eq!(mutation.to_inverse(&page).unwrap(), inverse);
    }

    #[test]
    fn test_clear_required_field_fails_validation() {
        let page = sample();
        let mutation = Mutation::ClearField {
            path: crate::FieldPath::Document {
                section: 0,
                document: 0,
                field: DocumentField::Url,
            },
        };
        assert!(matches!(
            mutation.validate(&page),
            Err(MutationError::NotOptional(_))
        ));
    }
}
