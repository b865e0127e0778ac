//! # Edit Session
//!
//! Holds the page currently being edited and its history.
//!
//! An EditSession is the single owner of the editor state: the page value
//! is replaced wholesale after each successful mutation and never touched
//! by anything else. Nothing is loaded until [`EditSession::load`] is
//! called; mutations applied before that are silently skipped.

use cms_model::{Page, PagePayload};
use tracing::debug;

use crate::path::{FieldPath, ItemPath, ListPath};
use crate::tree::list_len;
use crate::{EditorError, Mutation, MutationResult, UndoStack};

pub struct EditSession {
    /// Current page (none until the first load completes)
    page: Option<Page>,

    /// Increments on every applied mutation, undo and redo
    version: u64,

    /// Version of the last load or successful save
    saved_version: u64,

    history: UndoStack,
}

impl EditSession {
    pub fn new() -> Self {
        Self::with_history(UndoStack::new())
    }

    pub fn with_history(history: UndoStack) -> Self {
        Self {
            page: None,
            version: 0,
            saved_version: 0,
            history,
        }
    }

    /// Start editing `page`, discarding any previous state and history
    pub fn load(&mut self, page: Page) {
        debug!(page_id = %page.id, sections = page.sections.len(), "loaded page into session");
        self.page = Some(page);
        self.version += 1;
        self.saved_version = self.version;
        self.history.clear();
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn page_id(&self) -> Option<&str> {
        self.page.as_ref().map(|page| page.id.as_str())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether there are edits that have not been saved
    pub fn is_dirty(&self) -> bool {
        self.page.is_some() && self.version != self.saved_version
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Apply a mutation and record it for undo.
    ///
    /// On error the current page is left exactly as it was.
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let Some(page) = &self.page else {
            return Ok(self.skipped());
        };

        let next = self.history.apply(&mutation, page)?;
        debug!(mutation = mutation.name(), version = self.version + 1, "applied mutation");
        Ok(self.replace(next))
    }

    pub fn set_field(
        &mut self,
        path: FieldPath,
        value: impl Into<String>,
    ) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::SetField {
            path,
            value: value.into(),
        })
    }

    /// Append a default node to `parent`
    pub fn add_child(&mut self, parent: ListPath) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::insert_blank(parent))
    }

    /// Append a node to `parent` and title it, as a single undo step
    pub fn add_titled_child(
        &mut self,
        parent: ListPath,
        title: impl Into<String>,
    ) -> Result<MutationResult, EditorError> {
        let Some(page) = &self.page else {
            return Ok(self.skipped());
        };

        let at = parent.item(list_len(page, &parent)?);
        let mutations = [
            Mutation::insert_blank(parent),
            Mutation::SetField {
                path: at.title(),
                value: title.into(),
            },
        ];
        self.apply_batch(format!("Add {}", parent.child_kind()), mutations)
    }

    /// Apply several mutations as one undo step; all or nothing
    pub fn apply_batch(
        &mut self,
        description: impl Into<String>,
        mutations: impl IntoIterator<Item = Mutation>,
    ) -> Result<MutationResult, EditorError> {
        let Some(page) = &self.page else {
            return Ok(self.skipped());
        };
        let mut next = page.clone();

        self.history.begin_batch();
        self.history.set_batch_description(description);
        for mutation in mutations {
            match self.history.apply(&mutation, &next) {
                Ok(page) => next = page,
                Err(e) => {
                    self.history.cancel_batch();
                    return Err(e.into());
                }
            }
        }
        self.history.end_batch();

        debug!(version = self.version + 1, "applied batch");
        Ok(self.replace(next))
    }

    pub fn remove_child(&mut self, at: ItemPath) -> Result<MutationResult, EditorError> {
        self.apply(Mutation::RemoveChild { at })
    }

    /// Returns false when there was nothing to undo
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let Some(page) = &self.page else {
            return Ok(false);
        };
        match self.history.undo(page)? {
            Some(previous) => {
                self.replace(previous);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns false when there was nothing to redo
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let Some(page) = &self.page else {
            return Ok(false);
        };
        match self.history.redo(page)? {
            Some(next) => {
                self.replace(next);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Body to send to the store on save
    pub fn payload(&self) -> Result<PagePayload, EditorError> {
        self.page
            .as_ref()
            .map(Page::payload)
            .ok_or(EditorError::NoPageLoaded)
    }

    /// Record a successful save.
    ///
    /// `stored` is the page returned by the store; when given it replaces the
    /// local value so that ids assigned to new nodes become visible. History
    /// is kept: its paths are positional and stay valid.
    pub fn mark_saved(&mut self, stored: Option<Page>) {
        if let Some(page) = stored {
            self.page = Some(page);
            self.version += 1;
        }
        self.saved_version = self.version;
    }

    fn skipped(&self) -> MutationResult {
        MutationResult {
            version: self.version,
            applied: false,
        }
    }

    fn replace(&mut self, page: Page) -> MutationResult {
        self.page = Some(page);
        self.version += 1;
        MutationResult {
            version: self.version,
            applied: true,
        }
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}
