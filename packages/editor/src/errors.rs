//! Error types for the editor

use thiserror::Error;

use crate::mutations::MutationError;
use crate::path::PathError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Invalid path: {0}")]
    Path(#[from] PathError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("No page is loaded")]
    NoPageLoaded,
}
