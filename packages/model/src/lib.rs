//! # CMS Model
//!
//! Plain data types for the content tree managed by the CMS.
//!
//! ```text
//! Page
//!  └─ Section (document-list)
//!      └─ Document
//!          └─ Annex
//! ```
//!
//! Child lists hold `Arc` nodes so that an edited page can share every
//! untouched subtree with the page it was derived from. Serialization is
//! transparent: the JSON shape matches the backend (`_id`, `createdAt`,
//! `type` for the section kind).

mod fixtures;
mod page;
mod requests;
mod slug;

pub use fixtures::{seed_pages, SEED_PAGE_IDS};
pub use page::{
    Annex, Document, Page, Section, SectionKind, DEFAULT_ANNEX_TITLE, DEFAULT_DOCUMENT_TITLE,
    DEFAULT_SECTION_TITLE,
};
pub use requests::{AccessToken, Credentials, DeleteConfirmation, NewPage, PagePayload, PageSummary};
pub use slug::{validate_new_page, validate_slug, ModelError};
