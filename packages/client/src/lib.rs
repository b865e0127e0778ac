//! # CMS Client
//!
//! Access to the remote page store.
//!
//! Every call takes an explicit [`Session`]: a value created by a
//! successful login and cleared on logout or when the store rejects its
//! token. Nothing here reads ambient state.
//!
//! Two implementations of [`PageStore`] are provided:
//!
//! - [`HttpPageStore`] talks to the REST backend
//! - [`MemoryPageStore`] keeps pages in process (mock server, tests)

mod error;
mod http;
mod memory;
mod session;
mod store;

pub use error::StoreError;
pub use http::{HttpPageStore, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use memory::{MemoryPageStore, DEFAULT_EMAIL, DEFAULT_PASSWORD};
pub use session::Session;
pub use store::{login, PageStore};
