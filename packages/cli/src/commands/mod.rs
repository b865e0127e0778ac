pub mod auth;
pub mod edit;
pub mod init;
pub mod pages;

pub use auth::{login, logout, LoginArgs};
pub use edit::{edit, EditArgs};
pub use init::{init, InitArgs};
pub use pages::{pages, PagesCommand};
