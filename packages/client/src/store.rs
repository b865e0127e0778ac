use async_trait::async_trait;
use cms_model::{
    AccessToken, Credentials, DeleteConfirmation, NewPage, Page, PagePayload, PageSummary,
};

use crate::{Session, StoreError};

/// Operations of the remote page store.
///
/// Every call except `authenticate` requires an authenticated session;
/// a missing or rejected token yields [`StoreError::Unauthorized`].
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Short name for logs
    fn backend_tag(&self) -> &'static str;

    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, StoreError>;

    /// Summaries of every page, in store order
    async fn list_pages(&self, session: &Session) -> Result<Vec<PageSummary>, StoreError>;

    async fn get_page(&self, session: &Session, id: &str) -> Result<Page, StoreError>;

    /// Create a page with no sections
    async fn create_page(&self, session: &Session, page: &NewPage) -> Result<Page, StoreError>;

    /// Replace the stored content of `id` with `payload`
    async fn update_page(
        &self,
        session: &Session,
        id: &str,
        payload: &PagePayload,
    ) -> Result<Page, StoreError>;

    async fn delete_page(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<DeleteConfirmation, StoreError>;
}

/// Authenticate and start a session
pub async fn login(
    store: &dyn PageStore,
    credentials: &Credentials,
) -> Result<Session, StoreError> {
    let token = store.authenticate(credentials).await?;
    let mut session = Session::anonymous();
    session.begin(credentials.email.clone(), token);
    Ok(session)
}
