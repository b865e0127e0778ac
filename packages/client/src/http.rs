//! REST backend client.

use std::time::Duration;

use async_trait::async_trait;
use cms_model::{
    AccessToken, Credentials, DeleteConfirmation, NewPage, Page, PagePayload, PageSummary,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{PageStore, Session, StoreError};

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// [`PageStore`] over HTTP.
///
/// Routes are relative to `base_url`: `/auth/login`, `/cms/pages` and
/// `/cms/pages/{id}`. The session token goes in `Authorization: Bearer`.
pub struct HttpPageStore {
    base_url: String,
    client: Client,
}

impl HttpPageStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base_url}/cms/pages/{id}` with `id` as one encoded path segment
    fn page_url(&self, id: &str) -> Result<Url, StoreError> {
        let invalid = || StoreError::Network(format!("Invalid API URL {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["cms", "pages", id]);
        Ok(url)
    }

    /// Attach the bearer token; no request leaves without one
    fn authorized(
        &self,
        request: RequestBuilder,
        session: &Session,
    ) -> Result<RequestBuilder, StoreError> {
        let token = session.token().ok_or(StoreError::Unauthorized)?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(&body);
            warn!(status = status.as_u16(), %message, "store request failed");
            return Err(StoreError::from_status(status.as_u16(), message));
        }

        serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// Pull `message` out of an error body. The backend sends either a
/// string or a list of validation messages.
fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("message") {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            _ => Value::Object(map).to_string(),
        },
        _ => String::from_utf8_lossy(body).into_owned(),
    }
}

#[async_trait]
impl PageStore for HttpPageStore {
    fn backend_tag(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, StoreError> {
        let request = self.client.post(self.url("/auth/login")).json(credentials);
        match self.send(request).await {
            Err(StoreError::Unauthorized) => Err(StoreError::InvalidCredentials(
                "Falha no login. Verifique as suas credenciais.".to_string(),
            )),
            other => other,
        }
    }

    #[instrument(skip(self, session))]
    async fn list_pages(&self, session: &Session) -> Result<Vec<PageSummary>, StoreError> {
        let request = self.authorized(self.client.get(self.url("/cms/pages")), session)?;
        let pages: Vec<Page> = self.send(request).await?;
        debug!(count = pages.len(), "listed pages");
        Ok(pages.iter().map(Page::summary).collect())
    }

    #[instrument(skip(self, session))]
    async fn get_page(&self, session: &Session, id: &str) -> Result<Page, StoreError> {
        let request = self.authorized(self.client.get(self.page_url(id)?), session)?;
        self.send(request).await
    }

    #[instrument(skip(self, session, page), fields(slug = %page.slug))]
    async fn create_page(&self, session: &Session, page: &NewPage) -> Result<Page, StoreError> {
        let request = self.authorized(self.client.post(self.url("/cms/pages")), session)?;
        self.send(request.json(page)).await
    }

    #[instrument(skip(self, session, payload), fields(sections = payload.sections.len()))]
    async fn update_page(
        &self,
        session: &Session,
        id: &str,
        payload: &PagePayload,
    ) -> Result<Page, StoreError> {
        let request = self.authorized(self.client.put(self.page_url(id)?), session)?;
        self.send(request.json(payload)).await
    }

    #[instrument(skip(self, session))]
    async fn delete_page(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<DeleteConfirmation, StoreError> {
        let request = self.authorized(self.client.delete(self.page_url(id)?), session)?;
        self.send(request).await
    }
}
