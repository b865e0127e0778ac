//! In-process page store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use cms_model::{
    seed_pages, validate_new_page, validate_slug, AccessToken, Credentials, DeleteConfirmation,
    ModelError, NewPage, Page, PagePayload, PageSummary,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{PageStore, Session, StoreError};

pub const DEFAULT_EMAIL: &str = "admin@ufsj.edu.br";
pub const DEFAULT_PASSWORD: &str = "admin";

/// [`PageStore`] keeping everything in memory.
///
/// Behaves like the real backend where the client can observe it: it
/// assigns ids to pages and to new nested nodes, stamps timestamps,
/// enforces unique slugs, and accepts a single credential pair.
pub struct MemoryPageStore {
    pages: RwLock<Vec<Page>>,
    tokens: RwLock<HashSet<String>>,
    credentials: Credentials,
    next_id: AtomicU64,
}

impl MemoryPageStore {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_pages(credentials, Vec::new())
    }

    /// Store preloaded with the sample pages
    pub fn seeded(credentials: Credentials) -> Self {
        Self::with_pages(credentials, seed_pages())
    }

    pub fn with_pages(credentials: Credentials, pages: Vec<Page>) -> Self {
        Self {
            pages: RwLock::new(pages),
            tokens: RwLock::new(HashSet::new()),
            credentials,
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn page_count(&self) -> usize {
        self.pages.read().await.len()
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", prefix, n)
    }

    async fn check(&self, session: &Session) -> Result<(), StoreError> {
        let token = session.token().ok_or(StoreError::Unauthorized)?;
        if self.tokens.read().await.contains(token) {
            Ok(())
        } else {
            Err(StoreError::Unauthorized)
        }
    }

    /// Give every node created by the editor an id
    fn assign_ids(&self, page: &mut Page) {
        for section in &mut page.sections {
            if section.id.is_none() {
                Arc::make_mut(section).id = Some(self.next_id("sec"));
            }
            for document in &mut Arc::make_mut(section).documents {
                if document.id.is_none() {
                    Arc::make_mut(document).id = Some(self.next_id("doc"));
                }
                for annex in &mut Arc::make_mut(document).annexes {
                    if annex.id.is_none() {
                        Arc::make_mut(annex).id = Some(self.next_id("anx"));
                    }
                }
            }
        }
    }
}

fn slug_taken(pages: &[Page], slug: &str, except: Option<&str>) -> bool {
    pages
        .iter()
        .any(|page| page.slug == slug && Some(page.id.as_str()) != except)
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound(format!("Page {} not found", id))
}

#[async_trait]
impl PageStore for MemoryPageStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<AccessToken, StoreError> {
        if *credentials != self.credentials {
            debug!(email = %credentials.email, "rejected login");
            return Err(StoreError::InvalidCredentials(
                "Credenciais inválidas".to_string(),
            ));
        }

        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let token = format!("{:x}.{}", nanos, self.next_id("tok"));
        self.tokens.write().await.insert(token.clone());
        info!(email = %credentials.email, "issued access token");

        Ok(AccessToken {
            access_token: token,
        })
    }

    async fn list_pages(&self, session: &Session) -> Result<Vec<PageSummary>, StoreError> {
        self.check(session).await?;
        Ok(self.pages.read().await.iter().map(Page::summary).collect())
    }

    async fn get_page(&self, session: &Session, id: &str) -> Result<Page, StoreError> {
        self.check(session).await?;
        self.pages
            .read()
            .await
            .iter()
            .find(|page| page.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create_page(&self, session: &Session, new_page: &NewPage) -> Result<Page, StoreError> {
        self.check(session).await?;
        validate_new_page(new_page)?;

        let mut pages = self.pages.write().await;
        if slug_taken(&pages, &new_page.slug, None) {
            return Err(StoreError::Conflict(format!(
                "Slug {} is already in use",
                new_page.slug
            )));
        }

        let now = Utc::now();
        let mut page = Page::new(self.next_id("page"), &new_page.title, &new_page.slug);
        page.created_at = Some(now);
        page.updated_at = Some(now);

        info!(id = %page.id, slug = %page.slug, "created page");
        pages.push(page.clone());
        Ok(page)
    }

    async fn update_page(
        &self,
        session: &Session,
        id: &str,
        payload: &PagePayload,
    ) -> Result<Page, StoreError> {
        self.check(session).await?;
        if payload.title.trim().is_empty() {
            return Err(ModelError::EmptyTitle.into());
        }
        validate_slug(&payload.slug)?;

        let mut pages = self.pages.write().await;
        let position = pages
            .iter()
            .position(|page| page.id == id)
            .ok_or_else(|| not_found(id))?;
        if slug_taken(&pages, &payload.slug, Some(id)) {
            return Err(StoreError::Conflict(format!(
                "Slug {} is already in use",
                payload.slug
            )));
        }

        let stored = &mut pages[position];
        let mut next = stored.with_payload(payload.clone());
        self.assign_ids(&mut next);
        next.updated_at = Some(Utc::now());

        debug!(id, sections = next.sections.len(), "updated page");
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_page(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<DeleteConfirmation, StoreError> {
        self.check(session).await?;

        let mut pages = self.pages.write().await;
        let position = pages
            .iter()
            .position(|page| page.id == id)
            .ok_or_else(|| not_found(id))?;
        pages.remove(position);

        info!(id, "deleted page");
        Ok(DeleteConfirmation {
            deleted: true,
            id: id.to_string(),
        })
    }
}
