use std::path::Path;

use anyhow::{anyhow, bail, Result};
use cms_client::{HttpPageStore, PageStore, Session, StoreError};
use tracing::{debug, warn};

use crate::config::Config;
use crate::session_file::SessionFile;

/// Everything a command needs: config, store and the login session
pub struct Context {
    pub config: Config,
    pub store: Box<dyn PageStore>,
    pub session: Session,
    pub json: bool,
    session_file: SessionFile,
}

impl Context {
    /// Build the context for a command run in `cwd`
    pub fn load(cwd: &Path, api_url: Option<String>, json: bool) -> Result<Self> {
        let config = Config::load(cwd)?.with_api_url(api_url);
        let store = HttpPageStore::new(config.api_url.clone(), config.timeout())?;
        let session_file = SessionFile::new(config.session_path(cwd));
        let session = session_file.load()?;

        debug!(
            api_url = %config.api_url,
            session_file = %session_file.path().display(),
            authenticated = session.is_authenticated(),
            "loaded context"
        );

        Ok(Self::new(config, Box::new(store), session_file, session, json))
    }

    pub fn new(
        config: Config,
        store: Box<dyn PageStore>,
        session_file: SessionFile,
        session: Session,
        json: bool,
    ) -> Self {
        Self {
            config,
            store,
            session,
            json,
            session_file,
        }
    }

    pub fn require_login(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            bail!("Not logged in. Run `cms login` first.");
        }
        Ok(())
    }

    /// Adopt a freshly authenticated session and persist it
    pub fn start_session(&mut self, session: Session) -> Result<()> {
        self.session = session;
        self.session_file.save(&self.session)
    }

    /// Forget the session. Returns false when there was none on disk.
    pub fn end_session(&mut self) -> Result<bool> {
        self.session.clear();
        self.session_file.remove()
    }

    /// Turn a store result into a command result.
    ///
    /// A rejected token ends the session, so the next command asks for a
    /// login instead of failing the same way again.
    pub fn check<T>(&mut self, result: Result<T, StoreError>) -> Result<T> {
        match self.session.observe(result) {
            Ok(value) => Ok(value),
            Err(err) if err.is_auth_failure() => {
                if let Err(e) = self.session_file.remove() {
                    warn!(error = %e, "could not remove session file");
                }
                Err(anyhow!("{}. Run `cms login` to sign in again.", err))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use cms_client::{login, MemoryPageStore, DEFAULT_EMAIL, DEFAULT_PASSWORD};
    use cms_model::Credentials;

    /// Context over a seeded in-memory store, already logged in
    pub async fn memory_context(dir: &Path) -> Context {
        let credentials = Credentials::new(DEFAULT_EMAIL, DEFAULT_PASSWORD);
        let store = MemoryPageStore::seeded(credentials.clone());
        let session = login(&store, &credentials).await.unwrap();

        let session_file = SessionFile::new(dir.join("session.json"));
        session_file.save(&session).unwrap();

        Context::new(Config::default(), Box::new(store), session_file, session, false)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::memory_context;
    use super::*;
    use cms_model::SEED_PAGE_IDS;

    #[tokio::test]
    async fn test_rejected_token_ends_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = memory_context(dir.path()).await;
        ctx.session = Session::from_token("expired");

        let result = ctx.store.get_page(&ctx.session, SEED_PAGE_IDS[0]).await;
        let err = ctx.check(result).unwrap_err();

        assert!(err.to_string().contains("cms login"));
        assert!(!ctx.session.is_authenticated());
        assert!(!dir.path().join("session.json").exists());
        assert!(ctx.require_login().is_err());
    }

    #[tokio::test]
    async fn test_other_errors_keep_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = memory_context(dir.path()).await;

        let result = ctx.store.get_page(&ctx.session, "missing").await;
        assert!(ctx.check(result).is_err());

        assert!(ctx.session.is_authenticated());
        assert!(dir.path().join("session.json").exists());
    }
}
