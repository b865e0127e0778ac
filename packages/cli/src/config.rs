use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_NAME: &str = "cms.config.json";
pub const DEFAULT_SESSION_FILE: &str = ".cms-session.json";

/// CMS client configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Where the login session is kept, relative to the working directory
    #[serde(default = "default_session_file")]
    pub session_file: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    cms_client::DEFAULT_API_URL.to_string()
}

fn default_session_file() -> String {
    DEFAULT_SESSION_FILE.to_string()
}

fn default_timeout_secs() -> u64 {
    cms_client::DEFAULT_TIMEOUT.as_secs()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Apply the `--api-url` flag (or `CMS_API_URL`), which wins over the file
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        self
    }

    /// Get absolute path to the session file
    pub fn session_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.session_file)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            session_file: default_session_file(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
