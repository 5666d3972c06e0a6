//! Application configuration. Credentials, endpoints, timeouts.

use crate::domain::{Credentials, DomainError};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
pub const DEFAULT_GRAPH_BETA_URL: &str = "https://graph.microsoft.com/beta";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Environment variable prefix: `GRAPH_TENANT_ID` -> `tenant_id`.
const ENV_PREFIX: &str = "GRAPH";

#[derive(Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Directory (tenant) ID. Read from GRAPH_TENANT_ID.
    pub tenant_id: Option<String>,
    /// Application (client) ID. Read from GRAPH_CLIENT_ID.
    pub client_id: Option<String>,
    /// Client secret. Read from GRAPH_CLIENT_SECRET; prompted for when missing.
    pub client_secret: Option<String>,

    /// Pre-acquired bearer token. Read from GRAPH_ACCESS_TOKEN. Skips client credentials.
    #[serde(default)]
    pub access_token: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Endpoints
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub beta_url: Option<String>,

    /// Login host for the token endpoint. Read from GRAPH_AUTHORITY_HOST.
    #[serde(default)]
    pub authority_host: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Timeouts
    // ─────────────────────────────────────────────────────────────────────────
    /// Graph request timeout in seconds (default 60). Read from GRAPH_TIMEOUT_SECS.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Token request timeout in seconds (default 30). Read from GRAPH_AUTH_TIMEOUT_SECS.
    #[serde(default)]
    pub auth_timeout_secs: Option<u64>,

    /// Scratch directory for drive clones. Read from GRAPH_CLONE_TMP_DIR.
    #[serde(default)]
    pub clone_tmp_dir: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("beta_url", &self.beta_url)
            .field("authority_host", &self.authority_host)
            .field("scope", &self.scope)
            .field("timeout_secs", &self.timeout_secs)
            .field("auth_timeout_secs", &self.auth_timeout_secs)
            .field("clone_tmp_dir", &self.clone_tmp_dir)
            .finish()
    }
}

impl AppConfig {
    /// Load from process environment (after `.env`) and the optional file named by GRAPH_CONFIG.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("GRAPH_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        c.build()?.try_deserialize()
    }

    /// Build from an explicit variable map instead of the process environment.
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .build()?
            .try_deserialize()
    }

    /// Apply command-line overrides; a `Some` flag wins over the environment.
    pub fn with_overrides(
        mut self,
        tenant_id: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        if tenant_id.is_some() {
            self.tenant_id = tenant_id;
        }
        if client_id.is_some() {
            self.client_id = client_id;
        }
        if client_secret.is_some() {
            self.client_secret = client_secret;
        }
        self
    }

    /// Graph root URL. `beta` selects the beta endpoint.
    pub fn base_url_or_default(&self, beta: bool) -> String {
        if beta {
            self.beta_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GRAPH_BETA_URL.to_string())
        } else {
            self.base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string())
        }
    }

    pub fn authority_host_or_default(&self) -> String {
        self.authority_host
            .clone()
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string())
    }

    pub fn scope_or_default(&self) -> String {
        self.scope.clone().unwrap_or_else(|| DEFAULT_SCOPE.to_string())
    }

    /// Graph request timeout. Defaults to 60 seconds.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(60))
    }

    /// Token request timeout. Defaults to 30 seconds.
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs.unwrap_or(30))
    }

    /// Scratch directory for `onedrive clone-root`.
    pub fn clone_tmp_dir_or_default(&self) -> std::path::PathBuf {
        self.clone_tmp_dir
            .as_deref()
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("graph_swissknife_onedrive_clone"))
    }

    /// True when a static token makes client credentials unnecessary.
    pub fn has_static_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Tenant and client ids are required; the secret is resolved separately (it may be prompted for).
    pub fn require_ids(&self) -> Result<(String, String), DomainError> {
        let tenant = non_empty(self.tenant_id.as_deref()).ok_or_else(|| {
            DomainError::Config("set --tenant-id or GRAPH_TENANT_ID".to_string())
        })?;
        let client = non_empty(self.client_id.as_deref()).ok_or_else(|| {
            DomainError::Config("set --client-id or GRAPH_CLIENT_ID".to_string())
        })?;
        Ok((tenant, client))
    }

    /// Full credentials once a secret is known.
    pub fn credentials(&self, client_secret: String) -> Result<Credentials, DomainError> {
        let (tenant_id, client_id) = self.require_ids()?;
        if client_secret.trim().is_empty() {
            return Err(DomainError::Config("client secret is empty".to_string()));
        }
        Ok(Credentials {
            tenant_id,
            client_id,
            client_secret,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
