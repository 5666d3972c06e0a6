//! Implements GraphPort using reqwest.
//!
//! Attaches the bearer token, builds the absolute URL from base + path,
//! forwards the verb and parses the JSON answer. No retries.

use crate::domain::{DomainError, GraphRequest, HttpMethod};
use crate::ports::{GraphPort, TokenProvider};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Graph gateway adapter.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
    /// Applied to JSON calls only; transfers run until the body is consumed.
    timeout: Duration,
}

impl GraphClient {
    /// Create a client rooted at `base_url` (e.g. "https://graph.microsoft.com/v1.0").
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DomainError::Transport(format!("build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; relative paths are joined onto the base URL.
    pub fn make_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn authorized(&self, method: Method, url: &str) -> Result<reqwest::RequestBuilder, DomainError> {
        let token = self.tokens.access_token().await?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json"))
    }

    /// Map a non-2xx response to `DomainError::Graph`. 401 also drops the cached token.
    async fn error_from(&self, response: Response) -> DomainError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate().await;
        }
        warn!(status = %status, "Graph API returned error");
        let body = match serde_json::from_str::<Value>(&text) {
            Ok(json) => json.to_string(),
            Err(_) => text,
        };
        DomainError::Graph {
            status: status.as_u16(),
            body,
        }
    }

    async fn parse(&self, response: Response) -> Result<Value, DomainError> {
        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = response
            .text()
            .await
            .map_err(|e| DomainError::Transport(format!("read response body: {}", e)))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// `report.pdf` -> `report.pdf.part`, next to the destination.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

fn io_err(context: &str, path: &Path, e: std::io::Error) -> DomainError {
    DomainError::Io(format!("{} {}: {}", context, path.display(), e))
}

/// Write the body into `temp_path`, then move it onto `dest`.
async fn write_part(
    response: &mut Response,
    temp_path: &Path,
    dest: &Path,
) -> Result<u64, DomainError> {
    let mut file = tokio::fs::File::create(temp_path)
        .await
        .map_err(|e| io_err("create", temp_path, e))?;

    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| DomainError::Transport(format!("read download body: {}", e)))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| io_err("write", temp_path, e))?;
        written += chunk.len() as u64;
    }
    file.sync_all()
        .await
        .map_err(|e| io_err("sync", temp_path, e))?;
    drop(file);

    tokio::fs::rename(temp_path, dest)
        .await
        .map_err(|e| io_err("rename into", dest, e))?;
    Ok(written)
}

#[async_trait]
impl GraphPort for GraphClient {
    async fn send(&self, request: GraphRequest) -> Result<Value, DomainError> {
        let url = self.make_url(&request.path);
        debug!(method = %request.method, url = %url, "graph request");

        let mut builder = self
            .authorized(to_method(request.method), &url)
            .await?
            .timeout(self.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("{} {}: {}", request.method, url, e)))?;
        self.parse(response).await
    }

    /// Streams into `<dest>.part`, then renames so a failed transfer never leaves a truncated file.
    async fn download(&self, path: &str, dest: &Path) -> Result<u64, DomainError> {
        let url = self.make_url(path);
        debug!(url = %url, dest = %dest.display(), "graph download");

        let mut response = self
            .authorized(Method::GET, &url)
            .await?
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("GET {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err("create directory", parent, e))?;
        }
        let temp_path = partial_path(dest);
        let written = match write_part(&mut response, &temp_path, dest).await {
            Ok(written) => written,
            Err(e) => {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(e);
            }
        };
        debug!(bytes = written, dest = %dest.display(), "download complete");
        Ok(written)
    }

    async fn upload(&self, path: &str, content: Vec<u8>) -> Result<Value, DomainError> {
        let url = self.make_url(path);
        debug!(url = %url, bytes = content.len(), "graph upload");

        let response = self
            .authorized(Method::PUT, &url)
            .await?
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content)
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("PUT {}: {}", url, e)))?;
        self.parse(response).await
    }
}
