//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, GraphRequest, HttpMethod};
use serde_json::Value;
use std::path::Path;

/// Source of bearer tokens for Graph.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a valid access token, acquiring a new one when the cache is empty or stale.
    async fn access_token(&self) -> Result<String, DomainError>;

    /// Drop any cached token so the next call re-authenticates.
    async fn invalidate(&self);
}

/// Microsoft Graph gateway. Forwards one verb/path/body and returns the parsed JSON.
#[async_trait::async_trait]
pub trait GraphPort: Send + Sync {
    /// Perform the request. 204/empty bodies map to `Value::Null`; non-2xx is `DomainError::Graph`.
    async fn send(&self, request: GraphRequest) -> Result<Value, DomainError>;

    /// Stream the body of `path` (typically `.../content`) into `dest`. Returns bytes written.
    async fn download(&self, path: &str, dest: &Path) -> Result<u64, DomainError>;

    /// PUT raw bytes to `path` (typically `.../root:/{remote}:/content`).
    async fn upload(&self, path: &str, content: Vec<u8>) -> Result<Value, DomainError>;

    async fn get(&self, path: &str) -> Result<Value, DomainError> {
        self.send(GraphRequest::get(path)).await
    }

    /// GET with query parameters, e.g. `[("$top", "25")]`.
    async fn get_with(&self, path: &str, query: &[(&str, String)]) -> Result<Value, DomainError> {
        let mut request = GraphRequest::get(path);
        for (key, value) in query {
            request = request.query(*key, value);
        }
        self.send(request).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, DomainError> {
        self.send(GraphRequest::post(path, body)).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, DomainError> {
        self.send(GraphRequest::new(HttpMethod::Patch, path).json(body))
            .await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, DomainError> {
        self.send(GraphRequest::new(HttpMethod::Put, path).json(body))
            .await
    }

    async fn delete(&self, path: &str) -> Result<Value, DomainError> {
        self.send(GraphRequest::new(HttpMethod::Delete, path)).await
    }
}
