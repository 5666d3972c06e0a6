//! In-memory GraphPort that records calls instead of sending them.
//!
//! Backs `--dry-run` and the use-case tests.

use crate::domain::{DomainError, GraphRequest};
use crate::ports::GraphPort;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Send(GraphRequest),
    Download { path: String, dest: PathBuf },
    Upload { path: String, bytes: usize },
}

#[derive(Default)]
struct State {
    calls: Vec<RecordedCall>,
    responses: VecDeque<Result<Value, DomainError>>,
}

/// Scripted Graph gateway.
///
/// `send` and `upload` pop queued responses in order; once the queue is
/// empty they answer with the fallback value.
pub struct RecordingGraph {
    state: Mutex<State>,
    fallback: Value,
    download_content: Option<Vec<u8>>,
    failing_downloads: Vec<String>,
    announce: bool,
}

impl Default for RecordingGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGraph {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            fallback: json!({ "value": [] }),
            download_content: None,
            failing_downloads: Vec::new(),
            announce: false,
        }
    }

    /// Gateway for `--dry-run`: logs every request and returns a placeholder object.
    pub fn dry_run() -> Self {
        Self {
            fallback: json!({ "id": "dry-run", "value": [] }),
            announce: true,
            ..Self::new()
        }
    }

    /// Queue a successful response.
    pub fn respond(self, value: Value) -> Self {
        self.lock().responses.push_back(Ok(value));
        self
    }

    /// Queue a failure.
    pub fn fail(self, error: DomainError) -> Self {
        self.lock().responses.push_back(Err(error));
        self
    }

    /// Bytes written to the destination of every successful download.
    pub fn with_download_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.download_content = Some(content.into());
        self
    }

    /// Downloads whose path contains `fragment` fail with a 404.
    pub fn fail_download_containing(mut self, fragment: impl Into<String>) -> Self {
        self.failing_downloads.push(fragment.into());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Only the `send` calls, in order.
    pub fn requests(&self) -> Vec<GraphRequest> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Send(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-call; the data is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_response(&self, call: RecordedCall) -> Result<Value, DomainError> {
        let mut state = self.lock();
        state.calls.push(call);
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[async_trait]
impl GraphPort for RecordingGraph {
    async fn send(&self, request: GraphRequest) -> Result<Value, DomainError> {
        if self.announce {
            let body = request
                .body
                .as_ref()
                .map(|b| b.to_string())
                .unwrap_or_default();
            info!(
                method = %request.method,
                path = %request.path,
                query = ?request.query,
                body = %body,
                "dry run: request not sent"
            );
        }
        self.next_response(RecordedCall::Send(request))
    }

    async fn download(&self, path: &str, dest: &Path) -> Result<u64, DomainError> {
        if self.announce {
            info!(path, dest = %dest.display(), "dry run: download not performed");
        }
        self.lock().calls.push(RecordedCall::Download {
            path: path.to_string(),
            dest: dest.to_path_buf(),
        });
        if self.failing_downloads.iter().any(|f| path.contains(f.as_str())) {
            return Err(DomainError::Graph {
                status: 404,
                body: json!({"error": {"code": "itemNotFound"}}).to_string(),
            });
        }
        match &self.download_content {
            Some(content) => {
                if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent)
                        .await
                        .map_err(|e| DomainError::Io(e.to_string()))?;
                }
                tokio::fs::write(dest, content)
                    .await
                    .map_err(|e| DomainError::Io(e.to_string()))?;
                Ok(content.len() as u64)
            }
            None => Ok(0),
        }
    }

    async fn upload(&self, path: &str, content: Vec<u8>) -> Result<Value, DomainError> {
        if self.announce {
            info!(path, bytes = content.len(), "dry run: upload not sent");
        }
        self.next_response(RecordedCall::Upload {
            path: path.to_string(),
            bytes: content.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_responses_then_fallback() {
        let graph = RecordingGraph::new()
            .respond(json!({"id": "first"}))
            .fail(DomainError::Graph {
                status: 404,
                body: "gone".into(),
            });

        assert_eq!(graph.get("/a").await.unwrap()["id"], "first");
        assert_eq!(graph.get("/b").await.unwrap_err().status(), Some(404));
        assert_eq!(graph.get("/c").await.unwrap(), json!({"value": []}));

        let paths: Vec<String> = graph.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);
    }

    #[tokio::test]
    async fn test_dry_run_fallback_has_placeholder_id() {
        let graph = RecordingGraph::dry_run();
        let out = graph.post("/groups", json!({"displayName": "x"})).await.unwrap();
        assert_eq!(out["id"], "dry-run");
        assert_eq!(graph.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_download_writes_configured_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("sub").join("f.bin");
        let graph = RecordingGraph::new()
            .with_download_content(b"abc".to_vec())
            .fail_download_containing("bad");

        assert_eq!(graph.download("/items/ok/content", &dest).await.unwrap(), 3);
        assert_eq!(std::fs::read(&dest).unwrap(), b"abc");
        assert!(graph.download("/items/bad/content", &dest).await.is_err());
        assert_eq!(graph.calls().len(), 2);
    }
}
