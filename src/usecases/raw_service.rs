//! Arbitrary Graph call: any verb, any path or absolute URL, optional JSON body.

use crate::domain::{DomainError, GraphRequest, HttpMethod};
use crate::ports::GraphPort;
use serde_json::{Value, json};
use std::sync::Arc;

pub struct RawService {
    graph: Arc<dyn GraphPort>,
}

impl RawService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    /// `body` is JSON text. A `null` answer (e.g. 204) becomes `{"status": "No content"}`.
    pub async fn call(&self, method: &str, path: &str, body: Option<&str>) -> Result<Value, DomainError> {
        let method: HttpMethod = method.parse()?;
        let mut request = GraphRequest::new(method, path);
        if let Some(text) = body.map(str::trim).filter(|t| !t.is_empty()) {
            let parsed: Value = serde_json::from_str(text)
                .map_err(|e| DomainError::InvalidInput(format!("body is not valid JSON: {}", e)))?;
            request = request.json(parsed);
        }
        match self.graph.send(request).await? {
            Value::Null => Ok(json!({ "status": "No content" })),
            other => Ok(other),
        }
    }
}
