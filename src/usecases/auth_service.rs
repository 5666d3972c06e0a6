//! Connection self-test: acquire a token and read the tenant's organization record.

use crate::adapters::graph::odata;
use crate::domain::DomainError;
use crate::ports::GraphPort;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub struct AuthService {
    graph: Arc<dyn GraphPort>,
}

impl AuthService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    /// GET /organization. Any token or permission problem surfaces as the error.
    pub async fn connect(&self) -> Result<Value, DomainError> {
        let organization = self.graph.get("/organization").await?;
        let org = odata::collection(organization.clone())
            .into_iter()
            .next()
            .unwrap_or(organization);
        info!(
            tenant = %odata::str_field(&org, "displayName"),
            "connected to Microsoft Graph"
        );
        Ok(json!({
            "message": "Connected successfully",
            "organization": org,
        }))
    }
}
