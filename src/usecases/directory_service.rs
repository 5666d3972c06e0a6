//! Read-only tenant listings: SharePoint sites, audit logs, subscribed licenses.

use crate::adapters::graph::odata;
use crate::domain::DomainError;
use crate::ports::GraphPort;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_SITES_TOP: u32 = 20;
pub const DEFAULT_AUDIT_TOP: u32 = 50;

pub struct DirectoryService {
    graph: Arc<dyn GraphPort>,
}

impl DirectoryService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    /// SharePoint sites, optionally filtered by a name search.
    pub async fn sites(&self, search: Option<&str>, top: u32) -> Result<Vec<Value>, DomainError> {
        let mut query = vec![("$top", top.to_string())];
        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("search", term.to_string()));
        }
        let result = self.graph.get_with("/sites", &query).await?;
        Ok(odata::collection(result))
    }

    pub async fn directory_audits(&self, top: u32) -> Result<Vec<Value>, DomainError> {
        self.top_list("/auditLogs/directoryAudits", top).await
    }

    pub async fn sign_ins(&self, top: u32) -> Result<Vec<Value>, DomainError> {
        self.top_list("/auditLogs/signIns", top).await
    }

    pub async fn subscribed_skus(&self) -> Result<Vec<Value>, DomainError> {
        Ok(odata::collection(self.graph.get("/subscribedSkus").await?))
    }

    async fn top_list(&self, path: &str, top: u32) -> Result<Vec<Value>, DomainError> {
        let result = self.graph.get_with(path, &[("$top", top.to_string())]).await?;
        Ok(odata::collection(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::graph::RecordingGraph;

    #[tokio::test]
    async fn test_sites_search_is_optional() {
        let graph = Arc::new(RecordingGraph::new());
        let svc = DirectoryService::new(graph.clone());
        svc.sites(None, DEFAULT_SITES_TOP).await.unwrap();
        svc.sites(Some("marketing"), 5).await.unwrap();
        svc.sites(Some("  "), 5).await.unwrap();

        let reqs = graph.requests();
        assert_eq!(reqs[0].path, "/sites");
        assert_eq!(reqs[0].query_value("$top"), Some("20"));
        assert_eq!(reqs[0].query_value("search"), None);
        assert_eq!(reqs[1].query_value("search"), Some("marketing"));
        assert_eq!(reqs[2].query_value("search"), None);
    }

    #[tokio::test]
    async fn test_audit_endpoints() {
        let graph = Arc::new(RecordingGraph::new());
        let svc = DirectoryService::new(graph.clone());
        svc.directory_audits(DEFAULT_AUDIT_TOP).await.unwrap();
        svc.sign_ins(10).await.unwrap();
        svc.subscribed_skus().await.unwrap();

        let reqs = graph.requests();
        assert_eq!(reqs[0].path, "/auditLogs/directoryAudits");
        assert_eq!(reqs[0].query_value("$top"), Some("50"));
        assert_eq!(reqs[1].path, "/auditLogs/signIns");
        assert_eq!(reqs[2].path, "/subscribedSkus");
    }
}
