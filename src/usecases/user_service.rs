//! Directory users: listing, lookup, group membership and licenses.

use crate::adapters::graph::odata;
use crate::domain::DomainError;
use crate::ports::GraphPort;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_USERS_TOP: u32 = 25;

pub struct UserService {
    graph: Arc<dyn GraphPort>,
}

impl UserService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    pub async fn list(&self, top: u32) -> Result<Vec<Value>, DomainError> {
        let result = self
            .graph
            .get_with("/users", &[("$top", top.to_string())])
            .await?;
        Ok(odata::collection(result))
    }

    /// `user` is a UPN or object id.
    pub async fn get(&self, user: &str) -> Result<Value, DomainError> {
        self.graph.get(&format!("/users/{user}")).await
    }

    /// Groups, directory roles and administrative units the user belongs to.
    pub async fn member_of(&self, user: &str) -> Result<Vec<Value>, DomainError> {
        let result = self.graph.get(&format!("/users/{user}/memberOf")).await?;
        Ok(odata::collection(result))
    }

    pub async fn license_details(&self, user: &str) -> Result<Vec<Value>, DomainError> {
        let result = self
            .graph
            .get(&format!("/users/{user}/licenseDetails"))
            .await?;
        Ok(odata::collection(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::graph::RecordingGraph;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_passes_top_and_unwraps_value() {
        let graph = Arc::new(RecordingGraph::new().respond(json!({
            "value": [{"id": "u1"}, {"id": "u2"}]
        })));
        let users = UserService::new(graph.clone()).list(DEFAULT_USERS_TOP).await.unwrap();

        assert_eq!(users.len(), 2);
        let req = &graph.requests()[0];
        assert_eq!(req.path, "/users");
        assert_eq!(req.query_value("$top"), Some("25"));
    }

    #[tokio::test]
    async fn test_member_of_and_licenses_paths() {
        let graph = Arc::new(RecordingGraph::new());
        let svc = UserService::new(graph.clone());
        svc.get("a@contoso.com").await.unwrap();
        svc.member_of("a@contoso.com").await.unwrap();
        svc.license_details("a@contoso.com").await.unwrap();

        let paths: Vec<String> = graph.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/users/a@contoso.com",
                "/users/a@contoso.com/memberOf",
                "/users/a@contoso.com/licenseDetails",
            ]
        );
    }
}
