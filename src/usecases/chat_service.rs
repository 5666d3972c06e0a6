//! Teams chats: listing, membership and recent messages.

use crate::adapters::graph::odata;
use crate::domain::{DomainError, MemberRole};
use crate::ports::GraphPort;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_MESSAGES_TOP: u32 = 20;

pub struct ChatService {
    graph: Arc<dyn GraphPort>,
}

impl ChatService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    /// Chats the user takes part in.
    pub async fn list_user_chats(&self, user: &str) -> Result<Vec<Value>, DomainError> {
        let result = self.graph.get(&format!("/users/{user}/chats")).await?;
        Ok(odata::collection(result))
    }

    pub async fn members(&self, chat_id: &str) -> Result<Vec<Value>, DomainError> {
        let result = self.graph.get(&format!("/chats/{chat_id}/members")).await?;
        Ok(odata::collection(result))
    }

    pub async fn messages(&self, chat_id: &str, top: u32) -> Result<Vec<Value>, DomainError> {
        let result = self
            .graph
            .get_with(
                &format!("/chats/{chat_id}/messages"),
                &[("$top", top.to_string())],
            )
            .await?;
        Ok(odata::collection(result))
    }

    pub async fn add_member(
        &self,
        chat_id: &str,
        user_upn: &str,
        role: MemberRole,
    ) -> Result<Value, DomainError> {
        let result = self
            .graph
            .post(
                &format!("/chats/{chat_id}/members"),
                odata::conversation_member(user_upn, role),
            )
            .await?;
        info!(chat_id, user = user_upn, role = %role, "added chat member");
        Ok(result)
    }

    pub async fn remove_member(&self, chat_id: &str, user_upn: &str) -> Result<(), DomainError> {
        odata::require_upn(user_upn)?;
        let members = self.members(chat_id).await?;
        let membership_id = odata::find_membership_id(&members, user_upn).ok_or_else(|| {
            DomainError::MemberNotFound {
                upn: user_upn.to_string(),
                container: format!("chat {chat_id}"),
            }
        })?;
        self.graph
            .delete(&format!("/chats/{chat_id}/members/{membership_id}"))
            .await?;
        info!(chat_id, user = user_upn, "removed chat member");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::graph::RecordingGraph;
    use crate::domain::HttpMethod;
    use serde_json::json;

    #[tokio::test]
    async fn test_messages_uses_top() {
        let graph = Arc::new(RecordingGraph::new());
        ChatService::new(graph.clone())
            .messages("19:abc@thread.v2", DEFAULT_MESSAGES_TOP)
            .await
            .unwrap();

        let req = &graph.requests()[0];
        assert_eq!(req.path, "/chats/19:abc@thread.v2/messages");
        assert_eq!(req.query_value("$top"), Some("20"));
    }

    #[tokio::test]
    async fn test_add_member_plain_role() {
        let graph = Arc::new(RecordingGraph::new());
        ChatService::new(graph.clone())
            .add_member("c1", "b@contoso.com", MemberRole::Member)
            .await
            .unwrap();

        let req = &graph.requests()[0];
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "/chats/c1/members");
        assert_eq!(req.body.as_ref().unwrap()["roles"], json!([]));
    }

    #[tokio::test]
    async fn test_remove_member_deletes_membership() {
        let graph = Arc::new(RecordingGraph::new().respond(json!({"value": [
            {"id": "m-9", "email": "b@contoso.com", "displayName": "B"}
        ]})));
        ChatService::new(graph.clone())
            .remove_member("c1", "B@CONTOSO.COM")
            .await
            .unwrap();

        let reqs = graph.requests();
        assert_eq!(reqs[1].method, HttpMethod::Delete);
        assert_eq!(reqs[1].path, "/chats/c1/members/m-9");
    }

    #[tokio::test]
    async fn test_remove_unknown_member_names_the_chat() {
        let graph = Arc::new(RecordingGraph::new());
        let err = ChatService::new(graph)
            .remove_member("c1", "nobody@contoso.com")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No member with UPN/email nobody@contoso.com in chat c1"
        );
    }

    #[tokio::test]
    async fn test_remove_blank_upn_is_rejected_before_lookup() {
        let graph = Arc::new(RecordingGraph::new().respond(json!({"value": [
            {"id": "bot-member", "email": null},
            {"id": "m-2", "email": "b@contoso.com"}
        ]})));
        let err = ChatService::new(graph.clone())
            .remove_member("c1", "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(graph.requests().is_empty());
    }

    #[tokio::test]
    async fn test_remove_never_matches_member_without_email() {
        let graph = Arc::new(RecordingGraph::new().respond(json!({"value": [
            {"id": "bot-member", "email": null},
            {"id": "guest", "displayName": "Guest"}
        ]})));
        let err = ChatService::new(graph.clone())
            .remove_member("c1", "carol@contoso.com")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MemberNotFound { .. }));
        assert_eq!(graph.requests().len(), 1);
    }
}
