//! Microsoft 365 groups: listing, membership, creation and conversion into a Team.

use crate::adapters::graph::odata;
use crate::domain::DomainError;
use crate::ports::GraphPort;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_GROUPS_TOP: u32 = 25;

/// Parameters of a new Unified group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub display_name: String,
    pub description: String,
    pub mail_nickname: String,
    /// Bound as both owner and member when present.
    pub owner_upn: Option<String>,
}

/// Which `$ref` collection a user is added to.
#[derive(Debug, Clone, Copy)]
enum GroupLink {
    Owners,
    Members,
}

impl GroupLink {
    fn segment(self) -> &'static str {
        match self {
            GroupLink::Owners => "owners",
            GroupLink::Members => "members",
        }
    }
}

pub struct GroupService {
    graph: Arc<dyn GraphPort>,
}

impl GroupService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    pub async fn list(&self, top: u32) -> Result<Vec<Value>, DomainError> {
        let result = self
            .graph
            .get_with("/groups", &[("$top", top.to_string())])
            .await?;
        Ok(odata::collection(result))
    }

    pub async fn get(&self, group_id: &str) -> Result<Value, DomainError> {
        self.graph.get(&format!("/groups/{group_id}")).await
    }

    /// Users, groups and service principals in the group.
    pub async fn members(&self, group_id: &str) -> Result<Vec<Value>, DomainError> {
        let result = self
            .graph
            .get(&format!("/groups/{group_id}/members"))
            .await?;
        Ok(odata::collection(result))
    }

    pub async fn add_owner(&self, group_id: &str, user_upn: &str) -> Result<Value, DomainError> {
        self.link_user(group_id, user_upn, GroupLink::Owners).await
    }

    pub async fn add_member(&self, group_id: &str, user_upn: &str) -> Result<Value, DomainError> {
        self.link_user(group_id, user_upn, GroupLink::Members).await
    }

    /// Resolve the user's object id, then POST a directory reference into the group.
    async fn link_user(
        &self,
        group_id: &str,
        user_upn: &str,
        link: GroupLink,
    ) -> Result<Value, DomainError> {
        let user = self.graph.get(&format!("/users/{user_upn}")).await?;
        let user_id = odata::str_field(&user, "id");
        if user_id.is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "user {user_upn} not found"
            )));
        }
        let result = self
            .graph
            .post(
                &format!("/groups/{group_id}/{}/$ref", link.segment()),
                odata::directory_ref(&user_id),
            )
            .await?;
        info!(group_id, user = user_upn, link = link.segment(), "added user to group");
        Ok(result)
    }

    /// POST /groups with a Unified, mail-enabled, non-security group.
    pub async fn create_m365_group(&self, group: &NewGroup) -> Result<Value, DomainError> {
        let mut body = json!({
            "displayName": group.display_name,
            "description": group.description,
            "groupTypes": ["Unified"],
            "mailEnabled": true,
            "securityEnabled": false,
            "mailNickname": group.mail_nickname,
        });
        if let Some(owner) = group.owner_upn.as_deref().filter(|o| !o.is_empty()) {
            let bind = odata::user_bind(owner);
            body["owners@odata.bind"] = json!([bind]);
            body["members@odata.bind"] = json!([bind]);
        }
        let created = self.graph.post("/groups", body).await?;
        info!(
            group_id = %odata::str_field(&created, "id"),
            name = %group.display_name,
            "created M365 group"
        );
        Ok(created)
    }

    /// PUT /groups/{id}/team. Graph may answer 404 for a few seconds after group creation.
    pub async fn teamify(&self, group_id: &str) -> Result<Value, DomainError> {
        let body = json!({
            "memberSettings": {
                "allowCreateUpdateChannels": true
            },
            "messagingSettings": {
                "allowUserEditMessages": true,
                "allowUserDeleteMessages": true
            },
            "funSettings": {
                "allowGiphy": true,
                "giphyContentRating": "strict"
            }
        });
        let team = self
            .graph
            .put(&format!("/groups/{group_id}/team"), body)
            .await?;
        info!(group_id, "converted group into a team");
        Ok(team)
    }

    /// Create the group, then turn it into a Team. Returns both resources.
    pub async fn create_and_teamify(&self, group: &NewGroup) -> Result<Value, DomainError> {
        let created = self.create_m365_group(group).await?;
        let group_id = odata::str_field(&created, "id");
        if group_id.is_empty() {
            return Err(DomainError::InvalidInput(
                "group creation returned no id".to_string(),
            ));
        }
        let team = self.teamify(&group_id).await?;
        Ok(json!({ "group": created, "team": team }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::graph::RecordingGraph;
    use crate::domain::HttpMethod;

    fn new_group(owner: Option<&str>) -> NewGroup {
        NewGroup {
            display_name: "Project X".into(),
            description: "Team for project X".into(),
            mail_nickname: "projectx".into(),
            owner_upn: owner.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_add_owner_resolves_user_id() {
        let graph = Arc::new(
            RecordingGraph::new()
                .respond(json!({"id": "oid-7", "userPrincipalName": "a@contoso.com"}))
                .respond(Value::Null),
        );
        GroupService::new(graph.clone())
            .add_owner("g1", "a@contoso.com")
            .await
            .unwrap();

        let reqs = graph.requests();
        assert_eq!(reqs[0].path, "/users/a@contoso.com");
        assert_eq!(reqs[1].method, HttpMethod::Post);
        assert_eq!(reqs[1].path, "/groups/g1/owners/$ref");
        assert_eq!(
            reqs[1].body,
            Some(json!({"@odata.id": "https://graph.microsoft.com/v1.0/users/oid-7"}))
        );
    }

    #[tokio::test]
    async fn test_add_member_without_user_id_sends_nothing_more() {
        let graph = Arc::new(RecordingGraph::new().respond(json!({})));
        let err = GroupService::new(graph.clone())
            .add_member("g1", "ghost@contoso.com")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(graph.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_create_group_binds_owner_as_owner_and_member() {
        let graph = Arc::new(RecordingGraph::new().respond(json!({"id": "g-new"})));
        GroupService::new(graph.clone())
            .create_m365_group(&new_group(Some("boss@contoso.com")))
            .await
            .unwrap();

        let body = graph.requests()[0].body.clone().unwrap();
        assert_eq!(body["groupTypes"], json!(["Unified"]));
        assert_eq!(body["mailEnabled"], true);
        assert_eq!(body["securityEnabled"], false);
        let bind = json!(["https://graph.microsoft.com/v1.0/users('boss@contoso.com')"]);
        assert_eq!(body["owners@odata.bind"], bind);
        assert_eq!(body["members@odata.bind"], bind);
    }

    #[tokio::test]
    async fn test_create_group_without_owner_has_no_binds() {
        let graph = Arc::new(RecordingGraph::new().respond(json!({"id": "g-new"})));
        GroupService::new(graph.clone())
            .create_m365_group(&new_group(None))
            .await
            .unwrap();

        let body = graph.requests()[0].body.clone().unwrap();
        assert!(body.get("owners@odata.bind").is_none());
        assert!(body.get("members@odata.bind").is_none());
    }

    #[tokio::test]
    async fn test_create_and_teamify() {
        let graph = Arc::new(
            RecordingGraph::new()
                .respond(json!({"id": "g-new"}))
                .respond(json!({"id": "g-new", "isArchived": false})),
        );
        let out = GroupService::new(graph.clone())
            .create_and_teamify(&new_group(None))
            .await
            .unwrap();

        assert_eq!(out["group"]["id"], "g-new");
        let reqs = graph.requests();
        assert_eq!(reqs[1].method, HttpMethod::Put);
        assert_eq!(reqs[1].path, "/groups/g-new/team");
        let body = reqs[1].body.clone().unwrap();
        assert_eq!(body["memberSettings"]["allowCreateUpdateChannels"], true);
        assert_eq!(body["funSettings"]["giphyContentRating"], "strict");
    }
}
