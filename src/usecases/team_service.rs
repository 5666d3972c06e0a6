//! Teams, channels and their members.

use crate::adapters::graph::odata;
use crate::domain::{ChannelType, DomainError, MemberRole};
use crate::ports::GraphPort;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

/// Parameters of a new channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannel {
    pub display_name: String,
    pub description: String,
    pub channel_type: ChannelType,
    /// Required for private and shared channels.
    pub owner_upn: Option<String>,
}

pub struct TeamService {
    graph: Arc<dyn GraphPort>,
}

impl TeamService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    pub async fn joined_teams(&self, user: &str) -> Result<Vec<Value>, DomainError> {
        self.list(&format!("/users/{user}/joinedTeams")).await
    }

    pub async fn channels(&self, team_id: &str) -> Result<Vec<Value>, DomainError> {
        self.list(&format!("/teams/{team_id}/channels")).await
    }

    pub async fn members(&self, team_id: &str) -> Result<Vec<Value>, DomainError> {
        self.list(&format!("/teams/{team_id}/members")).await
    }

    pub async fn channel_members(
        &self,
        team_id: &str,
        channel_id: &str,
    ) -> Result<Vec<Value>, DomainError> {
        self.list(&format!("/teams/{team_id}/channels/{channel_id}/members"))
            .await
    }

    pub async fn add_member(
        &self,
        team_id: &str,
        user_upn: &str,
        role: MemberRole,
    ) -> Result<Value, DomainError> {
        let result = self
            .graph
            .post(
                &format!("/teams/{team_id}/members"),
                odata::conversation_member(user_upn, role),
            )
            .await?;
        info!(team_id, user = user_upn, role = %role, "added team member");
        Ok(result)
    }

    pub async fn add_channel_member(
        &self,
        team_id: &str,
        channel_id: &str,
        user_upn: &str,
        role: MemberRole,
    ) -> Result<Value, DomainError> {
        let result = self
            .graph
            .post(
                &format!("/teams/{team_id}/channels/{channel_id}/members"),
                odata::conversation_member(user_upn, role),
            )
            .await?;
        info!(team_id, channel_id, user = user_upn, role = %role, "added channel member");
        Ok(result)
    }

    pub async fn remove_member(&self, team_id: &str, user_upn: &str) -> Result<(), DomainError> {
        odata::require_upn(user_upn)?;
        let members = self.members(team_id).await?;
        let membership_id = odata::find_membership_id(&members, user_upn).ok_or_else(|| {
            DomainError::MemberNotFound {
                upn: user_upn.to_string(),
                container: format!("Team {team_id}"),
            }
        })?;
        self.graph
            .delete(&format!("/teams/{team_id}/members/{membership_id}"))
            .await?;
        info!(team_id, user = user_upn, "removed team member");
        Ok(())
    }

    pub async fn remove_channel_member(
        &self,
        team_id: &str,
        channel_id: &str,
        user_upn: &str,
    ) -> Result<(), DomainError> {
        odata::require_upn(user_upn)?;
        let members = self.channel_members(team_id, channel_id).await?;
        let membership_id = odata::find_membership_id(&members, user_upn).ok_or_else(|| {
            DomainError::MemberNotFound {
                upn: user_upn.to_string(),
                container: format!("channel {channel_id}"),
            }
        })?;
        self.graph
            .delete(&format!(
                "/teams/{team_id}/channels/{channel_id}/members/{membership_id}"
            ))
            .await?;
        info!(team_id, channel_id, user = user_upn, "removed channel member");
        Ok(())
    }

    /// Private and shared channels are created with their single owner embedded,
    /// since app-only tokens cannot add one afterwards.
    pub async fn create_channel(
        &self,
        team_id: &str,
        channel: &NewChannel,
    ) -> Result<Value, DomainError> {
        let mut body = json!({
            "displayName": channel.display_name,
            "description": channel.description,
            "membershipType": channel.channel_type.as_str(),
        });
        if channel.channel_type.requires_owner() {
            let owner = channel
                .owner_upn
                .as_deref()
                .filter(|o| !o.trim().is_empty())
                .ok_or_else(|| {
                    DomainError::InvalidInput(format!(
                        "a {} channel needs --owner (UPN of the owner)",
                        channel.channel_type
                    ))
                })?;
            body["members"] = json!([odata::conversation_member(owner, MemberRole::Owner)]);
        }
        let created = self
            .graph
            .post(&format!("/teams/{team_id}/channels"), body)
            .await?;
        info!(
            team_id,
            channel_id = %odata::str_field(&created, "id"),
            kind = %channel.channel_type,
            "created channel"
        );
        Ok(created)
    }

    async fn list(&self, path: &str) -> Result<Vec<Value>, DomainError> {
        Ok(odata::collection(self.graph.get(path).await?))
    }
}
