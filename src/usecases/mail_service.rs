//! Mailbox listing and sending on behalf of a user.

use crate::adapters::graph::odata;
use crate::domain::{DomainError, MailDraft};
use crate::ports::GraphPort;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_MAIL_TOP: u32 = 20;
pub const DEFAULT_MAIL_FOLDER: &str = "inbox";

pub struct MailService {
    graph: Arc<dyn GraphPort>,
}

impl MailService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    /// Newest messages first.
    pub async fn list_messages(
        &self,
        user: &str,
        folder: &str,
        top: u32,
    ) -> Result<Vec<Value>, DomainError> {
        let result = self
            .graph
            .get_with(
                &format!("/users/{user}/mailFolders/{folder}/messages"),
                &[
                    ("$top", top.to_string()),
                    ("$select", "id,subject,from,receivedDateTime,isRead".to_string()),
                    ("$orderby", "receivedDateTime DESC".to_string()),
                ],
            )
            .await?;
        Ok(odata::collection(result))
    }

    /// POST /users/{user}/sendMail with a plain-text body, kept in Sent Items.
    pub async fn send(&self, user: &str, draft: &MailDraft) -> Result<(), DomainError> {
        let recipients: Vec<&str> = draft
            .to
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(DomainError::InvalidInput(
                "at least one recipient is required".to_string(),
            ));
        }
        let payload = json!({
            "message": {
                "subject": draft.subject,
                "body": {
                    "contentType": "Text",
                    "content": draft.body,
                },
                "toRecipients": recipients
                    .iter()
                    .map(|address| json!({"emailAddress": {"address": address}}))
                    .collect::<Vec<_>>(),
            },
            "saveToSentItems": true,
        });
        self.graph
            .post(&format!("/users/{user}/sendMail"), payload)
            .await?;
        info!(user, recipients = recipients.len(), "mail sent");
        Ok(())
    }
}
