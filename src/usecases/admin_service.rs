//! Account administration: sign-in blocking, password reset, session revocation, licenses.

use crate::domain::DomainError;
use crate::ports::GraphPort;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub struct AdminService {
    graph: Arc<dyn GraphPort>,
}

impl AdminService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    pub async fn user_info(&self, user: &str) -> Result<Value, DomainError> {
        self.graph
            .get_with(
                &format!("/users/{user}"),
                &[(
                    "$select",
                    "id,displayName,userPrincipalName,mail,accountEnabled".to_string(),
                )],
            )
            .await
    }

    /// PATCH `accountEnabled`. `false` blocks sign-in.
    pub async fn set_account_enabled(&self, user: &str, enabled: bool) -> Result<Value, DomainError> {
        let result = self
            .graph
            .patch(&format!("/users/{user}"), json!({ "accountEnabled": enabled }))
            .await?;
        info!(user, enabled, "updated accountEnabled");
        Ok(result)
    }

    /// Works for cloud-managed accounts only; synced accounts are rejected by Graph.
    pub async fn reset_password(
        &self,
        user: &str,
        new_password: &str,
        force_change_next_sign_in: bool,
    ) -> Result<Value, DomainError> {
        if new_password.is_empty() {
            return Err(DomainError::InvalidInput("password is empty".to_string()));
        }
        let result = self
            .graph
            .patch(
                &format!("/users/{user}"),
                json!({
                    "passwordProfile": {
                        "forceChangePasswordNextSignIn": force_change_next_sign_in,
                        "password": new_password,
                    }
                }),
            )
            .await?;
        info!(user, force_change_next_sign_in, "password reset");
        Ok(result)
    }

    /// Invalidate refresh tokens and session cookies.
    pub async fn revoke_sessions(&self, user: &str) -> Result<Value, DomainError> {
        let result = self
            .graph
            .post(&format!("/users/{user}/revokeSignInSessions"), json!({}))
            .await?;
        info!(user, "sign-in sessions revoked");
        Ok(result)
    }

    /// POST /users/{user}/assignLicense. At least one of `add`/`remove` must be non-empty.
    pub async fn assign_licenses(
        &self,
        user: &str,
        add: &[String],
        remove: &[String],
    ) -> Result<Value, DomainError> {
        if add.is_empty() && remove.is_empty() {
            return Err(DomainError::InvalidInput(
                "give at least one --add or --remove SKU id".to_string(),
            ));
        }
        let body = json!({
            "addLicenses": add
                .iter()
                .map(|sku| json!({ "skuId": sku }))
                .collect::<Vec<_>>(),
            "removeLicenses": remove,
        });
        let result = self
            .graph
            .post(&format!("/users/{user}/assignLicense"), body)
            .await?;
        info!(user, added = add.len(), removed = remove.len(), "licenses updated");
        Ok(result)
    }
}
