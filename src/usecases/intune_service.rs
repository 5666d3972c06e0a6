//! Intune managed devices and remote actions.

use crate::adapters::graph::odata;
use crate::domain::DomainError;
use crate::ports::GraphPort;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_DEVICES_TOP: u32 = 50;

const DEVICES_PATH: &str = "/deviceManagement/managedDevices";

/// Remote action on a managed device. All are POSTs to `{device}/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    Wipe {
        keep_enrollment_data: bool,
        keep_user_data: bool,
    },
    Retire,
    RemoteLock,
}

impl DeviceAction {
    fn endpoint(&self) -> &'static str {
        match self {
            DeviceAction::Wipe { .. } => "wipe",
            DeviceAction::Retire => "retire",
            DeviceAction::RemoteLock => "remoteLock",
        }
    }

    fn body(&self) -> Value {
        match self {
            DeviceAction::Wipe {
                keep_enrollment_data,
                keep_user_data,
            } => json!({
                "keepEnrollmentData": keep_enrollment_data,
                "keepUserData": keep_user_data,
                "macOsUnlockCode": null,
            }),
            DeviceAction::Retire | DeviceAction::RemoteLock => json!({}),
        }
    }
}

pub struct IntuneService {
    graph: Arc<dyn GraphPort>,
}

impl IntuneService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    pub async fn list_devices(&self, top: u32) -> Result<Vec<Value>, DomainError> {
        let result = self
            .graph
            .get_with(DEVICES_PATH, &[("$top", top.to_string())])
            .await?;
        Ok(odata::collection(result))
    }

    pub async fn get_device(&self, device_id: &str) -> Result<Value, DomainError> {
        self.graph.get(&format!("{DEVICES_PATH}/{device_id}")).await
    }

    pub async fn run_action(&self, device_id: &str, action: DeviceAction) -> Result<Value, DomainError> {
        let result = self
            .graph
            .post(
                &format!("{DEVICES_PATH}/{device_id}/{}", action.endpoint()),
                action.body(),
            )
            .await?;
        info!(device_id, action = action.endpoint(), "device action accepted");
        Ok(result)
    }
}
