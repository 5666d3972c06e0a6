//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: the CLI invokes application use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Execute the parsed command and render its result.
    async fn run(&self) -> Result<(), DomainError>;
}
