//! Core domain layer. No external I/O dependencies.
//!
//! Locally owned inputs (credentials, token, request shapes) and errors.

pub mod entities;
pub mod errors;

pub use entities::{
    AccessToken, ChannelType, CloneReport, CopiedItem, Credentials, DriveTarget, EventDraft,
    FailedItem, GraphRequest, HttpMethod, LinkScope, LinkType, MailDraft, MemberRole, SkippedItem,
};
pub use errors::DomainError;
