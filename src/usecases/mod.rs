//! Application use cases. One service per Graph area, each over `GraphPort`.

pub mod admin_service;
pub mod auth_service;
pub mod calendar_service;
pub mod chat_service;
pub mod directory_service;
pub mod drive_service;
pub mod group_service;
pub mod intune_service;
pub mod mail_service;
pub mod raw_service;
pub mod team_service;
pub mod user_service;

pub use admin_service::AdminService;
pub use auth_service::AuthService;
pub use calendar_service::CalendarService;
pub use chat_service::ChatService;
pub use directory_service::DirectoryService;
pub use drive_service::DriveService;
pub use group_service::{GroupService, NewGroup};
pub use intune_service::{DeviceAction, IntuneService};
pub use mail_service::MailService;
pub use raw_service::RawService;
pub use team_service::{NewChannel, TeamService};
pub use user_service::UserService;

use crate::ports::GraphPort;
use std::sync::Arc;

/// All services over one shared gateway.
pub struct Services {
    pub auth: AuthService,
    pub users: UserService,
    pub groups: GroupService,
    pub teams: TeamService,
    pub chats: ChatService,
    pub mail: MailService,
    pub calendar: CalendarService,
    pub drive: DriveService,
    pub directory: DirectoryService,
    pub intune: IntuneService,
    pub admin: AdminService,
    pub raw: RawService,
}

impl Services {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&graph)),
            users: UserService::new(Arc::clone(&graph)),
            groups: GroupService::new(Arc::clone(&graph)),
            teams: TeamService::new(Arc::clone(&graph)),
            chats: ChatService::new(Arc::clone(&graph)),
            mail: MailService::new(Arc::clone(&graph)),
            calendar: CalendarService::new(Arc::clone(&graph)),
            drive: DriveService::new(Arc::clone(&graph)),
            directory: DirectoryService::new(Arc::clone(&graph)),
            intune: IntuneService::new(Arc::clone(&graph)),
            admin: AdminService::new(Arc::clone(&graph)),
            raw: RawService::new(graph),
        }
    }
}
