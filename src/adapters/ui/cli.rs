//! Command tree (clap derive).

use crate::adapters::ui::render::OutputFormat;
use crate::domain::{ChannelType, LinkScope, LinkType};
use crate::usecases::calendar_service::DEFAULT_EVENTS_TOP;
use crate::usecases::chat_service::DEFAULT_MESSAGES_TOP;
use crate::usecases::directory_service::{DEFAULT_AUDIT_TOP, DEFAULT_SITES_TOP};
use crate::usecases::drive_service::{DEFAULT_DRIVE_TOP, DEFAULT_SEARCH_TOP};
use crate::usecases::group_service::DEFAULT_GROUPS_TOP;
use crate::usecases::intune_service::DEFAULT_DEVICES_TOP;
use crate::usecases::mail_service::{DEFAULT_MAIL_FOLDER, DEFAULT_MAIL_TOP};
use crate::usecases::user_service::DEFAULT_USERS_TOP;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Microsoft Graph swissknife: tenant administration from the terminal
#[derive(Parser, Debug)]
#[command(name = "graph-swissknife")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Directory (tenant) ID. Overrides GRAPH_TENANT_ID
    #[arg(long, global = true)]
    pub tenant_id: Option<String>,

    /// Application (client) ID. Overrides GRAPH_CLIENT_ID
    #[arg(long, global = true)]
    pub client_id: Option<String>,

    /// Client secret. Overrides GRAPH_CLIENT_SECRET; prompted for when missing
    #[arg(long, global = true)]
    pub client_secret: Option<String>,

    /// Send requests to the beta endpoint
    #[arg(long, global = true)]
    pub beta: bool,

    /// Output format (lists default to table, everything else to json)
    #[arg(short, long, global = true, value_enum, env = "GRAPH_OUTPUT")]
    pub output: Option<OutputFormat>,

    /// Log the requests that would be sent instead of calling Graph
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Do not ask for confirmation before destructive actions
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire a token and read the organization record
    AuthTest,

    /// Account administration
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Directory audit and sign-in logs
    #[command(subcommand)]
    Audit(AuditCommand),

    /// Intune managed devices
    #[command(subcommand)]
    Intune(IntuneCommand),

    /// Teams chats
    #[command(subcommand)]
    Chats(ChatsCommand),

    /// Directory users
    #[command(subcommand)]
    Users(UsersCommand),

    /// Microsoft 365 groups
    #[command(subcommand)]
    Groups(GroupsCommand),

    /// Teams, channels and members
    #[command(subcommand)]
    Teams(TeamsCommand),

    /// A user's OneDrive
    #[command(subcommand)]
    Onedrive(OnedriveCommand),

    /// SharePoint sites and document libraries
    #[command(subcommand)]
    Sp(SpCommand),

    /// Subscribed SKUs and license assignment
    #[command(subcommand)]
    Licensing(LicensingCommand),

    /// Mailbox messages
    #[command(subcommand)]
    Mail(MailCommand),

    /// Calendar events
    #[command(subcommand)]
    Calendar(CalendarCommand),

    /// Call any Graph endpoint
    Raw {
        /// GET, POST, PATCH, PUT or DELETE
        method: String,
        /// Path relative to the Graph root (e.g. /me) or an absolute URL
        path: String,
        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Basic account info (id, names, mail, accountEnabled)
    UserInfo { user: String },
    /// Block sign-in (accountEnabled = false)
    Block { user: String },
    /// Allow sign-in again
    Unblock { user: String },
    /// Set a new password; prompted for when --password is absent
    ResetPassword {
        user: String,
        #[arg(long)]
        password: Option<String>,
        /// Do not require a password change at next sign-in
        #[arg(long)]
        no_force_change: bool,
    },
    /// Revoke refresh tokens and sessions
    RevokeSessions { user: String },
}

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Directory audit records
    Logs {
        #[arg(long, default_value_t = DEFAULT_AUDIT_TOP)]
        top: u32,
    },
    /// Sign-in records
    Signin {
        #[arg(long, default_value_t = DEFAULT_AUDIT_TOP)]
        top: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum IntuneCommand {
    /// List managed devices
    Devices {
        #[arg(long, default_value_t = DEFAULT_DEVICES_TOP)]
        top: u32,
    },
    /// One managed device
    Device { device_id: String },
    /// Factory reset a device
    Wipe {
        device_id: String,
        #[arg(long)]
        keep_enrollment: bool,
        #[arg(long)]
        keep_user_data: bool,
    },
    /// Remove company data and management
    Retire { device_id: String },
    /// Remote lock
    Lock { device_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ChatsCommand {
    /// Chats of a user
    List { user: String },
    /// Add a user to a chat
    AddMember {
        chat_id: String,
        user_upn: String,
        #[arg(long)]
        owner: bool,
    },
    /// Remove a user from a chat by UPN/email
    RemoveMember { chat_id: String, user_upn: String },
    /// Chat members
    Members { chat_id: String },
    /// Recent messages
    Messages {
        chat_id: String,
        #[arg(long, default_value_t = DEFAULT_MESSAGES_TOP)]
        top: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List users
    List {
        #[arg(long, default_value_t = DEFAULT_USERS_TOP)]
        top: u32,
    },
    /// One user by UPN or id
    Get { user: String },
    /// Groups and roles the user belongs to
    Groups { user: String },
    /// Assigned licenses
    Licenses { user: String },
}

#[derive(Subcommand, Debug)]
pub enum GroupsCommand {
    /// List groups
    List {
        #[arg(long, default_value_t = DEFAULT_GROUPS_TOP)]
        top: u32,
    },
    /// One group
    Get { group_id: String },
    /// Group members
    Members { group_id: String },
    /// Make a user an owner
    AddOwner { group_id: String, user_upn: String },
    /// Add a user as member
    AddMember { group_id: String, user_upn: String },
    /// Create a Microsoft 365 group
    Create {
        #[command(flatten)]
        group: NewGroupArgs,
        /// Turn the new group into a Team right away
        #[arg(long)]
        teamify: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct NewGroupArgs {
    pub display_name: String,
    pub description: String,
    pub mail_nickname: String,
    /// UPN bound as owner and member
    #[arg(long = "owner")]
    pub owner_upn: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TeamsCommand {
    /// Teams a user has joined
    UserJoined { user: String },
    /// Channels of a team
    Channels { team_id: String },
    /// Team members
    Members { team_id: String },
    /// Channel members
    ChannelMembers { team_id: String, channel_id: String },
    /// Add a user to a team
    AddMember {
        team_id: String,
        user_upn: String,
        #[arg(long)]
        owner: bool,
    },
    /// Remove a user from a team by UPN/email
    RemoveMember { team_id: String, user_upn: String },
    /// Add a user to a private or shared channel
    AddChannelMember {
        team_id: String,
        channel_id: String,
        user_upn: String,
        #[arg(long)]
        owner: bool,
    },
    /// Remove a user from a channel by UPN/email
    RemoveChannelMember {
        team_id: String,
        channel_id: String,
        user_upn: String,
    },
    /// Create a Microsoft 365 group (see `teamify`)
    CreateGroup {
        #[command(flatten)]
        group: NewGroupArgs,
    },
    /// Turn an existing group into a Team
    Teamify { group_id: String },
    /// Create a channel
    CreateChannel {
        team_id: String,
        display_name: String,
        description: String,
        /// standard, private or shared
        #[arg(long = "type", default_value = "standard")]
        channel_type: ChannelType,
        /// Owner UPN, required for private and shared channels
        #[arg(long = "owner")]
        owner_upn: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum OnedriveCommand {
    /// Items in the drive root
    ListRoot {
        user: String,
        #[arg(long, default_value_t = DEFAULT_DRIVE_TOP)]
        top: u32,
    },
    /// Items in a folder
    Children {
        user: String,
        item_id: String,
        #[arg(long, default_value_t = DEFAULT_DRIVE_TOP)]
        top: u32,
    },
    /// Save a file locally
    Download {
        user: String,
        item_id: String,
        dest: PathBuf,
    },
    /// Upload a local file to a drive path such as folder/file.txt
    Upload {
        user: String,
        local_path: PathBuf,
        remote_path: String,
    },
    /// Delete a file or folder
    Delete { user: String, item_id: String },
    /// Create a sharing link
    ShareLink {
        user: String,
        item_id: String,
        #[command(flatten)]
        link: LinkArgs,
    },
    /// Search the drive
    Search {
        user: String,
        query: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_TOP)]
        top: u32,
    },
    /// Copy top-level files from one user's drive root into another's
    CloneRoot {
        source_user: String,
        target_user: String,
        /// Replace files that already exist in the target
        #[arg(long)]
        overwrite: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SpCommand {
    /// List or search sites
    Sites {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = DEFAULT_SITES_TOP)]
        top: u32,
    },
    /// Items in the site library root
    Root {
        site_id: String,
        #[arg(long, default_value_t = DEFAULT_DRIVE_TOP)]
        top: u32,
    },
    /// Items in a folder
    Children {
        site_id: String,
        item_id: String,
        #[arg(long, default_value_t = DEFAULT_DRIVE_TOP)]
        top: u32,
    },
    /// Save a file locally
    Download {
        site_id: String,
        item_id: String,
        dest: PathBuf,
    },
    /// Upload a local file to a library path
    Upload {
        site_id: String,
        local_path: PathBuf,
        remote_path: String,
    },
    /// Delete a file or folder
    Delete { site_id: String, item_id: String },
    /// Create a sharing link
    ShareLink {
        site_id: String,
        item_id: String,
        #[command(flatten)]
        link: LinkArgs,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct LinkArgs {
    /// view, edit or embed
    #[arg(long = "type", default_value = "view")]
    pub link_type: LinkType,
    /// organization or anonymous
    #[arg(long, default_value = "organization")]
    pub scope: LinkScope,
}

#[derive(Subcommand, Debug)]
pub enum LicensingCommand {
    /// Subscribed SKUs with consumed and total units
    Skus,
    /// Add and/or remove licenses by SKU id
    Assign {
        user: String,
        #[arg(long)]
        add: Vec<String>,
        #[arg(long)]
        remove: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MailCommand {
    /// Newest messages in a folder
    List {
        user: String,
        #[arg(long, default_value_t = DEFAULT_MAIL_TOP)]
        top: u32,
        #[arg(long, default_value = DEFAULT_MAIL_FOLDER)]
        folder: String,
    },
    /// Send a plain-text message as the user
    Send {
        user: String,
        subject: String,
        body: String,
        #[arg(required = true, num_args = 1..)]
        to: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CalendarCommand {
    /// Events, newest start first
    List {
        user: String,
        #[arg(long, default_value_t = DEFAULT_EVENTS_TOP)]
        top: u32,
    },
    /// Create an event; dates like 2025-12-11T10:00:00
    Create {
        user: String,
        subject: String,
        body: String,
        start: String,
        end: String,
        #[arg(long, default_value = "UTC")]
        timezone: String,
        /// Required attendee (repeatable)
        #[arg(long)]
        attendee: Vec<String>,
    },
    /// Create an event from one JSON document with user, subject, body, start, end[, timezone, to]
    QuickCreate { payload: String },
}
