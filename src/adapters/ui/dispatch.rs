//! Implements InputPort. Runs one parsed command against the use cases and renders the result.

use crate::adapters::ui::cli::{
    AdminCommand, AuditCommand, CalendarCommand, ChatsCommand, Command, GroupsCommand,
    IntuneCommand, LicensingCommand, LinkArgs, MailCommand, NewGroupArgs, OnedriveCommand,
    SpCommand, TeamsCommand, UsersCommand,
};
use crate::adapters::ui::progress::TerminalProgress;
use crate::adapters::ui::render::{self, OutputFormat};
use crate::adapters::ui::views::{self, View};
use crate::adapters::ui::prompt;
use crate::domain::{DomainError, DriveTarget, EventDraft, MailDraft, MemberRole};
use crate::ports::InputPort;
use crate::usecases::{DeviceAction, NewChannel, NewGroup, Services};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

const CONSENT_HINT: &str = "Check that the app registration has the required Application \
permissions under API permissions and that admin consent has been granted.";

fn role(owner: bool) -> MemberRole {
    if owner {
        MemberRole::Owner
    } else {
        MemberRole::Member
    }
}

impl From<&NewGroupArgs> for NewGroup {
    fn from(args: &NewGroupArgs) -> Self {
        NewGroup {
            display_name: args.display_name.clone(),
            description: args.description.clone(),
            mail_nickname: args.mail_nickname.clone(),
            owner_upn: args.owner_upn.clone(),
        }
    }
}

/// Rendered list, or `None` when there is nothing to show.
///
/// Lists default to a table when a column set exists, JSON otherwise.
fn list_text(
    items: &[Value],
    view: Option<View>,
    output: Option<OutputFormat>,
) -> Result<Option<String>, DomainError> {
    if items.is_empty() {
        return Ok(None);
    }
    let default = if view.is_some() {
        OutputFormat::Table
    } else {
        OutputFormat::Json
    };
    let grid = || match view {
        Some(v) => views::grid(v, items),
        None => render::generic_grid(&Value::Array(items.to_vec())),
    };
    let text = match output.unwrap_or(default) {
        OutputFormat::Json => render::render_json(&Value::Array(items.to_vec())),
        OutputFormat::Tree => render::render_tree(&Value::Array(items.to_vec())),
        OutputFormat::Table => render::render_table(&grid()),
        OutputFormat::Csv => render::render_csv(&grid())?,
    };
    Ok(Some(text.trim_end().to_string()))
}

/// Single values default to JSON.
fn value_text(value: &Value, output: Option<OutputFormat>) -> Result<String, DomainError> {
    let text = match output.unwrap_or(OutputFormat::Json) {
        OutputFormat::Json => render::render_json(value),
        OutputFormat::Tree => render::render_tree(value),
        OutputFormat::Table => render::render_table(&render::generic_grid(value)),
        OutputFormat::Csv => render::render_csv(&render::generic_grid(value))?,
    };
    Ok(text.trim_end().to_string())
}

/// Drive commands shared by `onedrive` and `sp`.
enum DriveOp<'a> {
    List { top: u32 },
    Children { item_id: &'a str, top: u32 },
    Download { item_id: &'a str, dest: &'a Path },
    Upload { local_path: &'a Path, remote_path: &'a str },
    Delete { item_id: &'a str },
    ShareLink { item_id: &'a str, link: LinkArgs },
}

/// CLI adapter. Owns the parsed command and the services it drives.
pub struct CliInputPort {
    command: Command,
    services: Services,
    output: Option<OutputFormat>,
    assume_yes: bool,
    clone_tmp_dir: PathBuf,
}

impl CliInputPort {
    pub fn new(
        command: Command,
        services: Services,
        output: Option<OutputFormat>,
        assume_yes: bool,
        clone_tmp_dir: PathBuf,
    ) -> Self {
        Self {
            command,
            services,
            output,
            assume_yes,
            clone_tmp_dir,
        }
    }

    fn show_list(&self, items: &[Value], view: Option<View>) -> Result<(), DomainError> {
        match list_text(items, view, self.output)? {
            Some(text) => println!("{text}"),
            None => render::notice("Nothing found."),
        }
        Ok(())
    }

    fn show_value(&self, value: &Value) -> Result<(), DomainError> {
        println!("{}", value_text(value, self.output)?);
        Ok(())
    }

    fn confirmed(&self, question: &str) -> Result<bool, DomainError> {
        let ok = prompt::confirm(question, self.assume_yes)?;
        if !ok {
            render::notice("Aborted.");
        }
        Ok(ok)
    }

    async fn auth_test(&self) -> Result<(), DomainError> {
        render::section("Authorization check");
        match self.services.auth.connect().await {
            Ok(result) => {
                render::success("token acquired, /organization readable");
                self.show_value(&result)
            }
            Err(e) => {
                render::notice(CONSENT_HINT);
                Err(e)
            }
        }
    }

    async fn admin(&self, command: &AdminCommand) -> Result<(), DomainError> {
        let admin = &self.services.admin;
        match command {
            AdminCommand::UserInfo { user } => {
                render::section(&format!("User {user}"));
                self.show_value(&admin.user_info(user).await?)
            }
            AdminCommand::Block { user } => {
                render::section(&format!("Block {user}"));
                admin.set_account_enabled(user, false).await?;
                render::success(&format!("{user} can no longer sign in"));
                Ok(())
            }
            AdminCommand::Unblock { user } => {
                render::section(&format!("Unblock {user}"));
                admin.set_account_enabled(user, true).await?;
                render::success(&format!("{user} can sign in again"));
                Ok(())
            }
            AdminCommand::ResetPassword {
                user,
                password,
                no_force_change,
            } => {
                render::section(&format!("Reset password for {user}"));
                let password = match password {
                    Some(p) => p.clone(),
                    None => prompt::new_password("New password:")?,
                };
                admin
                    .reset_password(user, &password, !no_force_change)
                    .await?;
                render::success("password updated");
                Ok(())
            }
            AdminCommand::RevokeSessions { user } => {
                render::section(&format!("Revoke sessions of {user}"));
                let result = admin.revoke_sessions(user).await?;
                render::success("sessions revoked");
                self.show_value(&result)
            }
        }
    }

    async fn audit(&self, command: &AuditCommand) -> Result<(), DomainError> {
        let directory = &self.services.directory;
        match command {
            AuditCommand::Logs { top } => {
                render::section("Audit logs");
                self.show_list(&directory.directory_audits(*top).await?, None)
            }
            AuditCommand::Signin { top } => {
                render::section("Sign-in logs");
                self.show_list(&directory.sign_ins(*top).await?, None)
            }
        }
    }

    async fn intune(&self, command: &IntuneCommand) -> Result<(), DomainError> {
        let intune = &self.services.intune;
        let (device_id, action, question) = match command {
            IntuneCommand::Devices { top } => {
                render::section("Managed devices");
                return self.show_list(&intune.list_devices(*top).await?, Some(views::DEVICES));
            }
            IntuneCommand::Device { device_id } => {
                render::section(&format!("Device {device_id}"));
                return self.show_value(&intune.get_device(device_id).await?);
            }
            IntuneCommand::Wipe {
                device_id,
                keep_enrollment,
                keep_user_data,
            } => (
                device_id,
                DeviceAction::Wipe {
                    keep_enrollment_data: *keep_enrollment,
                    keep_user_data: *keep_user_data,
                },
                format!("Wipe device {device_id}? This cannot be undone."),
            ),
            IntuneCommand::Retire { device_id } => (
                device_id,
                DeviceAction::Retire,
                format!("Retire device {device_id}?"),
            ),
            IntuneCommand::Lock { device_id } => {
                render::section(&format!("Remote lock {device_id}"));
                let result = intune.run_action(device_id, DeviceAction::RemoteLock).await?;
                render::success("lock requested");
                return self.show_value(&result);
            }
        };
        render::section(&format!("Device action on {device_id}"));
        if !self.confirmed(&question)? {
            return Ok(());
        }
        let result = intune.run_action(device_id, action).await?;
        render::success("action requested");
        self.show_value(&result)
    }

    async fn chats(&self, command: &ChatsCommand) -> Result<(), DomainError> {
        let chats = &self.services.chats;
        match command {
            ChatsCommand::List { user } => {
                render::section(&format!("Chats of {user}"));
                self.show_list(&chats.list_user_chats(user).await?, Some(views::CHATS))
            }
            ChatsCommand::AddMember {
                chat_id,
                user_upn,
                owner,
            } => {
                render::section(&format!("Add {user_upn} to chat"));
                let result = chats.add_member(chat_id, user_upn, role(*owner)).await?;
                render::success(&format!("{user_upn} added to chat {chat_id}"));
                self.show_value(&result)
            }
            ChatsCommand::RemoveMember { chat_id, user_upn } => {
                render::section(&format!("Remove {user_upn} from chat"));
                chats.remove_member(chat_id, user_upn).await?;
                render::success(&format!("{user_upn} removed from chat {chat_id}"));
                Ok(())
            }
            ChatsCommand::Members { chat_id } => {
                render::section(&format!("Members of chat {chat_id}"));
                self.show_list(&chats.members(chat_id).await?, Some(views::MEMBERS))
            }
            ChatsCommand::Messages { chat_id, top } => {
                render::section(&format!("Messages of chat {chat_id}"));
                self.show_list(&chats.messages(chat_id, *top).await?, Some(views::CHAT_MESSAGES))
            }
        }
    }

    async fn users(&self, command: &UsersCommand) -> Result<(), DomainError> {
        let users = &self.services.users;
        match command {
            UsersCommand::List { top } => {
                render::section("Users");
                self.show_list(&users.list(*top).await?, Some(views::USERS))
            }
            UsersCommand::Get { user } => {
                render::section(&format!("User {user}"));
                self.show_value(&users.get(user).await?)
            }
            UsersCommand::Groups { user } => {
                render::section(&format!("Memberships of {user}"));
                self.show_list(&users.member_of(user).await?, Some(views::DIRECTORY_OBJECTS))
            }
            UsersCommand::Licenses { user } => {
                render::section(&format!("Licenses of {user}"));
                self.show_list(&users.license_details(user).await?, Some(views::LICENSE_DETAILS))
            }
        }
    }

    async fn groups(&self, command: &GroupsCommand) -> Result<(), DomainError> {
        let groups = &self.services.groups;
        match command {
            GroupsCommand::List { top } => {
                render::section("Groups");
                self.show_list(&groups.list(*top).await?, Some(views::GROUPS))
            }
            GroupsCommand::Get { group_id } => {
                render::section(&format!("Group {group_id}"));
                self.show_value(&groups.get(group_id).await?)
            }
            GroupsCommand::Members { group_id } => {
                render::section(&format!("Members of group {group_id}"));
                self.show_list(&groups.members(group_id).await?, Some(views::DIRECTORY_OBJECTS))
            }
            GroupsCommand::AddOwner { group_id, user_upn } => {
                render::section(&format!("Add owner to group {group_id}"));
                groups.add_owner(group_id, user_upn).await?;
                render::success(&format!("{user_upn} is now an owner of {group_id}"));
                Ok(())
            }
            GroupsCommand::AddMember { group_id, user_upn } => {
                render::section(&format!("Add member to group {group_id}"));
                groups.add_member(group_id, user_upn).await?;
                render::success(&format!("{user_upn} is now a member of {group_id}"));
                Ok(())
            }
            GroupsCommand::Create { group, teamify } => {
                render::section(&format!("Create group {}", group.display_name));
                let new_group = NewGroup::from(group);
                let result = if *teamify {
                    groups.create_and_teamify(&new_group).await?
                } else {
                    groups.create_m365_group(&new_group).await?
                };
                self.show_value(&result)
            }
        }
    }

    async fn teams(&self, command: &TeamsCommand) -> Result<(), DomainError> {
        let teams = &self.services.teams;
        match command {
            TeamsCommand::UserJoined { user } => {
                render::section(&format!("Teams of {user}"));
                self.show_list(&teams.joined_teams(user).await?, Some(views::TEAMS))
            }
            TeamsCommand::Channels { team_id } => {
                render::section(&format!("Channels of team {team_id}"));
                self.show_list(&teams.channels(team_id).await?, Some(views::CHANNELS))
            }
            TeamsCommand::Members { team_id } => {
                render::section(&format!("Members of team {team_id}"));
                self.show_list(&teams.members(team_id).await?, Some(views::MEMBERS))
            }
            TeamsCommand::ChannelMembers {
                team_id,
                channel_id,
            } => {
                render::section(&format!("Members of channel {channel_id}"));
                self.show_list(
                    &teams.channel_members(team_id, channel_id).await?,
                    Some(views::MEMBERS),
                )
            }
            TeamsCommand::AddMember {
                team_id,
                user_upn,
                owner,
            } => {
                render::section(&format!("Add {user_upn} to team"));
                let result = teams.add_member(team_id, user_upn, role(*owner)).await?;
                render::success(&format!("{user_upn} added to team {team_id}"));
                self.show_value(&result)
            }
            TeamsCommand::RemoveMember { team_id, user_upn } => {
                render::section(&format!("Remove {user_upn} from team"));
                teams.remove_member(team_id, user_upn).await?;
                render::success(&format!("{user_upn} removed from team {team_id}"));
                Ok(())
            }
            TeamsCommand::AddChannelMember {
                team_id,
                channel_id,
                user_upn,
                owner,
            } => {
                render::section(&format!("Add {user_upn} to channel"));
                let result = teams
                    .add_channel_member(team_id, channel_id, user_upn, role(*owner))
                    .await?;
                render::success(&format!("{user_upn} added to channel {channel_id}"));
                self.show_value(&result)
            }
            TeamsCommand::RemoveChannelMember {
                team_id,
                channel_id,
                user_upn,
            } => {
                render::section(&format!("Remove {user_upn} from channel"));
                teams
                    .remove_channel_member(team_id, channel_id, user_upn)
                    .await?;
                render::success(&format!("{user_upn} removed from channel {channel_id}"));
                Ok(())
            }
            TeamsCommand::CreateGroup { group } => {
                render::section(&format!("Create group {}", group.display_name));
                let created = self
                    .services
                    .groups
                    .create_m365_group(&NewGroup::from(group))
                    .await?;
                self.show_value(&created)
            }
            TeamsCommand::Teamify { group_id } => {
                render::section(&format!("Teamify group {group_id}"));
                self.show_value(&self.services.groups.teamify(group_id).await?)
            }
            TeamsCommand::CreateChannel {
                team_id,
                display_name,
                description,
                channel_type,
                owner_upn,
            } => {
                render::section(&format!("Create channel {display_name}"));
                let channel = NewChannel {
                    display_name: display_name.clone(),
                    description: description.clone(),
                    channel_type: *channel_type,
                    owner_upn: owner_upn.clone(),
                };
                self.show_value(&teams.create_channel(team_id, &channel).await?)
            }
        }
    }

    async fn drive(&self, target: DriveTarget, op: DriveOp<'_>) -> Result<(), DomainError> {
        let drive = &self.services.drive;
        match op {
            DriveOp::List { top } => {
                render::section(&format!("Root of {target}"));
                self.show_list(&drive.list_root(&target, top).await?, Some(views::DRIVE_ITEMS))
            }
            DriveOp::Children { item_id, top } => {
                render::section(&format!("Folder {item_id} in {target}"));
                self.show_list(
                    &drive.children(&target, item_id, top).await?,
                    Some(views::DRIVE_ITEMS),
                )
            }
            DriveOp::Download { item_id, dest } => {
                render::section(&format!("Download from {target}"));
                let bytes = drive.download(&target, item_id, dest).await?;
                render::success(&format!("saved {} ({bytes} bytes)", dest.display()));
                Ok(())
            }
            DriveOp::Upload {
                local_path,
                remote_path,
            } => {
                render::section(&format!("Upload to {target}"));
                self.show_value(&drive.upload(&target, local_path, remote_path).await?)
            }
            DriveOp::Delete { item_id } => {
                render::section(&format!("Delete from {target}"));
                if !self.confirmed(&format!("Delete item {item_id} from {target}?"))? {
                    return Ok(());
                }
                drive.delete(&target, item_id).await?;
                render::success(&format!("item {item_id} deleted"));
                Ok(())
            }
            DriveOp::ShareLink { item_id, link } => {
                render::section(&format!("Sharing link in {target}"));
                self.show_value(
                    &drive
                        .create_link(&target, item_id, link.link_type, link.scope)
                        .await?,
                )
            }
        }
    }

    async fn onedrive(&self, command: &OnedriveCommand) -> Result<(), DomainError> {
        let user = |u: &str| DriveTarget::User(u.to_string());
        match command {
            OnedriveCommand::ListRoot { user: u, top } => {
                self.drive(user(u), DriveOp::List { top: *top }).await
            }
            OnedriveCommand::Children { user: u, item_id, top } => {
                self.drive(user(u), DriveOp::Children { item_id, top: *top })
                    .await
            }
            OnedriveCommand::Download { user: u, item_id, dest } => {
                self.drive(user(u), DriveOp::Download { item_id, dest }).await
            }
            OnedriveCommand::Upload {
                user: u,
                local_path,
                remote_path,
            } => {
                self.drive(
                    user(u),
                    DriveOp::Upload {
                        local_path,
                        remote_path,
                    },
                )
                .await
            }
            OnedriveCommand::Delete { user: u, item_id } => {
                self.drive(user(u), DriveOp::Delete { item_id }).await
            }
            OnedriveCommand::ShareLink { user: u, item_id, link } => {
                self.drive(user(u), DriveOp::ShareLink { item_id, link: *link })
                    .await
            }
            OnedriveCommand::Search { user: u, query, top } => {
                render::section(&format!("Search {query:?} in OneDrive of {u}"));
                let items = self.services.drive.search(&user(u), query, *top).await?;
                self.show_list(&items, Some(views::DRIVE_ITEMS))
            }
            OnedriveCommand::CloneRoot {
                source_user,
                target_user,
                overwrite,
            } => {
                render::section(&format!("Clone OneDrive root {source_user} -> {target_user}"));
                let progress = TerminalProgress::new();
                let report = self
                    .services
                    .drive
                    .clone_root(
                        &user(source_user),
                        &user(target_user),
                        *overwrite,
                        &self.clone_tmp_dir,
                        &progress,
                    )
                    .await?;
                let value = serde_json::to_value(&report)
                    .map_err(|e| DomainError::Io(format!("serialize report: {}", e)))?;
                self.show_value(&value)
            }
        }
    }

    async fn sharepoint(&self, command: &SpCommand) -> Result<(), DomainError> {
        let site = |s: &str| DriveTarget::Site(s.to_string());
        match command {
            SpCommand::Sites { search, top } => {
                render::section("SharePoint sites");
                let sites = self
                    .services
                    .directory
                    .sites(search.as_deref(), *top)
                    .await?;
                self.show_list(&sites, Some(views::SITES))
            }
            SpCommand::Root { site_id, top } => {
                self.drive(site(site_id), DriveOp::List { top: *top }).await
            }
            SpCommand::Children { site_id, item_id, top } => {
                self.drive(site(site_id), DriveOp::Children { item_id, top: *top })
                    .await
            }
            SpCommand::Download { site_id, item_id, dest } => {
                self.drive(site(site_id), DriveOp::Download { item_id, dest })
                    .await
            }
            SpCommand::Upload {
                site_id,
                local_path,
                remote_path,
            } => {
                self.drive(
                    site(site_id),
                    DriveOp::Upload {
                        local_path,
                        remote_path,
                    },
                )
                .await
            }
            SpCommand::Delete { site_id, item_id } => {
                self.drive(site(site_id), DriveOp::Delete { item_id }).await
            }
            SpCommand::ShareLink { site_id, item_id, link } => {
                self.drive(site(site_id), DriveOp::ShareLink { item_id, link: *link })
                    .await
            }
        }
    }

    async fn licensing(&self, command: &LicensingCommand) -> Result<(), DomainError> {
        match command {
            LicensingCommand::Skus => {
                render::section("Subscribed SKUs");
                let skus = self.services.directory.subscribed_skus().await?;
                self.show_list(&skus, Some(views::SKUS))
            }
            LicensingCommand::Assign { user, add, remove } => {
                render::section(&format!("Licenses of {user}"));
                let result = self.services.admin.assign_licenses(user, add, remove).await?;
                self.show_value(&result)
            }
        }
    }

    async fn mail(&self, command: &MailCommand) -> Result<(), DomainError> {
        match command {
            MailCommand::List { user, top, folder } => {
                render::section(&format!("Mail of {user} ({folder})"));
                let messages = self.services.mail.list_messages(user, folder, *top).await?;
                self.show_list(&messages, Some(views::MAIL))
            }
            MailCommand::Send {
                user,
                subject,
                body,
                to,
            } => {
                render::section(&format!("Send mail as {user}"));
                let draft = MailDraft {
                    subject: subject.clone(),
                    body: body.clone(),
                    to: to.clone(),
                };
                self.services.mail.send(user, &draft).await?;
                render::success(&format!("sent to {}", to.join(", ")));
                Ok(())
            }
        }
    }

    async fn calendar(&self, command: &CalendarCommand) -> Result<(), DomainError> {
        let calendar = &self.services.calendar;
        match command {
            CalendarCommand::List { user, top } => {
                render::section(&format!("Events of {user}"));
                self.show_list(&calendar.list_events(user, *top).await?, Some(views::EVENTS))
            }
            CalendarCommand::Create {
                user,
                subject,
                body,
                start,
                end,
                timezone,
                attendee,
            } => {
                render::section(&format!("Create event for {user}"));
                let draft = EventDraft {
                    user: user.clone(),
                    subject: subject.clone(),
                    body: body.clone(),
                    start: start.clone(),
                    end: end.clone(),
                    timezone: timezone.clone(),
                    attendees: attendee.clone(),
                };
                self.show_value(&calendar.create_event(&draft).await?)
            }
            CalendarCommand::QuickCreate { payload } => {
                render::section("Quick create event");
                self.show_value(&calendar.quick_create(payload).await?)
            }
        }
    }
}

#[async_trait]
impl InputPort for CliInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        match &self.command {
            Command::AuthTest => self.auth_test().await,
            Command::Admin(c) => self.admin(c).await,
            Command::Audit(c) => self.audit(c).await,
            Command::Intune(c) => self.intune(c).await,
            Command::Chats(c) => self.chats(c).await,
            Command::Users(c) => self.users(c).await,
            Command::Groups(c) => self.groups(c).await,
            Command::Teams(c) => self.teams(c).await,
            Command::Onedrive(c) => self.onedrive(c).await,
            Command::Sp(c) => self.sharepoint(c).await,
            Command::Licensing(c) => self.licensing(c).await,
            Command::Mail(c) => self.mail(c).await,
            Command::Calendar(c) => self.calendar(c).await,
            Command::Raw { method, path, body } => {
                render::section(&format!("{} {}", method.to_uppercase(), path));
                let result = self
                    .services
                    .raw
                    .call(method, path, body.as_deref())
                    .await?;
                self.show_value(&result)
            }
        }
    }
}
