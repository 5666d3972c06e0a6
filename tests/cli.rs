//! Command-line parsing of the public command tree.

use clap::Parser;
use graph_swissknife::adapters::ui::OutputFormat;
use graph_swissknife::adapters::ui::cli::{
    Cli, Command, GroupsCommand, IntuneCommand, LicensingCommand, MailCommand, OnedriveCommand,
    SpCommand, TeamsCommand,
};
use graph_swissknife::domain::{ChannelType, LinkScope, LinkType};

fn parse(args: &[&str]) -> Cli {
    let mut full = vec!["graph-swissknife"];
    full.extend_from_slice(args);
    Cli::try_parse_from(full).unwrap()
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["users", "list", "--beta", "-o", "csv", "--dry-run", "-y"]);
    assert!(cli.global.beta);
    assert!(cli.global.dry_run);
    assert!(cli.global.yes);
    assert_eq!(cli.global.output, Some(OutputFormat::Csv));
}

#[test]
fn test_default_tops() {
    match parse(&["mail", "list", "a@contoso.com"]).command {
        Command::Mail(MailCommand::List { top, folder, .. }) => {
            assert_eq!(top, 20);
            assert_eq!(folder, "inbox");
        }
        other => panic!("unexpected {other:?}"),
    }
    match parse(&["intune", "devices"]).command {
        Command::Intune(IntuneCommand::Devices { top }) => assert_eq!(top, 50),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_create_channel_type_and_owner() {
    let cli = parse(&[
        "teams",
        "create-channel",
        "team-1",
        "Finance",
        "Private finance",
        "--type",
        "private",
        "--owner",
        "boss@contoso.com",
    ]);
    match cli.command {
        Command::Teams(TeamsCommand::CreateChannel {
            channel_type,
            owner_upn,
            ..
        }) => {
            assert_eq!(channel_type, ChannelType::Private);
            assert_eq!(owner_upn.as_deref(), Some("boss@contoso.com"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_unknown_channel_type_is_rejected() {
    let result = Cli::try_parse_from([
        "graph-swissknife",
        "teams",
        "create-channel",
        "t",
        "n",
        "d",
        "--type",
        "secret",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_share_link_defaults() {
    match parse(&["sp", "share-link", "site-1", "item-1"]).command {
        Command::Sp(SpCommand::ShareLink { link, .. }) => {
            assert_eq!(link.link_type, LinkType::View);
            assert_eq!(link.scope, LinkScope::Organization);
        }
        other => panic!("unexpected {other:?}"),
    }
    match parse(&["onedrive", "share-link", "u", "i", "--type", "edit", "--scope", "anonymous"])
        .command
    {
        Command::Onedrive(OnedriveCommand::ShareLink { link, .. }) => {
            assert_eq!(link.link_type, LinkType::Edit);
            assert_eq!(link.scope, LinkScope::Anonymous);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_group_create_with_teamify() {
    match parse(&["groups", "create", "Sales", "Sales team", "sales", "--owner", "a@b.com", "--teamify"])
        .command
    {
        Command::Groups(GroupsCommand::Create { group, teamify }) => {
            assert!(teamify);
            assert_eq!(group.mail_nickname, "sales");
            assert_eq!(group.owner_upn.as_deref(), Some("a@b.com"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_licensing_assign_repeatable() {
    match parse(&["licensing", "assign", "u@x.com", "--add", "sku-1", "--add", "sku-2", "--remove", "sku-3"])
        .command
    {
        Command::Licensing(LicensingCommand::Assign { add, remove, .. }) => {
            assert_eq!(add, vec!["sku-1", "sku-2"]);
            assert_eq!(remove, vec!["sku-3"]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_mail_send_requires_recipient() {
    let result = Cli::try_parse_from(["graph-swissknife", "mail", "send", "u@x.com", "Hi", "Body"]);
    assert!(result.is_err());
}

#[test]
fn test_raw_with_body() {
    match parse(&["raw", "patch", "/users/u@x.com", "--body", r#"{"jobTitle":"CTO"}"#]).command {
        Command::Raw { method, path, body } => {
            assert_eq!(method, "patch");
            assert_eq!(path, "/users/u@x.com");
            assert!(body.is_some());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_raw_short_body_flag() {
    match parse(&["raw", "post", "/groups", "-b", r#"{"displayName":"x"}"#]).command {
        Command::Raw { body, .. } => assert_eq!(body.as_deref(), Some(r#"{"displayName":"x"}"#)),
        other => panic!("unexpected {other:?}"),
    }
}
