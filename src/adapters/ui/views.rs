//! Column sets for list commands, including derived cells.

use crate::adapters::ui::render::{Grid, cell_text};
use serde_json::Value;

const PREVIEW_MAX_CHARS: usize = 80;

/// How a cell is computed from one item.
#[derive(Clone, Copy)]
pub enum Cell {
    /// Top-level field.
    Field(&'static str),
    /// Nested field, e.g. `["from", "emailAddress", "address"]`.
    Path(&'static [&'static str]),
    Derived(fn(&Value) -> String),
}

#[derive(Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    pub cell: Cell,
}

const fn field(header: &'static str, key: &'static str) -> Column {
    Column {
        header,
        cell: Cell::Field(key),
    }
}

const fn path(header: &'static str, keys: &'static [&'static str]) -> Column {
    Column {
        header,
        cell: Cell::Path(keys),
    }
}

const fn derived(header: &'static str, f: fn(&Value) -> String) -> Column {
    Column {
        header,
        cell: Cell::Derived(f),
    }
}

/// A table layout. An `Index` column (1-based) is always prepended.
pub type View = &'static [Column];

pub const USERS: View = &[
    field("User ID", "id"),
    field("UPN", "userPrincipalName"),
    field("DisplayName", "displayName"),
];

pub const DIRECTORY_OBJECTS: View = &[
    field("Object ID", "id"),
    field("Type", "@odata.type"),
    field("DisplayName", "displayName"),
];

pub const LICENSE_DETAILS: View = &[
    field("SKU ID", "skuId"),
    field("SKU Part Number", "skuPartNumber"),
];

pub const GROUPS: View = &[
    field("Group ID", "id"),
    field("DisplayName", "displayName"),
    field("Mail", "mail"),
];

pub const TEAMS: View = &[
    field("Team ID", "id"),
    field("DisplayName", "displayName"),
    field("Description", "description"),
];

pub const CHANNELS: View = &[
    field("Channel ID", "id"),
    field("DisplayName", "displayName"),
    derived("Type", channel_type),
];

pub const MEMBERS: View = &[
    field("Membership ID", "id"),
    field("DisplayName", "displayName"),
    field("Email", "email"),
    derived("Roles", roles),
];

pub const CHATS: View = &[
    field("Chat ID", "id"),
    field("Topic", "topic"),
    field("Chat type", "chatType"),
];

pub const CHAT_MESSAGES: View = &[
    derived("From", message_sender),
    field("Created", "createdDateTime"),
    derived("Preview", message_preview),
];

pub const DRIVE_ITEMS: View = &[
    field("Item ID", "id"),
    field("Name", "name"),
    derived("Type", drive_item_type),
];

pub const SITES: View = &[
    field("Site ID", "id"),
    field("Name", "displayName"),
    field("WebUrl", "webUrl"),
];

pub const DEVICES: View = &[
    field("Device ID", "id"),
    field("Device Name", "deviceName"),
    field("OS", "operatingSystem"),
    field("User", "userPrincipalName"),
];

pub const SKUS: View = &[
    field("SKU ID", "skuId"),
    field("SKU Part Number", "skuPartNumber"),
    field("Consumed", "consumedUnits"),
    derived("Total", sku_total),
];

pub const MAIL: View = &[
    field("Subject", "subject"),
    path("From", &["from", "emailAddress", "address"]),
    field("Received", "receivedDateTime"),
    derived("IsRead", is_read),
];

pub const EVENTS: View = &[
    field("Subject", "subject"),
    path("Start", &["start", "dateTime"]),
    path("End", &["end", "dateTime"]),
    path("Location", &["location", "displayName"]),
];

fn lookup<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(item, |current, key| current.get(key))
}

impl Cell {
    fn text(&self, item: &Value) -> String {
        match self {
            Cell::Field(key) => item.get(key).map(cell_text).unwrap_or_default(),
            Cell::Path(keys) => lookup(item, keys).map(cell_text).unwrap_or_default(),
            Cell::Derived(f) => f(item),
        }
    }
}

pub fn grid(view: View, items: &[Value]) -> Grid {
    let headers = std::iter::once("Index".to_string())
        .chain(view.iter().map(|c| c.header.to_string()))
        .collect();
    let rows = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            std::iter::once((i + 1).to_string())
                .chain(view.iter().map(|c| c.cell.text(item)))
                .collect()
        })
        .collect();
    Grid { headers, rows }
}

/// `folder`, `file` or `other` depending on which facet the item carries.
pub fn drive_item_type(item: &Value) -> String {
    if item.get("folder").is_some() {
        "folder".into()
    } else if item.get("file").is_some() {
        "file".into()
    } else {
        "other".into()
    }
}

/// Graph reports shared channels as `unknownFutureValue` on v1.0.
pub fn channel_type(item: &Value) -> String {
    let raw = item
        .get("membershipType")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();
    match raw.as_str() {
        "unknownfuturevalue" => "shared".into(),
        "" => "-".into(),
        _ => raw,
    }
}

pub fn roles(item: &Value) -> String {
    item.get("roles")
        .and_then(Value::as_array)
        .map(|roles| {
            roles
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

pub fn message_sender(item: &Value) -> String {
    let user = lookup(item, &["from", "user"]);
    user.and_then(|u| u.get("displayName").and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .or_else(|| user.and_then(|u| u.get("id").and_then(Value::as_str)))
        .unwrap_or_default()
        .to_string()
}

/// Body content on one line, cut to 80 characters with `...`.
pub fn message_preview(item: &Value) -> String {
    let body = lookup(item, &["body", "content"])
        .and_then(Value::as_str)
        .unwrap_or_default();
    let flat = body.replace('\n', " ");
    if flat.chars().count() > PREVIEW_MAX_CHARS {
        let cut: String = flat.chars().take(PREVIEW_MAX_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

/// enabled + suspended + warning prepaid units.
pub fn sku_total(item: &Value) -> String {
    let total: i64 = ["enabled", "suspended", "warning"]
        .iter()
        .filter_map(|k| lookup(item, &["prepaidUnits", *k]).and_then(Value::as_i64))
        .sum();
    total.to_string()
}

fn is_read(item: &Value) -> String {
    item.get("isRead")
        .and_then(Value::as_bool)
        .unwrap_or(false)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grid_prepends_index() {
        let items = vec![
            json!({"id": "u1", "userPrincipalName": "a@contoso.com", "displayName": "A"}),
            json!({"id": "u2"}),
        ];
        let g = grid(USERS, &items);
        assert_eq!(g.headers, vec!["Index", "User ID", "UPN", "DisplayName"]);
        assert_eq!(g.rows[0], vec!["1", "u1", "a@contoso.com", "A"]);
        assert_eq!(g.rows[1], vec!["2", "u2", "", ""]);
    }

    #[test]
    fn test_drive_item_type() {
        assert_eq!(drive_item_type(&json!({"folder": {"childCount": 1}})), "folder");
        assert_eq!(drive_item_type(&json!({"file": {"mimeType": "text/plain"}})), "file");
        assert_eq!(drive_item_type(&json!({"package": {}})), "other");
    }

    #[test]
    fn test_channel_type() {
        assert_eq!(channel_type(&json!({"membershipType": "unknownFutureValue"})), "shared");
        assert_eq!(channel_type(&json!({"membershipType": "Private"})), "private");
        assert_eq!(channel_type(&json!({"membershipType": null})), "-");
        assert_eq!(channel_type(&json!({})), "-");
    }

    #[test]
    fn test_roles_joined() {
        assert_eq!(roles(&json!({"roles": ["owner", "guest"]})), "owner, guest");
        assert_eq!(roles(&json!({"roles": []})), "");
    }

    #[test]
    fn test_message_preview_truncates() {
        let long = "x".repeat(100);
        let preview = message_preview(&json!({"body": {"content": long}}));
        assert_eq!(preview.chars().count(), 80);
        assert!(preview.ends_with("..."));

        let short = message_preview(&json!({"body": {"content": "hi\nthere"}}));
        assert_eq!(short, "hi there");
        assert_eq!(message_preview(&json!({"body": null})), "");
    }

    #[test]
    fn test_message_sender_falls_back_to_id() {
        assert_eq!(
            message_sender(&json!({"from": {"user": {"displayName": "Ann", "id": "u1"}}})),
            "Ann"
        );
        assert_eq!(message_sender(&json!({"from": {"user": {"id": "u1"}}})), "u1");
        assert_eq!(message_sender(&json!({"from": null})), "");
    }

    #[test]
    fn test_sku_total_and_nested_paths() {
        let sku = json!({
            "skuId": "s1",
            "skuPartNumber": "ENTERPRISEPACK",
            "consumedUnits": 7,
            "prepaidUnits": {"enabled": 10, "suspended": 2, "warning": 1}
        });
        let g = grid(SKUS, &[sku]);
        assert_eq!(g.rows[0], vec!["1", "s1", "ENTERPRISEPACK", "7", "13"]);

        let mail = json!({"subject": "Hi", "from": {"emailAddress": {"address": "x@y.com"}}});
        let g = grid(MAIL, &[mail]);
        assert_eq!(g.rows[0], vec!["1", "Hi", "x@y.com", "", "false"]);
    }
}
