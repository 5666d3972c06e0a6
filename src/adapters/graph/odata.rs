//! OData body and path helpers shared by the Graph use cases.

use crate::domain::{DomainError, MemberRole};
use serde_json::{Value, json};

/// Bind URLs always reference v1.0, even when requests go to beta.
pub const GRAPH_V1_ROOT: &str = "https://graph.microsoft.com/v1.0";

const CONVERSATION_MEMBER_TYPE: &str = "#microsoft.graph.aadUserConversationMember";

/// Extract the `value` array of a collection response.
///
/// A bare array is returned as-is; anything else yields an empty list.
pub fn collection(value: Value) -> Vec<Value> {
    match value {
        Value::Object(mut map) => match map.remove("value") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// `https://graph.microsoft.com/v1.0/users('{upn}')` for `@odata.bind` properties.
pub fn user_bind(upn: &str) -> String {
    format!("{GRAPH_V1_ROOT}/users('{upn}')")
}

/// `{"@odata.id": ".../users/{id}"}` for `$ref` endpoints (owners, members).
pub fn directory_ref(user_id: &str) -> Value {
    json!({ "@odata.id": format!("{GRAPH_V1_ROOT}/users/{user_id}") })
}

/// Body for adding a user to a team, channel or chat.
pub fn conversation_member(upn: &str, role: MemberRole) -> Value {
    let roles: Vec<&str> = match role {
        MemberRole::Owner => vec!["owner"],
        MemberRole::Member => vec![],
    };
    json!({
        "@odata.type": CONVERSATION_MEMBER_TYPE,
        "roles": roles,
        "user@odata.bind": user_bind(upn),
    })
}

/// Escape a string literal for use inside an OData function call: `'` becomes `''`.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Percent-encode each segment of a drive-relative path, dropping empty segments.
pub fn encode_drive_path(remote_path: &str) -> String {
    remote_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// String field of a JSON object; `""` when absent or null, compact JSON for non-strings.
pub fn str_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Trimmed UPN; blank input is rejected before any member lookup.
pub fn require_upn(upn: &str) -> Result<&str, DomainError> {
    let trimmed = upn.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput(
            "user UPN/email must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Find the membership id of the member whose `email` equals `upn` (case-insensitive).
///
/// Members without an email (bots, some guests) never match.
pub fn find_membership_id(members: &[Value], upn: &str) -> Option<String> {
    let wanted = upn.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    members
        .iter()
        .find(|m| {
            let email = str_field(m, "email");
            !email.is_empty() && email.to_lowercase() == wanted
        })
        .map(|m| str_field(m, "id"))
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_extracts_value_array() {
        let items = collection(json!({"@odata.context": "x", "value": [{"id": "1"}, {"id": "2"}]}));
        assert_eq!(items.len(), 2);
        assert!(collection(json!({"id": "single"})).is_empty());
        assert_eq!(collection(json!([1, 2, 3])).len(), 3);
        assert!(collection(Value::Null).is_empty());
    }

    #[test]
    fn test_conversation_member_roles() {
        let owner = conversation_member("a@contoso.com", MemberRole::Owner);
        assert_eq!(owner["roles"], json!(["owner"]));
        assert_eq!(owner["@odata.type"], CONVERSATION_MEMBER_TYPE);
        assert_eq!(
            owner["user@odata.bind"],
            "https://graph.microsoft.com/v1.0/users('a@contoso.com')"
        );
        let member = conversation_member("a@contoso.com", MemberRole::Member);
        assert_eq!(member["roles"], json!([]));
    }

    #[test]
    fn test_directory_ref() {
        assert_eq!(
            directory_ref("oid-1"),
            json!({"@odata.id": "https://graph.microsoft.com/v1.0/users/oid-1"})
        );
    }

    #[test]
    fn test_escape_and_encode() {
        assert_eq!(escape_literal("O'Brien report"), "O''Brien report");
        assert_eq!(encode_drive_path("/Reports/Q1 plan.docx"), "Reports/Q1%20plan.docx");
        assert_eq!(encode_drive_path("a//b/"), "a/b");
    }

    #[test]
    fn test_find_membership_id_is_case_insensitive() {
        let members = vec![
            json!({"id": "m1", "email": "Alice@Contoso.com"}),
            json!({"id": "m2", "email": null}),
            json!({"id": "m3", "email": "bob@contoso.com"}),
        ];
        assert_eq!(find_membership_id(&members, "alice@contoso.com"), Some("m1".into()));
        assert_eq!(find_membership_id(&members, "BOB@contoso.com"), Some("m3".into()));
        assert_eq!(find_membership_id(&members, "carol@contoso.com"), None);
        assert_eq!(find_membership_id(&members, ""), None);
        assert_eq!(find_membership_id(&members, "   "), None);
    }

    #[test]
    fn test_require_upn() {
        assert_eq!(require_upn(" a@contoso.com ").unwrap(), "a@contoso.com");
        assert!(matches!(require_upn(" \t"), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn test_str_field() {
        let v = json!({"a": "x", "b": null, "c": 3});
        assert_eq!(str_field(&v, "a"), "x");
        assert_eq!(str_field(&v, "b"), "");
        assert_eq!(str_field(&v, "c"), "3");
        assert_eq!(str_field(&v, "missing"), "");
    }
}
