//! Domain entities. Pure data structures for the core business.
//!
//! Graph resources themselves stay opaque `serde_json::Value`s; only the
//! locally owned inputs and request shapes are typed here.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Seconds before expiry at which a cached token is treated as stale.
pub const TOKEN_EXPIRY_SKEW_SECS: i64 = 60;

/// Client-credentials triple. Input only, never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Bearer token with its absolute expiry.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_in_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at: now + Duration::seconds(expires_in_secs),
        }
    }

    /// True while more than the skew window remains before expiry.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > Duration::seconds(TOKEN_EXPIRY_SKEW_SECS)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PATCH" => Ok(HttpMethod::Patch),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(DomainError::InvalidInput(format!(
                "unsupported HTTP method {other:?} (expected GET, POST, PATCH, PUT or DELETE)"
            ))),
        }
    }
}

/// One call against Graph: verb, path (relative to the base URL, or absolute),
/// query pairs and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl GraphRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(HttpMethod::Post, path).json(body)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Convenience for the ubiquitous `$top` parameter.
    pub fn top(self, top: u32) -> Self {
        self.query("$top", top)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a query parameter, if present.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(DomainError::InvalidInput(format!(
                        "unknown {} {:?} (expected one of: {})",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }
    };
}

string_enum!(
    /// Role of a conversation member (team, channel or chat).
    MemberRole { Member => "member", Owner => "owner" }
);

string_enum!(
    /// Teams channel membership type.
    ChannelType { Standard => "standard", Private => "private", Shared => "shared" }
);

string_enum!(
    /// Sharing link kind for drive items.
    LinkType { View => "view", Edit => "edit", Embed => "embed" }
);

string_enum!(
    /// Sharing link audience.
    LinkScope { Organization => "organization", Anonymous => "anonymous" }
);

impl ChannelType {
    /// Private and shared channels must be created with exactly one owner.
    pub fn requires_owner(&self) -> bool {
        matches!(self, ChannelType::Private | ChannelType::Shared)
    }
}

/// Which drive a drive operation addresses: a user's OneDrive or a SharePoint site library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveTarget {
    User(String),
    Site(String),
}

impl DriveTarget {
    /// Path of the drive resource, e.g. `/users/{upn}/drive`.
    pub fn drive_path(&self) -> String {
        match self {
            DriveTarget::User(user) => format!("/users/{user}/drive"),
            DriveTarget::Site(site) => format!("/sites/{site}/drive"),
        }
    }
}

impl fmt::Display for DriveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriveTarget::User(user) => write!(f, "OneDrive of {user}"),
            DriveTarget::Site(site) => write!(f, "site {site}"),
        }
    }
}

/// Plain-text mail to send on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub subject: String,
    pub body: String,
    pub to: Vec<String>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Calendar event to create. Also the shape of the `quick-create` JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventDraft {
    pub user: String,
    pub subject: String,
    pub body: String,
    pub start: String,
    pub end: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default, rename = "to")]
    pub attendees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedItem {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub name: String,
    pub error: String,
}

/// Outcome of copying a drive root into another drive root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CloneReport {
    pub copied: Vec<CopiedItem>,
    pub skipped: Vec<SkippedItem>,
    pub failed: Vec<FailedItem>,
}
