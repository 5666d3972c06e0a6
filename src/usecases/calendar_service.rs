//! Calendar events: listing and creation, including from a single JSON document.

use crate::adapters::graph::odata;
use crate::domain::{DomainError, EventDraft};
use crate::ports::GraphPort;
use chrono::NaiveDateTime;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_EVENTS_TOP: u32 = 20;

/// Accepted local date-time layouts, e.g. `2025-12-11T10:00:00`, `2025-12-11T10:00`
/// or Graph's own `2025-12-11T10:00:00.0000000`.
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_local(label: &str, value: &str) -> Result<NaiveDateTime, DomainError> {
    let trimmed = value.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "{label} {value:?} is not an ISO date-time like 2025-12-11T10:00:00"
            ))
        })
}

/// Both bounds must parse and `end` must come after `start`.
pub fn validate_window(start: &str, end: &str) -> Result<(), DomainError> {
    let start_at = parse_local("start", start)?;
    let end_at = parse_local("end", end)?;
    if end_at <= start_at {
        return Err(DomainError::InvalidInput(format!(
            "end {end} must be after start {start}"
        )));
    }
    Ok(())
}

pub struct CalendarService {
    graph: Arc<dyn GraphPort>,
}

impl CalendarService {
    pub fn new(graph: Arc<dyn GraphPort>) -> Self {
        Self { graph }
    }

    pub async fn list_events(&self, user: &str, top: u32) -> Result<Vec<Value>, DomainError> {
        let result = self
            .graph
            .get_with(
                &format!("/users/{user}/events"),
                &[
                    ("$top", top.to_string()),
                    ("$orderby", "start/dateTime DESC".to_string()),
                    ("$select", "id,subject,start,end,location,organizer".to_string()),
                ],
            )
            .await?;
        Ok(odata::collection(result))
    }

    pub async fn create_event(&self, draft: &EventDraft) -> Result<Value, DomainError> {
        validate_window(&draft.start, &draft.end)?;
        let event = json!({
            "subject": draft.subject,
            "body": {
                "contentType": "Text",
                "content": draft.body,
            },
            "start": {
                "dateTime": draft.start.trim(),
                "timeZone": draft.timezone,
            },
            "end": {
                "dateTime": draft.end.trim(),
                "timeZone": draft.timezone,
            },
            "attendees": draft
                .attendees
                .iter()
                .map(|address| json!({
                    "emailAddress": {"address": address},
                    "type": "required",
                }))
                .collect::<Vec<_>>(),
        });
        let created = self
            .graph
            .post(&format!("/users/{}/events", draft.user), event)
            .await?;
        info!(
            user = %draft.user,
            event_id = %odata::str_field(&created, "id"),
            attendees = draft.attendees.len(),
            "created event"
        );
        Ok(created)
    }

    /// Create from one JSON document with `user, subject, body, start, end`
    /// and optional `timezone`, `to`.
    pub async fn quick_create(&self, payload: &str) -> Result<Value, DomainError> {
        let draft: EventDraft = serde_json::from_str(payload)
            .map_err(|e| DomainError::InvalidInput(format!("event JSON: {}", e)))?;
        self.create_event(&draft).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::graph::RecordingGraph;

    fn draft(start: &str, end: &str) -> EventDraft {
        EventDraft {
            user: "a@contoso.com".into(),
            subject: "Sync".into(),
            body: "Agenda".into(),
            start: start.into(),
            end: end.into(),
            timezone: "UTC".into(),
            attendees: vec!["b@contoso.com".into()],
        }
    }

    #[test]
    fn test_validate_window() {
        assert!(validate_window("2025-12-11T10:00:00", "2025-12-11T11:00:00").is_ok());
        assert!(validate_window("2025-12-11T10:00", "2025-12-11T10:30").is_ok());
        assert!(validate_window("2025-12-11T10:00:00.000", "2025-12-11T11:00:00.000").is_ok());
        assert!(validate_window("2025-12-11T10:00:00.0000000", "2025-12-11T10:00:00.5").is_ok());
        assert!(validate_window("2025-12-11T10:00:00.500", "2025-12-11T10:00:00.500").is_err());
        assert!(validate_window("2025-12-11T10:00:00", "2025-12-11T10:00:00").is_err());
        assert!(validate_window("tomorrow", "2025-12-11T10:00:00").is_err());
    }

    #[tokio::test]
    async fn test_list_events_query() {
        let graph = Arc::new(RecordingGraph::new());
        CalendarService::new(graph.clone())
            .list_events("a@contoso.com", DEFAULT_EVENTS_TOP)
            .await
            .unwrap();

        let req = &graph.requests()[0];
        assert_eq!(req.path, "/users/a@contoso.com/events");
        assert_eq!(req.query_value("$orderby"), Some("start/dateTime DESC"));
        assert_eq!(
            req.query_value("$select"),
            Some("id,subject,start,end,location,organizer")
        );
    }

    #[tokio::test]
    async fn test_create_event_body() {
        let graph = Arc::new(RecordingGraph::new().respond(json!({"id": "ev-1"})));
        CalendarService::new(graph.clone())
            .create_event(&draft("2025-12-11T10:00:00", "2025-12-11T11:00:00"))
            .await
            .unwrap();

        let body = graph.requests()[0].body.clone().unwrap();
        assert_eq!(body["start"], json!({"dateTime": "2025-12-11T10:00:00", "timeZone": "UTC"}));
        assert_eq!(body["attendees"][0]["type"], "required");
        assert_eq!(body["attendees"][0]["emailAddress"]["address"], "b@contoso.com");
    }

    #[tokio::test]
    async fn test_create_event_rejects_inverted_window() {
        let graph = Arc::new(RecordingGraph::new());
        let err = CalendarService::new(graph.clone())
            .create_event(&draft("2025-12-11T11:00:00", "2025-12-11T10:00:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(graph.requests().is_empty());
    }

    #[tokio::test]
    async fn test_quick_create_from_json() {
        let graph = Arc::new(RecordingGraph::new().respond(json!({"id": "ev-2"})));
        let payload = r#"{
            "user": "a@contoso.com",
            "subject": "Standup",
            "body": "Daily",
            "start": "2025-12-11T09:00:00",
            "end": "2025-12-11T09:15:00",
            "timezone": "Europe/Berlin",
            "to": ["b@contoso.com", "c@contoso.com"]
        }"#;
        let out = CalendarService::new(graph.clone())
            .quick_create(payload)
            .await
            .unwrap();

        assert_eq!(out["id"], "ev-2");
        let body = graph.requests()[0].body.clone().unwrap();
        assert_eq!(body["end"]["timeZone"], "Europe/Berlin");
        assert_eq!(body["attendees"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_quick_create_missing_key() {
        let graph = Arc::new(RecordingGraph::new());
        let err = CalendarService::new(graph)
            .quick_create(r#"{"user": "a@contoso.com", "subject": "x"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.contains("event JSON")));
    }
}
