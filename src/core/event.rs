use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event source CloudTrail stamps on its own API calls.
pub const CLOUDTRAIL_EVENT_SOURCE: &str = "cloudtrail.amazonaws.com";

/// EventBridge notification wrapping a CloudTrail API call record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        rename = "detail-type",
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub detail_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "object_or_default")]
    pub detail: ChangeDetail,
    /// Remaining envelope fields, not interpreted.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// CloudTrail record carried in the notification `detail`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetail {
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_source: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChangeEvent {
    /// Builds a minimal event, mostly for tests and tooling.
    pub fn new(event_source: impl Into<String>, event_name: impl Into<String>) -> Self {
        Self {
            detail: ChangeDetail {
                event_source: Some(event_source.into()),
                event_name: Some(event_name.into()),
                extra: Map::new(),
            },
            ..Self::default()
        }
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn event_source(&self) -> Option<&str> {
        self.detail.event_source.as_deref()
    }

    pub fn event_name(&self) -> Option<&str> {
        self.detail.event_name.as_deref()
    }

    pub fn is_cloudtrail(&self) -> bool {
        self.event_source() == Some(CLOUDTRAIL_EVENT_SOURCE)
    }

    /// Envelope timestamp, when present and RFC3339.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.time
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Non-string values read as absent so a malformed field never rejects the
/// whole event.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => Ok(Some(value)),
        _ => Ok(None),
    }
}

/// A `detail` that is null or not an object reads as empty.
fn object_or_default<'de, D>(deserializer: D) -> Result<ChangeDetail, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => Ok(serde_json::from_value(value).unwrap_or_default()),
        _ => Ok(ChangeDetail::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_eventbridge_notification() {
        let raw = r#"{
            "version": "0",
            "id": "6a7e8feb-b491-4cf7-a9f1-bf3703467718",
            "detail-type": "AWS API Call via CloudTrail",
            "source": "aws.cloudtrail",
            "account": "123456789012",
            "time": "2024-03-01T12:00:00Z",
            "region": "us-east-1",
            "detail": {
                "eventSource": "cloudtrail.amazonaws.com",
                "eventName": "StopLogging",
                "requestParameters": {"name": "org-trail"}
            }
        }"#;

        let event = ChangeEvent::from_json(raw).expect("event");
        assert!(event.is_cloudtrail());
        assert_eq!(event.event_name(), Some("StopLogging"));
        assert_eq!(event.detail_type.as_deref(), Some("AWS API Call via CloudTrail"));
        assert_eq!(event.extra.get("account"), Some(&Value::from("123456789012")));
        assert!(event.detail.extra.contains_key("requestParameters"));
        assert_eq!(
            event.occurred_at(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn missing_or_null_detail_is_empty() {
        let event = ChangeEvent::from_json(r#"{"detail": null, "time": "yesterday"}"#)
            .expect("event");
        assert_eq!(event.event_source(), None);
        assert_eq!(event.event_name(), None);
        assert!(!event.is_cloudtrail());
        assert_eq!(event.occurred_at(), None);

        let event = ChangeEvent::from_json("{}").expect("event");
        assert_eq!(event.event_source(), None);
    }

    #[test]
    fn non_string_fields_read_as_absent() {
        let event = ChangeEvent::from_json(
            r#"{"time": 17, "detail": {"eventSource": 123, "eventName": "StopLogging"}}"#,
        )
        .expect("event");
        assert_eq!(event.event_source(), None);
        assert_eq!(event.event_name(), Some("StopLogging"));
        assert!(!event.is_cloudtrail());
        assert_eq!(event.time, None);

        let event = ChangeEvent::from_json(
            r#"{"detail": {"eventSource": "cloudtrail.amazonaws.com", "eventName": 5}}"#,
        )
        .expect("event");
        assert!(event.is_cloudtrail());
        assert_eq!(event.event_name(), None);

        let event = ChangeEvent::from_json(r#"{"detail": "StopLogging"}"#).expect("event");
        assert_eq!(event.event_source(), None);
        assert_eq!(event.event_name(), None);
    }
}
