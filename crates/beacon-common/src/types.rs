use chrono::{DateTime, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Title assigned when a notification is sent without one.
pub const DEFAULT_TITLE: &str = "New Notification";
/// Body assigned when a notification is sent without one.
pub const DEFAULT_BODY: &str = "You have a new message.";

/// How the client should surface a notification.
///
/// # Examples
///
/// ```
/// use beacon_common::types::NotificationKind;
///
/// let kind: NotificationKind = "scheduled".parse().unwrap();
/// assert_eq!(kind, NotificationKind::Scheduled);
/// assert_eq!(kind.to_string(), "scheduled");
/// assert_eq!(NotificationKind::default(), NotificationKind::Local);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Shown immediately by the client.
    #[default]
    Local,
    /// Fired by the client at `time`.
    Scheduled,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Local => write!(f, "local"),
            NotificationKind::Scheduled => write!(f, "scheduled"),
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(NotificationKind::Local),
            "scheduled" => Ok(NotificationKind::Scheduled),
            _ => Err(format!("unknown notification type: {s}")),
        }
    }
}

/// A stored notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotificationRecord {
    /// Server-assigned identifier, never changes. Numeric ids in older
    /// documents are read as their decimal string.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    /// Set once the client has displayed the notification
    #[serde(default)]
    pub notified: bool,
    /// When a scheduled notification should fire
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    /// Creation time, server-assigned
    pub timestamp: DateTime<Utc>,
}

/// Body of a send request. Every field is optional and falls back to a default.
///
/// `id` and `timestamp` have no field here, so client-supplied values are
/// dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct NotificationInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<NotificationKind>,
    /// RFC 3339 timestamp; an empty string is treated as absent
    #[serde(default, deserialize_with = "deserialize_optional_time")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub time: Option<DateTime<Utc>>,
}

impl NotificationInput {
    /// Builds the record the send operation stores.
    pub fn into_record(self, id: String, timestamp: DateTime<Utc>) -> NotificationRecord {
        NotificationRecord {
            id,
            title: non_empty_or(self.title, DEFAULT_TITLE),
            body: non_empty_or(self.body, DEFAULT_BODY),
            kind: self.kind.unwrap_or_default(),
            notified: true,
            time: self.time,
            timestamp,
        }
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback.to_string(),
    }
}

/// Partial update. Absent fields are left untouched.
///
/// `time` distinguishes "absent" (`None`) from "set to null" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct NotificationPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<NotificationKind>,
    #[serde(default)]
    pub notified: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_time_patch")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub time: Option<Option<DateTime<Utc>>>,
}

impl NotificationPatch {
    pub fn mark_read() -> Self {
        Self {
            notified: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.kind.is_none()
            && self.notified.is_none()
            && self.time.is_none()
    }

    /// Shallow-assigns the present fields onto `record`. `id` and `timestamp`
    /// are never touched.
    pub fn apply(&self, record: &mut NotificationRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(body) = &self.body {
            record.body = body.clone();
        }
        if let Some(kind) = self.kind {
            record.kind = kind;
        }
        if let Some(notified) = self.notified {
            record.notified = notified;
        }
        if let Some(time) = self.time {
            record.time = time;
        }
    }
}

/// Per-type record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TypeBreakdown {
    pub local: usize,
    pub scheduled: usize,
}

/// Summary of the current record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    pub total: usize,
    pub notified: usize,
    pub unnotified: usize,
    pub by_type: TypeBreakdown,
}

fn parse_time<E: DeError>(text: &str) -> Result<Option<DateTime<Utc>>, E> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(text)
        .map(|t| Some(t.with_timezone(&Utc)))
        .map_err(|e| E::custom(format!("invalid time '{text}': {e}")))
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(id) => Ok(id),
        RawId::Number(id) => Ok(id.to_string()),
    }
}

fn deserialize_optional_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) => parse_time(&text),
    }
}

fn deserialize_time_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_time(deserializer).map(Some)
}
