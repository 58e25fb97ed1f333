//! Notification record model.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use inboxhub_core::types::NotificationId;

use super::kind::{NotificationKind, Subject};

/// A single notification as delivered by fetch or push.
///
/// Immutable once created except for `read`, the only field the store
/// ever mutates locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Opaque identifier, stable across fetch and push.
    pub id: NotificationId,
    /// Event category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Display text, opaque to the store.
    pub message: String,
    /// Id of the podcast or element the event is about.
    pub related_id: i64,
    /// Creation time, used for display only. Timestamps without an offset
    /// are read as UTC.
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
    /// Read status.
    pub read: bool,
}

impl NotificationRecord {
    /// Create an unread record created now.
    pub fn new(
        id: impl Into<NotificationId>,
        kind: NotificationKind,
        message: impl Into<String>,
        related_id: i64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            message: message.into(),
            related_id,
            created_at: Utc::now(),
            read: false,
        }
    }

    /// Builder-style read flag.
    pub fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Check if the notification is unread.
    pub fn is_unread(&self) -> bool {
        !self.read
    }

    /// The entity this notification points at.
    pub fn subject(&self) -> Subject {
        self.kind.subject(self.related_id)
    }
}

/// Deserialize a timestamp as RFC 3339, a naive date-time or a bare date.
fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: String = Deserialize::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid createdAt timestamp '{raw}'"))
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
