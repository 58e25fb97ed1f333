//! Notification kind enumeration.

use serde::{Deserialize, Serialize};

/// Category of the event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A new podcast was published.
    NewPodcast,
    /// Someone liked the user's comment on a podcast.
    CommentLikePodcast,
    /// Someone liked the user's comment on an element.
    CommentLikeElement,
}

/// The entity a notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    /// A podcast, by id.
    Podcast(i64),
    /// A periodic table element, by id.
    Element(i64),
}

impl NotificationKind {
    /// Return the kind as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewPodcast => "NEW_PODCAST",
            Self::CommentLikePodcast => "COMMENT_LIKE_PODCAST",
            Self::CommentLikeElement => "COMMENT_LIKE_ELEMENT",
        }
    }

    /// Resolve the related id into the subject entity for this kind.
    pub fn subject(&self, related_id: i64) -> Subject {
        match self {
            Self::NewPodcast | Self::CommentLikePodcast => Subject::Podcast(related_id),
            Self::CommentLikeElement => Subject::Element(related_id),
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Podcast(id) => write!(f, "podcast/{id}"),
            Self::Element(id) => write!(f, "element/{id}"),
        }
    }
}
