//! Content catalogue models: sermons, media, audio messages and testimonies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Sermon,
    Media,
    AudioMessage,
    Testimony,
}

impl ContentKind {
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Sermon,
        ContentKind::Media,
        ContentKind::AudioMessage,
        ContentKind::Testimony,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Sermon => "sermon",
            ContentKind::Media => "media",
            ContentKind::AudioMessage => "audio_message",
            ContentKind::Testimony => "testimony",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ContentKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == needle)
            .ok_or_else(|| format!("Unknown content kind: {}", s))
    }
}

/// Counters bumped by read-side endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCounter {
    Views,
    Plays,
    Downloads,
}

impl ContentCounter {
    pub fn column(&self) -> &'static str {
        match self {
            ContentCounter::Views => "views",
            ContentCounter::Plays => "plays",
            ContentCounter::Downloads => "downloads",
        }
    }
}

/// A stored content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: Uuid,
    pub kind: ContentKind,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub media_url: Option<String>,
    pub views: i64,
    pub plays: i64,
    pub downloads: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn from_new(new: CreateContentRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: new.kind,
            title: new.title.trim().to_string(),
            author: trimmed(new.author),
            description: trimmed(new.description),
            media_url: trimmed(new.media_url),
            views: 0,
            plays: 0,
            downloads: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds one to the given counter.
    pub fn bump(&mut self, counter: ContentCounter, now: DateTime<Utc>) {
        match counter {
            ContentCounter::Views => self.views += 1,
            ContentCounter::Plays => self.plays += 1,
            ContentCounter::Downloads => self.downloads += 1,
        }
        self.updated_at = now;
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Request payload for creating a content item.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    pub kind: ContentKind,

    #[validate(length(min = 2, max = 200, message = "Title must be 2-200 characters"))]
    pub title: String,

    #[validate(length(max = 100, message = "Author must be at most 100 characters"))]
    pub author: Option<String>,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(url(message = "Invalid media URL format"))]
    pub media_url: Option<String>,
}
