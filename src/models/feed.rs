//! Feed items and the records they reference.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Create a new location
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A member of the social network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server-side identifier
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    /// Where the user lives
    #[serde(default)]
    pub living_location: Option<Location>,
}

impl User {
    /// Create a user with only an identifier
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// "First Last", skipping missing parts
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A single item of a user's feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    /// Server-side identifier
    pub id: String,

    /// Text body
    #[serde(default)]
    pub message: Option<String>,

    /// Author of the item
    #[serde(default)]
    pub owner: Option<User>,

    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub likes_total: u32,

    #[serde(default)]
    pub comments_total: u32,
}

impl Feed {
    /// Create a feed item with an id and a message
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: Some(message.into()),
            owner: None,
            created_date: None,
            likes_total: 0,
            comments_total: 0,
        }
    }

    /// Set the owner
    pub fn owner(mut self, owner: User) -> Self {
        self.owner = Some(owner);
        self
    }
}

/// Who may see a wall post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Friend,
    Private,
}

/// Payload for publishing on a wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPost {
    pub message: String,

    #[serde(default)]
    pub visibility: Visibility,

    /// Hashtags attached to the post
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl FeedPost {
    /// Create a public post with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            visibility: Visibility::default(),
            tags: Vec::new(),
        }
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Attach a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}
