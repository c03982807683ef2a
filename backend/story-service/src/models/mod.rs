/// Data models for story-service
///
/// - Story: a user-authored post with public/private visibility
/// - UserSummary: the slice of the author's user record joined into views
/// - NewStory / StoryChanges: create and update payloads (neither carries an owner)
/// - StoryFilter: listing criteria handed to the store
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    #[default]
    Public,
    Private,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Public => "public",
            StoryStatus::Private => "private",
        }
    }
}

impl TryFrom<&str> for StoryStatus {
    type Error = AppError;
    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s {
            "public" => Ok(StoryStatus::Public),
            "private" => Ok(StoryStatus::Private),
            other => Err(AppError::ValidationError(format!(
                "invalid story status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub id: Uuid,
    /// Owning user. Written once by the store on insert.
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub status: StoryStatus,
    pub created_at: DateTime<Utc>,
}

impl Story {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn is_private(&self) -> bool {
        self.status == StoryStatus::Private
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
}

/// A story joined with its author's summary.
///
/// `owner` is `None` when the user record no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryWithOwner {
    #[serde(flatten)]
    pub story: Story,
    pub owner: Option<UserSummary>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStory {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 50000, message = "body is required"))]
    pub body: String,
    #[serde(default)]
    pub status: Option<StoryStatus>,
}

impl NewStory {
    /// Trims the title and validates the payload.
    pub fn normalize(mut self) -> crate::error::Result<Self> {
        self.title = self.title.trim().to_string();
        self.validate()?;
        Ok(self)
    }

    pub fn status_or_default(&self) -> StoryStatus {
        self.status.unwrap_or_default()
    }
}

/// Fields an owner may change. Ownership is fixed at creation, so there is no owner field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StoryChanges {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 50000, message = "body must not be empty"))]
    pub body: Option<String>,
    pub status: Option<StoryStatus>,
}

impl StoryChanges {
    pub fn normalize(mut self) -> crate::error::Result<Self> {
        self.title = self.title.map(|t| t.trim().to_string());
        self.validate()?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.status.is_none()
    }

    /// Applies the changes to an in-memory copy of a story.
    pub fn apply_to(&self, story: &mut Story) {
        if let Some(title) = &self.title {
            story.title = title.clone();
        }
        if let Some(body) = &self.body {
            story.body = body.clone();
        }
        if let Some(status) = self.status {
            story.status = status;
        }
    }
}

/// Listing criteria. Results are always ordered by `created_at` descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryFilter {
    pub owner: Option<Uuid>,
    pub status: Option<StoryStatus>,
    /// Case-insensitive literal substring of the title.
    pub title_contains: Option<String>,
}

impl StoryFilter {
    pub fn public() -> Self {
        Self {
            status: Some(StoryStatus::Public),
            ..Self::default()
        }
    }

    pub fn public_by_owner(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            status: Some(StoryStatus::Public),
            ..Self::default()
        }
    }

    pub fn owned_by(owner: Uuid) -> Self {
        Self {
            owner: Some(owner),
            ..Self::default()
        }
    }

    pub fn public_title_search(query: &str) -> Self {
        Self {
            status: Some(StoryStatus::Public),
            title_contains: Some(query.to_string()),
            ..Self::default()
        }
    }

    /// Evaluates the filter against a single story.
    pub fn matches(&self, story: &Story) -> bool {
        if let Some(owner) = self.owner {
            if story.user_id != owner {
                return false;
            }
        }
        if let Some(status) = self.status {
            if story.status != status {
                return false;
            }
        }
        match &self.title_contains {
            Some(needle) => story
                .title
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
