/// Story store access layer
///
/// The access controller only talks to the [`StoryStore`] trait. Consistency
/// between a read and the write that follows it is the store's concern; the
/// Postgres implementation scopes every write by owner as well as by id.
use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewStory, Story, StoryChanges, StoryFilter, StoryWithOwner};

pub mod story_repo;

pub use story_repo::{like_pattern, PgStoryStore};

#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Insert a story owned by `owner`. The store assigns id and creation time.
    async fn insert(&self, owner: Uuid, story: &NewStory) -> Result<Story>;

    /// Fetch a story without joining its owner.
    async fn find_by_id(&self, story_id: Uuid) -> Result<Option<Story>>;

    /// Fetch a story joined with its owner's summary.
    async fn find_with_owner(&self, story_id: Uuid) -> Result<Option<StoryWithOwner>>;

    /// List stories matching `filter`, newest first.
    async fn list(&self, filter: &StoryFilter) -> Result<Vec<StoryWithOwner>>;

    /// Apply `changes` to the story if it exists and belongs to `owner`.
    async fn update(
        &self,
        story_id: Uuid,
        owner: Uuid,
        changes: &StoryChanges,
    ) -> Result<Option<Story>>;

    /// Permanently remove the story if it exists and belongs to `owner`.
    async fn delete(&self, story_id: Uuid, owner: Uuid) -> Result<bool>;

    /// Cheap round trip used by readiness probes.
    async fn health_check(&self) -> Result<()>;
}
