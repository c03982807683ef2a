use std::sync::Arc;

use uuid::Uuid;

use crate::db::StoryStore;
use crate::error::Result;
use crate::metrics;
use crate::models::{NewStory, Story, StoryChanges, StoryFilter, StoryWithOwner};

/// Outcome of an ownership or visibility check.
///
/// `NotFound` and `ForbiddenRedirect` are rendered differently: reads of a
/// private story hide its existence, while edits of a foreign story send the
/// caller back to the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryAccess<T> {
    Allowed(T),
    NotFound,
    ForbiddenRedirect,
}

impl<T> StoryAccess<T> {
    pub fn outcome(&self) -> &'static str {
        match self {
            StoryAccess::Allowed(_) => "allowed",
            StoryAccess::NotFound => "not_found",
            StoryAccess::ForbiddenRedirect => "redirect",
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, StoryAccess::Allowed(_))
    }

    pub fn allowed(self) -> Option<T> {
        match self {
            StoryAccess::Allowed(value) => Some(value),
            _ => None,
        }
    }
}

/// Ownership- and visibility-checked operations over stories.
///
/// The principal is always passed in explicitly; the controller holds no
/// per-request state.
#[derive(Clone)]
pub struct StoryAccessController {
    store: Arc<dyn StoryStore>,
}

impl StoryAccessController {
    pub fn new(store: Arc<dyn StoryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn StoryStore> {
        &self.store
    }

    /// Create a story owned by `principal`.
    pub async fn create(&self, principal: Uuid, fields: NewStory) -> Result<Story> {
        let fields = fields.normalize()?;
        let story = observe("create", self.store.insert(principal, &fields).await)?;
        metrics::record_decision("create", "allowed");
        tracing::info!(story_id = %story.id, user_id = %principal, status = %story.status, "story created");
        Ok(story)
    }

    /// All public stories, newest first.
    pub async fn list_public(&self) -> Result<Vec<StoryWithOwner>> {
        self.list("list_public", StoryFilter::public()).await
    }

    /// Public stories of `target`. Private stories are excluded even when the
    /// principal is the target.
    pub async fn list_by_user(
        &self,
        _principal: Uuid,
        target: Uuid,
    ) -> Result<Vec<StoryWithOwner>> {
        self.list("list_by_user", StoryFilter::public_by_owner(target))
            .await
    }

    /// Public stories whose title contains `query`, ignoring case. Whitespace
    /// in `query` is part of the match.
    pub async fn search(&self, _principal: Uuid, query: &str) -> Result<Vec<StoryWithOwner>> {
        self.list("search", StoryFilter::public_title_search(query))
            .await
    }

    /// The principal's own stories of any status.
    pub async fn list_own(&self, principal: Uuid) -> Result<Vec<StoryWithOwner>> {
        self.list("list_own", StoryFilter::owned_by(principal)).await
    }

    pub async fn get(
        &self,
        principal: Uuid,
        story_id: Uuid,
    ) -> Result<StoryAccess<StoryWithOwner>> {
        let access = match observe("get", self.store.find_with_owner(story_id).await)? {
            None => StoryAccess::NotFound,
            Some(found) if found.story.is_private() && !found.story.is_owned_by(principal) => {
                StoryAccess::NotFound
            }
            Some(found) => StoryAccess::Allowed(found),
        };
        Ok(decide("get", principal, story_id, access))
    }

    /// Load a story for its owner's edit form.
    pub async fn edit_form(&self, principal: Uuid, story_id: Uuid) -> Result<StoryAccess<Story>> {
        let access = self.owned("edit_form", principal, story_id).await?;
        Ok(decide("edit_form", principal, story_id, access))
    }

    pub async fn update(
        &self,
        principal: Uuid,
        story_id: Uuid,
        changes: StoryChanges,
    ) -> Result<StoryAccess<Story>> {
        let access = match self.owned("update", principal, story_id).await? {
            StoryAccess::Allowed(current) => {
                let changes = changes.normalize()?;
                if changes.is_empty() {
                    StoryAccess::Allowed(current)
                } else {
                    match observe(
                        "update",
                        self.store.update(story_id, principal, &changes).await,
                    )? {
                        Some(updated) => StoryAccess::Allowed(updated),
                        None => StoryAccess::NotFound,
                    }
                }
            }
            StoryAccess::NotFound => StoryAccess::NotFound,
            StoryAccess::ForbiddenRedirect => StoryAccess::ForbiddenRedirect,
        };
        Ok(decide("update", principal, story_id, access))
    }

    pub async fn delete(&self, principal: Uuid, story_id: Uuid) -> Result<StoryAccess<()>> {
        let access = match self.owned("delete", principal, story_id).await? {
            StoryAccess::Allowed(_) => {
                if observe("delete", self.store.delete(story_id, principal).await)? {
                    StoryAccess::Allowed(())
                } else {
                    StoryAccess::NotFound
                }
            }
            StoryAccess::NotFound => StoryAccess::NotFound,
            StoryAccess::ForbiddenRedirect => StoryAccess::ForbiddenRedirect,
        };
        Ok(decide("delete", principal, story_id, access))
    }

    /// Fetch a story and require that `principal` owns it, whatever its status.
    async fn owned(
        &self,
        operation: &'static str,
        principal: Uuid,
        story_id: Uuid,
    ) -> Result<StoryAccess<Story>> {
        Ok(
            match observe(operation, self.store.find_by_id(story_id).await)? {
                None => StoryAccess::NotFound,
                Some(story) if !story.is_owned_by(principal) => StoryAccess::ForbiddenRedirect,
                Some(story) => StoryAccess::Allowed(story),
            },
        )
    }

    async fn list(
        &self,
        operation: &'static str,
        filter: StoryFilter,
    ) -> Result<Vec<StoryWithOwner>> {
        let stories = observe(operation, self.store.list(&filter).await)?;
        metrics::record_decision(operation, "allowed");
        tracing::debug!(operation, count = stories.len(), "stories listed");
        Ok(stories)
    }
}

/// Log and count store failures; other errors pass through untouched.
fn observe<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        if err.is_store_failure() {
            tracing::error!(operation, error = %err, "story store operation failed");
            metrics::record_store_failure(operation);
        }
    }
    result
}

fn decide<T>(
    operation: &'static str,
    principal: Uuid,
    story_id: Uuid,
    access: StoryAccess<T>,
) -> StoryAccess<T> {
    metrics::record_decision(operation, access.outcome());
    if !access.is_allowed() {
        tracing::info!(
            operation,
            %story_id,
            user_id = %principal,
            outcome = access.outcome(),
            "story access denied"
        );
    }
    access
}
