//! In-memory StoryStore for integration tests
//!
//! Mirrors the Postgres store's contract without a database: the store assigns
//! ids and strictly increasing creation times, listings are newest first, and
//! writes are scoped by owner. Store failures can be switched on to exercise
//! error rendering.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use story_service::db::StoryStore;
use story_service::error::{AppError, Result};
use story_service::models::{
    NewStory, Story, StoryChanges, StoryFilter, StoryWithOwner, UserSummary,
};
use uuid::Uuid;

#[derive(Default)]
struct State {
    stories: Vec<Story>,
    users: HashMap<Uuid, UserSummary>,
    last_created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Default)]
pub struct InMemoryStoryStore {
    state: Arc<Mutex<State>>,
    failing: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user record so listings can join its summary.
    pub fn add_user(&self, display_name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().users.insert(
            id,
            UserSummary {
                id,
                display_name: display_name.to_string(),
                first_name: None,
                last_name: None,
                image: None,
            },
        );
        id
    }

    /// Make every subsequent store call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful inserts, updates and deletes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw stored record, bypassing access checks.
    pub fn snapshot(&self, story_id: Uuid) -> Option<Story> {
        self.state
            .lock()
            .unwrap()
            .stories
            .iter()
            .find(|s| s.id == story_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().stories.len()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::DatabaseError("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn join(state: &State, story: &Story) -> StoryWithOwner {
        StoryWithOwner {
            story: story.clone(),
            owner: state.users.get(&story.user_id).cloned(),
        }
    }
}

#[async_trait]
impl StoryStore for InMemoryStoryStore {
    async fn insert(&self, owner: Uuid, story: &NewStory) -> Result<Story> {
        self.check()?;
        let mut state = self.state.lock().unwrap();

        let mut created_at = Utc::now();
        if let Some(last) = state.last_created_at {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }
        state.last_created_at = Some(created_at);

        let stored = Story {
            id: Uuid::new_v4(),
            user_id: owner,
            title: story.title.clone(),
            body: story.body.clone(),
            status: story.status_or_default(),
            created_at,
        };
        state.stories.push(stored.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    async fn find_by_id(&self, story_id: Uuid) -> Result<Option<Story>> {
        self.check()?;
        Ok(self.snapshot(story_id))
    }

    async fn find_with_owner(&self, story_id: Uuid) -> Result<Option<StoryWithOwner>> {
        self.check()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .stories
            .iter()
            .find(|s| s.id == story_id)
            .map(|s| Self::join(&state, s)))
    }

    async fn list(&self, filter: &StoryFilter) -> Result<Vec<StoryWithOwner>> {
        self.check()?;
        let state = self.state.lock().unwrap();
        let mut matching: Vec<StoryWithOwner> = state
            .stories
            .iter()
            .filter(|s| filter.matches(s))
            .map(|s| Self::join(&state, s))
            .collect();
        matching.sort_by(|a, b| b.story.created_at.cmp(&a.story.created_at));
        Ok(matching)
    }

    async fn update(
        &self,
        story_id: Uuid,
        owner: Uuid,
        changes: &StoryChanges,
    ) -> Result<Option<Story>> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let Some(story) = state
            .stories
            .iter_mut()
            .find(|s| s.id == story_id && s.user_id == owner)
        else {
            return Ok(None);
        };
        changes.apply_to(story);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(story.clone()))
    }

    async fn delete(&self, story_id: Uuid, owner: Uuid) -> Result<bool> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let before = state.stories.len();
        state
            .stories
            .retain(|s| !(s.id == story_id && s.user_id == owner));
        let deleted = state.stories.len() < before;
        if deleted {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> Result<()> {
        self.check()
    }
}
