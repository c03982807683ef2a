/// Story handlers - HTTP endpoints for story operations
use crate::error::{AppError, Result};
use crate::handlers::views::{
    View, ADD_STORY, DASHBOARD, DASHBOARD_PATH, STORIES_PATH, STORY_EDIT, STORY_INDEX, STORY_SHOW,
};
use crate::middleware::UserId;
use crate::models::{NewStory, StoryChanges, StoryWithOwner};
use crate::services::{StoryAccess, StoryAccessController};
use actix_web::{web, Either, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Form posts and JSON bodies are both accepted.
pub type Payload<T> = Either<web::Json<T>, web::Form<T>>;

fn payload<T>(body: Payload<T>) -> T {
    match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    }
}

/// How listing endpoints render store failures.
#[derive(Debug, Clone, Copy)]
pub struct ListingErrorPolicy {
    /// Render ListByUser/Search store failures as 404 instead of 500.
    pub list_errors_as_not_found: bool,
}

impl Default for ListingErrorPolicy {
    fn default() -> Self {
        Self {
            list_errors_as_not_found: true,
        }
    }
}

impl ListingErrorPolicy {
    fn render(&self, result: Result<Vec<StoryWithOwner>>) -> Result<HttpResponse> {
        match result {
            Ok(stories) => Ok(View::render(STORY_INDEX, json!({ "stories": stories }))),
            Err(err) if err.is_store_failure() && self.list_errors_as_not_found => {
                Ok(View::not_found())
            }
            Err(err) => Err(err),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// Show the create form
pub async fn add_story_form(_user_id: UserId) -> HttpResponse {
    View::render(ADD_STORY, View::add_form_context())
}

/// Create a new story owned by the caller
pub async fn create_story(
    controller: web::Data<StoryAccessController>,
    user_id: UserId,
    req: Payload<NewStory>,
) -> Result<HttpResponse> {
    controller.create(user_id.0, payload(req)).await?;
    Ok(View::redirect(DASHBOARD_PATH))
}

/// List all public stories
pub async fn list_public_stories(
    controller: web::Data<StoryAccessController>,
    _user_id: UserId,
) -> Result<HttpResponse> {
    let stories = controller.list_public().await?;
    Ok(View::render(STORY_INDEX, json!({ "stories": stories })))
}

/// Get a single story
pub async fn get_story(
    controller: web::Data<StoryAccessController>,
    story_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    match controller.get(user_id.0, *story_id).await? {
        StoryAccess::Allowed(story) => Ok(View::render(STORY_SHOW, json!({ "story": story }))),
        StoryAccess::NotFound | StoryAccess::ForbiddenRedirect => Ok(View::not_found()),
    }
}

/// Show the edit form to the story owner
pub async fn edit_story_form(
    controller: web::Data<StoryAccessController>,
    story_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    match controller.edit_form(user_id.0, *story_id).await? {
        StoryAccess::Allowed(story) => Ok(View::render(STORY_EDIT, json!({ "story": story }))),
        StoryAccess::NotFound => Ok(View::not_found()),
        StoryAccess::ForbiddenRedirect => Ok(View::redirect(STORIES_PATH)),
    }
}

/// Update a story
pub async fn update_story(
    controller: web::Data<StoryAccessController>,
    story_id: web::Path<Uuid>,
    user_id: UserId,
    req: Payload<StoryChanges>,
) -> Result<HttpResponse> {
    match controller
        .update(user_id.0, *story_id, payload(req))
        .await?
    {
        StoryAccess::Allowed(_) => Ok(View::redirect(DASHBOARD_PATH)),
        StoryAccess::NotFound => Ok(View::not_found()),
        StoryAccess::ForbiddenRedirect => Ok(View::redirect(STORIES_PATH)),
    }
}

/// Delete a story
pub async fn delete_story(
    controller: web::Data<StoryAccessController>,
    story_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    match controller.delete(user_id.0, *story_id).await? {
        StoryAccess::Allowed(()) => Ok(View::redirect(DASHBOARD_PATH)),
        StoryAccess::NotFound => Ok(View::not_found()),
        StoryAccess::ForbiddenRedirect => Ok(View::redirect(STORIES_PATH)),
    }
}

/// List a user's public stories
pub async fn get_user_stories(
    controller: web::Data<StoryAccessController>,
    policy: web::Data<ListingErrorPolicy>,
    owner_id: web::Path<Uuid>,
    user_id: UserId,
) -> Result<HttpResponse> {
    policy.render(controller.list_by_user(user_id.0, *owner_id).await)
}

/// Search public stories by title.
///
/// The `query` query-string parameter wins over the path segment.
pub async fn search_stories(
    controller: web::Data<StoryAccessController>,
    policy: web::Data<ListingErrorPolicy>,
    path: Option<web::Path<String>>,
    params: web::Query<SearchParams>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let query = params
        .into_inner()
        .query
        .or_else(|| path.map(|p| p.into_inner()))
        .ok_or_else(|| AppError::BadRequest("missing search query".into()))?;

    policy.render(controller.search(user_id.0, &query).await)
}

/// The caller's own stories, private ones included
pub async fn dashboard(
    controller: web::Data<StoryAccessController>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let stories = controller.list_own(user_id.0).await?;
    Ok(View::render(
        DASHBOARD,
        json!({ "user_id": user_id.0, "stories": stories }),
    ))
}
