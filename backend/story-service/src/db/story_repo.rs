use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::StoryStore;
use crate::error::{AppError, Result};
use crate::models::{
    NewStory, Story, StoryChanges, StoryFilter, StoryStatus, StoryWithOwner, UserSummary,
};

const STORY_COLUMNS: &str = "id, user_id, title, body, status, created_at";

const JOINED_SELECT: &str = r#"
    SELECT s.id, s.user_id, s.title, s.body, s.status, s.created_at,
           u.id AS owner_id, u.display_name AS owner_display_name,
           u.first_name AS owner_first_name, u.last_name AS owner_last_name,
           u.image AS owner_image
    FROM stories s
    LEFT JOIN users u ON u.id = s.user_id
"#;

/// Escape `%`, `_` and `\` so the query matches as a literal substring under
/// `ILIKE ... ESCAPE '\'`.
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Postgres-backed story store
#[derive(Clone)]
pub struct PgStoryStore {
    pool: PgPool,
}

impl PgStoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_story(row: &PgRow) -> Result<Story> {
        let status: String = row.try_get("status")?;
        Ok(Story {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            status: StoryStatus::try_from(status.as_str()).map_err(|_| {
                AppError::DatabaseError(format!("unexpected story status '{}'", status))
            })?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_story_with_owner(row: &PgRow) -> Result<StoryWithOwner> {
        let story = Self::row_to_story(row)?;
        let owner_id: Option<Uuid> = row.try_get("owner_id")?;
        let owner = match owner_id {
            Some(id) => Some(UserSummary {
                id,
                display_name: row.try_get("owner_display_name")?,
                first_name: row.try_get("owner_first_name")?,
                last_name: row.try_get("owner_last_name")?,
                image: row.try_get("owner_image")?,
            }),
            None => None,
        };
        Ok(StoryWithOwner { story, owner })
    }
}

#[async_trait]
impl StoryStore for PgStoryStore {
    async fn insert(&self, owner: Uuid, story: &NewStory) -> Result<Story> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO stories (user_id, title, body, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(owner)
        .bind(&story.title)
        .bind(&story.body)
        .bind(story.status_or_default().as_str())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_story(&row)
    }

    async fn find_by_id(&self, story_id: Uuid) -> Result<Option<Story>> {
        let row = sqlx::query(&format!(
            "SELECT {STORY_COLUMNS} FROM stories WHERE id = $1"
        ))
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_story).transpose()
    }

    async fn find_with_owner(&self, story_id: Uuid) -> Result<Option<StoryWithOwner>> {
        let row = sqlx::query(&format!("{JOINED_SELECT} WHERE s.id = $1"))
            .bind(story_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_story_with_owner).transpose()
    }

    async fn list(&self, filter: &StoryFilter) -> Result<Vec<StoryWithOwner>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(JOINED_SELECT);
        qb.push(" WHERE TRUE");
        if let Some(owner) = filter.owner {
            qb.push(" AND s.user_id = ").push_bind(owner);
        }
        if let Some(status) = filter.status {
            qb.push(" AND s.status = ").push_bind(status.as_str());
        }
        if let Some(query) = &filter.title_contains {
            qb.push(" AND s.title ILIKE ")
                .push_bind(like_pattern(query))
                .push(r" ESCAPE '\'");
        }
        qb.push(" ORDER BY s.created_at DESC, s.id DESC");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_story_with_owner).collect()
    }

    async fn update(
        &self,
        story_id: Uuid,
        owner: Uuid,
        changes: &StoryChanges,
    ) -> Result<Option<Story>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE stories
            SET title = COALESCE($1, title),
                body = COALESCE($2, body),
                status = COALESCE($3, status)
            WHERE id = $4 AND user_id = $5
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(changes.title.as_deref())
        .bind(changes.body.as_deref())
        .bind(changes.status.map(|s| s.as_str()))
        .bind(story_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_story).transpose()
    }

    async fn delete(&self, story_id: Uuid, owner: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM stories WHERE id = $1 AND user_id = $2"#)
            .bind(story_id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
