use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;

use super::SqliteRepositories;
use super::util::{from_stored_timestamp, map_sqlx_error, to_stored_timestamp};

const POST_COLUMNS: &str = "id, slug, title, body_markdown, body_html, created_at";

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    slug: String,
    title: String,
    body_markdown: String,
    body_html: String,
    created_at: i64,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            body_markdown: row.body_markdown,
            body_html: row.body_html,
            created_at: from_stored_timestamp(row.created_at),
        }
    }
}

#[async_trait]
impl PostsRepo for SqliteRepositories {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn count_posts(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        count
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE slug = ?1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }
}

#[async_trait]
impl PostsWriteRepo for SqliteRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let CreatePostParams {
            slug,
            title,
            body_markdown,
            body_html,
        } = params;

        let now = to_stored_timestamp(OffsetDateTime::now_utc());
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "INSERT INTO posts (slug, title, body_markdown, body_html, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(slug)
        .bind(title)
        .bind(body_markdown)
        .bind(body_html)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(PostRecord::from(row))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let UpdatePostParams {
            id,
            slug,
            title,
            body_markdown,
            body_html,
        } = params;

        // id and slug must both match; a stale slug writes nothing
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts \
             SET title = ?3, body_markdown = ?4, body_html = ?5 \
             WHERE id = ?1 AND slug = ?2 \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(slug)
        .bind(title)
        .bind(body_markdown)
        .bind(body_html)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(PostRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
