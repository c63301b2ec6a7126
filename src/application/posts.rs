//! Post lifecycle service: list, view, create, edit, delete.
//!
//! Each operation issues exactly one persistence call; there is no shared
//! in-process state between requests, so concurrent writes are serialized
//! entirely by the database.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::render::{RenderError, RenderService};
use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::PostRecord;
use crate::domain::slug::{SlugError, derive_slug};

#[derive(Debug, Error)]
pub enum PostError {
    #[error("post not found")]
    NotFound,
    #[error("a post with slug `{slug}` already exists")]
    SlugTaken { slug: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Repo(RepoError),
}

impl PostError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<RepoError> for PostError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound,
            other => Self::Repo(other),
        }
    }
}

impl From<SlugError> for PostError {
    fn from(err: SlugError) -> Self {
        match err {
            SlugError::EmptyInput => Self::validation("title must not be empty"),
            SlugError::Unrepresentable { input } => Self::validation(format!(
                "title `{input}` cannot be turned into a URL slug"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreatePostCommand {
    pub title: String,
    pub body_markdown: String,
}

/// The submitted slug acts as an optimistic match against the stored row;
/// the post is addressed by `id` AND `slug` jointly.
#[derive(Debug, Clone)]
pub struct UpdatePostCommand {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub body_markdown: String,
}

#[derive(Clone)]
pub struct PostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    renderer: Arc<dyn RenderService>,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        renderer: Arc<dyn RenderService>,
    ) -> Self {
        Self {
            reader,
            writer,
            renderer,
        }
    }

    /// All posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<PostRecord>, PostError> {
        Ok(self.reader.list_posts().await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<PostRecord, PostError> {
        self.reader
            .find_by_slug(slug)
            .await?
            .ok_or(PostError::NotFound)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<PostRecord, PostError> {
        self.reader.find_by_id(id).await?.ok_or(PostError::NotFound)
    }

    /// Derive the slug from the title, render the body, and persist the new
    /// post. The slug is fixed at this point and never re-derived on edit.
    pub async fn create_post(&self, command: CreatePostCommand) -> Result<PostRecord, PostError> {
        let title = command.title.trim().to_string();
        if title.is_empty() {
            return Err(PostError::validation("title must not be empty"));
        }

        let slug = derive_slug(&title)?;
        let body_html = self.renderer.render_body(&command.body_markdown)?;

        let created = self
            .writer
            .create_post(CreatePostParams {
                slug: slug.clone(),
                title,
                body_markdown: command.body_markdown,
                body_html,
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => PostError::SlugTaken { slug },
                other => other.into(),
            })?;

        info!(
            target = "breve::posts",
            id = created.id,
            slug = %created.slug,
            "created post"
        );
        Ok(created)
    }

    /// Re-render the body and persist the new title/body/html. The update is
    /// keyed by id and slug together; a mismatch means the caller acted on a
    /// stale reference and nothing is written.
    pub async fn edit_post(&self, command: UpdatePostCommand) -> Result<PostRecord, PostError> {
        let title = command.title.trim().to_string();
        if title.is_empty() {
            return Err(PostError::validation("title must not be empty"));
        }

        let body_html = self.renderer.render_body(&command.body_markdown)?;

        let updated = self
            .writer
            .update_post(UpdatePostParams {
                id: command.id,
                slug: command.slug,
                title,
                body_markdown: command.body_markdown,
                body_html,
            })
            .await?;

        info!(
            target = "breve::posts",
            id = updated.id,
            slug = %updated.slug,
            "updated post"
        );
        Ok(updated)
    }

    /// Permanently remove the post, returning the deleted id as confirmation.
    pub async fn delete_post(&self, id: i64) -> Result<i64, PostError> {
        self.writer.delete_post(id).await?;
        info!(target = "breve::posts", id, "deleted post");
        Ok(id)
    }
}
