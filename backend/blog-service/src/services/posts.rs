/// Post service - creation, retrieval, update and deletion of posts
///
/// Every mutation first looks the post up (missing posts are `NotFound`),
/// then asks the authorization rules, then validates the new fields.
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{check_ownership, Action};
use crate::models::{NewPost, Post, PostDraft, PostView, UserIdentity};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a post owned by `author`
    pub async fn create_post(
        &self,
        author: &UserIdentity,
        title: &str,
        content: &str,
    ) -> Result<Post> {
        let new_post = NewPost::new(author, title, content)?;
        let post = self.repo.insert_post(new_post).await?;

        info!(post_id = %post.id, author_id = %author.id, "post created");
        Ok(post)
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: Uuid) -> Result<PostView> {
        self.repo
            .find_post_view(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }

    /// All posts, newest first
    pub async fn list_posts(&self) -> Result<Vec<PostView>> {
        self.repo.list_post_views().await
    }

    /// Replace title and content of a post owned by `caller`
    pub async fn update_post(
        &self,
        post_id: Uuid,
        caller: &UserIdentity,
        title: &str,
        content: &str,
    ) -> Result<Post> {
        let existing = self.find_existing(post_id).await?;
        check_ownership(caller, existing.author_id, Action::Update, "post")?;
        let draft = PostDraft::new(title, content)?;

        // Ownership is re-checked by the conditional write; a post deleted in
        // the meantime is reported as missing.
        let post = self
            .repo
            .update_post(post_id, caller.id, &draft, Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;

        info!(%post_id, "post updated");
        Ok(post)
    }

    /// Delete a post owned by `caller` together with its comments and likes
    pub async fn delete_post(&self, post_id: Uuid, caller: &UserIdentity) -> Result<()> {
        let existing = self.find_existing(post_id).await?;
        check_ownership(caller, existing.author_id, Action::Delete, "post")?;

        if !self.repo.delete_post(post_id, caller.id).await? {
            return Err(AppError::not_found("Post"));
        }

        info!(%post_id, "post deleted");
        Ok(())
    }

    async fn find_existing(&self, post_id: Uuid) -> Result<Post> {
        self.repo
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }
}
