/// Comment service - comments are created and deleted, never edited
use crate::db::CommentRepository;
use crate::error::{AppError, Result};
use crate::middleware::permissions::{check_ownership, Action};
use crate::models::{Comment, CommentView, NewComment, UserIdentity};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    /// Add a comment to an existing post
    pub async fn create_comment(
        &self,
        post_id: Uuid,
        author: &UserIdentity,
        content: &str,
    ) -> Result<Comment> {
        let new_comment = NewComment::new(author, post_id, content)?;
        let comment = self
            .repo
            .insert_comment(new_comment)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;

        info!(comment_id = %comment.id, %post_id, "comment created");
        Ok(comment)
    }

    /// Comments of a post, newest first
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<CommentView>> {
        self.repo
            .list_comment_views(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }

    pub async fn delete_comment(&self, comment_id: Uuid, caller: &UserIdentity) -> Result<()> {
        let comment = self
            .repo
            .find_comment(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))?;
        check_ownership(caller, comment.author_id, Action::Delete, "comment")?;

        if !self.repo.delete_comment(comment_id, caller.id).await? {
            return Err(AppError::not_found("Comment"));
        }

        info!(%comment_id, "comment deleted");
        Ok(())
    }
}
