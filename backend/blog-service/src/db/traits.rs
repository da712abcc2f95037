use crate::error::Result;
use crate::models::{
    Comment, CommentView, ExternalProfile, NewComment, NewPost, Post, PostDraft, PostView, User,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User records keyed by id and by (provider, provider subject).
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the user on first sign-in, otherwise refresh its display fields.
    /// Returns the stored user and whether it was just created.
    async fn upsert_user(&self, profile: &ExternalProfile) -> Result<(User, bool)>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>>;
}

/// Post documents.
#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert_post(&self, post: NewPost) -> Result<Post>;

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    async fn find_post_view(&self, post_id: Uuid) -> Result<Option<PostView>>;

    /// Every post, newest first
    async fn list_post_views(&self) -> Result<Vec<PostView>>;

    /// Overwrite title and content. Applies only while the post still exists
    /// and still belongs to `author_id`; `None` otherwise.
    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        draft: &PostDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>>;

    /// Delete the post together with its comments and likes in one atomic
    /// step. Returns false when no post `post_id` owned by `author_id` exists.
    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool>;
}

/// Comment documents scoped to a post.
#[async_trait::async_trait]
pub trait CommentRepository: Send + Sync {
    /// `None` when the target post does not exist
    async fn insert_comment(&self, comment: NewComment) -> Result<Option<Comment>>;

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    /// Comments of a post, newest first. `None` when the post does not exist.
    async fn list_comment_views(&self, post_id: Uuid) -> Result<Option<Vec<CommentView>>>;

    async fn delete_comment(&self, comment_id: Uuid, author_id: Uuid) -> Result<bool>;
}

/// The like set of each post, keyed by (post_id, user_id).
///
/// Counts are always derived from the set. Writes return the count read in
/// the same atomic step, or `None` when the post does not exist.
#[async_trait::async_trait]
pub trait LikeRepository: Send + Sync {
    async fn is_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool>;

    async fn count_likes(&self, post_id: Uuid) -> Result<i64>;

    /// Idempotent: liking twice leaves one entry
    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<i64>>;

    /// Idempotent: removing a missing entry is not an error
    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<i64>>;
}

#[async_trait::async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<()>;
}

/// Everything the service needs from a backing store
pub trait BlogStore:
    UserRepository + PostRepository + CommentRepository + LikeRepository + StoreHealth
{
}

impl<T> BlogStore for T where
    T: UserRepository + PostRepository + CommentRepository + LikeRepository + StoreHealth
{
}
