/// Like toggle
///
/// Each (post, user) pair is either `NotLiked` or `Liked`. Liking and
/// unliking are idempotent; the returned state carries the count read in the
/// same atomic step as the write.
use crate::db::LikeRepository;
use crate::error::{AppError, Result};
use crate::models::{LikeState, LikeStatus, UserIdentity};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub struct LikeService {
    repo: Arc<dyn LikeRepository>,
}

impl LikeService {
    pub fn new(repo: Arc<dyn LikeRepository>) -> Self {
        Self { repo }
    }

    pub async fn status(&self, post_id: Uuid, user: &UserIdentity) -> Result<LikeStatus> {
        Ok(self.repo.is_liked(post_id, user.id).await?.into())
    }

    /// Derived from the like set; there is no separate counter
    pub async fn count(&self, post_id: Uuid) -> Result<i64> {
        self.repo.count_likes(post_id).await
    }

    /// Caller's status plus the current count, read one after the other
    pub async fn snapshot(&self, post_id: Uuid, user: &UserIdentity) -> Result<LikeState> {
        let liked = self.status(post_id, user).await?.is_liked();
        let like_count = self.count(post_id).await?;
        Ok(LikeState { liked, like_count })
    }

    pub async fn like(&self, post_id: Uuid, user: &UserIdentity) -> Result<LikeState> {
        let like_count = self
            .repo
            .insert_like(post_id, user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;

        debug!(%post_id, user_id = %user.id, like_count, "post liked");
        Ok(LikeState {
            liked: true,
            like_count,
        })
    }

    pub async fn unlike(&self, post_id: Uuid, user: &UserIdentity) -> Result<LikeState> {
        let like_count = self
            .repo
            .delete_like(post_id, user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;

        debug!(%post_id, user_id = %user.id, like_count, "post unliked");
        Ok(LikeState {
            liked: false,
            like_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, PostRepository, UserRepository};
    use crate::models::{ExternalProfile, NewPost};
    use crate::services::PostService;

    async fn user(store: &MemoryStore, subject: &str) -> UserIdentity {
        let (user, _) = store
            .upsert_user(&ExternalProfile {
                provider: "google".into(),
                subject: subject.into(),
                email: format!("{subject}@example.com"),
                name: subject.into(),
            })
            .await
            .unwrap();
        UserIdentity::from(&user)
    }

    async fn setup() -> (LikeService, Arc<MemoryStore>, Uuid, UserIdentity, UserIdentity) {
        let store = Arc::new(MemoryStore::new());
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;
        let post = store
            .insert_post(NewPost::new(&a, "Hello", "World").unwrap())
            .await
            .unwrap();
        (LikeService::new(store.clone()), store, post.id, a, b)
    }

    #[tokio::test]
    async fn test_like_is_idempotent() {
        let (likes, _, post_id, _, b) = setup().await;

        let once = likes.like(post_id, &b).await.unwrap();
        let twice = likes.like(post_id, &b).await.unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice, LikeState { liked: true, like_count: 1 });
        assert_eq!(likes.status(post_id, &b).await.unwrap(), LikeStatus::Liked);
    }

    #[tokio::test]
    async fn test_like_then_unlike_restores_count() {
        let (likes, _, post_id, a, b) = setup().await;
        likes.like(post_id, &a).await.unwrap();
        let before = likes.count(post_id).await.unwrap();

        likes.like(post_id, &b).await.unwrap();
        let after = likes.unlike(post_id, &b).await.unwrap();

        assert_eq!(after, LikeState { liked: false, like_count: before });
        assert_eq!(likes.status(post_id, &b).await.unwrap(), LikeStatus::NotLiked);

        // unliking again is a no-op
        assert_eq!(likes.unlike(post_id, &b).await.unwrap().like_count, before);
    }

    #[tokio::test]
    async fn test_count_matches_liked_set() {
        let (likes, store, post_id, a, b) = setup().await;
        let c = user(&store, "c").await;

        likes.like(post_id, &a).await.unwrap();
        likes.like(post_id, &c).await.unwrap();
        likes.like(post_id, &c).await.unwrap();

        let mut liked = 0;
        for u in [&a, &b, &c] {
            if likes.status(post_id, u).await.unwrap().is_liked() {
                liked += 1;
            }
        }
        assert_eq!(likes.count(post_id).await.unwrap(), liked);
        assert_eq!(likes.snapshot(post_id, &b).await.unwrap(), LikeState { liked: false, like_count: 2 });
    }

    #[tokio::test]
    async fn test_unknown_post() {
        let (likes, _, _, a, _) = setup().await;
        let missing = Uuid::new_v4();

        assert!(matches!(likes.like(missing, &a).await, Err(AppError::NotFound(_))));
        assert!(matches!(likes.unlike(missing, &a).await, Err(AppError::NotFound(_))));
        assert_eq!(likes.status(missing, &a).await.unwrap(), LikeStatus::NotLiked);
        assert_eq!(likes.count(missing).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_likes_from_one_user_count_once() {
        let (likes, _, post_id, _, b) = setup().await;
        let likes = Arc::new(likes);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let likes = likes.clone();
                let b = b.clone();
                tokio::spawn(async move { likes.like(post_id, &b).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(likes.count(post_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ownership_and_like_scenario() {
        let (likes, store, post_id, a, b) = setup().await;
        let posts = PostService::new(store.clone());
        let original = posts.get_post(post_id).await.unwrap();

        assert!(matches!(
            posts.update_post(post_id, &b, "Mine now", "x").await,
            Err(AppError::Forbidden(_))
        ));

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = posts
            .update_post(post_id, &a, "Hello", "World, edited")
            .await
            .unwrap();
        assert!(updated.updated_at > original.updated_at);

        assert_eq!(likes.like(post_id, &b).await.unwrap().like_count, 1);
        assert_eq!(likes.like(post_id, &b).await.unwrap().like_count, 1);
        assert_eq!(posts.get_post(post_id).await.unwrap().like_count, 1);
    }
}
