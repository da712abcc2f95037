/// In-process store used for tests and for running without PostgreSQL.
///
/// All state sits behind one `RwLock`, so every write (including the cascading
/// post delete and the like toggle plus its count) happens in a single
/// critical section.
use crate::db::traits::{
    CommentRepository, LikeRepository, PostRepository, StoreHealth, UserRepository,
};
use crate::error::Result;
use crate::models::{
    Comment, CommentView, ExternalProfile, NewComment, NewPost, Post, PostDraft, PostView, User,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    users_by_subject: HashMap<(String, String), Uuid>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    /// post_id -> users who like it
    likes: HashMap<Uuid, HashSet<Uuid>>,
}

impl MemoryState {
    fn author_name(&self, user_id: Uuid) -> String {
        self.users
            .get(&user_id)
            .map(|u| u.name.clone())
            .unwrap_or_default()
    }

    fn like_count(&self, post_id: Uuid) -> i64 {
        self.likes.get(&post_id).map_or(0, |set| set.len() as i64)
    }

    fn post_view(&self, post: &Post) -> PostView {
        PostView {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            author_id: post.author_id,
            author_name: self.author_name(post.author_id),
            like_count: self.like_count(post.id),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn upsert_user(&self, profile: &ExternalProfile) -> Result<(User, bool)> {
        let mut state = self.state.write().await;
        let key = (profile.provider.clone(), profile.subject.clone());
        let now = Utc::now();

        if let Some(user_id) = state.users_by_subject.get(&key).copied() {
            if let Some(user) = state.users.get_mut(&user_id) {
                user.name = profile.name.clone();
                user.email = profile.email.clone();
                user.updated_at = now;
                return Ok((user.clone(), false));
            }
        }

        let user = User {
            id: Uuid::new_v4(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            provider: profile.provider.clone(),
            provider_subject: profile.subject.clone(),
            created_at: now,
            updated_at: now,
        };
        state.users_by_subject.insert(key, user.id);
        state.users.insert(user.id, user.clone());

        Ok((user, true))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }
}

#[async_trait::async_trait]
impl PostRepository for MemoryStore {
    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let post = post.into_post();
        self.state.write().await.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self.state.read().await.posts.get(&post_id).cloned())
    }

    async fn find_post_view(&self, post_id: Uuid) -> Result<Option<PostView>> {
        let state = self.state.read().await;
        Ok(state.posts.get(&post_id).map(|post| state.post_view(post)))
    }

    async fn list_post_views(&self) -> Result<Vec<PostView>> {
        let state = self.state.read().await;
        let mut views: Vec<PostView> = state.posts.values().map(|p| state.post_view(p)).collect();
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(views)
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        draft: &PostDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        let mut state = self.state.write().await;
        match state.posts.get_mut(&post_id) {
            Some(post) if post.author_id == author_id => {
                post.title = draft.title.clone();
                post.content = draft.content.clone();
                post.updated_at = updated_at;
                Ok(Some(post.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let owned = state
            .posts
            .get(&post_id)
            .is_some_and(|post| post.author_id == author_id);
        if !owned {
            return Ok(false);
        }

        state.posts.remove(&post_id);
        state.comments.retain(|_, c| c.post_id != post_id);
        state.likes.remove(&post_id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl CommentRepository for MemoryStore {
    async fn insert_comment(&self, comment: NewComment) -> Result<Option<Comment>> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&comment.post_id) {
            return Ok(None);
        }

        let comment = comment.into_comment();
        state.comments.insert(comment.id, comment.clone());
        Ok(Some(comment))
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        Ok(self.state.read().await.comments.get(&comment_id).cloned())
    }

    async fn list_comment_views(&self, post_id: Uuid) -> Result<Option<Vec<CommentView>>> {
        let state = self.state.read().await;
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }

        let mut views: Vec<CommentView> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .map(|c| CommentView {
                id: c.id,
                post_id: c.post_id,
                author_id: c.author_id,
                author_name: state.author_name(c.author_id),
                content: c.content.clone(),
                created_at: c.created_at,
            })
            .collect();
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(Some(views))
    }

    async fn delete_comment(&self, comment_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let owned = state
            .comments
            .get(&comment_id)
            .is_some_and(|c| c.author_id == author_id);
        if owned {
            state.comments.remove(&comment_id);
        }
        Ok(owned)
    }
}

#[async_trait::async_trait]
impl LikeRepository for MemoryStore {
    async fn is_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self
            .state
            .read()
            .await
            .likes
            .get(&post_id)
            .is_some_and(|set| set.contains(&user_id)))
    }

    async fn count_likes(&self, post_id: Uuid) -> Result<i64> {
        Ok(self.state.read().await.like_count(post_id))
    }

    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }

        state.likes.entry(post_id).or_default().insert(user_id);
        Ok(Some(state.like_count(post_id)))
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }

        if let Some(set) = state.likes.get_mut(&post_id) {
            set.remove(&user_id);
            if set.is_empty() {
                state.likes.remove(&post_id);
            }
        }
        Ok(Some(state.like_count(post_id)))
    }
}

#[async_trait::async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
