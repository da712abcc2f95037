/// PostgreSQL-backed store
///
/// Writes that touch more than one row (cascading post delete, like toggle
/// plus count) run inside a transaction that first locks the post row.
use crate::db::traits::{
    CommentRepository, LikeRepository, PostRepository, StoreHealth, UserRepository,
};
use crate::error::Result;
use crate::models::{
    Comment, CommentView, ExternalProfile, NewComment, NewPost, Post, PostDraft, PostView, User,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.author_id,
           u.name AS author_name,
           (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS like_count,
           p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

#[derive(FromRow)]
struct UpsertedUser {
    #[sqlx(flatten)]
    user: User,
    inserted: bool,
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl UserRepository for PgStore {
    async fn upsert_user(&self, profile: &ExternalProfile) -> Result<(User, bool)> {
        // xmax = 0 only for rows created by this statement
        let row = sqlx::query_as::<_, UpsertedUser>(
            r#"
            INSERT INTO users (id, name, email, provider, provider_subject)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (provider, provider_subject) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                updated_at = NOW()
            RETURNING id, name, email, provider, provider_subject, created_at, updated_at,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.provider)
        .bind(&profile.subject)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.user, row.inserted))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, provider, provider_subject, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait::async_trait]
impl PostRepository for PgStore {
    async fn insert_post(&self, post: NewPost) -> Result<Post> {
        let post = post.into_post();
        let stored = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (id, title, content, author_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, author_id, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_post_view(&self, post_id: Uuid) -> Result<Option<PostView>> {
        let view = sqlx::query_as::<_, PostView>(&format!("{POST_VIEW_SELECT} WHERE p.id = $1"))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(view)
    }

    async fn list_post_views(&self) -> Result<Vec<PostView>> {
        let views = sqlx::query_as::<_, PostView>(&format!(
            "{POST_VIEW_SELECT} ORDER BY p.created_at DESC, p.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(views)
    }

    async fn update_post(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        draft: &PostDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $1, content = $2, updated_at = $3
            WHERE id = $4 AND author_id = $5
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(updated_at)
        .bind(post_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM posts WHERE id = $1 AND author_id = $2 FOR UPDATE",
        )
        .bind(post_id)
        .bind(author_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        // Post, comments and likes disappear together
        tx.commit().await?;

        Ok(true)
    }
}

#[async_trait::async_trait]
impl CommentRepository for PgStore {
    async fn insert_comment(&self, comment: NewComment) -> Result<Option<Comment>> {
        let result = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, post_id, author_id, content, created_at)
            SELECT $1, $2, $3, $4, $5
            WHERE EXISTS (SELECT 1 FROM posts WHERE id = $2)
            RETURNING id, post_id, author_id, content, created_at
            "#,
        )
        .bind(comment.id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(comment) => Ok(comment),
            // post deleted between the EXISTS check and the FK check
            Err(err) if is_foreign_key_violation(&err) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, author_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn list_comment_views(&self, post_id: Uuid) -> Result<Option<Vec<CommentView>>> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;

        if !exists {
            tx.rollback().await?;
            return Ok(None);
        }

        let comments = sqlx::query_as::<_, CommentView>(
            r#"
            SELECT c.id, c.post_id, c.author_id, u.name AS author_name, c.content, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(comments))
    }

    async fn delete_comment(&self, comment_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND author_id = $2")
            .bind(comment_id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl PgStore {
    /// Lock the post row for the rest of the transaction. Blocks a concurrent
    /// cascading delete until the like write commits.
    async fn lock_post(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        post_id: Uuid,
    ) -> Result<bool> {
        let found: Option<Uuid> = sqlx::query_scalar("SELECT id FROM posts WHERE id = $1 FOR SHARE")
            .bind(post_id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(found.is_some())
    }

    async fn count_likes_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        post_id: Uuid,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&mut **tx)
            .await?;

        Ok(count)
    }
}

#[async_trait::async_trait]
impl LikeRepository for PgStore {
    async fn is_liked(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM post_likes
                WHERE post_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_likes(&self, post_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn insert_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        if !Self::lock_post(&mut tx, post_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let count = Self::count_likes_in(&mut tx, post_id).await?;
        tx.commit().await?;

        Ok(Some(count))
    }

    async fn delete_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        if !Self::lock_post(&mut tx, post_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let count = Self::count_likes_in(&mut tx, post_id).await?;
        tx.commit().await?;

        Ok(Some(count))
    }
}

#[async_trait::async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
