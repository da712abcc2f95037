use crate::error::Result;
use crate::models::UserIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Stored post
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post as rendered in listings: author name and live like count included
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated title and content, used for both create and update
///
/// The title is trimmed. The body is stored exactly as sent; surrounding
/// whitespace only counts when deciding whether it is blank.
#[derive(Debug, Clone, Validate, PartialEq)]
pub struct PostDraft {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validators::validate_not_blank")
    )]
    pub title: String,
    #[validate(
        length(min = 1, max = 50000),
        custom(function = "crate::validators::validate_not_blank")
    )]
    pub content: String,
}

impl PostDraft {
    pub fn new(title: &str, content: &str) -> Result<Self> {
        let draft = Self {
            title: title.trim().to_string(),
            content: content.to_string(),
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// A post that has not been stored yet
///
/// The author can only come from a resolved [`UserIdentity`]; request
/// payloads have no way to name one.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub draft: PostDraft,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(author: &UserIdentity, title: &str, content: &str) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            author_id: author.id,
            draft: PostDraft::new(title, content)?,
            created_at: Utc::now(),
        })
    }

    pub fn into_post(self) -> Post {
        Post {
            id: self.id,
            title: self.draft.title,
            content: self.draft.content,
            author_id: self.author_id,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}
