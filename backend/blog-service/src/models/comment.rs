use crate::error::Result;
use crate::models::UserIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Stored comment. Comments are never edited.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment that has not been stored yet; the author comes from the caller's identity
#[derive(Debug, Clone, Validate)]
pub struct NewComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    #[validate(
        length(min = 1, max = 2000),
        custom(function = "crate::validators::validate_not_blank")
    )]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    pub fn new(author: &UserIdentity, post_id: Uuid, content: &str) -> Result<Self> {
        let comment = Self {
            id: Uuid::new_v4(),
            post_id,
            author_id: author.id,
            content: content.trim().to_string(),
            created_at: Utc::now(),
        };
        comment.validate()?;
        Ok(comment)
    }

    pub fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            post_id: self.post_id,
            author_id: self.author_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_new_comment_validation() {
        let author = UserIdentity {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
        };
        let post_id = Uuid::new_v4();

        let comment = NewComment::new(&author, post_id, " nice post ").unwrap();
        assert_eq!(comment.author_id, author.id);
        assert_eq!(comment.content, "nice post");

        assert!(matches!(
            NewComment::new(&author, post_id, "  "),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            NewComment::new(&author, post_id, &"x".repeat(2001)),
            Err(AppError::Validation(_))
        ));
    }
}
