use serde::{Deserialize, Serialize};

/// Toggle state of one (post, user) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeStatus {
    NotLiked,
    Liked,
}

impl LikeStatus {
    pub fn is_liked(self) -> bool {
        matches!(self, LikeStatus::Liked)
    }
}

impl From<bool> for LikeStatus {
    fn from(liked: bool) -> Self {
        if liked {
            LikeStatus::Liked
        } else {
            LikeStatus::NotLiked
        }
    }
}

/// The caller's like state together with the post's like count
///
/// After `like`/`unlike` the count is read in the same atomic step as the
/// write, so a caller always sees its own toggle. A plain read (`snapshot`)
/// takes the two values separately and may straddle a concurrent toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

impl LikeState {
    pub fn status(&self) -> LikeStatus {
        LikeStatus::from(self.liked)
    }
}
