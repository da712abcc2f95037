/// Data models for blog-service
///
/// This module defines structures for:
/// - User: identities created from a verified external credential
/// - Post: articles written by a user
/// - Comment: immutable replies attached to a post
/// - Like: the (post, user) relation and its toggle state
pub mod comment;
pub mod like;
pub mod post;
pub mod user;

pub use comment::{Comment, CommentView, NewComment};
pub use like::{LikeState, LikeStatus};
pub use post::{NewPost, Post, PostDraft, PostView};
pub use user::{ExternalProfile, User, UserIdentity};
