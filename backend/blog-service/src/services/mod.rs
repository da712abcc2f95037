/// Business logic layer for blog-service
///
/// - Session: bearer token to caller identity
/// - Identity: external credential to user and session token
/// - Posts, comments and likes over the repository traits
pub mod comments;
pub mod identity;
pub mod likes;
pub mod posts;
pub mod session;

pub use comments::CommentService;
pub use identity::{
    GoogleIdentityProvider, IdentityProvider, IdentityVerifier, SignIn,
    DEFAULT_GOOGLE_TOKENINFO_URL,
};
pub use likes::LikeService;
pub use posts::PostService;
pub use session::{parse_bearer, SessionValidator};
