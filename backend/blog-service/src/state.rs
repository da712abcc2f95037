/// Service wiring shared by `main` and the integration tests
use crate::db::BlogStore;
use crate::error::AppError;
use crate::handlers::{self, HealthState};
use crate::services::{
    CommentService, IdentityProvider, IdentityVerifier, LikeService, PostService,
    SessionValidator,
};
use actix_web::web;
use chrono::Duration;
use crypto_core::JwtKeys;
use std::sync::Arc;

/// Every service the HTTP layer needs, built over one store
#[derive(Clone)]
pub struct AppServices {
    pub posts: web::Data<PostService>,
    pub comments: web::Data<CommentService>,
    pub likes: web::Data<LikeService>,
    pub sessions: web::Data<SessionValidator>,
    pub identity: web::Data<IdentityVerifier>,
    pub health: web::Data<HealthState>,
}

impl AppServices {
    pub fn new<S>(
        store: Arc<S>,
        provider: Arc<dyn IdentityProvider>,
        keys: Arc<JwtKeys>,
        session_ttl: Duration,
    ) -> Self
    where
        S: BlogStore + 'static,
    {
        Self {
            posts: web::Data::new(PostService::new(store.clone())),
            comments: web::Data::new(CommentService::new(store.clone())),
            likes: web::Data::new(LikeService::new(store.clone())),
            sessions: web::Data::new(SessionValidator::new(keys.clone(), store.clone())),
            identity: web::Data::new(IdentityVerifier::new(
                provider,
                store.clone(),
                keys,
                session_ttl,
            )),
            health: web::Data::new(HealthState::new(store)),
        }
    }

    /// Register app data and routes on an `App`
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.posts.clone())
            .app_data(self.comments.clone())
            .app_data(self.likes.clone())
            .app_data(self.sessions.clone())
            .app_data(self.identity.clone())
            .app_data(self.health.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(err.to_string()).into()
            }));

        handlers::configure(cfg);
    }
}
