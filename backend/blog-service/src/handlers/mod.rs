/// HTTP handlers for blog endpoints
///
/// - Auth: Google sign-in and the current user
/// - Posts: list, read, create, update, delete
/// - Comments: list, create, delete
/// - Likes: status, like, unlike
pub mod auth;
pub mod comments;
pub mod health;
pub mod likes;
pub mod posts;

pub use health::HealthState;

use crate::middleware::{JwtAuthMiddleware, RequestMetrics};
use actix_web::web;

/// Register every route. Services are expected as `web::Data` app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/health", web::get().to(health::health_summary))
        .service(
            web::scope("/api/v1")
                .wrap(JwtAuthMiddleware)
                .wrap(RequestMetrics::default())
                .service(
                    web::scope("/auth")
                        .route("/google", web::post().to(auth::google_sign_in))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/posts")
                        .service(
                            web::resource("")
                                .route(web::get().to(posts::list_posts))
                                .route(web::post().to(posts::create_post)),
                        )
                        .service(
                            web::resource("/{post_id}")
                                .route(web::get().to(posts::get_post))
                                .route(web::put().to(posts::update_post))
                                .route(web::delete().to(posts::delete_post)),
                        )
                        .service(
                            web::resource("/{post_id}/comments")
                                .route(web::get().to(comments::list_comments))
                                .route(web::post().to(comments::create_comment)),
                        )
                        .service(
                            web::resource("/{post_id}/likes")
                                .route(web::get().to(likes::like_status))
                                .route(web::post().to(likes::like_post))
                                .route(web::delete().to(likes::unlike_post)),
                        ),
                )
                .service(
                    web::resource("/comments/{comment_id}")
                        .route(web::delete().to(comments::delete_comment)),
                ),
        );
}
