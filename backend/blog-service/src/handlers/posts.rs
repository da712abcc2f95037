/// Post handlers - HTTP endpoints for post operations
use crate::error::Result;
use crate::middleware::{require_caller, AuthenticatedUser};
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

/// Body of both create and update; the author is never part of it
#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub content: String,
}

/// List all posts, newest first
pub async fn list_posts(service: web::Data<PostService>) -> Result<HttpResponse> {
    let posts = service.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Get a post by ID
pub async fn get_post(
    service: web::Data<PostService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service.get_post(*post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Create a new post
pub async fn create_post(
    service: web::Data<PostService>,
    user: Option<AuthenticatedUser>,
    req: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    let author = require_caller(user.as_ref().map(AuthenticatedUser::identity), "post")?;
    let post = service
        .create_post(author, &req.title, &req.content)
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// Update title and content
pub async fn update_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
    req: web::Json<PostRequest>,
) -> Result<HttpResponse> {
    let post = service
        .update_post(*post_id, user.identity(), &req.title, &req.content)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post
pub async fn delete_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete_post(*post_id, user.identity()).await?;
    Ok(HttpResponse::NoContent().finish())
}
