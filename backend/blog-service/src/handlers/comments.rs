/// Comment handlers
use crate::error::Result;
use crate::middleware::{require_caller, AuthenticatedUser};
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

pub async fn list_comments(
    service: web::Data<CommentService>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = service.list_comments(*post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn create_comment(
    service: web::Data<CommentService>,
    user: Option<AuthenticatedUser>,
    post_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let author = require_caller(user.as_ref().map(AuthenticatedUser::identity), "comment")?;
    let comment = service
        .create_comment(*post_id, author, &req.content)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn delete_comment(
    service: web::Data<CommentService>,
    user: AuthenticatedUser,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete_comment(*comment_id, user.identity()).await?;
    Ok(HttpResponse::NoContent().finish())
}
