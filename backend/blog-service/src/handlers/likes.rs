/// Like toggle handlers
///
/// All three answer with `{liked, like_count}` for the caller.
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::services::LikeService;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

pub async fn like_status(
    service: web::Data<LikeService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let state = service.snapshot(*post_id, user.identity()).await?;
    Ok(HttpResponse::Ok().json(state))
}

pub async fn like_post(
    service: web::Data<LikeService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let state = service.like(*post_id, user.identity()).await?;
    Ok(HttpResponse::Ok().json(state))
}

pub async fn unlike_post(
    service: web::Data<LikeService>,
    user: AuthenticatedUser,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let state = service.unlike(*post_id, user.identity()).await?;
    Ok(HttpResponse::Ok().json(state))
}
