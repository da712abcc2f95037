/// Sign-in and current-user endpoints
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::services::IdentityVerifier;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GoogleSignInRequest {
    /// Google ID token obtained by the client
    pub credential: String,
}

/// Exchange a Google ID token for a session token
pub async fn google_sign_in(
    verifier: web::Data<IdentityVerifier>,
    req: web::Json<GoogleSignInRequest>,
) -> Result<HttpResponse> {
    let sign_in = verifier.sign_in(&req.credential).await?;
    Ok(HttpResponse::Ok().json(sign_in))
}

/// The caller resolved from the session token
pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(user.identity()))
}
