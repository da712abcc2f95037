/// HTTP middleware utilities for blog-service
///
/// Provides bearer session authentication and per-route request metrics logging.
pub mod permissions;

pub use permissions::*;

use crate::error::AppError;
use crate::models::UserIdentity;
use crate::services::SessionValidator;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::{Duration, Instant};

// =====================================================================
// Session authentication
// =====================================================================

/// Caller resolved from the session token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserIdentity);

impl AuthenticatedUser {
    pub fn identity(&self) -> &UserIdentity {
        &self.0
    }
}

/// Resolves `Authorization: Bearer <token>` into an [`AuthenticatedUser`].
///
/// Requests without the header pass through untouched so public reads keep
/// working; handlers that need a caller extract `AuthenticatedUser` and get
/// a 401 when it is missing. A header that is present but does not validate
/// is rejected here, on every route.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let header = req
                .headers()
                .get("Authorization")
                .map(|value| value.to_str().map(str::to_owned));

            let resolved = match header {
                None => return service.call(req).await.map(|res| res.map_into_left_body()),
                Some(Err(_)) => Err(AppError::Unauthenticated(
                    "Malformed Authorization header".into(),
                )),
                Some(Ok(value)) => match req.app_data::<web::Data<SessionValidator>>().cloned() {
                    Some(validator) => validator.validate(Some(&value)).await,
                    None => Err(AppError::Internal(
                        "session validator not configured".into(),
                    )),
                },
            };

            match resolved {
                Ok(identity) => {
                    tracing::debug!(user_id = %identity.id, "session resolved");
                    req.extensions_mut().insert(AuthenticatedUser(identity));
                    service.call(req).await.map(|res| res.map_into_left_body())
                }
                Err(err) => {
                    let response = HttpResponse::from_error(err).map_into_right_body();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| AppError::Unauthenticated("Sign in required".into()).into()),
        )
    }
}

// =====================================================================
// Request metrics
// =====================================================================

const DEFAULT_SLOW_REQUEST: Duration = Duration::from_millis(500);

/// Logs method, route pattern, status and latency of every request.
///
/// The route is the matched pattern (`/api/v1/posts/{post_id}`), never the
/// raw path. Server errors and requests slower than `slow_after` go out at
/// `warn`, everything else at `debug`.
#[derive(Debug, Clone, Copy)]
pub struct RequestMetrics {
    slow_after: Duration,
}

impl RequestMetrics {
    pub fn new(slow_after: Duration) -> Self {
        Self { slow_after }
    }
}

impl Default for RequestMetrics {
    fn default() -> Self {
        Self::new(DEFAULT_SLOW_REQUEST)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestMetrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestMetricsService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestMetricsService {
            service,
            slow_after: self.slow_after,
        }))
    }
}

pub struct RequestMetricsService<S> {
    service: S,
    slow_after: Duration,
}

impl<S, B> Service<ServiceRequest> for RequestMetricsService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().clone();
        let raw_path = req.path().to_owned();
        let slow_after = self.slow_after;
        let started = Instant::now();
        let response = self.service.call(req);

        Box::pin(async move {
            let res = response.await;
            let elapsed = started.elapsed();

            // routing has happened by now, so the pattern is known
            let (status, route) = match &res {
                Ok(r) => (r.status(), r.request().match_pattern()),
                Err(e) => (e.as_response_error().status_code(), None),
            };
            let route = route.unwrap_or(raw_path);
            let status = status.as_u16();
            let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

            if status >= 500 || elapsed >= slow_after {
                tracing::warn!(%method, %route, status, elapsed_ms, "request slow or failed");
            } else {
                tracing::debug!(%method, %route, status, elapsed_ms, "request completed");
            }
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    async fn failing() -> crate::error::Result<HttpResponse> {
        Err(AppError::Internal("boom".into()))
    }

    #[actix_web::test]
    async fn test_request_metrics_passes_responses_through() {
        let app = test::init_service(
            App::new()
                .wrap(RequestMetrics::new(Duration::ZERO))
                .route(
                    "/posts/{post_id}",
                    web::get().to(|| async { HttpResponse::Ok().finish() }),
                )
                .route("/broken", web::get().to(failing)),
        )
        .await;

        let req = test::TestRequest::get().uri("/posts/42").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/broken").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let req = test::TestRequest::get().uri("/missing").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_anonymous_request_reaches_handler_without_identity() {
        let app = test::init_service(
            App::new().wrap(JwtAuthMiddleware).route(
                "/whoami",
                web::get().to(|user: Option<AuthenticatedUser>| async move {
                    HttpResponse::Ok().body(if user.is_some() { "user" } else { "anonymous" })
                }),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(&body[..], b"anonymous");
    }
}
