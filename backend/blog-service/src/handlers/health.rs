use crate::db::StoreHealth;
use actix_web::{web, HttpResponse};
use std::sync::Arc;

pub struct HealthState {
    store: Arc<dyn StoreHealth>,
}

impl HealthState {
    pub fn new(store: Arc<dyn StoreHealth>) -> Self {
        Self { store }
    }
}

pub async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "blog-service"
            }))
        }
    }
}
