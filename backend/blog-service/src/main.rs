use actix_cors::Cors;
use actix_web::{App, HttpServer};
use blog_service::db::{self, MemoryStore, PgStore};
use blog_service::services::{GoogleIdentityProvider, IdentityProvider};
use blog_service::{AppServices, Config};
use crypto_core::JwtKeys;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn other_error(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::Other, message)
}

/// Blog Service entry point
///
/// Serves the blog HTTP API on BLOG_SERVICE_HOST:BLOG_SERVICE_PORT. Runs on
/// PostgreSQL when DATABASE_URL is set, otherwise on the in-memory store.
#[actix_web::main]
async fn main() -> io::Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.app.json_logs);

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let keys = JwtKeys::from_rsa_pem(&config.auth.private_key_pem, &config.auth.public_key_pem)
        .map_err(|e| other_error(format!("Failed to initialize JWT keys: {e}")))?;
    let keys = Arc::new(keys);

    let provider: Arc<dyn IdentityProvider> = Arc::new(
        GoogleIdentityProvider::new(
            config.google.tokeninfo_url.clone(),
            config.google.client_id.clone(),
        )
        .map_err(|e| other_error(e.to_string()))?,
    );

    let session_ttl = config.auth.session_ttl();
    let services = match &config.database {
        Some(database) => {
            let pool = db::init_pool(&database.url, database.max_connections)
                .await
                .map_err(|e| other_error(format!("Failed to connect to database: {e}")))?;
            tracing::info!(max_connections = database.max_connections, "Using PostgreSQL store");
            AppServices::new(Arc::new(PgStore::new(pool)), provider, keys, session_ttl)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on restart");
            AppServices::new(Arc::new(MemoryStore::new()), provider, keys, session_ttl)
        }
    };

    let bind_address = config.app.bind_address();
    let allowed_origins = config.cors.allowed_origins.clone();
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin.is_empty() {
                continue;
            }
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let services = services.clone();
        App::new()
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(move |cfg| services.register(cfg))
    })
    .bind(&bind_address)?
    .run()
    .await
}
