/// Database access layer
///
/// Repository traits plus the two backing stores: PostgreSQL for deployments
/// and an in-memory store for tests and local runs without a database.
pub mod memory_repository;
pub mod postgres_repository;
pub mod traits;

pub use memory_repository::MemoryStore;
pub use postgres_repository::PgStore;
pub use traits::{
    BlogStore, CommentRepository, LikeRepository, PostRepository, StoreHealth, UserRepository,
};

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connect to PostgreSQL and bring the schema up to date
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;

    MIGRATOR.run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
