/// PostgreSQL plumbing
///
/// - `pool`: connection pool creation, health check and shutdown
/// - `migrations`: embedded schema migrations
///
/// The row types and their queries live in [`crate::models`]; the rest of
/// the crate reaches them through [`crate::store::PgStore`].
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskflow_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
