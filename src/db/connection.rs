use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;
pub type SqlitePooledConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Error)]
pub enum StoreInitError {
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migrations: {0}")]
    Migration(String),
}

/// Cascading deletes only happen with `foreign_keys` switched on, and SQLite
/// scopes the pragma to the connection, so it is applied on every checkout.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the pool and brings the schema up to date, returning a ready
/// handle. There is no lazily-initialized global: callers own the pool and
/// pass it to whoever needs it.
pub fn initialize(database_url: &str) -> Result<SqlitePool, StoreInitError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;

    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| StoreInitError::Migration(err.to_string()))?;

    Ok(pool)
}
