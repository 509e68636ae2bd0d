use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool, PooledConnection};
use std::time::Duration;
use thiserror::Error;

/// Type alias for PostgreSQL connection pool
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Type alias for pooled connection
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// Storage-related errors
///
/// Every variant is fatal for a sync run.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Connection pool error: {0}")]
    ConnectionPoolError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Blocking task failed: {0}")]
    TaskFailed(String),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

/// Build a lazily-connecting pool
///
/// No connection is opened until the first `get()`; each pooled
/// connection goes back to the pool when dropped.
///
/// # Arguments
/// * `connection_string` - libpq keyword/value string or `postgres://` URL
/// * `pool_size` - Maximum number of connections
pub fn establish_connection_pool(
    connection_string: &str,
    pool_size: u32,
) -> Result<PgPool, StorageError> {
    let manager = ConnectionManager::<PgConnection>::new(connection_string);
    let pool = r2d2::Pool::builder()
        .max_size(pool_size)
        .min_idle(Some(0))
        .connection_timeout(Duration::from_secs(10))
        .build(manager)
        .map_err(|e| StorageError::ConnectionPoolError(e.to_string()))?;

    tracing::debug!("Database pool created with max size: {}", pool_size);

    Ok(pool)
}

/// Check a connection out of the pool
pub fn get_connection(pool: &PgPool) -> Result<PgPooledConnection, StorageError> {
    pool.get()
        .map_err(|e| StorageError::ConnectionPoolError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_creation_is_lazy() {
        // Nothing listens on port 1, so an eager pool would fail here
        let pool = establish_connection_pool("host=127.0.0.1 port=1 dbname=none", 1);
        assert!(pool.is_ok());
    }

    #[test]
    #[ignore]
    fn test_database_connection() {
        // Requires a reachable database
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };

        let pool = establish_connection_pool(&url, 1).unwrap();
        assert!(get_connection(&pool).is_ok(), "Failed to connect to database");
    }
}
