/// Database module for PostgreSQL integration
///
/// This module provides:
/// - A lazily-connecting connection pool
/// - SQL for the quote table (idempotent DDL, paged upsert)
/// - The quote repository used by the sync job

pub mod connection;
pub mod models;
pub mod repositories;
pub mod schema;

pub use connection::{establish_connection_pool, get_connection, PgPool, StorageError};
pub use repositories::{StockQuoteRepository, StockQuoteRepositoryImpl};
