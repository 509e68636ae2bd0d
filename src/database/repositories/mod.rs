/// Repository pattern implementations
///
/// Jobs depend on the `StockQuoteRepository` trait; the diesel-backed
/// implementation takes a connection provider so it never holds a
/// connection between calls.

pub mod stock_quote_repository;

pub use stock_quote_repository::{StockQuoteRepository, StockQuoteRepositoryImpl, UPSERT_PAGE_SIZE};
