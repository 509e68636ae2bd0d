/// Quote retrieval from the market-data API
///
/// - `QuoteFetcher` port used by the sync job
/// - `FinnhubClient` HTTP implementation
/// - `QuoteRecord` normalized payload

pub mod client;
pub mod errors;
pub mod models;

pub use client::{FinnhubClient, QuoteFetcher};
pub use errors::FetchError;
pub use models::QuoteRecord;
