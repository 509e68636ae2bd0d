// Library Crate Root
// lib.rs

pub mod clock;
pub mod config;
pub mod database;
pub mod jobs;
pub mod quotes;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use database::{StockQuoteRepository, StockQuoteRepositoryImpl, StorageError};
pub use jobs::{JobError, JobReport, QuoteSyncJob};
pub use quotes::{FetchError, FinnhubClient, QuoteFetcher, QuoteRecord};
