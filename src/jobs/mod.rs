/// Jobs invoked by the entry point
///
/// - Quote sync: fetch configured symbols and upsert them into PostgreSQL

pub mod quote_sync_job;

pub use quote_sync_job::{JobError, JobReport, QuoteSyncJob, SymbolFailure};
