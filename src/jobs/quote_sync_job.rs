use crate::clock::Clock;
use crate::config::{AppConfig, ConfigError};
use crate::database::models::StockQuoteRow;
use crate::database::repositories::StockQuoteRepository;
use crate::database::StorageError;
use crate::quotes::{FetchError, QuoteFetcher};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

/// Fatal job errors
///
/// Per-symbol fetch failures never surface here; they end up in the
/// `JobReport` instead.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A symbol that produced no row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFailure {
    pub symbol: String,
    pub error: String,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobReport {
    /// Symbol occurrences processed, duplicates included
    pub requested: usize,
    /// Rows built from successful fetches
    pub fetched: usize,
    /// Rows reported written by the repository
    pub written: usize,
    pub failures: Vec<SymbolFailure>,
}

/// Quote sync job
///
/// Ensures the table, fetches every configured symbol, and writes all
/// successfully built rows in one batched upsert.
pub struct QuoteSyncJob {
    config: Arc<AppConfig>,
    fetcher: Arc<dyn QuoteFetcher>,
    repository: Arc<dyn StockQuoteRepository>,
    clock: Arc<dyn Clock>,
}

impl QuoteSyncJob {
    /// Create a new quote sync job
    pub fn new(
        config: Arc<AppConfig>,
        fetcher: Arc<dyn QuoteFetcher>,
        repository: Arc<dyn StockQuoteRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            fetcher,
            repository,
            clock,
        }
    }

    /// Run one fetch-and-upsert cycle
    ///
    /// Fails only on invalid configuration, schema-ensure failure, or write
    /// failure. Symbols whose fetch fails are logged and skipped.
    pub async fn run(&self) -> Result<JobReport, JobError> {
        self.config.validate()?;

        tracing::info!(
            "Starting quote sync for {} symbols into {}",
            self.config.symbols.len(),
            self.config.target_table
        );

        self.with_repository(|repo| repo.ensure_table()).await?;
        tracing::info!("Table ready.");

        let outcomes = self.fetch_all().await;
        let requested = outcomes.len();

        let mut rows = Vec::with_capacity(requested);
        let mut failures = Vec::new();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::error!(symbol = %symbol, error = %e, "Failed for {}: {}", symbol, e);
                    failures.push(SymbolFailure {
                        symbol,
                        error: e.to_string(),
                    });
                }
            }
        }

        let fetched = rows.len();
        if rows.is_empty() {
            tracing::warn!("No quotes fetched, nothing to write");
        }

        let written = self.with_repository(move |repo| repo.upsert(rows)).await?;
        if fetched > 0 {
            tracing::info!("Upserted {} rows.", written);
        }

        tracing::info!(
            requested,
            fetched,
            failed = failures.len(),
            written,
            "Quote sync completed"
        );

        Ok(JobReport {
            requested,
            fetched,
            written,
            failures,
        })
    }

    /// Fetch and build a row for every configured symbol
    ///
    /// Requests run with bounded concurrency; results come back in
    /// configuration order.
    async fn fetch_all(&self) -> Vec<(String, Result<StockQuoteRow, FetchError>)> {
        stream::iter(self.config.symbols.iter())
            .map(|symbol| async move {
                let outcome = self
                    .fetcher
                    .fetch(symbol)
                    .await
                    .map(|quote| StockQuoteRow::from_quote(symbol, quote, self.clock.now()));

                if outcome.is_ok() {
                    tracing::debug!(symbol = %symbol, "Quote fetched");
                }

                (symbol.clone(), outcome)
            })
            .buffered(self.config.fetch_concurrency.max(1))
            .collect()
            .await
    }

    /// Run a repository call on the blocking pool
    async fn with_repository<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn StockQuoteRepository) -> Result<T, StorageError> + Send + 'static,
    {
        let repository = Arc::clone(&self.repository);

        tokio::task::spawn_blocking(move || f(repository.as_ref()))
            .await
            .map_err(|e| StorageError::TaskFailed(e.to_string()))?
    }
}
