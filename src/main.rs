use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use stock_quote_sync::database::{establish_connection_pool, get_connection};
use stock_quote_sync::{
    AppConfig, FinnhubClient, JobReport, QuoteSyncJob, StockQuoteRepositoryImpl, SystemClock,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Diagnostics go to stderr for the invoking scheduler
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_quote_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!("Loaded configuration: {:?}", config);

    match run(config).await {
        Ok(report) => {
            if !report.failures.is_empty() {
                let symbols: Vec<&str> = report.failures.iter().map(|f| f.symbol.as_str()).collect();
                tracing::warn!("{} symbols skipped: {}", symbols.len(), symbols.join(", "));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Quote sync failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Wire up the job from configuration and run it once
async fn run(config: Arc<AppConfig>) -> Result<JobReport, Box<dyn Error>> {
    let fetcher = FinnhubClient::new(&config.api)?;

    let pool = establish_connection_pool(
        &config.database.connection_string(),
        config.database.pool_size,
    )?;
    let repository =
        StockQuoteRepositoryImpl::new(config.target_table.clone(), move || get_connection(&pool));

    let job = QuoteSyncJob::new(
        Arc::clone(&config),
        Arc::new(fetcher),
        Arc::new(repository),
        Arc::new(SystemClock),
    );

    Ok(job.run().await?)
}
