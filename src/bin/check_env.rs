//! Preflight check for the quote sync environment
//!
//! Exits non-zero when any required variable is unset or blank, so a
//! scheduler can stop before launching the sync job.

use std::process::ExitCode;
use stock_quote_sync::config::missing_required_vars;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_quote_sync=info,check_env=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let missing = missing_required_vars(|key| std::env::var(key).ok());
    if !missing.is_empty() {
        tracing::error!("Missing required environment variables: {:?}", missing);
        return ExitCode::FAILURE;
    }

    tracing::info!("Environment OK");
    ExitCode::SUCCESS
}
