//! Serves the demo application.
//!
//! Run with:
//!   RUST_LOG=info cargo run
//!
//! Try:
//!   curl http://localhost:8080/greet
//!   curl http://localhost:8080/status

use std::process::ExitCode;
use std::sync::Arc;

use strata::{Config, Error, RequestCounter, Server, app};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;
    let counter = Arc::new(RequestCounter::new());

    info!("starting server ...");
    Server::bind(config.addr)
        .await?
        .serve(app::router(counter))
        .await
}
