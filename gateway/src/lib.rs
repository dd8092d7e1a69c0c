pub mod api;
pub mod config;
pub mod metrics_defs;

use crate::api::AppState;
use crate::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use trends::aggregate::Aggregator;
use trends::client::GoogleTrendsClient;

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not build upstream client: {0}")]
    Upstream(#[from] trends::error::UpstreamError),
}

/// Composition root: builds the upstream client once, then serves.
///
/// The reqwest handle inside the client is safe for concurrent reuse, so a
/// single client backs every request for the process lifetime.
pub async fn run(config: Config) -> Result<(), GatewayError> {
    let client = GoogleTrendsClient::new((&config.upstream).into())?;
    let state = AppState {
        aggregator: Aggregator::new(Arc::new(client)),
        api_key: config.auth.api_key.clone(),
        max_keywords: config.upstream.max_keywords,
    };

    let addr = format!("{}:{}", config.listener.host, config.listener.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, upstream = %config.upstream.base_url, "trends gateway listening");

    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
