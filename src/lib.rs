pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod controllers;

use std::sync::Arc;
use std::time::Duration;

use services::{ManifestNavigator, TicketLimitChain};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub http_client: reqwest::Client,
    pub limit_chain: Arc<TicketLimitChain>,
    pub navigator: ManifestNavigator,
}

impl AppState {
    pub fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .cookie_store(true)
            .build()?;

        let limit_chain = Arc::new(TicketLimitChain::standard()?);
        let navigator = ManifestNavigator::new(&config.vendor.base_url, http_client.clone())?;

        Ok(Arc::new(Self {
            config,
            http_client,
            limit_chain,
            navigator,
        }))
    }
}
