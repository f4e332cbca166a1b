use thiserror::Error;

/// Ошибки загрузки конфигурации.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Ошибки действий над местами на странице.
#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("seat element {0} not found on the page")]
    NotFound(String),
    #[error("bridge request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("bridge rejected {action}: HTTP {status}")]
    Rejected { action: &'static str, status: u16 },
}

/// Ошибки перехода к схеме секции.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("performance id not found in page path {0}")]
    MissingPerformanceId(String),
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to encode form: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("vendor request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("vendor rejected manifest form: HTTP {0}")]
    Rejected(u16),
}
