use serde::Deserialize;

use crate::error::ConfigError;
use crate::services::navigation::MANIFEST_PATH;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_RUST_LOG: &str = "seat_manifest=debug,tower_http=debug";
const DEFAULT_VENDOR_BASE_URL: &str = "https://www.etix.com";
const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub vendor: VendorConfig,
    pub bridge: BridgeConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

// Сайт продавца
#[derive(Debug, Clone, Deserialize)]
pub struct VendorConfig {
    pub base_url: String,
    pub manifest_path: String,
}

// Мост внутри страницы; без него корзина недоступна
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    pub url: Option<String>,
}

// Исходящие HTTP-запросы
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

// Плоский набор переменных окружения
#[derive(Debug, Deserialize)]
struct Settings {
    host: String,
    port: u16,
    environment: String,
    rust_log: String,
    log_format: LogFormat,
    vendor_base_url: String,
    manifest_path: String,
    bridge_url: Option<String>,
    http_timeout_seconds: u64,
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid { name, reason: format!("{} ({})", e, value) })
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app: AppConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
                environment: DEFAULT_ENVIRONMENT.to_string(),
                rust_log: DEFAULT_RUST_LOG.to_string(),
                log_format: LogFormat::Pretty,
            },
            vendor: VendorConfig {
                base_url: DEFAULT_VENDOR_BASE_URL.to_string(),
                manifest_path: MANIFEST_PATH.to_string(),
            },
            bridge: BridgeConfig { url: None },
            http: HttpConfig { timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS },
        }
    }
}

impl Config {
    /// Читает настройки из окружения (после `dotenvy::dotenv()`), поверх значений по умолчанию.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(config::Environment::default().try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings: Settings = config::Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("environment", DEFAULT_ENVIRONMENT)?
            .set_default("rust_log", DEFAULT_RUST_LOG)?
            .set_default("log_format", "pretty")?
            .set_default("vendor_base_url", DEFAULT_VENDOR_BASE_URL)?
            .set_default("manifest_path", MANIFEST_PATH)?
            .set_default("http_timeout_seconds", DEFAULT_HTTP_TIMEOUT_SECONDS as i64)?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        check_url("VENDOR_BASE_URL", &settings.vendor_base_url)?;
        let bridge_url = settings.bridge_url.filter(|url| !url.trim().is_empty());
        if let Some(url) = &bridge_url {
            check_url("BRIDGE_URL", url)?;
        }

        Ok(Config {
            app: AppConfig {
                host: settings.host,
                port: settings.port,
                environment: settings.environment,
                rust_log: settings.rust_log,
                log_format: settings.log_format,
            },
            vendor: VendorConfig {
                base_url: settings.vendor_base_url,
                manifest_path: settings.manifest_path,
            },
            bridge: BridgeConfig { url: bridge_url },
            http: HttpConfig { timeout_seconds: settings.http_timeout_seconds },
        })
    }
}
