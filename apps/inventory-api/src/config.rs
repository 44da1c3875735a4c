use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, env_parse};
use database::mongodb::MongoConfig;
use std::time::Duration;
use strum::{Display, EnumString};

pub use core_config::Environment;
pub use core_config::server::ServerConfig;

/// Backing store selected by `INVENTORY_STORE`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreKind {
    #[strum(serialize = "mongodb", serialize = "mongo")]
    Mongodb,
    Memory,
}

#[derive(Clone, Debug)]
pub enum StoreConfig {
    Mongodb {
        mongo: MongoConfig,
        /// Upper bound on each store call; `None` leaves it to the driver
        operation_timeout: Option<Duration>,
    },
    Memory,
}

impl StoreConfig {
    /// - `INVENTORY_STORE`: `mongodb` (default) or `memory`
    /// - `STORE_OPERATION_TIMEOUT_MS`: per-call bound for MongoDB, `0` disables (default: 5000)
    fn from_env() -> Result<Self, ConfigError> {
        let raw = env_or_default("INVENTORY_STORE", "mongodb");
        let kind = raw.parse::<StoreKind>().map_err(|_| ConfigError::ParseError {
            key: "INVENTORY_STORE".to_string(),
            details: format!("unknown store '{raw}', expected 'mongodb' or 'memory'"),
        })?;

        match kind {
            StoreKind::Memory => Ok(StoreConfig::Memory),
            StoreKind::Mongodb => {
                let timeout_ms: u64 = env_parse("STORE_OPERATION_TIMEOUT_MS", 5000)?;
                Ok(StoreConfig::Mongodb {
                    mongo: MongoConfig::from_env()?,
                    operation_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),
                })
            }
        }
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            StoreConfig::Mongodb { .. } => StoreKind::Mongodb,
            StoreConfig::Memory => StoreKind::Memory,
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let store = StoreConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            store,
            server,
            environment,
        })
    }
}
