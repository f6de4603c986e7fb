use std::env;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("MONGO_URL (or MONGODB_URI) must be set when STORE_BACKEND is mongo")]
    MissingMongoUrl,
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreBackend {
    Mongo { url: String, db_name: String },
    Memory,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub store: StoreBackend,
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup("STORE_BACKEND").as_deref() {
            None | Some("mongo") => {
                let url = lookup("MONGO_URL")
                    .or_else(|| lookup("MONGODB_URI"))
                    .ok_or(ConfigError::MissingMongoUrl)?;
                let db_name = lookup("DB_NAME").unwrap_or_else(|| "shared_expenses".into());
                StoreBackend::Mongo { url, db_name }
            }
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.into(),
                })
            }
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("compact") => LogFormat::Compact,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    value: other.into(),
                })
            }
        };

        Ok(Self {
            store,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".into()),
            log_format,
        })
    }
}
