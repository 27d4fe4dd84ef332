//! Errors while loading a JSON configuration into a [`zd_model::Model`].

use thiserror::Error;
use zd_core::ZdError;
use zd_model::ModelError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown {what}: {value}")]
    UnknownBlockType { what: &'static str, value: String },

    #[error("missing reference: {what}")]
    MissingReference { what: String },

    #[error("invalid parameter value: {0}")]
    Param(#[from] ZdError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for ZdError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Json(e) => ZdError::Config { what: e.to_string() },
            ConfigError::Io(e) => ZdError::Config { what: e.to_string() },
            ConfigError::UnknownBlockType { what, value } => ZdError::Config {
                what: format!("unknown {what}: {value}"),
            },
            ConfigError::MissingReference { what } => ZdError::Config { what },
            ConfigError::Param(e) => e,
            ConfigError::Model(e) => e.into(),
        }
    }
}
