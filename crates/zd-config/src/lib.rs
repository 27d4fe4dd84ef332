//! zd-config: the JSON configuration format (§6) and its materialization
//! into a [`zd_model::Model`].

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_model;
pub use schema::{Config, SimulationParameters};

use zd_model::Model;

/// Parse a configuration document and build the [`Model`] it describes.
pub fn load_json_str(text: &str) -> ConfigResult<(Model, SimulationParameters)> {
    let config: Config = serde_json::from_str(text)?;
    load_model(&config)
}

/// Read a configuration file from disk and build the [`Model`] it describes.
pub fn load_json_file(path: &std::path::Path) -> ConfigResult<(Model, SimulationParameters)> {
    let text = std::fs::read_to_string(path)?;
    load_json_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_json_str_rejects_malformed_json() {
        let err = load_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
