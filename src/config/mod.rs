mod types;

pub use types::{BindingConfig, Config, ModelConfig, RelationConfig, ServerConfig};

use crate::error::{GraphbindError, Result};
use std::fs;

/// Load configuration from a TOML file
pub fn load_config(path: &str) -> Result<Config> {
    let contents = fs::read_to_string(path).map_err(|e| {
        GraphbindError::Config(format!("Failed to read config file '{}': {}", path, e))
    })?;

    let config: Config = toml::from_str(&contents)?;
    validate(&config)?;

    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &str) -> Result<()> {
    validate(config)?;

    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string).map_err(|e| {
        GraphbindError::Config(format!("Failed to write config file '{}': {}", path, e))
    })?;

    Ok(())
}

fn validate(config: &Config) -> Result<()> {
    for model in &config.model {
        model.validate().map_err(GraphbindError::Config)?;
    }
    for binding in &config.binding {
        binding.validate().map_err(GraphbindError::Config)?;
    }
    Ok(())
}
