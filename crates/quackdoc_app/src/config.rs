use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quackdoc_core::ConversionConfig;
use quackdoc_logging::quack_info;

/// Reads a RON config file; missing fields take their defaults. No path means all defaults.
pub fn load(path: Option<&Path>) -> Result<ConversionConfig> {
    let Some(path) = path else {
        return Ok(ConversionConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let config = parse(&text).with_context(|| format!("invalid config file {}", path.display()))?;
    quack_info!("loaded configuration from {}", path.display());
    Ok(config)
}

pub fn parse(text: &str) -> Result<ConversionConfig> {
    let config: ConversionConfig = ron::from_str(text)?;
    config.validate()?;
    Ok(config)
}

pub fn to_ron(config: &ConversionConfig) -> Result<String> {
    let pretty = ron::ser::PrettyConfig::new();
    Ok(ron::ser::to_string_pretty(config, pretty)?)
}
