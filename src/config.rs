use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub scraper: ScraperConfig,
}

#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    /// Directory the scraper writes raw transcript XML into.
    pub xml_dir: PathBuf,
    /// Directory the parser writes its JSON artifacts into.
    pub json_dir: PathBuf,
    /// SQLite database file.
    pub database: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_listing_url")]
    pub listing_url: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub delay_ms: u64,
    pub timeout_seconds: u64,
}

fn default_listing_url() -> String {
    crate::constants::DEFAULT_LISTING_URL.to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file '{config_path}': {e}"))
        })?;

        let mut config: Config = toml::from_str(&config_content)?;

        // Environment variables (and .env entries) take precedence over the file
        if let Ok(xml_path) = env::var("XML_PATH") {
            config.paths.xml_dir = PathBuf::from(xml_path);
        }
        if let Ok(json_path) = env::var("JSON_PATH") {
            config.paths.json_dir = PathBuf::from(json_path);
        }
        if let Ok(db_path) = env::var("DATABASE_FILEPATH") {
            config.paths.database = PathBuf::from(db_path);
        }

        Ok(config)
    }
}
