use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date/time parsing failed: {0}")]
    Chrono(#[from] chrono::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
