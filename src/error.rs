use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Prompt file not found: {0}")]
    PromptNotFound(PathBuf),

    #[error("Unsupported LLM backend: {0}")]
    UnsupportedBackend(String),

    #[error("Missing prompt template for report type: {0}")]
    MissingTemplate(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response structure: {0}")]
    InvalidResponse(String),

    #[error("Source document not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Collector error: {0}")]
    Collector(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
