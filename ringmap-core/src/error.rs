use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("registry fetch failed: {0}")]
    RegistryError(#[from] reqwest::Error),

    #[error("invalid registry data: {0}")]
    InvalidRegistry(String),

    #[error("spider error: {0}")]
    SpiderError(#[from] ringmap_spider::SpiderError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("missing artifact: {0}")]
    MissingArtifact(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
