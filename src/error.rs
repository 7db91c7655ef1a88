use thiserror::Error;

/// Errors surfaced by the store-navigation library
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to load asset `{name}`: {reason}")]
    AssetLoad { name: String, reason: String },

    #[error("graphics resource budget exhausted while creating {kind}")]
    ResourceExhausted { kind: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid catalog: {0}")]
    Catalog(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn asset_load(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::AssetLoad {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
