use std::path::PathBuf;

use crate::output::TokenBook;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Please set {0} environment variable")]
    MissingSecret(&'static str),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("No contract address configured for environment '{0}'")]
    UnknownEnvironment(String),

    #[error("Contract address for environment '{0}' is the zero address")]
    ZeroContractAddress(String),

    #[error("Failed to load {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid wallet address '{value}' on line {line}")]
    InvalidWallet { line: usize, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Signing failed for wallet {wallet}: {reason:#}")]
    Signing {
        wallet: String,
        partial: TokenBook,
        reason: eyre::Report,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to serialize signatures: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 1,
            AppError::Batch(_) => 2,
            AppError::Output(_) => 3,
        }
    }
}
