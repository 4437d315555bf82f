use std::{path::Path, str::FromStr};

use alloy::primitives::Address;

use crate::errors::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletEntry {
    /// The address as written in the wallet list.
    pub raw: String,
    pub address: Address,
}

impl WalletEntry {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let hex = raw.strip_prefix("0x")?;

        // mixed case carries an EIP-55 checksum that has to hold
        let mixed_case = hex.chars().any(|c| c.is_ascii_uppercase())
            && hex.chars().any(|c| c.is_ascii_lowercase());
        let address = if mixed_case {
            Address::parse_checksummed(raw, None).ok()?
        } else {
            Address::from_str(raw).ok()?
        };

        Some(Self {
            raw: raw.to_string(),
            address,
        })
    }

    pub fn key(&self) -> String {
        self.address.to_string().to_ascii_lowercase()
    }
}

pub async fn read_file_lines(path: impl AsRef<Path>) -> std::io::Result<Vec<String>> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(contents.lines().map(str::to_string).collect())
}

pub fn parse_wallets(lines: &[String]) -> Result<Vec<WalletEntry>, ConfigError> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            WalletEntry::parse(line).ok_or_else(|| ConfigError::InvalidWallet {
                line: i + 1,
                value: line.trim().to_string(),
            })
        })
        .collect()
}

pub async fn read_wallets(path: impl AsRef<Path>) -> Result<Vec<WalletEntry>, ConfigError> {
    let path = path.as_ref();
    let lines = read_file_lines(path).await.map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let wallets = parse_wallets(&lines)?;
    tracing::info!("Loaded {} wallets from {}", wallets.len(), path.display());

    Ok(wallets)
}
