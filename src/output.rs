use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use crate::errors::OutputError;

const JSON_INDENT: &[u8] = b"    ";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenRecord {
    pub salt: String,
    pub token: String,
}

/// Signatures keyed by lowercased wallet address, in first-seen order.
///
/// Inserting an existing key replaces its record without moving it.
#[derive(Clone, Debug, Default)]
pub struct TokenBook {
    records: Vec<(String, TokenRecord)>,
    index: HashMap<String, usize>,
}

impl TokenBook {
    pub fn insert(&mut self, key: String, record: TokenRecord) -> Option<TokenRecord> {
        match self.index.get(&key) {
            Some(&position) => Some(std::mem::replace(&mut self.records[position].1, record)),
            None => {
                self.index.insert(key.clone(), self.records.len());
                self.records.push((key, record));
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_pretty_json(&self) -> Result<String, OutputError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;

        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Serialize for TokenBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (key, record) in &self.records {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

pub async fn write_token_book(book: &TokenBook, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = path.as_ref();
    let json = book.to_pretty_json()?;

    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, json).await.map_err(write_err)?;

    tracing::info!("Wrote {} signatures to {}", book.len(), path.display());

    Ok(())
}

/// `data/signatures.json` -> `data/signatures.partial.json`
pub fn partial_output_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}.partial.json"))
}
