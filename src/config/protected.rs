//! Connection string lookup from the protected credentials file.
//!
//! The file holds one JSON object per line. Each object carries a numeric
//! `type`; the database entry is type `1` and stores the connection string
//! under `key`.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::error;

use crate::error::AppError;

const DB_CONNECTION: u32 = 1;

#[derive(Debug, Deserialize)]
struct ProtectedEntry {
    #[serde(rename = "type")]
    kind: u32,
    key: Option<String>,
}

pub fn read_connection_string(path: &Path) -> Result<String, AppError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Cannot open credentials file");
        AppError::ConfigError(format!("cannot read {}: {}", path.display(), e))
    })?;

    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        let entry: ProtectedEntry = serde_json::from_str(line).map_err(|e| {
            AppError::ConfigError(format!("malformed entry in {}: {}", path.display(), e))
        })?;

        if entry.kind == DB_CONNECTION {
            return entry.key.ok_or_else(|| {
                AppError::ConfigError("database entry has no key".to_string())
            });
        }
    }

    Err(AppError::ConfigError(format!(
        "no database credentials in {}",
        path.display()
    )))
}
