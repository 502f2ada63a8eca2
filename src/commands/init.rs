use crate::commands::Out;
use crate::{Config, Result};
use std::path::Path;

/// Creates the data directory and an initial `config.json` that points at `base_url`.
///
/// # Arguments
/// - `ledger_home` - The directory that will hold the configuration, e.g. `$HOME/ledger`
/// - `base_url` - The address of the ledger server, e.g. `http://localhost:8080/api/v1`
///
/// # Errors
/// - Returns an error if `base_url` is not a URL or if any file operations fail.
pub async fn init(ledger_home: &Path, base_url: &str) -> Result<Out<()>> {
    let config = Config::create(ledger_home, base_url).await?;
    Ok(format!(
        "Successfully created the ledger directory and config at '{}'",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ledger");
        let out = init(&home, "http://localhost:8080/api/v1").await.unwrap();
        assert!(out.message().starts_with("Successfully created"));
        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:8080/api/v1/");
    }

    #[tokio::test]
    async fn test_init_bad_url() {
        let dir = TempDir::new().unwrap();
        let err = init(dir.path(), "localhost").await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::Config);
    }
}
