//! Configuration file handling for the ledger client.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json` and holds the address of the
//! ledger server and request settings. The logged-in user is kept next to it in
//! `$LEDGER_HOME/session.json`.

use crate::error::{ErrorType, IntoResult, Res};
use crate::session::Session;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "ledger";
const CONFIG_VERSION: u8 = 1;
const TIMEOUT_SECS: u64 = 30;
const CONFIG_JSON: &str = "config.json";
const SESSION_JSON: &str = "session.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_HOME` and from there it loads `$LEDGER_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    base_url: Url,
}

impl Config {
    /// Creates the `$LEDGER_HOME` directory and an initial `config.json` pointing at `base_url`.
    ///
    /// # Errors
    /// - Returns an error if `base_url` is not a valid URL or if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, base_url: &str) -> Result<Self> {
        Self::create_inner(dir.into(), base_url)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(maybe_relative: PathBuf, base_url: &str) -> Res<Self> {
        let base_url = parse_base_url(base_url)?;
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            base_url: base_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            base_url,
        })
    }

    /// This will
    /// - validate that `ledger_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(ledger_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Ledger home is missing, run 'ledger init' first")?;
        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let base_url = parse_base_url(&config_file.base_url)?;
        Ok(Self {
            root,
            config_path,
            config_file,
            base_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_JSON)
    }

    /// The server address all endpoints are resolved against. Always ends with a `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.timeout_secs)
    }

    /// Loads the logged-in user. Fails with `ErrorType::Session` when nobody is logged in.
    pub async fn session(&self) -> Result<Session> {
        Session::load(&self.session_path()).await
    }
}

/// Parses the server address and makes sure relative endpoint paths join onto it rather than
/// replacing its last segment.
fn parse_base_url(s: &str) -> Res<Url> {
    let mut url = Url::parse(s).with_context(|| format!("Invalid base_url '{s}'"))?;
    if url.cannot_be_a_base() {
        bail!("The base_url '{s}' cannot be used as a base for requests");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger",
///   "config_version": 1,
///   "base_url": "http://localhost:8080/api/v1/",
///   "timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Address of the ledger server
    base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    TIMEOUT_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            base_url: String::new(),
            timeout_secs: TIMEOUT_SECS,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ledger_home");
        let created = Config::create(&home, "http://localhost:8080/api/v1")
            .await
            .unwrap();
        assert_eq!(created.base_url().as_str(), "http://localhost:8080/api/v1/");
        assert!(created.config_path().is_file());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.base_url(), created.base_url());
        assert_eq!(loaded.timeout(), Duration::from_secs(30));
        assert_eq!(loaded.session_path(), loaded.root().join("session.json"));
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let err = Config::create(dir.path(), "not a url").await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::Config);
        assert!(err.to_string().contains("Invalid base_url"));
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::Config);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "base_url": "http://localhost/"
        }"#;
        utils::write(&path, json).await.unwrap();
        let result = ConfigFile::load(&path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_minimal_uses_default_timeout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{"app_name": "ledger", "config_version": 1, "base_url": "https://x.io"}"#;
        utils::write(&path, json).await.unwrap();
        let config = ConfigFile::load(&path).await.unwrap();
        assert_eq!(config.timeout_secs, TIMEOUT_SECS);
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("https://ledger.example.com/api").unwrap();
        assert_eq!(
            url.join("transections/get-transection").unwrap().as_str(),
            "https://ledger.example.com/api/transections/get-transection"
        );
        assert!(parse_base_url("mailto:someone@example.com").is_err());
    }

    #[tokio::test]
    async fn test_session_requires_login() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), "http://localhost/").await.unwrap();
        let err = config.session().await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::Session);
        Session::new("u1").save(&config.session_path()).await.unwrap();
        assert_eq!(config.session().await.unwrap().user_id(), "u1");
    }
}
