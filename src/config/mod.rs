//! Configuration document: server policy, job list, persistence.
//!
//! The document lives in a single JSON file (`config.json` by default).
//! It is loaded once at startup and rewritten in full after each counted
//! notification, so an external timer can re-run the binary against the
//! same file.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use url::Url;

use crate::error::NotifyError;

/// Top-level document: one server policy and an ordered job list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub servers: ServerPolicy,
    pub jobs: Vec<JobSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerPolicy {
    pub email: EmailPolicy,
    pub endpoint: EndpointPolicy,
    pub syslog: bool,
    /// Seconds to pause between jobs that hit the provider. The exchange
    /// endpoint is a free tier, keep this generous.
    pub delay: u64,
    /// Per-job notification ceiling. Zero means unlimited.
    #[serde(rename = "maximum_email_sent")]
    pub max_notifications: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailPolicy {
    pub enable: bool,
    pub from: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointPolicy {
    /// Symbol listing endpoint, fetched once to build the local catalog.
    pub data_endpoint: String,
    /// Conversion quote endpoint.
    pub exchange_endpoint: String,
}

/// One monitored conversion.
///
/// The decimal values keep the scale they were written with: `0.250` loads
/// as three fractional digits and `10` as zero, and that scale drives how
/// amounts are rendered in alert messages. `comparison` stays a raw string
/// here; operator validity is checked per job at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    pub email: String,
    pub source_coin: String,
    pub target_coin: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub source_value: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub target_value: Decimal,
    pub comparison: String,
    #[serde(rename = "email_sent_count")]
    pub notified_count: u64,
}

/// Field-level patch for one job, applied by `jobs edit`. `None` fields
/// keep their current value.
#[derive(Debug, Default)]
pub struct JobUpdate {
    pub email: Option<String>,
    pub source_coin: Option<String>,
    pub target_coin: Option<String>,
    pub source_value: Option<Decimal>,
    pub target_value: Option<Decimal>,
    pub comparison: Option<String>,
    pub notified_count: Option<u64>,
}

impl JobSpec {
    /// Overwrite the fields the update carries, leaving the rest alone.
    pub fn apply(&mut self, update: JobUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(source_coin) = update.source_coin {
            self.source_coin = source_coin;
        }
        if let Some(target_coin) = update.target_coin {
            self.target_coin = target_coin;
        }
        if let Some(source_value) = update.source_value {
            self.source_value = source_value;
        }
        if let Some(target_value) = update.target_value {
            self.target_value = target_value;
        }
        if let Some(comparison) = update.comparison {
            self.comparison = comparison;
        }
        if let Some(notified_count) = update.notified_count {
            self.notified_count = notified_count;
        }
    }
}

impl ConfigDocument {
    /// Startup validation. Failures here are the only fatal errors the
    /// binary knows.
    pub fn validate(&self) -> Result<(), NotifyError> {
        for (name, value) in [
            ("data_endpoint", &self.servers.endpoint.data_endpoint),
            ("exchange_endpoint", &self.servers.endpoint.exchange_endpoint),
        ] {
            let url = Url::parse(value).map_err(|e| {
                NotifyError::configuration(format!("{} is not a valid URL: {}", name, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(NotifyError::configuration(format!(
                    "{} must be an http(s) URL, got scheme {:?}",
                    name,
                    url.scheme()
                )));
            }
        }

        if self.servers.email.enable && self.servers.email.from.is_empty() {
            return Err(NotifyError::configuration(
                "email.from must be set when email is enabled",
            ));
        }

        Ok(())
    }
}

/// Reads and rewrites the configuration document.
///
/// Rewrites go through a sibling temp file followed by a rename, so a crash
/// mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ConfigDocument, NotifyError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            NotifyError::configuration(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        let doc: ConfigDocument = serde_json::from_str(&raw).map_err(|e| {
            NotifyError::configuration(format!("cannot parse {}: {}", self.path.display(), e))
        })?;
        doc.validate()?;
        Ok(doc)
    }

    pub fn save(&self, doc: &ConfigDocument) -> std::io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut body = serde_json::to_string_pretty(doc)?;
        body.push('\n');

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(body.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

/// Deployment environment, used to pick the log format.
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Configuration document path: `CRYPTONOTIFY_CONFIG` or `config.json`.
pub fn default_config_path() -> PathBuf {
    env::var("CRYPTONOTIFY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"))
}

/// Catalog snapshot path: `CRYPTONOTIFY_CATALOG` or `cryptos.json`.
pub fn default_catalog_path() -> PathBuf {
    env::var("CRYPTONOTIFY_CATALOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("cryptos.json"))
}
