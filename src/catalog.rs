//! Symbol catalog: maps coin symbols to provider ids.
//!
//! The provider's listing endpoint serves a snapshot that is cached on disk
//! (`cryptos.json`). Rows arrive as positional arrays and occasionally grow
//! extra elements, so decoding tolerates anything past the third slot.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::services::market_data::RateSource;

/// Id returned for symbols absent from the catalog. Never sent upstream;
/// callers treat it as "skip this job".
pub const UNRESOLVED_ID: i64 = 0;

/// Days after which the cached snapshot draws an ageing warning. Provider
/// ids drift as listings change.
const STALE_AFTER_DAYS: i64 = 30;

/// One catalog row, decoded from an `[id, name, symbol, ...]` array.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    pub symbol: String,
}

impl<'de> Deserialize<'de> for CatalogEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = CatalogEntry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of [id, name, symbol, ...]")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<CatalogEntry, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let id = seq
                    .next_element::<i64>()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let name = seq
                    .next_element::<String>()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let symbol = seq
                    .next_element::<String>()?
                    .ok_or_else(|| de::Error::invalid_length(2, &self))?;
                // Drain whatever else the provider appended to the row.
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(CatalogEntry { id, name, symbol })
            }
        }

        deserializer.deserialize_seq(EntryVisitor)
    }
}

/// In-memory symbol table built from the cached snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolCatalog {
    pub values: Vec<CatalogEntry>,
}

impl SymbolCatalog {
    /// Resolve a coin symbol to its provider id.
    ///
    /// Matching is case-insensitive and the first catalog row wins when a
    /// symbol appears more than once. Unknown symbols resolve to
    /// [`UNRESOLVED_ID`].
    pub fn resolve(&self, symbol: &str) -> i64 {
        for entry in &self.values {
            if entry.symbol.eq_ignore_ascii_case(symbol) {
                return entry.id;
            }
        }
        UNRESOLVED_ID
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Disk cache for the symbol snapshot.
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog, fetching and persisting a snapshot first when
    /// nothing is cached yet.
    pub async fn load_or_fetch(
        &self,
        source: &dyn RateSource,
    ) -> Result<SymbolCatalog, NotifyError> {
        if !self.path.exists() {
            info!(
                path = %self.path.display(),
                "No symbol catalog at {}, fetching a snapshot",
                self.path.display()
            );
            self.refresh(source).await?;
        } else {
            self.warn_if_stale();
        }

        let raw = fs::read_to_string(&self.path).map_err(|e| {
            NotifyError::configuration(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        let catalog: SymbolCatalog = serde_json::from_str(&raw).map_err(|e| {
            NotifyError::configuration(format!("cannot parse {}: {}", self.path.display(), e))
        })?;
        info!(
            symbols = catalog.len(),
            "Symbol catalog loaded with {} entries",
            catalog.len()
        );
        Ok(catalog)
    }

    /// Fetch a fresh snapshot and persist the provider body verbatim,
    /// through a temp file and rename like every other write.
    pub async fn refresh(&self, source: &dyn RateSource) -> Result<(), NotifyError> {
        let body = source.symbol_snapshot().await?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(parent).map_err(NotifyError::Persistence)?;
        tmp.write_all(body.as_bytes())
            .map_err(NotifyError::Persistence)?;
        tmp.as_file().sync_all().map_err(NotifyError::Persistence)?;
        tmp.persist(&self.path)
            .map_err(|e| NotifyError::Persistence(e.error))?;

        info!(
            path = %self.path.display(),
            bytes = body.len(),
            "Symbol catalog snapshot written to {}",
            self.path.display()
        );
        Ok(())
    }

    fn warn_if_stale(&self) {
        let modified = fs::metadata(&self.path).and_then(|m| m.modified());
        if let Ok(modified) = modified {
            let age = Utc::now().signed_duration_since(DateTime::<Utc>::from(modified));
            if age.num_days() >= STALE_AFTER_DAYS {
                warn!(
                    path = %self.path.display(),
                    age_days = age.num_days(),
                    "Symbol catalog is {} days old, run `catalog refresh` to renew it",
                    age.num_days()
                );
            }
        }
    }
}
