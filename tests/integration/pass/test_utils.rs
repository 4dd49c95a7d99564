//! Test utilities for pass integration tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lettre::Message;
use tempfile::TempDir;
use tokio::time::Instant;

use cryptonotify::catalog::CatalogStore;
use cryptonotify::config::ConfigStore;
use cryptonotify::error::{DispatchError, NotifyError};
use cryptonotify::jobs::{JobContext, JobLedger, PassRunner};
use cryptonotify::services::coinmarketcap::CmcRateSource;
use cryptonotify::services::mailer::{Dispatcher, Mailer};
use cryptonotify::services::market_data::{QuoteRequest, RateSource};

/// Mailer that keeps everything handed to it, optionally refusing.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Message>>,
    pub refuse: AtomicBool,
}

impl RecordingMailer {
    pub fn refusing() -> Self {
        let mailer = Self::default();
        mailer.refuse.store(true, Ordering::SeqCst);
        mailer
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn rendered(&self, index: usize) -> String {
        let sent = self.sent.lock().unwrap();
        String::from_utf8_lossy(&sent[index].formatted()).to_string()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn deliver(&self, message: Message) -> Result<(), DispatchError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(DispatchError::Address {
                address: "relay".to_string(),
                source: "refused".parse::<lettre::Address>().unwrap_err(),
            });
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// In-process rate source serving canned payloads, stamping each quote
/// fetch with the instant it happened.
pub struct CannedSource {
    catalog: String,
    quote: String,
    pub fetched_at: Mutex<Vec<Instant>>,
}

impl CannedSource {
    pub fn new(catalog: &str, quote: &str) -> Self {
        Self {
            catalog: catalog.to_string(),
            quote: quote.to_string(),
            fetched_at: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RateSource for CannedSource {
    async fn exchange_quote(&self, _request: &QuoteRequest) -> Result<String, NotifyError> {
        self.fetched_at.lock().unwrap().push(Instant::now());
        Ok(self.quote.clone())
    }

    async fn symbol_snapshot(&self) -> Result<String, NotifyError> {
        Ok(self.catalog.clone())
    }
}

/// A ready-to-run pass over a temp config, a file-backed catalog and a
/// recording mailer.
pub struct TestPass {
    pub runner: PassRunner,
    pub mailbox: Arc<RecordingMailer>,
    pub store: ConfigStore,
    #[allow(dead_code)]
    pub dir: TempDir,
}

/// Catalog snapshot used by every pass test.
pub fn catalog_body() -> &'static str {
    r#"{"values": [
        [1, "Bitcoin", "BTC"],
        [1027, "Ethereum", "ETH"],
        [2781, "United States Dollar", "USD"],
        [2790, "Euro", "EUR"]
    ]}"#
}

/// Conversion payload in the provider's wire shape.
pub fn conversion_body(
    source: &str,
    source_id: i64,
    target: &str,
    target_id: i64,
    amount: &str,
    rate: &str,
) -> String {
    format!(
        r#"{{"data": {{"symbol": "{}", "id": "{}", "amount": {}, "quote": [{{"cryptoId": {}, "symbol": "{}", "price": {}}}]}}}}"#,
        source, source_id, amount, target_id, target, rate
    )
}

pub fn config_with_jobs(server_uri: &str, max: u64, jobs: &[String]) -> String {
    format!(
        r#"{{
  "servers": {{
    "email": {{
      "enable": true,
      "from": "alerts@example.com",
      "host": "localhost",
      "port": 25,
      "username": "",
      "password": ""
    }},
    "endpoint": {{
      "data_endpoint": "{uri}/data",
      "exchange_endpoint": "{uri}/exchange"
    }},
    "syslog": false,
    "delay": 0,
    "maximum_email_sent": {max}
  }},
  "jobs": [{jobs}]
}}"#,
        uri = server_uri,
        max = max,
        jobs = jobs.join(", ")
    )
}

pub fn job_json(
    email: &str,
    source: &str,
    target: &str,
    source_value: &str,
    target_value: &str,
    comparison: &str,
    count: u64,
) -> String {
    format!(
        r#"{{"email": "{}", "source_coin": "{}", "target_coin": "{}", "source_value": {}, "target_value": {}, "comparison": "{}", "email_sent_count": {}}}"#,
        email, source, target, source_value, target_value, comparison, count
    )
}

/// Build a pass around a recording mailer.
pub async fn build_pass(config_json: &str) -> TestPass {
    let mailbox = Arc::new(RecordingMailer::default());
    let dispatcher = Dispatcher::new(mailbox.clone(), "alerts@example.com");
    build_pass_with(config_json, mailbox, dispatcher).await
}

/// Build a pass around an explicit dispatcher (disabled, refusing, ...).
pub async fn build_pass_with(
    config_json: &str,
    mailbox: Arc<RecordingMailer>,
    dispatcher: Dispatcher,
) -> TestPass {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, config_json).unwrap();
    let catalog_path = dir.path().join("cryptos.json");
    std::fs::write(&catalog_path, catalog_body()).unwrap();

    let store = ConfigStore::new(&config_path);
    let doc = store.load().unwrap();

    let source = Arc::new(CmcRateSource::new(&doc.servers.endpoint));
    let catalog = CatalogStore::new(&catalog_path)
        .load_or_fetch(source.as_ref())
        .await
        .unwrap();

    let ledger = JobLedger::new(doc, store.clone());
    let ctx = JobContext::new(source, dispatcher);
    let runner = PassRunner::new(ctx, catalog, ledger);

    TestPass {
        runner,
        mailbox,
        store,
        dir,
    }
}

/// Build a pass over an in-process source, for tests that need exact
/// control of time or payloads without the HTTP stack.
pub async fn build_pass_over(
    config_json: &str,
    source: Arc<CannedSource>,
    dispatcher: Dispatcher,
) -> (PassRunner, TempDir) {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, config_json).unwrap();

    let store = ConfigStore::new(&config_path);
    let doc = store.load().unwrap();

    let catalog = CatalogStore::new(dir.path().join("cryptos.json"))
        .load_or_fetch(source.as_ref())
        .await
        .unwrap();

    let ledger = JobLedger::new(doc, store);
    let ctx = JobContext::new(source, dispatcher);
    (PassRunner::new(ctx, catalog, ledger), dir)
}
