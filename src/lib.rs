//! Crypto rate alert poller.
//!
//! Resolves configured coin pairs against a cached symbol catalog, fetches
//! conversion quotes from the exchange endpoint and emails an alert when a
//! monitored target is reached. One invocation performs one pass over the
//! job list; scheduling is left to an external timer (cron or systemd).

pub mod catalog;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod models;
pub mod services;
