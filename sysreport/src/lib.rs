//! Host metric logging and daily PDF reporting.
//!
//! The Collector ([`collector::run_collector`]) samples the machine once and
//! appends a row to a CSV log. The Reporter ([`reporter::run_reporter`])
//! averages that log, renders a one-page summary with a detail table and
//! posts it to a webhook.

pub mod alert;
pub mod collector;
pub mod config;
pub mod delivery;
pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod reporter;
pub mod sensors;
pub mod speedtest;
pub mod summary;
