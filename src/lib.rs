//! anypwa - Wrap any web page as an installable app
//!
//! Generates web app manifests, proxies icons, and scrapes pages for a title
//! and representative icon behind an SSRF guard.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod site;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_refill_task, spawn_sweep_task};
