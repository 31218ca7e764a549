//! Zero-configuration HTTP file server.
//!
//! This crate serves a local directory over HTTP with browsable listings,
//! a JSON browse API and file downloads, picking the first free listening
//! port at or after the preferred one. It can be used as a standalone
//! binary or embedded in another application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod netinfo;
pub mod port;
pub mod resolve;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

pub use config::Config;
pub use error::ServeError;

use netinfo::NetworkIp;

/// Snapshot of startup state, reported verbatim by `/api/server-info`.
///
/// Captured once before the listener binds and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// Port the server actually listens on
    pub port: u16,
    /// Absolute path of the served directory
    pub serve_dir: String,
    /// Non-loopback IPv4 addresses of the host
    #[serde(rename = "networkIPs")]
    pub network_ips: Vec<NetworkIp>,
    /// Host name
    pub hostname: String,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Root directory to serve files from
    pub root_dir: PathBuf,
    /// Configuration
    pub config: Arc<Config>,
    /// Startup snapshot for `/api/server-info`
    pub info: Arc<ServerInfo>,
}

impl AppState {
    /// Create a new AppState with the given root directory, config and
    /// startup snapshot.
    pub fn new(root_dir: PathBuf, config: Config, info: ServerInfo) -> Self {
        Self {
            root_dir,
            config: Arc::new(config),
            info: Arc::new(info),
        }
    }
}
