//! # Fangate
//!
//! A creator monetization server: creators list videos, bundle them, or sell
//! monthly subscriptions; viewers unlock content by free tier, individual
//! purchase, bundle purchase, or subscription. Usable both as a standalone
//! binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! fangate = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fangate::payment::StubProcessor;
//! use fangate::server::{AppState, create_router};
//! use fangate::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/fangate.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), Arc::new(StubProcessor)));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI entrypoint. Disable with
//!   `default-features = false`.

pub mod access;
pub mod auth;
pub mod config;
pub mod entitlements;
pub mod error;
pub mod payment;
pub mod server;
pub mod store;
pub mod types;
