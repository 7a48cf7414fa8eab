//! Key-value-backed session persistence for tower services.
//!
//! The session cookie carries only a signed session id; the session's value
//! mapping lives in an external key-value store as an opaque serialized blob.
//! A tamper-proofed id, a [`KeyValueBackend`] record keyed by that id, and a
//! strict write-before-cookie ordering on save are the whole contract:
//! clients never receive a cookie for a session that was not persisted, and
//! a corrupt cookie or missing record degrades to a fresh session instead of
//! failing the request.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use axum::{Router, routing::get};
//! use tower_kv_sessions::{
//!     Key, KeyRing, MemoryBackend, Session, SessionConfig, SessionManagerLayer, SessionStore,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = SessionStore::new(
//!         Arc::new(MemoryBackend::new()),
//!         Arc::new(KeyRing::new(Key::generate())),
//!     )
//!     .with_config(SessionConfig::default().with_name("sid"));
//!
//!     let app = Router::new()
//!         .route(
//!             "/",
//!             get(|session: Session| async move {
//!                 let visits: u64 = session.get("visits").unwrap().unwrap_or(0) + 1;
//!                 session.insert("visits", visits).unwrap();
//!                 format!("you have visited {visits} times")
//!             }),
//!         )
//!         .layer(SessionManagerLayer::new(store));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! # Consistency
//!
//! Saves are unconditional overwrites: two concurrent requests for the same
//! session id race and the last writer wins. Backends wanting stronger
//! guarantees can layer a compare-and-swap into their [`KeyValueBackend`]
//! implementation.

mod backend;
mod codec;
mod config;
mod error;
pub mod layer;
mod serializer;
mod session;
mod store;

pub use tower_cookies::{Key, cookie::SameSite};

pub use crate::backend::{KeyValueBackend, MemoryBackend, StoredRecord};
pub use crate::codec::{Codec, KeyRing};
pub use crate::config::SessionConfig;
pub use crate::error::Error;
pub use crate::layer::SessionManagerLayer;
pub use crate::serializer::{JsonSerializer, Serializer, Values};
pub use crate::session::Session;
pub use crate::store::SessionStore;
