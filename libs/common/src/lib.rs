//! Common library for the SB Dev Studio admin client
//!
//! This crate provides shared functionality used by the session, gateway and
//! dashboard crates: durable key/value storage for the session token, client
//! configuration, view lifecycle scopes and logging setup.
//!
//! # Example
//!
//! ```rust,no_run
//! use common::config::ClientConfig;
//! use common::storage::{FileStore, KeyValueStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env()?;
//!     let store = FileStore::open(&config.storage_dir)?;
//!     store.set("greeting", "hello")?;
//!     println!("Stored value: {:?}", store.get("greeting")?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod storage;
pub mod telemetry;
