//! Smartmarks local database layer.
//!
//! Provides SQLite connection management, schema migrations, and
//! [`LocalStore`], a self-contained bookmark backend implementing both the
//! persistence and the change-notification interfaces.
//!
//! # Usage
//!
//! ```no_run
//! use smartmarks::database::{Database, LocalStore};
//!
//! // Open a persistent database
//! let db = Database::open("smartmarks.db").expect("failed to open database");
//!
//! // Or serve bookmarks from an in-memory store for testing
//! let store = LocalStore::open_in_memory().expect("failed to open store");
//! ```

pub mod connection;
pub mod local_store;
pub mod migrations;

pub use connection::Database;
pub use local_store::LocalStore;
