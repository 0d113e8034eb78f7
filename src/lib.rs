//! Smartmarks: a personal bookmark manager whose local list stays in sync
//! with a remote store shared across sessions and devices.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod platform;
pub mod providers;
pub mod rpc_handler;
pub mod services;
pub mod types;
