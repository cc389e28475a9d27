//! Extra bookmark bars: user-configurable bookmark bars injected into every page,
//! kept in step with a synced key-value store.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod message_handler;
pub mod platform;
pub mod services;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
