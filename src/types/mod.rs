// Extra bookmark bars shared type definitions
// Each submodule defines types used across the crate.

pub mod bar;
pub mod config;
pub mod drag;
pub mod errors;
pub mod event;
pub mod menu;
pub mod message;
pub mod options;
