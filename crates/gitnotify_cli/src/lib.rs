//! gitnotify-config library exports.
//!
//! The binary is a thin wrapper; command implementations live here so they
//! can be tested without spawning a process.

pub mod commands;
pub mod config;
pub mod errors;
pub mod render;
