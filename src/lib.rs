// src/lib.rs

pub mod config;
pub mod core;

// Re-export
pub use crate::config::SessionConfig;
pub use crate::core::session::SessionedClient;
