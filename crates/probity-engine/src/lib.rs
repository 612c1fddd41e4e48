//! Probity Engine - Orchestration layer
//!
//! Runs snapshot commands against the store: one transaction per command,
//! canonical start/end logging, and configuration loading.

pub mod commands;
pub mod config;

pub use config::{EngineConfig, TransactionMode};
