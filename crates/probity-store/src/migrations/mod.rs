//! Migration framework
//!
//! Provides:
//! - Migration runner with recorded checksums
//! - Idempotent application; an edited migration body is rejected
//! - Embedded SQL migrations

mod checksums;
mod embedded;
mod runner;

pub use embedded::{get_migrations, Migration};
pub use runner::{applied_migrations, apply_migrations};
