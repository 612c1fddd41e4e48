//! Database connection management
//!
//! Every connection that runs snapshot statements must go through
//! [`configure`]: it enables foreign keys and registers the identifier
//! generator as the SQL function `probity_gid(tenant_hex, tag)`.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use probity_core::model::{EntityType, GidGenerator, TenantId};
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Name of the identifier-generator SQL function
pub const GID_FUNCTION: &str = "probity_gid";

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn = Connection::open(path).map_err(from_rusqlite)?;
    configure(&conn)?;
    Ok(conn)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(from_rusqlite)?;
    configure(&conn)?;
    Ok(conn)
}

/// Open a database file and bring its schema up to date
pub fn open_and_migrate<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let mut conn = open(path)?;
    apply_migrations(&mut conn)?;
    Ok(conn)
}

/// Apply connection settings and register SQL functions
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(from_rusqlite)?;

    register_gid_function(conn, Arc::new(GidGenerator::new()))
}

/// Register `probity_gid` backed by the given generator
///
/// The function is deliberately not flagged deterministic: SQLite must call
/// it once per row so every copy gets its own identity.
pub fn register_gid_function(conn: &Connection, generator: Arc<GidGenerator>) -> Result<()> {
    conn.create_scalar_function(GID_FUNCTION, 2, FunctionFlags::SQLITE_UTF8, move |ctx| {
        let tenant: String = ctx.get(0)?;
        let tag: i64 = ctx.get(1)?;

        let tenant: TenantId = tenant
            .parse()
            .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
        let entity_type = u16::try_from(tag)
            .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))
            .and_then(|tag| {
                EntityType::from_tag(tag)
                    .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))
            })?;

        Ok(generator.generate(tenant, entity_type).to_string())
    })
    .map_err(from_rusqlite)
}
