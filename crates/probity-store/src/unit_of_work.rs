//! Unit of work
//!
//! Coordinators and snapshotters take a `&UnitOfWork`, and the only way to
//! get one is to begin a transaction. Dropping it without `commit` rolls
//! back.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use probity_core::errors::{ExError, ExErrorKind};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct UnitOfWork<'conn> {
    tx: Transaction<'conn>,
    cancel: CancellationToken,
}

impl<'conn> UnitOfWork<'conn> {
    pub fn begin(conn: &'conn mut Connection, behavior: TransactionBehavior) -> Result<Self> {
        let tx = conn
            .transaction_with_behavior(behavior)
            .map_err(from_rusqlite)?;
        Ok(Self {
            tx,
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail with `Cancelled` if the token has fired
    pub fn ensure_active(&self, stage: &str) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ExError::new(ExErrorKind::Cancelled)
                .with_stage(stage)
                .with_message("cancelled before stage started"));
        }
        Ok(())
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit().map_err(from_rusqlite)
    }

    pub fn rollback(self) -> Result<()> {
        self.tx.rollback().map_err(from_rusqlite)
    }
}

impl Deref for UnitOfWork<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.tx
    }
}
