//! Durable audit ledger for the agent kernel.
//!
//! Every dispatched task passes through [`Ledger::record_start`],
//! [`Ledger::record_completion`] or [`Ledger::record_failure`] before a
//! caller can observe its outcome. Storage is SQLite; if the configured
//! path cannot be opened, the ledger transparently falls back to an
//! in-memory database (see [`Ledger::open`]).

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ledger;
mod record;

/// Error type and result alias for ledger operations.
pub use error::{LedgerError, LedgerResult};
/// The ledger itself.
pub use ledger::Ledger;
/// Row and statistics types returned by ledger queries.
pub use record::{LedgerStatistics, TaskRecord, TaskStatus};
