//! Append-only, capped ledgers backing the operational picture
//!
//! Two containers with the same discipline: insert, re-sort newest first,
//! truncate to the cap. History events are immutable once written; the only
//! in-place mutation anywhere is flipping an alert's acknowledged flag to
//! true, and it never flips back.

pub mod alerts;
pub mod history;

pub use alerts::{Alert, AlertBus, AlertKind, AlertPayload, AmmoReportPayload, NoveltyPayload, Severity};
pub use history::{HistoryEvent, HistoryKind, HistoryLedger};
