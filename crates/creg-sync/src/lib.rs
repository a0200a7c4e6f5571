//! Creg Ticket Sync
//!
//! The layer between the helpdesk and the SLA engine: interprets raw
//! audit payloads into [`creg_sla::AuditEvent`]s, fetches the production
//! calendar over HTTP, maps ticket custom fields onto (priority, plan),
//! and drives the per-ticket report batch with fail-and-continue error
//! isolation. The helpdesk REST client itself is an external
//! collaborator behind the [`AuditSource`] trait.

pub mod batch;
pub mod error;
pub mod feed;
pub mod fields;
pub mod ingest;
pub mod report;

pub use batch::{BatchOutcome, SlaBatch, TicketSummary};
pub use error::{Result, SyncError};
pub use feed::HttpCalendarFeed;
pub use fields::{RawCustomField, TicketFields};
pub use ingest::{AuditParser, RawAuditEvent};
pub use report::{AuditSource, ReportSink, TicketReport};
