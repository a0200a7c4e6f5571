//! Report Seams
//!
//! The collaborator traits the batch runs between: the audit source
//! (ticketing API client, paginated and pre-sorted upstream) and the
//! report sink (per-ticket report persistence behind the dashboard).

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use creg_sla::SlaResult;

use crate::error::Result;
use crate::ingest::RawAuditEvent;

/// Delivers one ticket's audit rows, ordered by timestamp ascending.
/// Ordering is this collaborator's contract; the engine does not sort
/// defensively.
pub trait AuditSource {
    fn events(&self, ticket_id: u64) -> Result<Vec<RawAuditEvent>>;
}

/// Persists per-ticket report rows.
pub trait ReportSink {
    fn upsert(&mut self, report: TicketReport) -> Result<()>;
}

/// One row of the SLA report.
#[derive(Debug, Clone, Serialize)]
pub struct TicketReport {
    pub ticket_id: u64,
    pub report_date: NaiveDate,
    pub subject: String,
    pub status: String,
    pub client_name: String,
    pub priority: String,
    pub plan: String,
    pub cause: String,
    pub module: String,
    pub ci: String,
    pub creation_date: Option<NaiveDateTime>,
    pub closed_date: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub sla: SlaResult,
}
