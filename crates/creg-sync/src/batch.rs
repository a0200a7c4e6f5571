//! SLA Report Batch
//!
//! Per-ticket orchestration: fetch audit rows, replay them through the
//! engine, evaluate the policy and sink the report row. One ticket's
//! failure is logged and the batch moves on; nothing aborts the run.

use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime};
use tracing::{error, info};

use creg_sla::{
    HolidayCalendar, Plan, PolicyTable, Priority, SlaResult, SlaTimeline, WorkingTime,
};

use crate::error::Result;
use crate::fields::{self, RawCustomField};
use crate::ingest::AuditParser;
use crate::report::{AuditSource, ReportSink, TicketReport};

/// Maintenance-release tickets ("Обновление") are excluded from SLA
/// reporting.
pub const UPDATE_TYPE_ID: i64 = 9;

/// What the batch needs to know about one ticket up front. The listing
/// comes from the ticketing API collaborator.
#[derive(Debug, Clone)]
pub struct TicketSummary {
    pub ticket_id: u64,
    pub type_id: i64,
    pub subject: String,
    pub status: String,
    pub client_name: String,
    pub priority_label: String,
    pub creation_date: Option<NaiveDateTime>,
    pub closed_date: Option<NaiveDateTime>,
    pub custom_fields: Vec<RawCustomField>,
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Drives one sync run over a ticket listing.
pub struct SlaBatch<S, K> {
    source: S,
    sink: K,
    policies: PolicyTable,
    calendar: Arc<HolidayCalendar>,
    parser: AuditParser,
}

impl<S: AuditSource, K: ReportSink> SlaBatch<S, K> {
    pub fn new(source: S, sink: K, policies: PolicyTable, calendar: Arc<HolidayCalendar>) -> Self {
        Self {
            source,
            sink,
            policies,
            calendar,
            parser: AuditParser::new(),
        }
    }

    /// Processes every ticket in the listing against the evaluation
    /// instant `now`.
    pub fn run(&mut self, tickets: &[TicketSummary], now: NaiveDateTime) -> BatchOutcome {
        // Warm the holiday cache before the hot loop so the per-ticket
        // walk never blocks on the feed for the current year.
        self.calendar.get(now.date().year());

        let mut outcome = BatchOutcome::default();
        for ticket in tickets {
            if ticket.type_id == UPDATE_TYPE_ID {
                info!(
                    "ticket {} is a maintenance release, excluded from SLA reporting",
                    ticket.ticket_id
                );
                outcome.skipped += 1;
                continue;
            }
            match self.process_ticket(ticket, now) {
                Ok(()) => outcome.processed += 1,
                Err(err) => {
                    error!("ticket {} failed, continuing batch: {}", ticket.ticket_id, err);
                    outcome.failed += 1;
                }
            }
        }
        info!(
            "sync run finished: {} processed, {} skipped, {} failed",
            outcome.processed, outcome.skipped, outcome.failed
        );
        outcome
    }

    fn process_ticket(&mut self, ticket: &TicketSummary, now: NaiveDateTime) -> Result<()> {
        let raw = self.source.events(ticket.ticket_id)?;
        let events = self.parser.parse_events(&raw);

        let timeline = SlaTimeline::new(WorkingTime::new(self.calendar.clone()));
        let times = timeline.compute_at(&events, now);

        let fields = fields::extract(&ticket.custom_fields);
        let result = match (
            Priority::from_label(&ticket.priority_label),
            Plan::from_label(&fields.plan),
        ) {
            (Some(priority), Some(plan)) => self.policies.evaluate(priority, plan, &times),
            _ => {
                error!(
                    "ticket {} has unmapped priority {:?} or plan {:?}; reporting no violation",
                    ticket.ticket_id, ticket.priority_label, fields.plan
                );
                SlaResult::unevaluated(&times)
            }
        };

        self.sink.upsert(TicketReport {
            ticket_id: ticket.ticket_id,
            report_date: now.date(),
            subject: ticket.subject.clone(),
            status: ticket.status.clone(),
            client_name: ticket.client_name.clone(),
            priority: ticket.priority_label.clone(),
            plan: fields.plan,
            cause: fields.cause,
            module: fields.module,
            ci: fields.ci,
            creation_date: ticket.creation_date,
            closed_date: ticket.closed_date,
            sla: result,
        })
    }
}
