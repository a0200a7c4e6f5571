//! Audit-Event Replay
//!
//! Replays one ticket's ordered audit events into total SLA time and
//! time to first response.

use chrono::{Duration, Local, NaiveDateTime};

use crate::transition::{classify, SlaEffect};
use crate::working_time::WorkingTime;

/// Who wrote a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyAuthor {
    Client,
    Staff,
}

/// One entry of a ticket's audit trail, pre-sorted by timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    TicketCreated {
        at: NaiveDateTime,
    },
    StatusChanged {
        at: NaiveDateTime,
        old: Option<String>,
        new: Option<String>,
    },
    Reply {
        at: NaiveDateTime,
        author: ReplyAuthor,
    },
}

impl AuditEvent {
    pub fn at(&self) -> NaiveDateTime {
        match self {
            AuditEvent::TicketCreated { at }
            | AuditEvent::StatusChanged { at, .. }
            | AuditEvent::Reply { at, .. } => *at,
        }
    }
}

/// Replay output: both durations are working time, not wall time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaTimes {
    pub sla_time: Duration,
    pub first_response_time: Duration,
}

/// The SLA clock: accumulated working time plus the cursor it next
/// accumulates from. Created fresh per ticket, never shared.
#[derive(Debug)]
struct SlaClock {
    accumulated: Duration,
    cursor: Option<NaiveDateTime>,
    active: bool,
}

impl SlaClock {
    fn new() -> Self {
        Self {
            accumulated: Duration::zero(),
            cursor: None,
            active: true,
        }
    }

    fn start(&mut self, at: NaiveDateTime) {
        self.cursor = Some(at);
        self.active = true;
    }

    /// Flushes working time up to `at` and stops the clock. A clock that
    /// is already paused stays paused with nothing flushed.
    fn pause(&mut self, working: &WorkingTime, at: NaiveDateTime) {
        if self.active {
            self.accumulated += working.between_opt(self.cursor, Some(at));
        }
        self.active = false;
    }

    /// Restarts accumulation from `at`. Resuming an already-running clock
    /// leaves the cursor alone so no interval is dropped.
    fn resume(&mut self, at: NaiveDateTime) {
        if !self.active {
            self.active = true;
            self.cursor = Some(at);
        }
    }
}

/// Replays audit events through the status state machine.
#[derive(Clone)]
pub struct SlaTimeline {
    working: WorkingTime,
}

impl SlaTimeline {
    pub fn new(working: WorkingTime) -> Self {
        Self { working }
    }

    /// Replays `events` with the wall clock as the evaluation instant.
    ///
    /// Open tickets keep accruing SLA time up to the moment of
    /// evaluation; closed tickets are unaffected by the choice of `now`.
    pub fn compute(&self, events: &[AuditEvent]) -> SlaTimes {
        self.compute_at(events, Local::now().naive_local())
    }

    /// Deterministic replay against an explicit evaluation instant.
    pub fn compute_at(&self, events: &[AuditEvent], now: NaiveDateTime) -> SlaTimes {
        let mut clock = SlaClock::new();
        let mut created: Option<NaiveDateTime> = None;
        let mut first_response: Option<Duration> = None;

        for event in events {
            match event {
                AuditEvent::TicketCreated { at } => {
                    created = Some(*at);
                    clock.start(*at);
                }
                AuditEvent::StatusChanged { at, old, new } => {
                    match classify(old.as_deref(), new.as_deref()) {
                        SlaEffect::Ignore | SlaEffect::Continue => {}
                        SlaEffect::Pause => clock.pause(&self.working, *at),
                        SlaEffect::Resume => clock.resume(*at),
                    }
                }
                AuditEvent::Reply {
                    at,
                    author: ReplyAuthor::Staff,
                } if first_response.is_none() => {
                    first_response = Some(self.working.between_opt(created, Some(*at)));
                }
                AuditEvent::Reply { .. } => {}
            }
        }

        // A still-active clock means the ticket is open: accrue to now.
        if clock.cursor.is_some() {
            clock.pause(&self.working, now);
        }

        let sla_time = clock.accumulated;
        // Known approximation: tickets closed without any staff reply
        // report the full SLA time as their response time.
        let first_response_time = first_response.unwrap_or(sla_time);
        SlaTimes {
            sla_time,
            first_response_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CalendarMonth, CalendarYear, HolidayCalendar, StaticCalendarFeed};
    use crate::transition::{
        STATUS_AWAITING_CLIENT, STATUS_DONE, STATUS_IN_PROGRESS, STATUS_OPEN,
    };
    use chrono::NaiveDate;
    use std::sync::Arc;

    /// June 2024 with the real weekends marked non-working.
    fn timeline() -> SlaTimeline {
        let feed = StaticCalendarFeed::new([CalendarYear {
            year: 2024,
            months: vec![CalendarMonth {
                month: 6,
                days: "1,2,8,9,15,16,22,23,29,30".to_string(),
            }],
        }]);
        SlaTimeline::new(WorkingTime::new(Arc::new(HolidayCalendar::new(feed))))
    }

    fn dt(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn status(at: NaiveDateTime, old: &str, new: &str) -> AuditEvent {
        AuditEvent::StatusChanged {
            at,
            old: Some(old.to_string()),
            new: Some(new.to_string()),
        }
    }

    #[test]
    fn test_full_ticket_lifecycle() {
        // Created Monday 09:00, first staff reply 11:00, awaiting client
        // 11:30 until Wednesday 09:00, done Wednesday 10:00.
        let events = vec![
            AuditEvent::TicketCreated { at: dt(3, 9, 0) },
            status(dt(3, 9, 5), STATUS_OPEN, STATUS_IN_PROGRESS),
            AuditEvent::Reply {
                at: dt(3, 11, 0),
                author: ReplyAuthor::Staff,
            },
            status(dt(3, 11, 30), STATUS_IN_PROGRESS, STATUS_AWAITING_CLIENT),
            status(dt(5, 9, 0), STATUS_AWAITING_CLIENT, STATUS_IN_PROGRESS),
            status(dt(5, 10, 0), STATUS_IN_PROGRESS, STATUS_DONE),
        ];
        let times = timeline().compute_at(&events, dt(6, 12, 0));
        assert_eq!(times.first_response_time, Duration::hours(2));
        // 2h30m on Monday plus 1h on Wednesday; awaiting-client excluded
        assert_eq!(times.sla_time, Duration::minutes(210));
    }

    #[test]
    fn test_closed_ticket_ignores_evaluation_instant() {
        let events = vec![
            AuditEvent::TicketCreated { at: dt(3, 9, 0) },
            status(dt(3, 12, 0), STATUS_IN_PROGRESS, STATUS_DONE),
        ];
        let tl = timeline();
        let a = tl.compute_at(&events, dt(4, 9, 0));
        let b = tl.compute_at(&events, dt(28, 18, 0));
        assert_eq!(a, b);
        assert_eq!(a.sla_time, Duration::hours(3));
    }

    #[test]
    fn test_open_ticket_accrues_to_now() {
        let events = vec![AuditEvent::TicketCreated { at: dt(3, 9, 0) }];
        let times = timeline().compute_at(&events, dt(3, 15, 0));
        assert_eq!(times.sla_time, Duration::hours(6));
    }

    #[test]
    fn test_client_reply_is_not_first_response() {
        let events = vec![
            AuditEvent::TicketCreated { at: dt(3, 9, 0) },
            AuditEvent::Reply {
                at: dt(3, 10, 0),
                author: ReplyAuthor::Client,
            },
            AuditEvent::Reply {
                at: dt(3, 11, 0),
                author: ReplyAuthor::Staff,
            },
            status(dt(3, 12, 0), STATUS_IN_PROGRESS, STATUS_DONE),
        ];
        let times = timeline().compute_at(&events, dt(4, 9, 0));
        assert_eq!(times.first_response_time, Duration::hours(2));
    }

    #[test]
    fn test_only_first_staff_reply_counts() {
        let events = vec![
            AuditEvent::TicketCreated { at: dt(3, 9, 0) },
            AuditEvent::Reply {
                at: dt(3, 10, 0),
                author: ReplyAuthor::Staff,
            },
            AuditEvent::Reply {
                at: dt(3, 14, 0),
                author: ReplyAuthor::Staff,
            },
            status(dt(3, 15, 0), STATUS_IN_PROGRESS, STATUS_DONE),
        ];
        let times = timeline().compute_at(&events, dt(4, 9, 0));
        assert_eq!(times.first_response_time, Duration::hours(1));
    }

    #[test]
    fn test_no_staff_reply_falls_back_to_sla_time() {
        let events = vec![
            AuditEvent::TicketCreated { at: dt(3, 9, 0) },
            status(dt(3, 13, 0), STATUS_IN_PROGRESS, STATUS_DONE),
        ];
        let times = timeline().compute_at(&events, dt(4, 9, 0));
        assert_eq!(times.sla_time, Duration::hours(4));
        assert_eq!(times.first_response_time, times.sla_time);
    }

    #[test]
    fn test_awaiting_client_interval_never_accrues() {
        let events = vec![
            AuditEvent::TicketCreated { at: dt(3, 9, 0) },
            status(dt(3, 10, 0), STATUS_IN_PROGRESS, STATUS_AWAITING_CLIENT),
            status(dt(4, 10, 0), STATUS_AWAITING_CLIENT, STATUS_IN_PROGRESS),
            status(dt(4, 11, 0), STATUS_IN_PROGRESS, STATUS_DONE),
        ];
        let times = timeline().compute_at(&events, dt(5, 9, 0));
        assert_eq!(times.sla_time, Duration::hours(2));
    }

    #[test]
    fn test_intake_transition_does_not_double_count() {
        let with_intake = vec![
            AuditEvent::TicketCreated { at: dt(3, 9, 0) },
            status(dt(3, 9, 10), STATUS_OPEN, STATUS_IN_PROGRESS),
            status(dt(3, 12, 0), STATUS_IN_PROGRESS, STATUS_DONE),
        ];
        let without_intake = vec![
            AuditEvent::TicketCreated { at: dt(3, 9, 0) },
            status(dt(3, 12, 0), STATUS_IN_PROGRESS, STATUS_DONE),
        ];
        let tl = timeline();
        assert_eq!(
            tl.compute_at(&with_intake, dt(4, 9, 0)),
            tl.compute_at(&without_intake, dt(4, 9, 0))
        );
    }

    #[test]
    fn test_double_pause_flushes_once() {
        let events = vec![
            AuditEvent::TicketCreated { at: dt(3, 9, 0) },
            status(dt(3, 10, 0), STATUS_IN_PROGRESS, STATUS_AWAITING_CLIENT),
            // second pause while already paused must not re-flush
            status(dt(3, 14, 0), STATUS_IN_PROGRESS, STATUS_AWAITING_CLIENT),
            status(dt(4, 9, 0), STATUS_AWAITING_CLIENT, STATUS_DONE),
        ];
        let times = timeline().compute_at(&events, dt(5, 9, 0));
        assert_eq!(times.sla_time, Duration::hours(1));
    }

    #[test]
    fn test_empty_event_stream_is_zero() {
        let times = timeline().compute_at(&[], dt(3, 12, 0));
        assert_eq!(times.sla_time, Duration::zero());
        assert_eq!(times.first_response_time, Duration::zero());
    }
}
