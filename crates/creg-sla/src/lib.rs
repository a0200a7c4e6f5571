//! Creg SLA Engine
//!
//! Working-time SLA accounting for helpdesk tickets.
//!
//! ## Features
//! - Production-calendar awareness (holidays, shortened days)
//! - Business-hours duration arithmetic (09:00-19:00, 09:00-18:00 on
//!   shortened days)
//! - Status-driven pause/resume of the SLA clock
//! - Audit-event replay into total SLA time and time to first response
//! - Violation checks against a (priority, plan) policy table
//!
//! The engine is a pure computation library: it owns no network or CLI
//! surface. Audit events arrive pre-sorted from the ticketing system, the
//! production calendar comes through an injected [`CalendarFeed`], and
//! results go out as [`SlaResult`] rows for the report store.

pub mod calendar;
pub mod policy;
pub mod timeline;
pub mod transition;
pub mod working_time;

pub use calendar::{
    CalendarFeed, CalendarMonth, CalendarYear, FeedError, HolidayCalendar, HolidaySet,
    StaticCalendarFeed,
};
pub use policy::{evaluate, Plan, PolicyTable, Priority, SlaPolicy, SlaResult};
pub use timeline::{AuditEvent, ReplyAuthor, SlaTimeline, SlaTimes};
pub use transition::{classify, SlaEffect};
pub use working_time::WorkingTime;
