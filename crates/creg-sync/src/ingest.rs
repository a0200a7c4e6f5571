//! Audit Payload Ingestion
//!
//! Interprets raw helpdesk audit rows into engine events. Malformed
//! rows are logged and skipped: one inconsistent ticket must not abort
//! a batch sync, so replay is best-effort.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Deserialize;
use tracing::warn;

use creg_sla::{AuditEvent, ReplyAuthor};

/// Timestamp format of the helpdesk audit feed.
pub const AUDIT_DATE_FORMAT: &str = "%H:%M:%S %d.%m.%Y";

/// Replies from this helpdesk group are client replies.
const CLIENT_GROUP_ID: i64 = 1;

const TICKET_CREATE: &str = "ticket_create";
const STATUS_UPDATE: &str = "status_update";
const TICKET_ANSWER: &str = "ticket_answer";

/// One raw audit row as the helpdesk API delivers it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAuditEvent {
    pub event: String,
    #[serde(default)]
    pub date_created: Option<String>,
    /// Localized event text, keyed by language code.
    #[serde(default)]
    pub text: HashMap<String, String>,
    #[serde(default)]
    pub group_id: Option<i64>,
}

/// Stateless converter from raw audit rows to engine events.
pub struct AuditParser {
    status_change: Regex,
}

impl AuditParser {
    pub fn new() -> Self {
        Self {
            status_change: Regex::new(
                r#"с <strong>"([^"]+)"</strong> на <strong>"([^"]+)"</strong>"#,
            )
            .expect("status-change pattern is valid"),
        }
    }

    /// Converts a pre-sorted row sequence, preserving order. Rows the
    /// engine has no use for (notes, field edits) are dropped silently;
    /// rows with unusable timestamps are dropped with a warning.
    pub fn parse_events(&self, raw: &[RawAuditEvent]) -> Vec<AuditEvent> {
        raw.iter().filter_map(|row| self.parse_event(row)).collect()
    }

    pub fn parse_event(&self, raw: &RawAuditEvent) -> Option<AuditEvent> {
        let stamp = match raw.date_created.as_deref() {
            Some(stamp) => stamp,
            None => {
                warn!("skipping {} audit row without a timestamp", raw.event);
                return None;
            }
        };
        let at = match NaiveDateTime::parse_from_str(stamp, AUDIT_DATE_FORMAT) {
            Ok(at) => at,
            Err(err) => {
                warn!("skipping audit row with bad timestamp {:?}: {}", stamp, err);
                return None;
            }
        };

        match raw.event.as_str() {
            TICKET_CREATE => Some(AuditEvent::TicketCreated { at }),
            STATUS_UPDATE => {
                let text = raw.text.get("ru").map(String::as_str).unwrap_or("");
                let (old, new) = self.parse_status_change(text);
                Some(AuditEvent::StatusChanged { at, old, new })
            }
            TICKET_ANSWER => {
                let author = if raw.group_id == Some(CLIENT_GROUP_ID) {
                    ReplyAuthor::Client
                } else {
                    ReplyAuthor::Staff
                };
                Some(AuditEvent::Reply { at, author })
            }
            _ => None,
        }
    }

    /// Extracts (old, new) from the status-change markup, e.g.
    /// `Статус изменен с <strong>"Открыто"</strong> на <strong>"В работе"</strong>`.
    /// Unmatched text yields `(None, None)` and the transition falls
    /// through to the classifier's continue rule.
    pub fn parse_status_change(&self, text: &str) -> (Option<String>, Option<String>) {
        match self.status_change.captures(text) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str().to_string()),
                caps.get(2).map(|m| m.as_str().to_string()),
            ),
            None => (None, None),
        }
    }
}

impl Default for AuditParser {
    fn default() -> Self {
        Self::new()
    }
}
