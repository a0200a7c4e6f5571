//! Status Transition Classification
//!
//! Maps a helpdesk status change onto its effect on the SLA clock. The
//! clock must not run while the ball is in the client's court, and the
//! intake transition "Открыто" -> "В работе" is cosmetic noise that must
//! not cause double-counting.

/// Newly registered ticket.
pub const STATUS_OPEN: &str = "Открыто";
/// Ticket picked up by support.
pub const STATUS_IN_PROGRESS: &str = "В работе";
/// Waiting for the client to reply; the SLA clock stops here.
pub const STATUS_AWAITING_CLIENT: &str = "Ожидание ответа от клиента";
/// Resolved ticket.
pub const STATUS_DONE: &str = "Выполнено";

/// Effect of one status change on SLA accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaEffect {
    /// No SLA meaning at all (intake noise).
    Ignore,
    /// Flush time accumulated so far, then stop the clock.
    Pause,
    /// Restart the clock from this event's timestamp.
    Resume,
    /// Keep the clock in whatever state it is in.
    Continue,
}

/// Classifies a status change. First matching rule wins.
///
/// Statuses are `None` when the audit payload carried no parseable
/// status pair; such events fall through to [`SlaEffect::Continue`].
pub fn classify(old: Option<&str>, new: Option<&str>) -> SlaEffect {
    // Intake noise: the ticket was just taken into work.
    if old == Some(STATUS_OPEN) && new == Some(STATUS_IN_PROGRESS) {
        return SlaEffect::Ignore;
    }
    // Waiting on the client stops the clock.
    if new == Some(STATUS_AWAITING_CLIENT) {
        return SlaEffect::Pause;
    }
    // Client came back and the ticket is not done: clock restarts.
    if old == Some(STATUS_AWAITING_CLIENT) && new != Some(STATUS_DONE) {
        return SlaEffect::Resume;
    }
    // Resolution stops the clock.
    if new == Some(STATUS_DONE) {
        return SlaEffect::Pause;
    }
    SlaEffect::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_transition_ignored() {
        assert_eq!(
            classify(Some(STATUS_OPEN), Some(STATUS_IN_PROGRESS)),
            SlaEffect::Ignore
        );
    }

    #[test]
    fn test_awaiting_client_pauses() {
        assert_eq!(
            classify(Some(STATUS_IN_PROGRESS), Some(STATUS_AWAITING_CLIENT)),
            SlaEffect::Pause
        );
        // pause wins even coming straight from intake
        assert_eq!(
            classify(Some(STATUS_OPEN), Some(STATUS_AWAITING_CLIENT)),
            SlaEffect::Pause
        );
    }

    #[test]
    fn test_leaving_awaiting_client_resumes() {
        assert_eq!(
            classify(Some(STATUS_AWAITING_CLIENT), Some(STATUS_IN_PROGRESS)),
            SlaEffect::Resume
        );
    }

    #[test]
    fn test_awaiting_client_to_done_pauses() {
        // rule order: closing from the waiting state is a pause, not a resume
        assert_eq!(
            classify(Some(STATUS_AWAITING_CLIENT), Some(STATUS_DONE)),
            SlaEffect::Pause
        );
    }

    #[test]
    fn test_done_pauses() {
        assert_eq!(
            classify(Some(STATUS_IN_PROGRESS), Some(STATUS_DONE)),
            SlaEffect::Pause
        );
    }

    #[test]
    fn test_unknown_transitions_continue() {
        assert_eq!(
            classify(Some("В работе"), Some("Эскалация")),
            SlaEffect::Continue
        );
        assert_eq!(classify(None, None), SlaEffect::Continue);
    }
}
