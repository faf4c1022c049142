//! Report lifecycle state machine.
//!
//! Legal transitions:
//!
//! ```text
//! pending_approval ── assign ──▶ assigned ── assign maintainer ──▶ in_progress ── resolve ──▶ resolved
//!        │
//!        └── reject ──▶ rejected
//! ```
//!
//! `rejected` and `resolved` are terminal. Every transition is
//! caller-initiated; nothing moves a report implicitly. Who may trigger each
//! action is the authorization gate's concern, not this module's.

use crate::features::reports::models::ReportStatus;

/// A caller-initiated lifecycle action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    /// Officer assigns the report to a technical officer
    Assign,
    /// Officer rejects the report (a reason is validated upstream)
    Reject,
    /// Technical officer hands the report to an external maintainer
    AssignMaintainer,
    /// The assigned maintainer closes the report out
    Resolve,
}

impl std::fmt::Display for ReportAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportAction::Assign => write!(f, "assign"),
            ReportAction::Reject => write!(f, "reject"),
            ReportAction::AssignMaintainer => write!(f, "assign maintainer"),
            ReportAction::Resolve => write!(f, "resolve"),
        }
    }
}

/// The attempted action is not defined for the report's current status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: ReportStatus,
    pub action: ReportAction,
}

impl std::fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cannot {} a report in status '{}'",
            self.action, self.from
        )
    }
}

/// Whether no further transition is defined from this status
pub fn is_terminal(status: ReportStatus) -> bool {
    matches!(status, ReportStatus::Rejected | ReportStatus::Resolved)
}

/// Apply a lifecycle action to the current status, yielding the next status.
/// Anything outside the transition table is an `InvalidTransition`.
pub fn apply(from: ReportStatus, action: ReportAction) -> Result<ReportStatus, InvalidTransition> {
    match (from, action) {
        (ReportStatus::PendingApproval, ReportAction::Assign) => Ok(ReportStatus::Assigned),
        (ReportStatus::PendingApproval, ReportAction::Reject) => Ok(ReportStatus::Rejected),
        (ReportStatus::Assigned, ReportAction::AssignMaintainer) => Ok(ReportStatus::InProgress),
        (ReportStatus::InProgress, ReportAction::Resolve) => Ok(ReportStatus::Resolved),
        _ => Err(InvalidTransition { from, action }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReportAction::*;
    use ReportStatus::*;

    #[test]
    fn test_legal_transitions() {
        assert_eq!(apply(PendingApproval, Assign), Ok(Assigned));
        assert_eq!(apply(PendingApproval, Reject), Ok(Rejected));
        assert_eq!(apply(Assigned, AssignMaintainer), Ok(InProgress));
        assert_eq!(apply(InProgress, Resolve), Ok(Resolved));
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        for terminal in [Rejected, Resolved] {
            assert!(is_terminal(terminal));
            for action in [Assign, Reject, AssignMaintainer, Resolve] {
                assert!(apply(terminal, action).is_err());
            }
        }
    }

    #[test]
    fn test_skipping_states_is_rejected() {
        // pending_approval cannot jump past triage
        assert!(apply(PendingApproval, AssignMaintainer).is_err());
        assert!(apply(PendingApproval, Resolve).is_err());
        // assigned cannot resolve without a maintainer
        assert!(apply(Assigned, Resolve).is_err());
        // in_progress cannot be re-triaged
        assert!(apply(InProgress, Assign).is_err());
        assert!(apply(InProgress, Reject).is_err());
    }

    #[test]
    fn test_no_backwards_transitions() {
        assert!(apply(Assigned, Assign).is_err());
        assert!(apply(Assigned, Reject).is_err());
        assert!(apply(InProgress, AssignMaintainer).is_err());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = apply(Rejected, Assign).unwrap_err();
        assert_eq!(err.to_string(), "Cannot assign a report in status 'rejected'");
    }
}
