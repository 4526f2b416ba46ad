use crate::models::Student;

/// What a check-in attempt should do, given the record as currently stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInDecision {
    NotFound,
    AlreadyCheckedIn,
    /// Verification is still pending. Staff see a warning; nothing is written.
    PendingVerification,
    Admit,
}

/// Evaluate the check-in rules in order, first match wins:
/// missing record, already checked in, pending verification, admit.
///
/// `force` is the explicit staff override of the pending-verification warning.
/// It never bypasses the first two rules.
pub fn decide(current: Option<&Student>, force: bool) -> CheckInDecision {
    match current {
        None => CheckInDecision::NotFound,
        Some(student) if student.checked_in => CheckInDecision::AlreadyCheckedIn,
        Some(student) if student.is_pending() && !force => CheckInDecision::PendingVerification,
        Some(_) => CheckInDecision::Admit,
    }
}

/// Result of a check-in after the store has applied the decision.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    Rejected,
    AlreadyCheckedIn(Student),
    PendingVerification(Student),
    CheckedIn(Student),
}

impl CheckInOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            CheckInOutcome::Rejected => "Not found",
            CheckInOutcome::AlreadyCheckedIn(_) => "Already checked in",
            CheckInOutcome::PendingVerification(_) => "Verification is PENDING!",
            CheckInOutcome::CheckedIn(_) => "Checked in",
        }
    }

    pub fn into_student(self) -> Option<Student> {
        match self {
            CheckInOutcome::Rejected => None,
            CheckInOutcome::AlreadyCheckedIn(s)
            | CheckInOutcome::PendingVerification(s)
            | CheckInOutcome::CheckedIn(s) => Some(s),
        }
    }
}
