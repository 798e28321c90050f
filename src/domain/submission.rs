use rust_decimal::Decimal;
use std::fmt;

/// Snapshot of the distributor account as loaded from the ledger.
///
/// Reloaded before every submission attempt; a stale sequence number is the
/// most common transient failure, so the snapshot is never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountState {
    pub address: String,
    pub sequence: i64,
}

/// What to send where. Computed per qualifying event, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardInstruction {
    pub destination: String,
    pub amount: Decimal,
}

/// Outcome of one submission attempt.
///
/// The gateway adapter folds every transport and ledger error into this
/// closed set, so the dispatcher's state machine never inspects
/// library-specific error shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The ledger applied the transaction.
    Accepted,
    /// Gateway or network timeout; worth retrying after a pause.
    Timeout,
    /// Stale sequence number; a fresh account load resolves it.
    BadSequence,
    /// The transaction's validity window expired before inclusion.
    TooLate,
    /// The offered fee did not make the ledger; escalate and retry.
    FeeTooLow,
    /// The distributor account cannot cover the payment.
    Underfunded,
    /// Anything else, with the raw diagnostic from the ledger.
    Rejected(String),
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionOutcome::Accepted => write!(f, "accepted"),
            SubmissionOutcome::Timeout => write!(f, "gateway timeout"),
            SubmissionOutcome::BadSequence => write!(f, "bad sequence number"),
            SubmissionOutcome::TooLate => write!(f, "submission deadline exceeded"),
            SubmissionOutcome::FeeTooLow => write!(f, "fee too low"),
            SubmissionOutcome::Underfunded => write!(f, "insufficient balance"),
            SubmissionOutcome::Rejected(diagnostic) => write!(f, "rejected: {diagnostic}"),
        }
    }
}
