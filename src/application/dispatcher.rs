use crate::domain::ports::LedgerGateway;
use crate::domain::submission::{ForwardInstruction, SubmissionOutcome};
use std::time::Duration;
use tracing::{debug, warn};

/// Fee-per-operation bounds, in base units (stroops).
#[derive(Debug, Clone)]
pub struct FeePolicy {
    /// Starting fee for every dispatch invocation.
    pub floor: u32,
    /// Escalation stops once the current fee reaches this value.
    pub cap: u32,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            floor: 100,
            cap: 2000,
        }
    }
}

/// Ceiling on timeout / bad-sequence / too-late retries per invocation.
/// Worst case this bounds an invocation to roughly five minutes of
/// backoffs before the event is failed permanently.
pub const MAX_TRANSIENT_ATTEMPTS: u32 = 60;

const TIMEOUT_BACKOFF: Duration = Duration::from_secs(5);
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Mutable state of one in-flight dispatch invocation. Never shared:
/// created on entry, discarded on the terminal outcome.
#[derive(Debug)]
struct RetryState {
    fee: u32,
    attempts: u32,
    transient_attempts: u32,
}

impl RetryState {
    fn new(floor: u32) -> Self {
        Self {
            fee: floor,
            attempts: 0,
            transient_attempts: 0,
        }
    }

    /// Counts a transient failure; returns false once the budget is spent.
    fn note_transient(&mut self) -> bool {
        self.transient_attempts += 1;
        self.transient_attempts <= MAX_TRANSIENT_ATTEMPTS
    }
}

/// Terminal result of a dispatch invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered { fee: u32, attempts: u32 },
    Failed { reason: String },
}

/// Drives one payment through submission until it either lands on the
/// ledger or fails permanently.
///
/// Every attempt reloads the source account for a fresh sequence number
/// and offers `max(network base fee, escalated fee)`. The escalated fee
/// only ever doubles, and only on a fee-too-low response; transient
/// failures retry with the fee unchanged.
pub struct Dispatcher {
    policy: FeePolicy,
}

impl Dispatcher {
    pub fn new(policy: FeePolicy) -> Self {
        Self { policy }
    }

    pub async fn dispatch(
        &self,
        ledger: &dyn LedgerGateway,
        source_address: &str,
        instruction: &ForwardInstruction,
    ) -> DispatchOutcome {
        let mut state = RetryState::new(self.policy.floor);

        loop {
            state.attempts += 1;

            let account = match ledger.load_account(source_address).await {
                Ok(account) => account,
                Err(e) => {
                    warn!(error = %e, "account load failed; retrying");
                    if !state.note_transient() {
                        return Self::budget_exhausted(&state);
                    }
                    tokio::time::sleep(TIMEOUT_BACKOFF).await;
                    continue;
                }
            };

            let network_floor = match ledger.base_fee().await {
                Ok(fee) => fee,
                Err(e) => {
                    warn!(error = %e, "base fee lookup failed; retrying");
                    if !state.note_transient() {
                        return Self::budget_exhausted(&state);
                    }
                    tokio::time::sleep(TIMEOUT_BACKOFF).await;
                    continue;
                }
            };

            let fee = network_floor.max(state.fee);
            let outcome = ledger
                .submit_payment(&account, &instruction.destination, instruction.amount, fee)
                .await;

            match outcome {
                SubmissionOutcome::Accepted => {
                    return DispatchOutcome::Delivered {
                        fee,
                        attempts: state.attempts,
                    };
                }
                SubmissionOutcome::Timeout => {
                    warn!(attempt = state.attempts, "gateway timeout; retrying");
                    if !state.note_transient() {
                        return Self::budget_exhausted(&state);
                    }
                    tokio::time::sleep(TIMEOUT_BACKOFF).await;
                }
                outcome @ (SubmissionOutcome::BadSequence | SubmissionOutcome::TooLate) => {
                    warn!(attempt = state.attempts, %outcome, "retrying with a fresh account load");
                    if !state.note_transient() {
                        return Self::budget_exhausted(&state);
                    }
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                SubmissionOutcome::FeeTooLow => {
                    if state.fee < self.policy.cap {
                        state.fee = state.fee.saturating_mul(2);
                        debug!(fee = state.fee, "fee too low; escalating");
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    } else {
                        return DispatchOutcome::Failed {
                            reason: "network busy: fee cap exceeded".to_string(),
                        };
                    }
                }
                SubmissionOutcome::Underfunded => {
                    return DispatchOutcome::Failed {
                        reason: "insufficient balance on distributor account".to_string(),
                    };
                }
                SubmissionOutcome::Rejected(diagnostic) => {
                    return DispatchOutcome::Failed { reason: diagnostic };
                }
            }
        }
    }

    fn budget_exhausted(state: &RetryState) -> DispatchOutcome {
        DispatchOutcome::Failed {
            reason: format!(
                "transient retry budget exhausted after {} attempts",
                state.transient_attempts
            ),
        }
    }
}
