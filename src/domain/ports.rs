use super::event::{Cursor, PaymentEvent};
use super::submission::{AccountState, SubmissionOutcome};
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use rust_decimal::Decimal;

/// Infinite, restartable sequence of payment records for one account.
pub type PaymentStream = BoxStream<'static, Result<PaymentEvent>>;

/// Everything the core needs from the ledger network.
///
/// `submit_payment` is infallible by contract: the adapter classifies every
/// failure, transport-level or ledger-level, into a [`SubmissionOutcome`].
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn load_account(&self, address: &str) -> Result<AccountState>;
    async fn base_fee(&self) -> Result<u32>;
    async fn submit_payment(
        &self,
        source: &AccountState,
        destination: &str,
        amount: Decimal,
        fee_per_op: u32,
    ) -> SubmissionOutcome;
    async fn open_payment_stream(&self, address: &str, cursor: &Cursor) -> Result<PaymentStream>;
}

/// Durable storage for the stream resume position.
pub trait CursorStore: Send + Sync {
    /// Returns the last persisted cursor, or [`Cursor::Now`] if none exists.
    fn load(&self) -> Result<Cursor>;
    /// Overwrites the persisted value before the next event is processed.
    fn save(&self, cursor: &Cursor) -> Result<()>;
}

/// Terminal-outcome log: one line per forwarding invocation.
pub trait ReceiptSink: Send + Sync {
    fn record(&self, destination: &str, amount: Decimal, success: bool, message: &str)
    -> Result<()>;
}

pub type LedgerGatewayBox = Box<dyn LedgerGateway>;
pub type CursorStoreBox = Box<dyn CursorStore>;
pub type ReceiptSinkBox = Box<dyn ReceiptSink>;
