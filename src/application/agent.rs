use super::dispatcher::{DispatchOutcome, Dispatcher, FeePolicy};
use crate::domain::event::{Cursor, PaymentEvent};
use crate::domain::filter::EventFilter;
use crate::domain::ports::{CursorStoreBox, LedgerGatewayBox, PaymentStream, ReceiptSinkBox};
use crate::domain::share::forward_share;
use crate::domain::submission::ForwardInstruction;
use crate::error::Result;
use futures::StreamExt;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const STREAM_BACKOFF: Duration = Duration::from_secs(5);

/// Immutable wiring for one agent: who is watched, who receives, and the
/// tunables. Constructed once at startup and passed to every component;
/// there is no process-wide state.
#[derive(Debug, Clone)]
pub struct AgentContext {
    /// Public address of the watched distributor account.
    pub distributor: String,
    /// Fixed receiver of every forward.
    pub receiver: String,
    /// Fraction of each qualifying incoming transfer to forward.
    pub send_fraction: Decimal,
    /// Incoming transfers below this amount are ignored.
    pub min_incoming: Decimal,
    pub fee: FeePolicy,
}

/// The streaming loop: resume from the persisted cursor, advance it after
/// every observed event, and forward the configured share of each
/// qualifying incoming transfer.
///
/// Cursor persistence happens before an event is handled, so an event whose
/// forwarding is interrupted mid-retry is not re-read on restart:
/// forwarding is at-most-once, never doubled.
pub struct ForwardingAgent {
    ctx: AgentContext,
    filter: EventFilter,
    dispatcher: Dispatcher,
    ledger: LedgerGatewayBox,
    cursors: CursorStoreBox,
    receipts: ReceiptSinkBox,
    cursor: Cursor,
}

impl ForwardingAgent {
    pub fn new(
        ctx: AgentContext,
        ledger: LedgerGatewayBox,
        cursors: CursorStoreBox,
        receipts: ReceiptSinkBox,
    ) -> Self {
        let filter = EventFilter::new(ctx.distributor.clone(), ctx.min_incoming);
        let dispatcher = Dispatcher::new(ctx.fee.clone());
        Self {
            ctx,
            filter,
            dispatcher,
            ledger,
            cursors,
            receipts,
            cursor: Cursor::Now,
        }
    }

    /// Runs indefinitely, reopening the stream from the in-memory cursor
    /// after any stream-level failure.
    pub async fn run(&mut self) -> Result<()> {
        self.cursor = self.cursors.load()?;
        info!(
            distributor = %self.ctx.distributor,
            receiver = %self.ctx.receiver,
            cursor = %self.cursor,
            "listening for incoming payments"
        );

        loop {
            match self
                .ledger
                .open_payment_stream(&self.ctx.distributor, &self.cursor)
                .await
            {
                Ok(stream) => {
                    self.drain_stream(stream).await;
                    warn!("payment stream closed; reconnecting");
                }
                Err(e) => warn!(error = %e, "failed to open payment stream"),
            }
            tokio::time::sleep(STREAM_BACKOFF).await;
        }
    }

    /// Consumes events until the stream ends or yields an error.
    pub async fn drain_stream(&mut self, mut stream: PaymentStream) {
        while let Some(item) = stream.next().await {
            match item {
                Ok(event) => {
                    self.advance_cursor(&event);
                    self.handle_event(&event).await;
                }
                Err(e) => {
                    warn!(error = %e, "payment stream error");
                    return;
                }
            }
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Stream position always advances, whether or not the event is acted
    /// on. A failed save is reported and the in-memory cursor carries on;
    /// the next event's save overwrites it.
    fn advance_cursor(&mut self, event: &PaymentEvent) {
        self.cursor = Cursor::Token(event.paging_token.clone());
        if let Err(e) = self.cursors.save(&self.cursor) {
            warn!(error = %e, "failed to persist cursor; continuing from memory");
        }
    }

    async fn handle_event(&self, event: &PaymentEvent) {
        let Some(incoming) = self.filter.qualify(event) else {
            return;
        };

        let share = forward_share(incoming, self.ctx.send_fraction);
        if share <= Decimal::ZERO {
            debug!(%incoming, "share truncates to zero; nothing to forward");
            return;
        }

        info!(
            %incoming,
            %share,
            from = event.from.as_deref().unwrap_or("unknown"),
            "qualifying incoming transfer"
        );

        let instruction = ForwardInstruction {
            destination: self.ctx.receiver.clone(),
            amount: share,
        };
        match self
            .dispatcher
            .dispatch(self.ledger.as_ref(), &self.ctx.distributor, &instruction)
            .await
        {
            DispatchOutcome::Delivered { fee, attempts } => {
                info!(fee, attempts, "forward delivered");
                self.record(&instruction, true, "");
            }
            DispatchOutcome::Failed { reason } => {
                error!(%reason, "forward permanently failed");
                self.record(&instruction, false, &reason);
            }
        }
    }

    fn record(&self, instruction: &ForwardInstruction, success: bool, message: &str) {
        if let Err(e) =
            self.receipts
                .record(&instruction.destination, instruction.amount, success, message)
        {
            warn!(error = %e, "failed to write receipt");
        }
    }
}
