#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use xlm_forwarder::application::agent::{AgentContext, ForwardingAgent};
use xlm_forwarder::application::dispatcher::FeePolicy;
use xlm_forwarder::domain::event::{AssetKind, Cursor, OperationKind, PaymentEvent};
use xlm_forwarder::domain::ports::{CursorStore, LedgerGateway, PaymentStream, ReceiptSink};
use xlm_forwarder::domain::submission::{AccountState, SubmissionOutcome};
use xlm_forwarder::error::{ForwarderError, Result};

pub const DISTRIBUTOR: &str = "GDISTRIBUTOR";
pub const RECEIVER: &str = "GRECEIVER";

#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedPayment {
    pub destination: String,
    pub amount: Decimal,
    pub fee: u32,
}

#[derive(Default)]
struct LedgerState {
    outcomes: VecDeque<SubmissionOutcome>,
    submissions: Vec<SubmittedPayment>,
    account_loads: u32,
    account_failures: u32,
    sequence: i64,
    base_fee: u32,
    events: Vec<PaymentEvent>,
    opened_with: Vec<Cursor>,
}

/// Scripted in-memory ledger: plays back a queue of submission outcomes
/// (defaulting to `Accepted` once the queue runs dry) and records every
/// interaction for assertions.
#[derive(Clone)]
pub struct ScriptedLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl Default for ScriptedLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                base_fee: 100,
                ..Default::default()
            })),
        }
    }

    pub fn with_base_fee(self, base_fee: u32) -> Self {
        self.state.lock().unwrap().base_fee = base_fee;
        self
    }

    pub fn script(&self, outcomes: impl IntoIterator<Item = SubmissionOutcome>) {
        self.state.lock().unwrap().outcomes.extend(outcomes);
    }

    pub fn set_events(&self, events: Vec<PaymentEvent>) {
        self.state.lock().unwrap().events = events;
    }

    /// Makes the next `count` account loads fail with a ledger error.
    pub fn fail_account_loads(&self, count: u32) {
        self.state.lock().unwrap().account_failures = count;
    }

    pub fn submissions(&self) -> Vec<SubmittedPayment> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn submitted_fees(&self) -> Vec<u32> {
        self.submissions().iter().map(|s| s.fee).collect()
    }

    pub fn account_loads(&self) -> u32 {
        self.state.lock().unwrap().account_loads
    }

    pub fn opened_with(&self) -> Vec<Cursor> {
        self.state.lock().unwrap().opened_with.clone()
    }
}

#[async_trait]
impl LedgerGateway for ScriptedLedger {
    async fn load_account(&self, address: &str) -> Result<AccountState> {
        let mut state = self.state.lock().unwrap();
        if state.account_failures > 0 {
            state.account_failures -= 1;
            return Err(ForwarderError::LedgerError("account load refused".to_string()));
        }
        state.account_loads += 1;
        state.sequence += 1;
        Ok(AccountState {
            address: address.to_string(),
            sequence: state.sequence,
        })
    }

    async fn base_fee(&self) -> Result<u32> {
        Ok(self.state.lock().unwrap().base_fee)
    }

    async fn submit_payment(
        &self,
        _source: &AccountState,
        destination: &str,
        amount: Decimal,
        fee_per_op: u32,
    ) -> SubmissionOutcome {
        let mut state = self.state.lock().unwrap();
        state.submissions.push(SubmittedPayment {
            destination: destination.to_string(),
            amount,
            fee: fee_per_op,
        });
        state
            .outcomes
            .pop_front()
            .unwrap_or(SubmissionOutcome::Accepted)
    }

    async fn open_payment_stream(&self, _address: &str, cursor: &Cursor) -> Result<PaymentStream> {
        let mut state = self.state.lock().unwrap();
        state.opened_with.push(cursor.clone());
        let events = state.events.clone();
        Ok(futures::stream::iter(events.into_iter().map(Ok)).boxed())
    }
}

#[derive(Clone, Default)]
pub struct MemoryCursorStore {
    saves: Arc<Mutex<Vec<Cursor>>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saves(&self) -> Vec<Cursor> {
        self.saves.lock().unwrap().clone()
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> Result<Cursor> {
        Ok(self.saves.lock().unwrap().last().cloned().unwrap_or(Cursor::Now))
    }

    fn save(&self, cursor: &Cursor) -> Result<()> {
        self.saves.lock().unwrap().push(cursor.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub destination: String,
    pub amount: Decimal,
    pub success: bool,
    pub message: String,
}

#[derive(Clone, Default)]
pub struct MemoryReceiptSink {
    receipts: Arc<Mutex<Vec<Receipt>>>,
}

impl MemoryReceiptSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receipts(&self) -> Vec<Receipt> {
        self.receipts.lock().unwrap().clone()
    }
}

impl ReceiptSink for MemoryReceiptSink {
    fn record(
        &self,
        destination: &str,
        amount: Decimal,
        success: bool,
        message: &str,
    ) -> Result<()> {
        self.receipts.lock().unwrap().push(Receipt {
            destination: destination.to_string(),
            amount,
            success,
            message: message.to_string(),
        });
        Ok(())
    }
}

pub fn incoming_payment(from: &str, amount: &str, paging_token: &str) -> PaymentEvent {
    PaymentEvent {
        kind: OperationKind::Payment,
        asset_type: Some(AssetKind::Native),
        from: Some(from.to_string()),
        to: Some(DISTRIBUTOR.to_string()),
        amount: Some(amount.to_string()),
        paging_token: paging_token.to_string(),
        transaction_successful: true,
    }
}

pub fn default_context() -> AgentContext {
    AgentContext {
        distributor: DISTRIBUTOR.to_string(),
        receiver: RECEIVER.to_string(),
        send_fraction: dec!(0.25),
        min_incoming: Decimal::ZERO,
        fee: FeePolicy::default(),
    }
}

pub fn build_agent(
    ctx: AgentContext,
    ledger: ScriptedLedger,
    cursors: MemoryCursorStore,
    receipts: MemoryReceiptSink,
) -> ForwardingAgent {
    ForwardingAgent::new(ctx, Box::new(ledger), Box::new(cursors), Box::new(receipts))
}

pub fn event_stream(events: Vec<PaymentEvent>) -> PaymentStream {
    futures::stream::iter(events.into_iter().map(Ok)).boxed()
}
