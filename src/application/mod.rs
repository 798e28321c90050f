//! Application layer containing the core forwarding orchestration.
//!
//! `ForwardingAgent` owns the stream loop and the cursor discipline, and
//! hands every qualifying event to the `Dispatcher`, which owns the
//! submission retry and fee-escalation state machine. Processing is
//! strictly sequential: at most one outbound transaction is in flight.

pub mod agent;
pub mod dispatcher;
