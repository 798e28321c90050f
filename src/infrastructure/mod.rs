//! Adapters behind the domain ports: filesystem-backed cursor and receipt
//! storage, and the Horizon ledger gateway with its signing primitives.

pub mod cursor_file;
pub mod horizon;
pub mod receipt_log;
pub mod stellar;
