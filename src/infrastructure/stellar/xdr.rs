//! Hand-rolled XDR for the one transaction shape this agent ever submits:
//! a single native-asset payment from an ed25519 account, time-bounded.
//!
//! XDR is big-endian with 4-byte alignment throughout; every enum and
//! union arm below is a 4-byte discriminant.

use sha2::{Digest, Sha256};

const ENVELOPE_TYPE_TX: u32 = 2;
const KEY_TYPE_ED25519: u32 = 0;
const PRECOND_TIME: u32 = 1;
const MEMO_NONE: u32 = 0;
const OPERATION_PAYMENT: u32 = 1;
const ASSET_TYPE_NATIVE: u32 = 0;

pub struct PaymentParams<'a> {
    pub source: &'a [u8; 32],
    pub sequence: i64,
    pub destination: &'a [u8; 32],
    pub amount_stroops: i64,
    pub fee: u32,
    pub min_time: u64,
    pub max_time: u64,
}

#[derive(Default)]
struct XdrWriter {
    buf: Vec<u8>,
}

impl XdrWriter {
    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Raw bytes whose length is already a multiple of four.
    fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Variable-length opaque: length prefix plus zero padding to alignment.
    fn opaque_var(&mut self, bytes: &[u8]) {
        self.u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
        for _ in 0..(4 - bytes.len() % 4) % 4 {
            self.buf.push(0);
        }
    }

    fn account(&mut self, key: &[u8; 32]) {
        self.u32(KEY_TYPE_ED25519);
        self.raw(key);
    }
}

/// Serializes the transaction body — exactly the bytes that get signed.
pub fn payment_tx(params: &PaymentParams<'_>) -> Vec<u8> {
    let mut w = XdrWriter::default();
    w.account(params.source);
    w.u32(params.fee);
    w.i64(params.sequence);
    w.u32(PRECOND_TIME);
    w.u64(params.min_time);
    w.u64(params.max_time);
    w.u32(MEMO_NONE);
    w.u32(1); // operation count
    w.u32(0); // operation source absent, inherits the transaction source
    w.u32(OPERATION_PAYMENT);
    w.account(params.destination);
    w.u32(ASSET_TYPE_NATIVE);
    w.i64(params.amount_stroops);
    w.u32(0); // ext
    w.buf
}

/// Domain-separation hash for a network passphrase.
pub fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

/// The hash that is actually signed: network id, envelope tag, body.
pub fn signature_payload(network_id: &[u8; 32], tx: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(network_id);
    hasher.update(ENVELOPE_TYPE_TX.to_be_bytes());
    hasher.update(tx);
    hasher.finalize().into()
}

/// Wraps a signed transaction body into the submittable envelope.
pub fn envelope(tx: &[u8], hint: [u8; 4], signature: &[u8; 64]) -> Vec<u8> {
    let mut w = XdrWriter::default();
    w.u32(ENVELOPE_TYPE_TX);
    w.raw(tx);
    w.u32(1); // signature count
    w.raw(&hint);
    w.opaque_var(signature);
    w.buf
}
