//! Signing primitives for the submission path: strkey address codec,
//! the distributor keypair, and the minimal transaction XDR.

pub mod keypair;
pub mod strkey;
pub mod xdr;
