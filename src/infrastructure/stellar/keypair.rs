use super::strkey;
use crate::error::Result;
use ed25519_dalek::{Signer, SigningKey};
use std::fmt;

/// The distributor signing key.
///
/// Decoded once at startup from the operator's `S...` seed and held only
/// here; the application core sees the public address alone.
pub struct Keypair {
    signing: SigningKey,
    public: [u8; 32],
}

impl Keypair {
    pub fn from_secret_seed(seed: &str) -> Result<Self> {
        let seed_bytes = strkey::decode_seed(seed)?;
        let signing = SigningKey::from_bytes(&seed_bytes);
        let public = signing.verifying_key().to_bytes();
        Ok(Self { signing, public })
    }

    /// Public address in `G...` form.
    pub fn address(&self) -> String {
        strkey::encode_public(&self.public)
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public
    }

    /// Last four bytes of the public key, identifying the signature on the
    /// wire.
    pub fn hint(&self) -> [u8; 4] {
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&self.public[28..]);
        hint
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing.sign(message).to_bytes()
    }
}

// Manual impl so the secret seed can never end up in log output.
impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
