//! XChaCha20-Poly1305 codec keyed by the platform secret.

use crate::domain::SealedSecret;
use crate::ports::SecretCodec;
use shared_crypto::{CryptoError, SealingKey};
use zeroize::Zeroizing;

/// Platform codec backed by XChaCha20-Poly1305.
pub struct XChaChaCodec {
    key: SealingKey,
}

impl XChaChaCodec {
    /// Derive the codec key from the platform secret.
    pub fn from_platform_secret(secret: &str) -> Self {
        Self {
            key: SealingKey::from_platform_secret(secret),
        }
    }
}

impl SecretCodec for XChaChaCodec {
    fn seal(&self, plaintext: &[u8]) -> Result<SealedSecret, CryptoError> {
        let (ciphertext, nonce) = self.key.seal(plaintext)?;
        Ok(SealedSecret { ciphertext, nonce })
    }

    fn open(&self, sealed: &SealedSecret) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        self.key.open(&sealed.ciphertext, &sealed.nonce)
    }
}
