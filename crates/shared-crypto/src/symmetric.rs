//! # Symmetric Encryption
//!
//! XChaCha20-Poly1305 sealing of secrets kept at rest. The key is derived
//! from the platform secret, so rotating that secret makes earlier
//! ciphertexts unreadable.

use crate::hashing::keccak256;
use crate::CryptoError;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use zeroize::{Zeroize, Zeroizing};

/// 256-bit sealing key, wiped on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SealingKey([u8; 32]);

impl SealingKey {
    /// `keccak256(secret)`.
    pub fn from_platform_secret(secret: &str) -> Self {
        Self(keccak256(secret.as_bytes()))
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new((&self.0).into())
    }

    /// Encrypt `plaintext` under a fresh random nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<(Vec<u8>, Nonce), CryptoError> {
        let nonce = Nonce::random();
        let ciphertext = self
            .cipher()
            .encrypt(XNonce::from_slice(nonce.as_bytes()), plaintext)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        Ok((ciphertext, nonce))
    }

    /// Decrypt and authenticate. The plaintext is wiped when dropped.
    pub fn open(&self, ciphertext: &[u8], nonce: &Nonce) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        self.cipher()
            .decrypt(XNonce::from_slice(nonce.as_bytes()), ciphertext)
            .map(Zeroizing::new)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

/// 192-bit XChaCha20 nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonce([u8; 24]);

impl Nonce {
    /// Length in bytes.
    pub const LEN: usize = 24;

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: [u8; 24]) -> Self {
        Self(bytes)
    }

    /// Parse a stored nonce.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| CryptoError::InvalidNonceLength {
                expected: Self::LEN,
                actual: bytes.len(),
            })
    }

    /// Random nonce. 192 bits make collisions negligible.
    fn random() -> Self {
        let mut bytes = [0u8; 24];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 24] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = SealingKey::from_platform_secret("platform-secret");
        let (ciphertext, nonce) = key.seal(b"hub wallet private key").unwrap();
        assert_ne!(ciphertext.as_slice(), b"hub wallet private key".as_slice());
        assert_eq!(
            key.open(&ciphertext, &nonce).unwrap().as_slice(),
            b"hub wallet private key"
        );
    }

    #[test]
    fn test_rotated_secret_cannot_open() {
        let before = SealingKey::from_platform_secret("secret-before-rotation");
        let after = SealingKey::from_platform_secret("secret-after-rotation");

        let (ciphertext, nonce) = before.seal(b"key material").unwrap();
        assert!(matches!(
            after.open(&ciphertext, &nonce),
            Err(CryptoError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_tampered_ciphertext_or_nonce_fails() {
        let key = SealingKey::from_platform_secret("platform-secret");
        let (mut ciphertext, nonce) = key.seal(b"key material").unwrap();

        let mut other = *nonce.as_bytes();
        other[0] ^= 1;
        assert!(key.open(&ciphertext, &Nonce::from_bytes(other)).is_err());

        ciphertext[0] ^= 0xFF;
        assert!(key.open(&ciphertext, &nonce).is_err());
    }

    #[test]
    fn test_each_seal_uses_a_fresh_nonce() {
        let key = SealingKey::from_platform_secret("platform-secret");
        let (first, n1) = key.seal(b"same").unwrap();
        let (second, n2) = key.seal(b"same").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(first, second);
    }

    #[test]
    fn test_nonce_from_slice_checks_length() {
        assert!(Nonce::from_slice(&[0u8; 24]).is_ok());
        assert_eq!(
            Nonce::from_slice(&[0u8; 12]),
            Err(CryptoError::InvalidNonceLength {
                expected: 24,
                actual: 12
            })
        );
    }
}
