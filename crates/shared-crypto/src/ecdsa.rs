//! # ECDSA Signatures (secp256k1)
//!
//! Ethereum-compatible recoverable signatures over the personal-sign digest.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization (EIP-2)
//! - Constant-time operations
//!
//! ## Wire Format
//!
//! 65 bytes `r ‖ s ‖ v`: two 32-byte big-endian integers followed by
//! `v = 27 + recovery_id`, rendered as `0x` + 130 lowercase hex chars.

use crate::hashing::{keccak256, personal_message_hash};
use crate::CryptoError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use shared_types::Address;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Offset added to the recovery id in the `v` byte.
const V_OFFSET: u8 = 27;

// =============================================================================
// RECOVERABLE SIGNATURE
// =============================================================================

/// 65-byte recoverable signature (`r ‖ s ‖ v`).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature([u8; 65]);

impl RecoverableSignature {
    /// Length in bytes.
    pub const LEN: usize = 65;

    /// Create from bytes (65 bytes).
    pub fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// The recovery byte.
    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// `0x`-prefixed lowercase hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    fn recovery_id(&self) -> Result<RecoveryId, CryptoError> {
        let id = match self.v() {
            0 | 27 => 0,
            1 | 28 => 1,
            v => return Err(CryptoError::InvalidRecoveryId(v)),
        };
        RecoveryId::from_byte(id).ok_or(CryptoError::InvalidRecoveryId(self.v()))
    }
}

impl FromStr for RecoverableSignature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 65];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature({})", self.to_hex())
    }
}

// =============================================================================
// KEYPAIR
// =============================================================================

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes(bytes.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Create from a hex private key, with or without `0x`.
    pub fn from_hex(private_key: &str) -> Result<Self, CryptoError> {
        let digits = private_key.trim();
        let digits = digits.strip_prefix("0x").unwrap_or(digits);
        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(digits, &mut bytes[..])
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_bytes(&bytes)
    }

    /// Account address of this keypair.
    pub fn address(&self) -> Address {
        address_from_pubkey(self.signing_key.verifying_key())
    }

    /// Sign `message` with the personal-sign prefix.
    pub fn sign_personal(&self, message: &[u8]) -> Result<RecoverableSignature, CryptoError> {
        let digest = personal_message_hash(message);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = V_OFFSET + recovery_id.to_byte();
        Ok(RecoverableSignature(bytes))
    }

    /// Get secret key bytes (for encryption at rest).
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes().into())
    }
}

/// Recover the address that produced a personal-sign signature of `message`.
pub fn recover_personal_signer(
    message: &[u8],
    signature: &RecoverableSignature,
) -> Result<Address, CryptoError> {
    let recovery_id = signature.recovery_id()?;
    let sig =
        Signature::from_slice(&signature.0[..64]).map_err(|_| CryptoError::InvalidSignature)?;
    let digest = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;
    Ok(address_from_pubkey(&key))
}

/// Address = last 20 bytes of keccak256 of the uncompressed key minus `0x04`.
fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let point = public_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    Address(address)
}

// =============================================================================
// TESTS
// =============================================================================
