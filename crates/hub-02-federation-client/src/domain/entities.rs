//! # Wire Requests
//!
//! Requests sent to the WoM server. Requests signed by the hub implement
//! [`HubSigned`]: the hub signature covers the canonical JSON of the request
//! with `hubSignedMessage` omitted.

use serde::{Deserialize, Serialize};
use shared_crypto::{keccak256, RecoverableSignature};
use shared_types::{Address, HubReportPayload, LanguageMap, UNKNOWN_DEED_ID};
use std::collections::BTreeMap;
use std::fmt;

/// A request carrying the hub's own signature.
pub trait HubSigned: Serialize + Clone {
    /// Current hub signature, if set.
    fn hub_signed_message(&self) -> Option<&str>;

    /// Replace the hub signature.
    fn set_hub_signed_message(&mut self, signature: Option<String>);

    /// Canonical bytes the hub signs.
    fn signing_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut unsigned = self.clone();
        unsigned.set_hub_signed_message(None);
        serde_json::to_vec(&unsigned)
    }
}

/// Request to join the federation.
///
/// `signed_message` is the deed manager's proof over `raw_message`, supplied
/// by the caller. `hub_signed_message` is computed locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionRequest {
    pub deed_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deed_manager_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earner_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Hub address, filled in by the orchestrator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name: LanguageMap,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub description: LanguageMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_signed_message: Option<String>,
}

impl Default for ConnectionRequest {
    fn default() -> Self {
        Self {
            deed_id: UNKNOWN_DEED_ID,
            deed_manager_address: None,
            earner_address: None,
            signed_message: None,
            raw_message: None,
            token: None,
            address: None,
            name: LanguageMap::new(),
            description: LanguageMap::new(),
            url: None,
            color: None,
            hub_signed_message: None,
        }
    }
}

impl HubSigned for ConnectionRequest {
    fn hub_signed_message(&self) -> Option<&str> {
        self.hub_signed_message.as_deref()
    }

    fn set_hub_signed_message(&mut self, signature: Option<String>) {
        self.hub_signed_message = signature;
    }
}

/// Request to leave the federation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisconnectionRequest {
    /// Hub address, filled in from the identity cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deed_manager_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_signed_message: Option<String>,
}

impl HubSigned for DisconnectionRequest {
    fn hub_signed_message(&self) -> Option<&str> {
        self.hub_signed_message.as_deref()
    }

    fn set_hub_signed_message(&mut self, signature: Option<String>) {
        self.hub_signed_message = signature;
    }
}

/// A signed report as submitted to the WoM server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    /// `0x` + hex keccak256 of the signature bytes.
    pub hash: String,
    /// `0x` + hex of the 65-byte signature over the payload JSON.
    pub signature: String,
    pub payload: HubReportPayload,
}

impl ReportSubmission {
    /// Bytes of `payload` the hub signs.
    pub fn signing_bytes(payload: &HubReportPayload) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(payload)
    }

    /// Assemble a submission from its payload and hub signature.
    pub fn new(payload: HubReportPayload, signature: &RecoverableSignature) -> Self {
        Self {
            hash: report_hash(signature),
            signature: signature.to_hex(),
            payload,
        }
    }
}

/// Report hash: `0x` + lowercase hex keccak256 of the signature bytes.
pub fn report_hash(signature: &RecoverableSignature) -> String {
    format!("0x{}", hex::encode(keccak256(signature.as_bytes())))
}

/// Hub card image kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Avatar,
    Banner,
}

impl AssetKind {
    /// Path segment under `/api/hubs/{address}/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Banner => "banner",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// A hub card image upload, authenticated by a signed token.
#[derive(Clone, PartialEq, Eq)]
pub struct AssetUpload {
    pub kind: AssetKind,
    pub hub_address: Address,
    pub signed_message: String,
    pub raw_message: String,
    pub token: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for AssetUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetUpload")
            .field("kind", &self.kind)
            .field("hub_address", &self.hub_address)
            .field("len", &self.bytes.len())
            .finish()
    }
}
