//! # Request Validation
//!
//! Field checks run before any wallet or network access. The first missing
//! field wins.

use super::errors::HubError;
use hub_02_federation_client::{ConnectionRequest, DisconnectionRequest};

/// Missing or negative deed id.
pub const EMPTY_DEED_ID: &str = "wom.emptyDeedId";
/// Missing deed manager address.
pub const EMPTY_DEED_MANAGER_ADDRESS: &str = "wom.emptyDeedManagerAddress";
/// Missing earner address.
pub const EMPTY_EARNER_ADDRESS: &str = "wom.emptyEarnerAddress";
/// Missing deed manager signature.
pub const EMPTY_SIGNED_MESSAGE: &str = "wom.emptySignedMessage";
/// Missing token the manager signed.
pub const EMPTY_TOKEN: &str = "wom.emptyTokenForSignedMessage";

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn require(value: &Option<String>, code: &'static str) -> Result<(), HubError> {
    if is_blank(value) {
        Err(HubError::Validation { code })
    } else {
        Ok(())
    }
}

/// Validate a connection request.
pub fn validate_connection(request: &ConnectionRequest) -> Result<(), HubError> {
    if request.deed_id < 0 {
        return Err(HubError::Validation {
            code: EMPTY_DEED_ID,
        });
    }
    require(&request.deed_manager_address, EMPTY_DEED_MANAGER_ADDRESS)?;
    require(&request.earner_address, EMPTY_EARNER_ADDRESS)?;
    require(&request.signed_message, EMPTY_SIGNED_MESSAGE)?;
    require(&request.token, EMPTY_TOKEN)
}

/// Validate a disconnection request.
pub fn validate_disconnection(request: &DisconnectionRequest) -> Result<(), HubError> {
    require(&request.deed_manager_address, EMPTY_DEED_MANAGER_ADDRESS)?;
    require(&request.signed_message, EMPTY_SIGNED_MESSAGE)?;
    require(&request.token, EMPTY_TOKEN)
}
