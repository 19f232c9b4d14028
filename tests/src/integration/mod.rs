//! Cross-subsystem flows.

#[cfg(test)]
mod e2e_federation;
#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod gateway_flows;
