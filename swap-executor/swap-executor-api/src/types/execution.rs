//! Payloads exchanged with the execution engine through its hooks

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::{
    serialization::u256_string_serialization,
    types::chain::{ChainId, Token},
};

/// A transaction the engine proposes to sign, offered to the
/// transaction-request hook before signing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// The chain the transaction is sent on
    pub chain_id: ChainId,
    /// The sending address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// The contract called
    pub to: Address,
    /// The calldata
    #[serde(default)]
    pub data: Bytes,
    /// The native value attached
    #[serde(default, with = "u256_string_serialization")]
    pub value: U256,
    /// The gas limit, if the engine estimated one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
}

/// A drift between the quoted and the realizable output of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateUpdate {
    /// The token being received
    pub to_token: Token,
    /// The output amount originally quoted
    #[serde(with = "u256_string_serialization")]
    pub old_to_amount: U256,
    /// The output amount now realizable
    #[serde(with = "u256_string_serialization")]
    pub new_to_amount: U256,
}

/// Execution settings passed to the engine on start, resume and
/// reconfiguration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSettings {
    /// Continue without requiring foreground confirmation for later steps
    pub execute_in_background: bool,
    /// Disable off-chain message signing (e.g. permits)
    pub disable_message_signing: bool,
}

impl ExecutionSettings {
    /// Settings for foreground execution
    pub fn foreground() -> Self {
        Self { execute_in_background: false, disable_message_signing: false }
    }

    /// Settings for background execution
    pub fn background() -> Self {
        Self { execute_in_background: true, ..Self::foreground() }
    }
}
