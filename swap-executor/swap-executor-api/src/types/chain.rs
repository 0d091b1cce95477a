//! Network and token metadata types

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// The numeric identifier of a network, e.g. `1` for Ethereum mainnet
pub type ChainId = u64;

/// A network on which routes may start or end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    /// The chain ID
    pub id: ChainId,
    /// The short key the routing service uses for the chain, e.g. `arb`
    #[serde(default)]
    pub key: String,
    /// The human-readable name of the chain
    pub name: String,
}

/// A token on a specific network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// The token contract address; the zero address denotes the native asset
    pub address: Address,
    /// The chain on which the token lives
    pub chain_id: ChainId,
    /// The ticker symbol
    pub symbol: String,
    /// The number of decimals in the token's smallest unit
    pub decimals: u8,
    /// The token's name
    #[serde(default)]
    pub name: String,
    /// The USD price reported by the routing service, if any
    #[serde(default, rename = "priceUSD", skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<String>,
}

impl Token {
    /// Whether the token is the native asset of its chain
    pub fn is_native(&self) -> bool {
        self.address.is_zero()
    }
}
