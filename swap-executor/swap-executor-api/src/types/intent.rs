//! Swap intents and route discovery options

use std::fmt::Display;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    errors::UnitsError,
    serialization::u256_string_serialization,
    types::chain::{ChainId, Token},
    units::parse_amount,
};

// -------------
// | Constants |
// -------------

/// The default maximum acceptable price impact of a route
pub const DEFAULT_MAX_PRICE_IMPACT: f64 = 0.3; // 30%
/// The default maximum acceptable slippage of a route
pub const DEFAULT_SLIPPAGE: f64 = 0.005; // 50bps
/// The default integrator fee charged on a route
pub const DEFAULT_INTEGRATOR_FEE: f64 = 0.01; // 1%
/// The default integrator name reported to the routing service
pub const DEFAULT_INTEGRATOR: &str = "swap-executor";

// ----------
// | Intent |
// ----------

/// A user's request to move value from one token and network to another
///
/// The amount is held in the source token's smallest unit; construct intents
/// from user input with [`SwapIntent::from_decimal_amount`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapIntent {
    /// The network the value leaves from
    pub source_chain: ChainId,
    /// The network the value arrives on
    pub destination_chain: ChainId,
    /// The token being sold
    pub source_token: Address,
    /// The token being bought
    pub destination_token: Address,
    /// The amount sold, in the source token's smallest unit
    #[serde(with = "u256_string_serialization")]
    pub amount: U256,
    /// The address sending the funds
    pub sender: Address,
    /// The address receiving the funds
    pub recipient: Address,
}

impl SwapIntent {
    /// Build an intent from a decimal amount string, converting it with the
    /// source token's decimals
    pub fn from_decimal_amount(
        source_token: &Token,
        destination_token: &Token,
        amount: &str,
        sender: Address,
        recipient: Address,
    ) -> Result<Self, UnitsError> {
        let amount = parse_amount(amount, source_token.decimals)?;
        Ok(Self {
            source_chain: source_token.chain_id,
            destination_chain: destination_token.chain_id,
            source_token: source_token.address,
            destination_token: destination_token.address,
            amount,
            sender,
            recipient,
        })
    }

    /// Whether the intent crosses networks
    pub fn is_cross_chain(&self) -> bool {
        self.source_chain != self.destination_chain
    }
}

// ---------------------
// | Discovery Options |
// ---------------------

/// The ordering the routing service applies to candidate routes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteOrder {
    /// Order by net output after costs
    #[default]
    Cheapest,
    /// Order by execution time
    Fastest,
}

impl Display for RouteOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteOrder::Cheapest => write!(f, "CHEAPEST"),
            RouteOrder::Fastest => write!(f, "FASTEST"),
        }
    }
}

/// The selection policy sent with every discovery request
///
/// This is fixed configuration of a discovery client rather than a
/// per-request parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOptions {
    /// The route ordering
    pub order: RouteOrder,
    /// The maximum acceptable price impact, as a fraction
    pub max_price_impact: f64,
    /// The maximum acceptable slippage, as a fraction
    pub slippage: f64,
    /// The integrator fee, as a fraction
    pub fee: f64,
    /// The integrator name
    pub integrator: String,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            order: RouteOrder::Cheapest,
            max_price_impact: DEFAULT_MAX_PRICE_IMPACT,
            slippage: DEFAULT_SLIPPAGE,
            fee: DEFAULT_INTEGRATOR_FEE,
            integrator: DEFAULT_INTEGRATOR.to_string(),
        }
    }
}
