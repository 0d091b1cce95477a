//! LiFi API type definitions
//!
//! Covers the subset of <https://apidocs.li.fi/reference/post_v1-advanced-routes>,
//! `/chains` and `/tokens` that route discovery needs

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use swap_executor_api::{
    chain::{Chain, ChainId, Token},
    intent::DiscoveryOptions,
    route::{Execution, Route, RouteId, Step, StepEstimate},
    serialization::{option_u256_string_serialization, u256_string_serialization},
};

// ------------
// | Requests |
// ------------

/// The body of an advanced routes request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifiRoutesRequest {
    /// The ID of the sending chain
    pub from_chain_id: ChainId,
    /// The ID of the receiving chain
    pub to_chain_id: ChainId,
    /// The token being sold; the zero address denotes the native token
    pub from_token_address: Address,
    /// The token being bought; the zero address denotes the native token
    pub to_token_address: Address,
    /// The amount that should be sent including all decimals
    #[serde(with = "u256_string_serialization")]
    pub from_amount: U256,
    /// The sending wallet address
    pub from_address: Address,
    /// The receiving wallet address
    pub to_address: Address,
    /// The route selection options
    pub options: LifiRouteOptions,
}

/// The route selection options of an advanced routes request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifiRouteOptions {
    /// Which kind of route should be preferred, e.g. `CHEAPEST`
    pub order: String,
    /// The maximum price impact for the transaction
    pub max_price_impact: f64,
    /// The maximum allowed slippage as a decimal value; 0.005 represents 0.5%
    pub slippage: f64,
    /// The integrator fee as a decimal value
    pub fee: f64,
    /// The integrator string attributed to the request
    pub integrator: String,
}

impl From<&DiscoveryOptions> for LifiRouteOptions {
    fn from(options: &DiscoveryOptions) -> Self {
        Self {
            order: options.order.to_string(),
            max_price_impact: options.max_price_impact,
            slippage: options.slippage,
            fee: options.fee,
            integrator: options.integrator.clone(),
        }
    }
}

// -------------
// | Responses |
// -------------

/// The response of an advanced routes request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifiRoutesResponse {
    /// The candidate routes, in the requested order
    #[serde(default)]
    pub routes: Vec<LifiRoute>,
}

/// A route as returned by LiFi
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifiRoute {
    /// The route's identifier
    id: String,
    /// The ID of the sending chain
    from_chain_id: ChainId,
    /// The ID of the receiving chain
    to_chain_id: ChainId,
    /// The token being sold
    from_token: Token,
    /// The token being bought
    to_token: Token,
    /// The amount sold
    #[serde(with = "u256_string_serialization")]
    from_amount: U256,
    /// The estimated amount received
    #[serde(with = "u256_string_serialization")]
    to_amount: U256,
    /// The minimum amount received after slippage
    #[serde(default, with = "option_u256_string_serialization")]
    to_amount_min: Option<U256>,
    /// The USD value of the amount sold
    #[serde(default, rename = "fromAmountUSD")]
    from_amount_usd: Option<String>,
    /// The USD value of the amount received
    #[serde(default, rename = "toAmountUSD")]
    to_amount_usd: Option<String>,
    /// The USD cost of gas across the route
    #[serde(default, rename = "gasCostUSD")]
    gas_cost_usd: Option<String>,
    /// The route's steps
    steps: Vec<LifiStep>,
}

/// A route step as returned by LiFi
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiStep {
    /// The step's identifier
    id: String,
    /// The kind of step
    #[serde(rename = "type")]
    step_type: String,
    /// The tool executing the step
    tool: String,
    /// The step's action
    action: LifiAction,
    /// The step's estimate
    estimate: LifiEstimate,
    /// The step's execution state, present on routes already executing
    #[serde(default)]
    execution: Option<Execution>,
}

/// The subset of a step's action we read
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiAction {
    /// The chain the step starts on
    from_chain_id: ChainId,
    /// The chain the step ends on
    to_chain_id: ChainId,
}

/// The subset of a step's estimate we read
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifiEstimate {
    /// The estimated duration in seconds
    #[serde(default)]
    execution_duration: f64,
    /// The estimated output amount of the step
    #[serde(default, with = "option_u256_string_serialization")]
    to_amount: Option<U256>,
}

impl From<LifiStep> for Step {
    fn from(step: LifiStep) -> Self {
        Step {
            id: step.id,
            step_type: step.step_type,
            tool: step.tool,
            from_chain_id: step.action.from_chain_id,
            to_chain_id: step.action.to_chain_id,
            estimate: StepEstimate {
                execution_duration: step.estimate.execution_duration,
                to_amount: step.estimate.to_amount,
            },
            execution: step.execution,
        }
    }
}

impl From<LifiRoute> for Route {
    fn from(route: LifiRoute) -> Self {
        Route {
            id: RouteId::new(route.id),
            from_chain_id: route.from_chain_id,
            to_chain_id: route.to_chain_id,
            from_token: route.from_token,
            to_token: route.to_token,
            from_amount: route.from_amount,
            to_amount: route.to_amount,
            to_amount_min: route.to_amount_min,
            from_amount_usd: route.from_amount_usd,
            to_amount_usd: route.to_amount_usd,
            gas_cost_usd: route.gas_cost_usd,
            steps: route.steps.into_iter().map(Step::from).collect(),
        }
    }
}

/// The response of a chains request
#[derive(Debug, Deserialize)]
pub struct LifiChainsResponse {
    /// The supported chains
    #[serde(default)]
    pub chains: Vec<Chain>,
}

/// The response of a tokens request, keyed by the decimal chain id
#[derive(Debug, Deserialize)]
pub struct LifiTokensResponse {
    /// The tokens of each requested chain
    #[serde(default)]
    pub tokens: HashMap<String, Vec<Token>>,
}

impl LifiTokensResponse {
    /// Take the token list of a chain; a chain absent from the response has
    /// no tokens
    pub fn take_chain(mut self, chain_id: ChainId) -> Vec<Token> {
        self.tokens.remove(&chain_id.to_string()).unwrap_or_default()
    }
}
