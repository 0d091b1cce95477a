//! Defines the command-line arguments of the swap CLI

use std::time::Duration;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand};
use route_client::{RouteClientConfig, DEFAULT_TIMEOUT_SECS, LIFI_BASE_URL};
use swap_executor_api::{
    chain::{ChainId, Token},
    intent::{DiscoveryOptions, DEFAULT_INTEGRATOR},
};
use swap_session::session::state::DEFAULT_AMOUNT;

/// The default delay between simulated processes, in milliseconds
const DEFAULT_STEP_DELAY_MS: u64 = 500;

/// Discover and simulate cross-chain swap routes
#[rustfmt::skip]
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // --- Routing Service --- //
    /// The base URL of the LI.FI API
    #[clap(long, env = "LIFI_BASE_URL", default_value = LIFI_BASE_URL)]
    pub lifi_base_url: String,
    /// The LI.FI API key, if any
    #[clap(long, env = "LIFI_API_KEY")]
    pub lifi_api_key: Option<String>,
    /// The integrator name reported with each route request
    #[clap(long, env = "LIFI_INTEGRATOR", default_value = DEFAULT_INTEGRATOR)]
    pub integrator: String,
    /// The timeout applied to each request, in seconds
    #[clap(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    // --- Telemetry --- //
    /// Whether to emit JSON-formatted logs
    #[clap(long, env = "JSON_LOGS")]
    pub json_logs: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The routing client configuration described by the arguments
    pub fn route_client_config(&self) -> RouteClientConfig {
        let options =
            DiscoveryOptions { integrator: self.integrator.clone(), ..Default::default() };

        RouteClientConfig {
            base_url: self.lifi_base_url.clone(),
            api_key: self.lifi_api_key.clone(),
            options,
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// The commands of the swap CLI
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the supported networks
    Chains,
    /// List the tokens of a network
    Tokens {
        /// The network to list tokens for
        #[clap(long)]
        chain: ChainId,
    },
    /// Discover routes for a swap
    Routes(IntentArgs),
    /// Discover routes for a swap and simulate executing one
    Simulate(SimulateArgs),
}

/// The arguments describing a swap
#[rustfmt::skip]
#[derive(Args, Debug, Clone)]
pub struct IntentArgs {
    /// The network the value leaves from
    #[clap(long)]
    pub from_chain: ChainId,
    /// The network the value arrives on
    #[clap(long)]
    pub to_chain: ChainId,
    /// The token sold, by symbol or address
    #[clap(long)]
    pub from_token: String,
    /// The token bought, by symbol or address
    #[clap(long)]
    pub to_token: String,
    /// The decimal amount sold
    #[clap(long, default_value = DEFAULT_AMOUNT)]
    pub amount: String,
    /// The address sending and receiving the funds
    #[clap(long, env = "SWAP_ADDRESS")]
    pub address: Address,
}

/// The arguments of a simulated execution
#[rustfmt::skip]
#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// The swap to simulate
    #[command(flatten)]
    pub intent: IntentArgs,
    /// The index of the discovered route to execute
    #[clap(long, default_value_t = 0)]
    pub route_index: usize,
    /// The delay between simulated processes, in milliseconds
    #[clap(long, default_value_t = DEFAULT_STEP_DELAY_MS)]
    pub step_delay_ms: u64,
    /// If set, the final step's output drifts down by this many basis points
    #[clap(long)]
    pub rate_drift_bps: Option<u32>,
    /// Accept every prompt without asking
    #[clap(long)]
    pub auto_accept: bool,
}

/// Find a token by address or case-insensitive symbol
pub fn find_token<'a>(tokens: &'a [Token], query: &str) -> Option<&'a Token> {
    if let Ok(address) = query.parse::<Address>() {
        return tokens.iter().find(|token| token.address == address);
    }

    tokens.iter().find(|token| token.symbol.eq_ignore_ascii_case(query))
}
