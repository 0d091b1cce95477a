//! The swap CLI: lists networks and tokens, discovers routes and simulates
//! executing them against the dry-run engine

use std::{error::Error, sync::Arc, time::Duration};

use clap::Parser;
use route_client::LifiClient;
use swap_executor_api::{
    chain::{ChainId, Token},
    interfaces::ConfirmationPrompt,
    progress::ProgressEntry,
    route::Route,
    units::format_amount,
};
use swap_session::{
    engines::{DryRunConfig, DryRunEngine},
    error::SessionError,
    session::SwapSession,
    telemetry::setup_logging,
    wallet::{FixedPrompt, StaticWallet, TerminalPrompt},
};
use tracing::{info, warn};

mod cli;

use cli::{find_token, Cli, Command, IntentArgs, SimulateArgs};

/// The interval at which simulated progress is polled
const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

// --------------
// | Entrypoint |
// --------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    setup_logging(cli.json_logs);

    let client = Arc::new(LifiClient::new(cli.route_client_config())?);
    match cli.command {
        Command::Chains => {
            for chain in client.get_chains().await? {
                println!("{:>8}  {:<8} {}", chain.id, chain.key, chain.name);
            }
        },
        Command::Tokens { chain } => {
            for token in client.get_tokens(chain).await? {
                println!("{:<10} {} ({} decimals)", token.symbol, token.address, token.decimals);
            }
        },
        Command::Routes(args) => {
            let session = build_session(client, &args, Arc::new(FixedPrompt(false)), None);
            let routes = discover(&session, &args).await?;
            print_routes(&routes);
        },
        Command::Simulate(args) => simulate(client, args).await?,
    }

    Ok(())
}

// ------------
// | Commands |
// ------------

/// Build a session over the routing client with a watch-only wallet
fn build_session(
    client: Arc<LifiClient>,
    args: &IntentArgs,
    prompt: Arc<dyn ConfirmationPrompt>,
    engine_config: Option<DryRunConfig>,
) -> SwapSession {
    let engine_config = engine_config.unwrap_or_default();
    let wallet = StaticWallet::new(Some(args.address))
        .with_network_switching(engine_config.initial_chain);
    let engine = Arc::new(DryRunEngine::new(engine_config));

    SwapSession::new(client.clone(), client, engine, Arc::new(wallet), prompt)
}

/// Fill in the session's form from the arguments and discover routes
async fn discover(session: &SwapSession, args: &IntentArgs) -> Result<Vec<Route>, Box<dyn Error>> {
    session.load_networks().await?;
    session.set_from_network(args.from_chain).await;
    session.set_to_network(args.to_chain).await;
    session.load_tokens().await?;

    let state = session.state().await;
    let from_token = resolve_token(&state.from_tokens, &args.from_token, args.from_chain)?;
    let to_token = resolve_token(&state.to_tokens, &args.to_token, args.to_chain)?;
    session.set_from_token(from_token).await;
    session.set_to_token(to_token).await;
    session.set_amount(&args.amount).await;

    Ok(session.request_routes().await?)
}

/// Look up a token on a network
fn resolve_token(tokens: &[Token], query: &str, chain_id: ChainId) -> Result<Token, SessionError> {
    find_token(tokens, query)
        .cloned()
        .ok_or_else(|| SessionError::validation(format!("Unknown token {query} on chain {chain_id}")))
}

/// Discover routes and simulate executing the chosen one
async fn simulate(client: Arc<LifiClient>, args: SimulateArgs) -> Result<(), Box<dyn Error>> {
    let prompt: Arc<dyn ConfirmationPrompt> =
        if args.auto_accept { Arc::new(FixedPrompt(true)) } else { Arc::new(TerminalPrompt) };
    let engine_config = DryRunConfig {
        step_delay: Duration::from_millis(args.step_delay_ms),
        initial_chain: Some(args.intent.from_chain),
        rate_drift_bps: args.rate_drift_bps,
    };
    let session = build_session(client, &args.intent, prompt, Some(engine_config));

    let routes = discover(&session, &args.intent).await?;
    print_routes(&routes);
    let route = routes
        .get(args.route_index)
        .cloned()
        .ok_or_else(|| SessionError::validation(format!("No route at index {}", args.route_index)))?;
    session.select_route(route).await;

    let runner = session.clone();
    let mut execution = tokio::spawn(async move { runner.execute_selected().await });
    let mut printed = Vec::new();
    let mut ticker = tokio::time::interval(PROGRESS_POLL_INTERVAL);

    let res = loop {
        tokio::select! {
            res = &mut execution => break res?,
            _ = ticker.tick() => print_progress(&session, &mut printed).await,
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted, stopping route execution");
                session.stop().await?;
            },
        }
    };
    print_progress(&session, &mut printed).await;

    match res {
        Ok(Some(route)) => {
            let amount = format_amount(route.to_amount, route.to_token.decimals);
            info!(route_id = %route.id.short(), "simulation finished");
            println!("Received {amount} {}", route.to_token.symbol);
        },
        Ok(None) => println!("Execution stopped"),
        Err(e) => return Err(e.into()),
    }

    if let Some(status) = session.state().await.status_message {
        println!("{status}");
    }
    Ok(())
}

// -----------
// | Display |
// -----------

/// Print a table of routes
fn print_routes(routes: &[Route]) {
    for (idx, route) in routes.iter().enumerate() {
        let to_amount = format_amount(route.to_amount, route.to_token.decimals);
        let gas = route.gas_cost_usd.as_deref().unwrap_or("?");
        println!(
            "[{idx}] {to_amount} {} via {} (~{} min, gas ${gas})",
            route.to_token.symbol,
            route.tools().join(" -> "),
            route.estimated_duration_minutes(),
        );
    }
}

/// Print the progress entries that changed since the last call
async fn print_progress(session: &SwapSession, printed: &mut Vec<ProgressEntry>) {
    let progress = session.state().await.progress;
    for (idx, entry) in progress.iter().enumerate() {
        if printed.get(idx) == Some(entry) {
            continue;
        }

        let tx = entry.tx_hash.as_deref().unwrap_or("-");
        let (step, chain) = (entry.step_index, entry.chain_id);
        println!("  step {step} on chain {chain}: {} (tx {tx})", entry.message);
    }

    *printed = progress;
}
