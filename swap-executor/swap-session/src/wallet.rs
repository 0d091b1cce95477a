//! Wallet and prompt implementations for running a session outside a browser

use std::{
    io::{self, BufRead, Write},
    sync::Mutex,
};

use alloy_primitives::Address;
use async_trait::async_trait;
use swap_executor_api::{
    chain::ChainId,
    errors::SwitchError,
    interfaces::{ConfirmationPrompt, WalletProvider},
};
use tracing::{info, warn};

// ----------
// | Wallet |
// ----------

/// A watch-only wallet at a fixed address
///
/// The wallet never signs; it only lends its address to discovery and, when
/// switching is enabled, tracks the network it was last moved to
#[derive(Debug)]
pub struct StaticWallet {
    /// The wallet's address
    address: Option<Address>,
    /// The network the wallet is on, if it supports switching
    current_chain: Option<Mutex<Option<ChainId>>>,
}

impl StaticWallet {
    /// Create a wallet at the given address; a missing address leaves the
    /// wallet disconnected
    pub fn new(address: Option<Address>) -> Self {
        Self { address, current_chain: None }
    }

    /// Enable network switching, starting on the given network
    pub fn with_network_switching(mut self, initial_chain: Option<ChainId>) -> Self {
        self.current_chain = Some(Mutex::new(initial_chain));
        self
    }

    /// The network the wallet is on, if it supports switching
    pub fn current_chain(&self) -> Option<ChainId> {
        let chain = self.current_chain.as_ref()?;
        *chain.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    fn current_address(&self) -> Option<Address> {
        self.address
    }

    fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    fn supports_network_switch(&self) -> bool {
        self.current_chain.is_some()
    }

    async fn switch_network(&self, chain_id: ChainId) -> Result<(), SwitchError> {
        let chain = self.current_chain.as_ref().ok_or(SwitchError::UnsupportedNetwork(chain_id))?;
        *chain.lock().unwrap_or_else(|e| e.into_inner()) = Some(chain_id);

        info!(chain_id, "wallet switched network");
        Ok(())
    }
}

// -----------
// | Prompts |
// -----------

/// A prompt that answers every message the same way
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompt(pub bool);

#[async_trait]
impl ConfirmationPrompt for FixedPrompt {
    async fn confirm(&self, message: &str) -> bool {
        info!(answer = self.0, "auto-answering prompt: {message}");
        self.0
    }
}

/// A prompt that asks on the terminal and reads a y/n answer from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

#[async_trait]
impl ConfirmationPrompt for TerminalPrompt {
    async fn confirm(&self, message: &str) -> bool {
        let message = message.to_string();
        let res = tokio::task::spawn_blocking(move || ask(&message)).await;

        match res {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                warn!("failed to read prompt answer: {e}");
                false
            },
            Err(e) => {
                warn!("prompt task failed: {e}");
                false
            },
        }
    }
}

/// Print a message and block on a line of stdin
fn ask(message: &str) -> io::Result<bool> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{message} [y/N] ")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(parse_answer(&line))
}

/// Whether a line of input is an affirmative answer
fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
