//! Network configuration for the transaction engine

use crate::address::AddressCodec;
use crate::constants::{
    DEFAULT_CONFIRMATION_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
    MIN_POLL_INTERVAL,
};
use alloy::primitives::Address;
use eyre::{ensure, Context, Result};
use std::time::Duration;

/// Node endpoint, token contract and timing knobs consumed by the engine
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Token contract address
    pub token_contract: Address,
    /// Per-request timeout against the node
    pub request_timeout: Duration,
    /// How long to wait for a receipt before reporting a timeout
    pub confirmation_timeout: Duration,
    /// Receipt polling interval
    pub poll_interval: Duration,
    /// Proof-of-authority header compatibility. Alloy decodes extended
    /// `extraData` natively, so the flag is carried but changes nothing.
    pub poa_compat: bool,
    /// If set, connecting fails when the node reports a different chain id
    pub expected_chain_id: Option<u64>,
}

impl NetworkConfig {
    /// Create configuration with default timeouts
    pub fn new(rpc_url: impl Into<String>, token_contract: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            token_contract,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poa_compat: false,
            expected_chain_id: None,
        }
    }

    /// Load configuration from `ENGINE_*` environment variables
    ///
    /// `ENGINE_RPC_URL` and `ENGINE_TOKEN_CONTRACT` are required; the rest fall
    /// back to defaults.
    pub fn from_env() -> Result<Self> {
        let rpc_url = std::env::var("ENGINE_RPC_URL").context("ENGINE_RPC_URL must be set")?;
        let token_raw = std::env::var("ENGINE_TOKEN_CONTRACT")
            .context("ENGINE_TOKEN_CONTRACT must be set")?;
        let token_contract =
            AddressCodec::normalize(&token_raw).context("Invalid ENGINE_TOKEN_CONTRACT")?;

        let mut config = Self::new(rpc_url, token_contract);

        if let Some(secs) = env_parse::<u64>("ENGINE_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("ENGINE_CONFIRMATION_TIMEOUT_SECS")? {
            config.confirmation_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = env_parse::<u64>("ENGINE_POLL_INTERVAL_MS")? {
            ensure!(ms > 0, "ENGINE_POLL_INTERVAL_MS must be greater than zero");
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(flag) = env_parse::<bool>("ENGINE_POA_COMPAT")? {
            config.poa_compat = flag;
        }
        config.expected_chain_id = env_parse::<u64>("ENGINE_CHAIN_ID")?;

        Ok(config)
    }

    /// Set the RPC URL
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the confirmation timeout
    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Set the receipt polling interval (at least [`MIN_POLL_INTERVAL`])
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Enable proof-of-authority compatibility
    pub fn with_poa_compat(mut self, enabled: bool) -> Self {
        self.poa_compat = enabled;
        self
    }

    /// Require the node to report this chain id
    pub fn with_expected_chain_id(mut self, chain_id: u64) -> Self {
        self.expected_chain_id = Some(chain_id);
        self
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        Err(_) => Ok(None),
    }
}
