//! Configuration for the reserve monitor.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): connection details, prize pool
//! - CLI arguments: refresh cadence and output

use std::time::Duration;

use alloy::primitives::Address;
use clap::{Parser, ValueEnum};
use prize_reserve::{Chain, fetch::DEFAULT_BLOCKS_PER_QUERY, tracker::RecomputePolicy};

/// Environment configuration (connection details, prize pool).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// Chain ID (e.g., 10 for Optimism)
    pub chain_id: u64,

    /// Prize pool contract address, defaults to the known deployment of the chain
    pub prize_pool_address: Option<String>,

    /// First block to query prize pool logs from
    pub query_start_block: u64,

    /// RPC URL for the node
    pub node_rpc_url: String,

    /// Optional token bought back with the remaining reserve
    pub burn_token_address: Option<String>,

    /// Optional block range of a single log query (default: 10000)
    pub blocks_per_query: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Resolve the chain from the configured ID and addresses.
    pub fn chain(&self) -> Result<Chain, ConfigError> {
        let chain = match &self.prize_pool_address {
            Some(address) => Chain::custom(
                self.chain_id,
                address
                    .parse()
                    .map_err(|_| ConfigError::InvalidAddress("prize_pool_address"))?,
                self.query_start_block,
            ),
            None => Chain::by_id(self.chain_id)
                .ok_or(ConfigError::UnknownChain(self.chain_id))?
                .with_query_start_block(self.query_start_block),
        };
        Ok(chain)
    }

    /// Parse the burn token address, if any.
    pub fn burn_token_address(&self) -> Result<Option<Address>, ConfigError> {
        self.burn_token_address
            .as_deref()
            .map(|address| {
                address
                    .parse()
                    .map_err(|_| ConfigError::InvalidAddress("burn_token_address"))
            })
            .transpose()
    }

    pub fn blocks_per_query(&self) -> u64 {
        self.blocks_per_query.unwrap_or(DEFAULT_BLOCKS_PER_QUERY)
    }
}

/// Output format of the series.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable table
    #[default]
    Table,
    /// One JSON document per recomputed series
    Json,
}

/// Input changes triggering a recompute.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum Policy {
    /// Any input change
    #[default]
    AllInputs,
    /// Reserve, draws and clock only
    DrawBoundaries,
}

impl From<Policy> for RecomputePolicy {
    fn from(value: Policy) -> Self {
        match value {
            Policy::AllInputs => RecomputePolicy::AllInputs,
            Policy::DrawBoundaries => RecomputePolicy::DrawBoundaries,
        }
    }
}

/// CLI arguments for the reserve monitor.
#[derive(Debug, Parser)]
#[command(name = "reserve-monitor")]
#[command(about = "Track how the prize pool reserve accumulates and is drawn down over draws")]
pub struct CliConfig {
    /// Seconds between prize pool refreshes
    #[arg(long, default_value = "300")]
    pub refresh_seconds: u64,

    /// Seconds between clock ticks of the live point
    #[arg(long, default_value = "60")]
    pub clock_seconds: u64,

    /// Fetch and print the series once, then exit
    #[arg(long)]
    pub once: bool,

    /// Output format: table or json
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Recompute policy: all-inputs or draw-boundaries
    #[arg(long, value_enum, default_value = "all-inputs")]
    pub policy: Policy,
}

/// Runtime settings of the monitor loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonitorConfig {
    pub refresh_interval: Duration,
    pub clock_interval: Duration,
    pub once: bool,
    pub format: OutputFormat,
    pub policy: RecomputePolicy,
}

impl CliConfig {
    /// Validate CLI arguments into the monitor settings.
    pub fn to_monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        if self.refresh_seconds == 0 {
            return Err(ConfigError::ZeroInterval("refresh_seconds"));
        }
        if self.clock_seconds == 0 {
            return Err(ConfigError::ZeroInterval("clock_seconds"));
        }

        Ok(MonitorConfig {
            refresh_interval: Duration::from_secs(self.refresh_seconds),
            clock_interval: Duration::from_secs(self.clock_seconds),
            once: self.once,
            format: self.format,
            policy: self.policy.into(),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("Invalid address in {0}")]
    InvalidAddress(&'static str),

    #[error("No known prize pool for chain {0}, set PRIZE_POOL_ADDRESS")]
    UnknownChain(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(prize_pool_address: Option<&str>, chain_id: u64) -> EnvConfig {
        EnvConfig {
            chain_id,
            prize_pool_address: prize_pool_address.map(str::to_string),
            query_start_block: 100,
            node_rpc_url: "http://localhost:8545".to_string(),
            burn_token_address: None,
            blocks_per_query: None,
        }
    }

    #[test]
    fn test_cli_config_to_monitor_config() {
        let cli = CliConfig::parse_from([
            "reserve-monitor",
            "--refresh-seconds",
            "30",
            "--format",
            "json",
            "--policy",
            "draw-boundaries",
        ]);

        let config = cli.to_monitor_config().unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.clock_interval, Duration::from_secs(60));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.policy, RecomputePolicy::DrawBoundaries);
        assert!(!config.once);
    }

    #[test]
    fn test_zero_interval() {
        let cli = CliConfig::parse_from(["reserve-monitor", "--clock-seconds", "0"]);

        assert!(matches!(
            cli.to_monitor_config(),
            Err(ConfigError::ZeroInterval("clock_seconds"))
        ));
    }

    #[test]
    fn test_env_chain() {
        let chain = env(None, 10).chain().unwrap();
        assert_eq!(chain.prize_pool(), Chain::optimism().prize_pool());
        assert_eq!(chain.query_start_block(), 100);

        let chain = env(Some("0x0000000000000000000000000000000000000001"), 31337)
            .chain()
            .unwrap();
        assert_eq!(chain.chain_id(), 31337);

        assert!(matches!(
            env(None, 31337).chain(),
            Err(ConfigError::UnknownChain(31337))
        ));
        assert!(matches!(
            env(Some("pool"), 10).chain(),
            Err(ConfigError::InvalidAddress("prize_pool_address"))
        ));
    }

    #[test]
    fn test_env_burn_token() {
        let mut config = env(None, 10);
        assert_eq!(config.burn_token_address().unwrap(), None);
        assert_eq!(config.blocks_per_query(), DEFAULT_BLOCKS_PER_QUERY);

        config.burn_token_address = Some("0x0000000000000000000000000000000000000002".into());
        assert!(config.burn_token_address().unwrap().is_some());

        config.burn_token_address = Some("burn".into());
        assert!(config.burn_token_address().is_err());
    }
}
