//! Reserve monitor orchestration and refresh loop.
//!
//! Periodically fetches a prize pool snapshot, ticks the live point clock
//! and prints the reserve series whenever it gets recomputed.

use std::sync::Arc;

use alloy::{
    primitives::Address,
    providers::{DynProvider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::layers::RetryBackoffLayer,
};
use prize_reserve::{Chain, chart::ChartData, fetch::Fetcher, tracker::ReserveTracker};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    config::MonitorConfig,
    error::{Error, Result},
    output,
};

/// Reserve monitor.
#[derive(Debug)]
pub struct ReserveMonitor {
    fetcher: Fetcher<DynProvider>,
    tracker: ReserveTracker,
    config: MonitorConfig,
    burn_token: Option<Address>,
    last_printed: Option<Arc<ChartData>>,
}

impl ReserveMonitor {
    /// Create a new reserve monitor.
    pub fn new(
        node_url: Url,
        chain: Chain,
        blocks_per_query: u64,
        burn_token: Option<Address>,
        config: MonitorConfig,
    ) -> Self {
        info!(
            chain_id = chain.chain_id(),
            prize_pool = %chain.prize_pool(),
            query_start_block = chain.query_start_block(),
            policy = ?config.policy,
            "Initializing reserve monitor"
        );

        let rpc_client = RpcClient::builder()
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .http(node_url);
        let provider = DynProvider::new(ProviderBuilder::new().connect_client(rpc_client));
        let fetcher = Fetcher::new(&chain, provider).with_blocks_per_query(blocks_per_query);

        Self {
            fetcher,
            tracker: ReserveTracker::new(config.policy),
            config,
            burn_token,
            last_printed: None,
        }
    }

    /// Run the monitor until an unrecoverable error, or once with `--once`.
    pub async fn run(&mut self) -> Result<()> {
        self.refresh_token_metadata().await?;
        self.refresh().await?;
        self.tick_clock();
        self.print_if_changed()?;

        if self.config.once {
            return match self.last_printed {
                Some(_) => Ok(()),
                None => Err(Error::NotReady),
            };
        }

        let mut refresh = tokio::time::interval(self.config.refresh_interval);
        let mut clock = tokio::time::interval(self.config.clock_interval);
        // First ticks complete immediately
        refresh.tick().await;
        clock.tick().await;

        loop {
            tokio::select! {
                _ = refresh.tick() => {
                    if let Err(e) = self.refresh().await {
                        match e {
                            Error::Provider(ref err) if err.is_transient() => {
                                warn!(%e, "Failed to refresh prize pool snapshot, retrying on next tick");
                                continue;
                            }
                            e => return Err(e),
                        }
                    }
                }
                _ = clock.tick() => {
                    self.tick_clock();
                }
            }

            // Keep the last printed series when a pass fails
            if let Err(e) = self.print_if_changed() {
                match e {
                    Error::Reconcile(ref err) => {
                        error!(%err, "Failed to reconcile reserve series");
                    }
                    e => return Err(e),
                }
            }
        }
    }

    async fn refresh_token_metadata(&mut self) -> Result<()> {
        let burn_token = match self.burn_token {
            Some(address) => Some(self.fetcher.token_info(address).await?),
            None => None,
        };
        if let Some(token) = &burn_token {
            info!(symbol = %token.symbol, decimals = token.decimals, "Tracking burn token");
        }
        self.tracker.set_burn_token(burn_token);
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        let snapshot = self.fetcher.snapshot().await?;
        let block_number = snapshot.instant.block_number();
        let changed = self.tracker.apply_snapshot(snapshot);
        debug!(block_number, changed, "Refreshed prize pool snapshot");
        Ok(())
    }

    fn tick_clock(&mut self) {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.tracker.set_clock(now);
    }

    fn print_if_changed(&mut self) -> Result<()> {
        let Some(data) = self.tracker.series()? else {
            debug!("Reserve series not ready yet");
            return Ok(());
        };
        if self
            .last_printed
            .as_ref()
            .is_some_and(|last| Arc::ptr_eq(last, &data))
        {
            return Ok(());
        }

        output::print(&data, self.config.format)?;
        info!(
            points = data.points.len(),
            passes = self.tracker.passes(),
            "Reserve series updated"
        );
        self.last_printed = Some(data);
        Ok(())
    }
}
