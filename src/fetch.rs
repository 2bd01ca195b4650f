//! Prize pool state and log fetching.
//!
//! [`Fetcher`] reads everything the reserve series is reconciled from:
//! reserve balances and the first draw timestamp via view calls, draw awards
//! and ledger events via chunked `eth_getLogs` queries.
//!
//! [`Fetcher::snapshot`] pins all queries to a single block to get a
//! consistent [`PoolSnapshot`]. It is recommended to setup the provider with
//! [`alloy::transports::layers::RetryBackoffLayer`], no retries are done here.

use std::collections::{HashMap, hash_map};

use alloy::{
    eips::{BlockId, BlockNumberOrTag},
    primitives::{Address, TxHash, U256},
    providers::Provider,
    rpc::types::{Filter, Log},
    sol_types::{SolEvent, SolEventInterface},
};
use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    Chain,
    abi::{
        draw_manager::DrawManager::{self, DrawManagerEvents},
        erc20::ERC20,
        prize_pool::PrizePool::{self, PrizePoolEvents},
    },
    error::ProviderError,
    reserve::PoolSnapshot,
    types::{
        DrawId, DrawTx, LedgerEvent, LedgerKind, ManualContribution, PrizeBackstop,
        ReserveSnapshot, StateInstant, TokenInfo,
    },
};

/// Default block range of a single `eth_getLogs` query.
/// Fits the limits of most public RPC providers.
pub const DEFAULT_BLOCKS_PER_QUERY: u64 = 10_000;

/// Reads prize pool state and logs for a [`Chain`].
#[derive(Clone, Debug)]
pub struct Fetcher<P> {
    chain: Chain,
    provider: P,
    instance: PrizePool::PrizePoolInstance<P>,
    block_id: BlockId,
    blocks_per_query: u64,
}

impl<P: Provider + Clone> Fetcher<P> {
    /// Creates a new [`Fetcher`] reading the latest state.
    pub fn new(chain: &Chain, provider: P) -> Self {
        Self {
            chain: chain.clone(),
            instance: PrizePool::new(chain.prize_pool(), provider.clone()),
            provider,
            block_id: BlockId::Number(BlockNumberOrTag::Latest),
            blocks_per_query: DEFAULT_BLOCKS_PER_QUERY,
        }
    }

    /// Sets the block to read the state at and to query logs up to (default: latest).
    pub fn at_block(mut self, block: BlockId) -> Self {
        self.block_id = block;
        self
    }

    /// Sets the block range of a single log query (default: 10000).
    /// Use if default does not fit node/provider limits.
    pub fn with_blocks_per_query(mut self, blocks_per_query: u64) -> Self {
        self.blocks_per_query = blocks_per_query.max(1);
        self
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Fetches all reconciliation inputs at a single block.
    pub async fn snapshot(&self) -> Result<PoolSnapshot, ProviderError> {
        let instant = self.normalize_block().await?;
        let pinned = self.clone().at_block(BlockId::number(instant.block_number()));
        let from_block = self.chain.query_start_block();

        let (
            reserve,
            draws,
            manual_contributions,
            prize_backstops,
            first_draw_opened_at,
            prize_token,
        ) = futures::try_join!(
            pinned.reserve(),
            pinned.draw_transactions(),
            pinned.manual_contribution_events(from_block),
            pinned.prize_backstop_events(from_block),
            pinned.first_draw_opened_at(),
            pinned.prize_token(),
        )?;

        debug!(
            block_number = instant.block_number(),
            draws = draws.len(),
            manual_contributions = manual_contributions.len(),
            prize_backstops = prize_backstops.len(),
            "Fetched prize pool snapshot"
        );

        Ok(PoolSnapshot {
            instant,
            reserve,
            draws,
            manual_contributions,
            prize_backstops,
            first_draw_opened_at,
            prize_token,
        })
    }

    /// Current and pending reserve of the prize pool.
    pub async fn reserve(&self) -> Result<ReserveSnapshot, ProviderError> {
        let (current_call, pending_call) = (
            self.instance.reserve().block(self.block_id),
            self.instance.pendingReserveContributions().block(self.block_id),
        );
        let (current, pending) = futures::try_join!(
            current_call.call().into_future(),
            pending_call.call().into_future(),
        )?;
        Ok(ReserveSnapshot { current, pending })
    }

    /// Timestamp the first draw of the prize pool opened at.
    pub async fn first_draw_opened_at(&self) -> Result<u64, ProviderError> {
        let opens_at = self
            .instance
            .firstDrawOpensAt()
            .block(self.block_id)
            .call()
            .await?;
        Ok(opens_at.to())
    }

    /// Metadata of the token prizes are paid in.
    pub async fn prize_token(&self) -> Result<TokenInfo, ProviderError> {
        let address = self
            .instance
            .prizeToken()
            .block(self.block_id)
            .call()
            .await?;
        self.token_info(address).await
    }

    /// Metadata of an arbitrary ERC-20 token.
    pub async fn token_info(&self, address: Address) -> Result<TokenInfo, ProviderError> {
        let token = ERC20::new(address, self.provider.clone());
        let (symbol_call, decimals_call) = (
            token.symbol().block(self.block_id),
            token.decimals().block(self.block_id),
        );
        let (symbol, decimals) = futures::try_join!(
            symbol_call.call().into_future(),
            decimals_call.call().into_future(),
        )?;
        Ok(TokenInfo::new(address, symbol, decimals))
    }

    /// Completed draws ordered by award block, each paired with the reward
    /// of the latest auction that started it, if any.
    pub async fn draw_transactions(&self) -> Result<Vec<DrawTx>, ProviderError> {
        let draw_manager = self
            .instance
            .drawManager()
            .block(self.block_id)
            .call()
            .await?;
        let filter = Filter::new().address(draw_manager).event_signature(vec![
            DrawManager::DrawStarted::SIGNATURE_HASH,
            DrawManager::DrawFinished::SIGNATURE_HASH,
        ]);
        let logs = self
            .logs(filter, self.chain.query_start_block())
            .await?;

        let mut auction_rewards: HashMap<DrawId, U256> = HashMap::new();
        let mut timestamps: HashMap<u64, u64> = HashMap::new();
        let mut draws = Vec::new();
        for log in &logs {
            match DrawManagerEvents::decode_log(&log.inner)?.data {
                DrawManagerEvents::DrawStarted(e) => {
                    auction_rewards.insert(e.drawId.to(), e.reward);
                }
                DrawManagerEvents::DrawFinished(e) => {
                    let draw_id: DrawId = e.drawId.to();
                    let (tx_hash, _) = log_position(log)?;
                    let instant = self.log_instant(log, &mut timestamps).await?;
                    draws.push(DrawTx::new(
                        draw_id,
                        instant,
                        tx_hash,
                        auction_rewards.remove(&draw_id),
                        e.reward,
                        e.remainingReserve,
                    ));
                }
            }
        }

        trace!(
            draw_manager = %draw_manager,
            draws = draws.len(),
            unmatched_auctions = auction_rewards.len(),
            "Fetched draw transactions"
        );
        Ok(draws
            .into_iter()
            .sorted_by_key(DrawTx::block_number)
            .collect())
    }

    /// Direct contributions to the reserve.
    pub async fn manual_contribution_events(
        &self,
        from_block: u64,
    ) -> Result<Vec<ManualContribution>, ProviderError> {
        let filter = Filter::new()
            .address(self.chain.prize_pool())
            .event_signature(PrizePool::ContributedReserve::SIGNATURE_HASH);
        self.ledger_events(filter, from_block, |event| match event {
            PrizePoolEvents::ContributedReserve(e) => Some(e.amount),
            _ => None,
        })
        .await
    }

    /// Prize tokens donated by the prize pool donator.
    pub async fn prize_backstop_events(
        &self,
        from_block: u64,
    ) -> Result<Vec<PrizeBackstop>, ProviderError> {
        let donator = self
            .instance
            .DONATOR()
            .block(self.block_id)
            .call()
            .await?;
        let filter = Filter::new()
            .address(self.chain.prize_pool())
            .event_signature(PrizePool::ContributePrizeTokens::SIGNATURE_HASH)
            .topic1(donator.into_word());
        self.ledger_events(filter, from_block, |event| match event {
            PrizePoolEvents::ContributePrizeTokens(e) => Some(e.amount),
            _ => None,
        })
        .await
    }

    async fn ledger_events<K: LedgerKind>(
        &self,
        filter: Filter,
        from_block: u64,
        amount: impl Fn(PrizePoolEvents) -> Option<U256>,
    ) -> Result<Vec<LedgerEvent<K>>, ProviderError> {
        let logs = self.logs(filter, from_block).await?;
        let mut timestamps = HashMap::new();
        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            let Some(value) = amount(PrizePoolEvents::decode_log(&log.inner)?.data) else {
                continue;
            };
            let (tx_hash, log_index) = log_position(log)?;
            let instant = self.log_instant(log, &mut timestamps).await?;
            events.push(LedgerEvent::new(instant, tx_hash, log_index, value));
        }
        trace!(category = %K::CATEGORY, events = events.len(), "Fetched ledger events");
        Ok(events)
    }

    /// Logs matching the filter from the given block up to the fetcher's block,
    /// queried in ranges of `blocks_per_query`.
    async fn logs(&self, filter: Filter, from_block: u64) -> Result<Vec<Log>, ProviderError> {
        let to_block = self.block_number().await?;
        let mut logs = Vec::new();
        let mut start = from_block;
        while start <= to_block {
            let end = to_block.min(start.saturating_add(self.blocks_per_query - 1));
            let chunk = self
                .provider
                .get_logs(&filter.clone().from_block(start).to_block(end))
                .await?;
            trace!(start, end, logs = chunk.len(), "Fetched logs");
            logs.extend(chunk);
            match end.checked_add(1) {
                Some(next) => start = next,
                None => break,
            }
        }
        Ok(logs)
    }

    /// Block of the log along with its timestamp, fetching the block header
    /// if the provider does not include timestamps in logs.
    async fn log_instant(
        &self,
        log: &Log,
        timestamps: &mut HashMap<u64, u64>,
    ) -> Result<StateInstant, ProviderError> {
        let block_number = log
            .block_number
            .ok_or(ProviderError::IncompleteLog("block number", log.transaction_hash))?;
        if let Some(timestamp) = log.block_timestamp {
            return Ok(StateInstant::new(block_number, timestamp));
        }
        let timestamp = match timestamps.entry(block_number) {
            hash_map::Entry::Occupied(entry) => *entry.get(),
            hash_map::Entry::Vacant(entry) => {
                let header = self
                    .provider
                    .get_block(BlockId::number(block_number))
                    .await?
                    .map(|b| b.into_header())
                    .ok_or(ProviderError::BlockNotFound(block_number))?;
                *entry.insert(header.timestamp)
            }
        };
        Ok(StateInstant::new(block_number, timestamp))
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        match self.block_id {
            BlockId::Number(BlockNumberOrTag::Number(number)) => Ok(number),
            _ => Ok(self.normalize_block().await?.block_number()),
        }
    }

    async fn normalize_block(&self) -> Result<StateInstant, ProviderError> {
        let block_header = self
            .provider
            .get_block(self.block_id)
            .await?
            .map(|b| b.into_header())
            .ok_or(ProviderError::InvalidRequest("block not found".to_string()))?;
        Ok(StateInstant::new(
            block_header.number,
            block_header.timestamp,
        ))
    }
}

/// Transaction hash and log index of a mined log.
fn log_position(log: &Log) -> Result<(TxHash, u64), ProviderError> {
    let tx_hash = log
        .transaction_hash
        .ok_or(ProviderError::IncompleteLog("transaction hash", None))?;
    let log_index = log
        .log_index
        .ok_or(ProviderError::IncompleteLog("log index", Some(tx_hash)))?;
    Ok((tx_hash, log_index))
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{
            self, Bytes, LogData, address,
            aliases::{U24, U48},
        },
        providers::ProviderBuilder,
        rpc::{client::RpcClient, types::Block},
        sol_types::SolValue,
        transports::{layers::RetryBackoffLayer, mock::Asserter},
    };

    use super::*;
    use crate::testing::tokens;

    const HEAD: u64 = 100;

    const DRAW_MANAGER: Address = address!("0x00000000000000000000000000000000000000d1");

    fn mocked(asserter: &Asserter) -> Fetcher<impl Provider + Clone> {
        let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
        Fetcher::new(&Chain::optimism(), provider).at_block(BlockId::number(HEAD))
    }

    /// Mined log with a block timestamp of `12 * block_number`.
    fn mined(address: Address, data: LogData, block_number: u64, log_index: u64) -> Log {
        Log {
            inner: primitives::Log { address, data },
            block_number: Some(block_number),
            block_timestamp: Some(block_number * 12),
            transaction_hash: Some(TxHash::with_last_byte(block_number as u8)),
            log_index: Some(log_index),
            ..Default::default()
        }
    }

    fn contribution(block_number: u64, amount: U256) -> Log {
        let data = PrizePool::ContributedReserve {
            user: Address::ZERO,
            amount,
        }
        .encode_log_data();
        mined(Chain::optimism().prize_pool(), data, block_number, 0)
    }

    fn draw_started(block_number: u64, draw_id: u32, reward: U256) -> Log {
        let data = DrawManager::DrawStarted {
            sender: Address::ZERO,
            recipient: Address::ZERO,
            drawId: U24::from(draw_id),
            elapsedTime: U48::ZERO,
            reward,
            rngRequestId: 0,
        }
        .encode_log_data();
        mined(DRAW_MANAGER, data, block_number, 0)
    }

    fn draw_finished(block_number: u64, draw_id: u32, reward: U256, remaining: U256) -> Log {
        let data = DrawManager::DrawFinished {
            sender: Address::ZERO,
            recipient: Address::ZERO,
            drawId: U24::from(draw_id),
            elapsedTime: U48::ZERO,
            reward,
            remainingReserve: remaining,
        }
        .encode_log_data();
        mined(DRAW_MANAGER, data, block_number, 1)
    }

    fn header(block_number: u64, timestamp: u64) -> Block {
        let mut block: Block = Block::default();
        block.header.inner.number = block_number;
        block.header.inner.timestamp = timestamp;
        block
    }

    #[tokio::test]
    async fn test_ledger_event_timestamp_from_header() {
        let asserter = Asserter::new();
        let mut first = contribution(10, tokens("1"));
        first.block_timestamp = None;
        let mut second = contribution(10, tokens("2"));
        second.block_timestamp = None;
        second.log_index = Some(1);
        asserter.push_success(&vec![first, second]);
        // One header lookup serves both logs of the block
        asserter.push_success(&header(10, 1_700_000_000));

        let events = mocked(&asserter).manual_contribution_events(0).await.unwrap();

        assert_eq!(events.len(), 2);
        for event in &events {
            assert_eq!(event.block_number(), 10);
            assert_eq!(event.instant().block_timestamp(), 1_700_000_000);
        }
        assert_eq!(events[1].amount(), tokens("2"));
        assert_eq!(events[1].log_index(), 1);
    }

    #[tokio::test]
    async fn test_draw_transactions_pair_latest_auction() {
        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from(DRAW_MANAGER.abi_encode()));
        asserter.push_success(&vec![
            draw_started(10, 1, tokens("1")),
            draw_started(12, 1, tokens("2")),
            draw_finished(20, 1, tokens("0.5"), tokens("7")),
            draw_finished(30, 2, tokens("0.25"), tokens("3")),
            draw_started(40, 3, tokens("1")),
        ]);

        let draws = mocked(&asserter).draw_transactions().await.unwrap();

        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].draw_id(), 1);
        assert_eq!(draws[0].block_number(), 20);
        assert_eq!(draws[0].awarded_at(), 240);
        assert_eq!(draws[0].auction_reward(), Some(tokens("2")));
        assert_eq!(draws[0].award_reward(), tokens("0.5"));
        assert_eq!(draws[0].remaining_reserve(), tokens("7"));

        // No auction observed for draw 2
        assert_eq!(draws[1].draw_id(), 2);
        assert_eq!(draws[1].auction_reward(), None);
        assert_eq!(draws[1].total_reward(), None);
    }

    #[tokio::test]
    async fn test_incomplete_log_fails_fetch() {
        let asserter = Asserter::new();
        let mut unmined = contribution(10, tokens("1"));
        unmined.block_number = None;
        asserter.push_success(&vec![unmined]);

        let result = mocked(&asserter).manual_contribution_events(0).await;
        assert!(matches!(
            result,
            Err(ProviderError::IncompleteLog("block number", Some(_)))
        ));

        let mut anonymous = contribution(10, tokens("1"));
        anonymous.transaction_hash = None;
        asserter.push_success(&vec![anonymous]);

        let result = mocked(&asserter).manual_contribution_events(0).await;
        assert!(matches!(
            result,
            Err(ProviderError::IncompleteLog("transaction hash", None))
        ));

        let mut unindexed = contribution(10, tokens("1"));
        unindexed.log_index = None;
        asserter.push_success(&vec![unindexed]);

        let result = mocked(&asserter).manual_contribution_events(0).await;
        assert!(matches!(
            result,
            Err(ProviderError::IncompleteLog("log index", Some(_)))
        ));
    }

    #[tokio::test]
    async fn test_logs_queried_in_inclusive_chunks() {
        // [0, 39], [40, 79], [80, 100]
        let asserter = Asserter::new();
        for block_number in [5, 45, 100] {
            asserter.push_success(&vec![contribution(block_number, tokens("1"))]);
        }
        let fetcher = mocked(&asserter).with_blocks_per_query(40);

        let events = fetcher.manual_contribution_events(0).await.unwrap();
        assert_eq!(
            events.iter().map(LedgerEvent::block_number).collect::<Vec<_>>(),
            vec![5, 45, 100]
        );

        // [60, 99], [100, 100]
        for block_number in [60, 100] {
            asserter.push_success(&vec![contribution(block_number, tokens("1"))]);
        }
        let events = fetcher.manual_contribution_events(60).await.unwrap();
        assert_eq!(events.len(), 2);

        // Starting past the pinned block queries nothing
        let events = fetcher.manual_contribution_events(HEAD + 1).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    #[ignore = "requires access to a public Optimism RPC endpoint"]
    async fn test_snapshot_optimism() {
        let client = RpcClient::builder()
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect("https://mainnet.optimism.io")
            .await
            .unwrap();
        let provider = ProviderBuilder::new().connect_client(client);
        let head = provider.get_block_number().await.unwrap();

        let chain = Chain::optimism().with_query_start_block(head - 50_000);
        let fetcher = Fetcher::new(&chain, provider).with_blocks_per_query(5_000);
        let snapshot = fetcher.snapshot().await.unwrap();

        assert!(snapshot.instant.block_number() >= head);
        assert!(snapshot.first_draw_opened_at > 0);
        assert_eq!(snapshot.prize_token.decimals, 18);
        for (prev, next) in snapshot.draws.iter().tuple_windows() {
            assert!(prev.block_number() <= next.block_number());
        }
        for event in &snapshot.manual_contributions {
            assert!(event.block_number() >= chain.query_start_block());
            assert!(event.block_number() <= snapshot.instant.block_number());
        }
    }
}
