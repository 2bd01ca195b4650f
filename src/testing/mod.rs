//! Test utilities.
//!
//! [`DrawTxBuilder`] and [`PoolSnapshotBuilder`] build reconciliation inputs
//! with controlled values, [`tokens`] and [`units`] express amounts the way
//! they appear on chain.

use alloy::primitives::{Address, TxHash, U256, address, utils::parse_units};

use crate::{
    reserve::PoolSnapshot,
    types::{
        DrawId, DrawTx, LedgerEvent, ManualContribution, PrizeBackstop,
        ReserveSnapshot, StateInstant, TokenInfo,
    },
};

pub const PRIZE_TOKEN_DECIMALS: u8 = 18;

pub const PRIZE_TOKEN: Address = address!("0x4200000000000000000000000000000000000006");

/// Amount of an 18-decimals token in smallest units, e.g. `tokens("0.5")`.
///
/// # Panics
///
/// If the value is not a valid decimal number.
pub fn tokens(value: &str) -> U256 {
    units(value, PRIZE_TOKEN_DECIMALS)
}

/// Amount in smallest units of a token with the given decimals.
///
/// # Panics
///
/// If the value is not a valid decimal number.
pub fn units(value: &str, decimals: u8) -> U256 {
    parse_units(value, decimals)
        .unwrap_or_else(|e| panic!("invalid token amount {value:?}: {e}"))
        .get_absolute()
}

/// Prize token with 18 decimals.
pub fn prize_token() -> TokenInfo {
    TokenInfo::new(PRIZE_TOKEN, "WETH", PRIZE_TOKEN_DECIMALS)
}

pub fn manual(block_number: u64, amount: U256) -> ManualContribution {
    LedgerEvent::at(block_number, amount)
}

pub fn backstop(block_number: u64, amount: U256) -> PrizeBackstop {
    LedgerEvent::at(block_number, amount)
}

/// Builds [`DrawTx`] instances, auction and award rewards default to zero.
#[derive(Clone, Debug)]
pub struct DrawTxBuilder {
    draw_id: DrawId,
    block_number: u64,
    awarded_at: u64,
    auction_reward: Option<U256>,
    award_reward: U256,
    remaining_reserve: U256,
}

impl DrawTxBuilder {
    pub fn new(draw_id: DrawId) -> Self {
        Self {
            draw_id,
            block_number: 0,
            awarded_at: 0,
            auction_reward: Some(U256::ZERO),
            award_reward: U256::ZERO,
            remaining_reserve: U256::ZERO,
        }
    }

    pub fn block(mut self, block_number: u64) -> Self {
        self.block_number = block_number;
        self
    }

    pub fn awarded_at(mut self, timestamp: u64) -> Self {
        self.awarded_at = timestamp;
        self
    }

    pub fn auction_reward(mut self, reward: U256) -> Self {
        self.auction_reward = Some(reward);
        self
    }

    /// Draw whose auction was never observed.
    pub fn no_auction(mut self) -> Self {
        self.auction_reward = None;
        self
    }

    pub fn award_reward(mut self, reward: U256) -> Self {
        self.award_reward = reward;
        self
    }

    pub fn remaining_reserve(mut self, reserve: U256) -> Self {
        self.remaining_reserve = reserve;
        self
    }

    pub fn build(self) -> DrawTx {
        DrawTx::new(
            self.draw_id,
            StateInstant::new(self.block_number, self.awarded_at),
            TxHash::ZERO,
            self.auction_reward,
            self.award_reward,
            self.remaining_reserve,
        )
    }
}

/// Builds [`PoolSnapshot`] instances, empty with an 18-decimals prize token by default.
#[derive(Clone, Debug)]
pub struct PoolSnapshotBuilder {
    snapshot: PoolSnapshot,
}

impl Default for PoolSnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolSnapshotBuilder {
    pub fn new() -> Self {
        Self {
            snapshot: PoolSnapshot {
                instant: StateInstant::default(),
                reserve: ReserveSnapshot::default(),
                draws: Vec::new(),
                manual_contributions: Vec::new(),
                prize_backstops: Vec::new(),
                first_draw_opened_at: 0,
                prize_token: prize_token(),
            },
        }
    }

    pub fn instant(mut self, block_number: u64, block_timestamp: u64) -> Self {
        self.snapshot.instant = StateInstant::new(block_number, block_timestamp);
        self
    }

    pub fn pending_reserve(mut self, pending: U256) -> Self {
        self.snapshot.reserve.pending = pending;
        self
    }

    pub fn current_reserve(mut self, current: U256) -> Self {
        self.snapshot.reserve.current = current;
        self
    }

    pub fn draw(mut self, draw: DrawTx) -> Self {
        self.snapshot.draws.push(draw);
        self
    }

    pub fn manual(mut self, block_number: u64, amount: U256) -> Self {
        self.snapshot
            .manual_contributions
            .push(manual(block_number, amount));
        self
    }

    pub fn backstop(mut self, block_number: u64, amount: U256) -> Self {
        self.snapshot
            .prize_backstops
            .push(backstop(block_number, amount));
        self
    }

    pub fn first_draw_opened_at(mut self, timestamp: u64) -> Self {
        self.snapshot.first_draw_opened_at = timestamp;
        self
    }

    pub fn prize_token(mut self, token: TokenInfo) -> Self {
        self.snapshot.prize_token = token;
        self
    }

    pub fn build(self) -> PoolSnapshot {
        self.snapshot
    }
}
