use alloy::primitives::{TxHash, U256};

use super::{DrawId, StateInstant};

/// Completed draw: the award transaction paired with the optional
/// auction reward paid to whoever started the draw.
#[derive(Clone, derive_more::Debug, PartialEq, Eq)]
pub struct DrawTx {
    draw_id: DrawId,
    instant: StateInstant,
    tx_hash: TxHash,
    auction_reward: Option<U256>,
    #[debug("{award_reward}")]
    award_reward: U256,
    #[debug("{remaining_reserve}")]
    remaining_reserve: U256,
}

impl DrawTx {
    pub fn new(
        draw_id: DrawId,
        instant: StateInstant,
        tx_hash: TxHash,
        auction_reward: Option<U256>,
        award_reward: U256,
        remaining_reserve: U256,
    ) -> Self {
        Self {
            draw_id,
            instant,
            tx_hash,
            auction_reward,
            award_reward,
            remaining_reserve,
        }
    }

    pub fn draw_id(&self) -> DrawId {
        self.draw_id
    }

    /// Instant of the award transaction.
    pub fn instant(&self) -> StateInstant {
        self.instant
    }

    pub fn block_number(&self) -> u64 {
        self.instant.block_number()
    }

    /// Timestamp the draw was awarded at.
    pub fn awarded_at(&self) -> u64 {
        self.instant.block_timestamp()
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    /// Reward paid for starting the draw, `None` if no auction was observed.
    pub fn auction_reward(&self) -> Option<U256> {
        self.auction_reward
    }

    /// Reward paid for awarding the draw.
    pub fn award_reward(&self) -> U256 {
        self.award_reward
    }

    /// Reserve left over after the draw was awarded.
    pub fn remaining_reserve(&self) -> U256 {
        self.remaining_reserve
    }

    /// Auction plus award reward, `None` without the auction leg
    /// or if the sum does not fit.
    pub fn total_reward(&self) -> Option<U256> {
        self.auction_reward?.checked_add(self.award_reward)
    }
}
