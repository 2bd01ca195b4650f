use std::iter;

use alloy::primitives::U256;
use itertools::Itertools;
use tracing::debug;

use super::ReconcileError;
use crate::types::{DrawId, DrawTx};

/// Half-open block range `[min_block, max_block)` between two awarded draws.
///
/// The open interval after the latest draw has `max_block == u64::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DrawInterval {
    pub index: u32,
    pub min_block: u64,
    pub max_block: u64,
}

impl DrawInterval {
    pub fn contains(&self, block_number: u64) -> bool {
        block_number >= self.min_block && block_number < self.max_block
    }

    /// Whether the interval extends to the chain tip.
    pub fn is_open(&self) -> bool {
        self.max_block == u64::MAX
    }
}

/// Draw that went through the auction, the only kind that gets a series point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuctionedDraw<'a> {
    draw: &'a DrawTx,
    auction_reward: U256,
}

impl<'a> AuctionedDraw<'a> {
    pub fn draw(&self) -> &'a DrawTx {
        self.draw
    }

    pub fn draw_id(&self) -> DrawId {
        self.draw.draw_id()
    }

    pub fn block_number(&self) -> u64 {
        self.draw.block_number()
    }

    pub fn auction_reward(&self) -> U256 {
        self.auction_reward
    }

    /// Auction plus award reward, `None` on overflow.
    pub fn rewards(&self) -> Option<U256> {
        self.auction_reward.checked_add(self.draw.award_reward())
    }
}

/// Keeps draws with an observed auction reward, in the given order.
///
/// Dropped draws leave no gap: the neighbouring interval simply extends
/// over their blocks.
// TODO: confirm with the protocol team whether draws awarded without an
// auction should be charted instead of folded into the next interval.
pub fn auctioned_draws(draws: &[DrawTx]) -> Vec<AuctionedDraw<'_>> {
    draws
        .iter()
        .filter_map(|draw| match draw.auction_reward() {
            Some(auction_reward) => Some(AuctionedDraw {
                draw,
                auction_reward,
            }),
            None => {
                debug!(
                    draw_id = draw.draw_id(),
                    block_number = draw.block_number(),
                    "Skipping draw without auction reward"
                );
                None
            }
        })
        .collect()
}

/// Fails if draws are not ascending by award block.
pub(crate) fn ensure_ordered(draws: &[AuctionedDraw<'_>]) -> Result<(), ReconcileError> {
    match draws
        .iter()
        .tuple_windows()
        .find(|(prev, next)| prev.block_number() > next.block_number())
    {
        Some((prev, next)) => Err(ReconcileError::UnorderedDraws {
            previous: prev.draw_id(),
            previous_block: prev.block_number(),
            next: next.draw_id(),
            next_block: next.block_number(),
        }),
        None => Ok(()),
    }
}

/// Splits block history at every draw's award block.
///
/// Produces `draws.len() + 1` contiguous intervals: the first one starts at
/// block `0`, the last one is open-ended. Interval `i` ends at the block
/// draw `i` was awarded in, so events of the award block itself belong to
/// the following interval.
pub fn partition(draws: &[AuctionedDraw<'_>]) -> Vec<DrawInterval> {
    iter::once(0)
        .chain(draws.iter().map(AuctionedDraw::block_number))
        .chain(iter::once(u64::MAX))
        .tuple_windows()
        .enumerate()
        .map(|(index, (min_block, max_block))| DrawInterval {
            index: index as u32,
            min_block,
            max_block,
        })
        .collect()
}
