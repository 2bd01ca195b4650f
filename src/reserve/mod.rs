//! Reserve reconciliation.
//!
//! Turns prize pool accounting events into a chart-ready series describing
//! how the reserve accumulates and is drawn down over consecutive draws.
//!
//! The computation is pure and synchronous: [`partition`] splits the chain
//! history into half-open block intervals at every awarded draw, then
//! [`reconcile`] nets ledger events against draw payouts per interval.
//! Keeping the inputs current and deciding when to recompute is up to
//! [`crate::tracker::ReserveTracker`].

mod interval;
mod series;


use alloy::primitives::U256;
use fastnum::{D256, UD256};
use serde::Serialize;

use crate::{
    chart::SeriesLabel,
    num,
    types::{
        DrawId, DrawTx, ManualContribution, PrizeBackstop, ReserveSnapshot, StateInstant, TokenInfo,
    },
};

pub use interval::{AuctionedDraw, DrawInterval, auctioned_draws, partition};
pub use series::{reconcile, sum_in};

/// Error failing the whole reconciliation pass.
///
/// A negative liquidations figure is a valid outcome and never an error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("amount overflow while computing {0}")]
    AmountOverflow(&'static str),

    #[error(
        "draws out of order: draw {previous} at block {previous_block} followed by draw {next} at block {next_block}"
    )]
    UnorderedDraws {
        previous: DrawId,
        previous_block: u64,
        next: DrawId,
        next_block: u64,
    },
}

/// Borrowed view of everything a reconciliation pass reads.
#[derive(Clone, Copy, Debug)]
pub struct ReserveInputs<'a> {
    pub reserve: &'a ReserveSnapshot,
    /// Completed draws, ascending by award block.
    pub draws: &'a [DrawTx],
    pub manual_contributions: &'a [ManualContribution],
    pub prize_backstops: &'a [PrizeBackstop],
    pub first_draw_opened_at: u64,
    /// Host clock reading labelling the live point.
    pub now: u64,
    /// Prize token smallest-units converter.
    pub converter: num::Converter,
}

/// Owned prize pool state as fetched at a single block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub instant: StateInstant,
    pub reserve: ReserveSnapshot,
    pub draws: Vec<DrawTx>,
    pub manual_contributions: Vec<ManualContribution>,
    pub prize_backstops: Vec<PrizeBackstop>,
    pub first_draw_opened_at: u64,
    pub prize_token: TokenInfo,
}

impl PoolSnapshot {
    pub fn inputs(&self, now: u64) -> ReserveInputs<'_> {
        ReserveInputs {
            reserve: &self.reserve,
            draws: &self.draws,
            manual_contributions: &self.manual_contributions,
            prize_backstops: &self.prize_backstops,
            first_draw_opened_at: self.first_draw_opened_at,
            now,
            converter: self.prize_token.converter(),
        }
    }
}

/// Single point of the reserve series, amounts in prize token units.
#[derive(Clone, derive_more::Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveDataPoint {
    #[serde(rename = "name")]
    #[debug("{label}")]
    pub label: SeriesLabel,

    /// Live pending reserve, only non-zero on the "now" point.
    #[debug("{reserve}")]
    pub reserve: UD256,

    /// Reserve inflow attributed to liquidations, inferred by netting
    /// every tracked inflow and outflow. Negative when outflows exceed
    /// tracked inflows.
    #[debug("{liquidations}")]
    pub liquidations: D256,

    #[debug("{manual}")]
    pub manual: UD256,

    /// Auction plus award rewards paid for the draw.
    #[debug("{rewards}")]
    pub rewards: UD256,

    #[debug("{prize_backstops}")]
    pub prize_backstops: UD256,

    /// Reserve remaining after the draw, spent on buybacks.
    #[debug("{buyback}")]
    pub buyback: UD256,
}

impl ReserveDataPoint {
    pub(crate) fn zero(label: SeriesLabel) -> Self {
        Self {
            label,
            reserve: UD256::ZERO,
            liquidations: D256::ZERO,
            manual: UD256::ZERO,
            rewards: UD256::ZERO,
            prize_backstops: UD256::ZERO,
            buyback: UD256::ZERO,
        }
    }

    /// Checks `liquidations + manual == rewards + prize_backstops + buyback + reserve`,
    /// which holds for every point produced by [`reconcile`].
    pub fn is_balanced(&self) -> bool {
        let inflow = self.liquidations + self.manual.to_signed();
        let outflow = (self.rewards + self.prize_backstops + self.buyback + self.reserve).to_signed();
        inflow == outflow
    }
}

/// Sum of raw amounts, `None` on overflow.
pub(crate) fn checked_total(amounts: impl IntoIterator<Item = U256>) -> Option<U256> {
    amounts
        .into_iter()
        .try_fold(U256::ZERO, |acc, amount| acc.checked_add(amount))
}
