use alloy::primitives::U256;
use fastnum::UD256;
use tracing::trace;

use super::{
    DrawInterval, ReconcileError, ReserveDataPoint, ReserveInputs, checked_total,
    interval::{self, AuctionedDraw},
};
use crate::{
    chart::SeriesLabel,
    num,
    types::{LedgerEvent, LedgerKind},
};

/// Total amount of ledger events within the interval, in smallest units.
pub fn sum_in<K: LedgerKind>(
    events: &[LedgerEvent<K>],
    interval: &DrawInterval,
) -> Result<U256, ReconcileError> {
    checked_total(
        events
            .iter()
            .filter(|e| interval.contains(e.block_number()))
            .map(LedgerEvent::amount),
    )
    .ok_or(ReconcileError::AmountOverflow(K::CATEGORY.as_str()))
}

/// Builds the reserve series.
///
/// Output order is: `Start-{first_draw_opened_at}` with all amounts zero,
/// one `{draw_id}-{awarded_at}` point per auctioned draw in ascending order,
/// then `Now-{now}` for the live pending reserve. Draws without an auction
/// reward are omitted entirely.
///
/// All sums are taken in smallest units and converted to decimals once.
pub fn reconcile(inputs: &ReserveInputs<'_>) -> Result<Vec<ReserveDataPoint>, ReconcileError> {
    let draws = interval::auctioned_draws(inputs.draws);
    interval::ensure_ordered(&draws)?;
    let intervals = interval::partition(&draws);

    let mut series = Vec::with_capacity(draws.len() + 2);
    series.push(ReserveDataPoint::zero(SeriesLabel::Start {
        timestamp: inputs.first_draw_opened_at,
    }));

    for (draw, interval) in draws.iter().zip(&intervals) {
        series.push(draw_point(inputs, draw, interval)?);
    }

    // Partition always yields one more interval than there are draws
    let open = intervals
        .last()
        .copied()
        .unwrap_or(DrawInterval {
            index: 0,
            min_block: 0,
            max_block: u64::MAX,
        });
    series.push(now_point(inputs, &open)?);

    Ok(series)
}

fn draw_point(
    inputs: &ReserveInputs<'_>,
    draw: &AuctionedDraw<'_>,
    interval: &DrawInterval,
) -> Result<ReserveDataPoint, ReconcileError> {
    let converter = inputs.converter;

    // Inbound
    let manual = sum_in(inputs.manual_contributions, interval)?;

    // Outbound
    let rewards = draw
        .rewards()
        .ok_or(ReconcileError::AmountOverflow("draw rewards"))?;
    let prize_backstops = sum_in(inputs.prize_backstops, interval)?;
    let buyback = draw.draw().remaining_reserve();

    let outbound = checked_total([rewards, prize_backstops, buyback])
        .ok_or(ReconcileError::AmountOverflow("draw outflows"))?;
    let liquidations =
        num::net(outbound, manual).ok_or(ReconcileError::AmountOverflow("liquidations"))?;

    trace!(
        draw_id = draw.draw_id(),
        min_block = interval.min_block,
        max_block = interval.max_block,
        %manual,
        %outbound,
        "Reconciled draw interval"
    );

    Ok(ReserveDataPoint {
        label: SeriesLabel::Draw {
            draw_id: draw.draw_id(),
            timestamp: draw.draw().awarded_at(),
        },
        reserve: UD256::ZERO,
        liquidations: converter.balance(liquidations),
        manual: converter.amount(manual),
        rewards: converter.amount(rewards),
        prize_backstops: converter.amount(prize_backstops),
        buyback: converter.amount(buyback),
    })
}

fn now_point(
    inputs: &ReserveInputs<'_>,
    open: &DrawInterval,
) -> Result<ReserveDataPoint, ReconcileError> {
    let converter = inputs.converter;
    let pending = inputs.reserve.pending;
    let manual = sum_in(inputs.manual_contributions, open)?;
    let liquidations =
        num::net(pending, manual).ok_or(ReconcileError::AmountOverflow("current liquidations"))?;

    Ok(ReserveDataPoint {
        reserve: converter.amount(pending),
        liquidations: converter.balance(liquidations),
        manual: converter.amount(manual),
        ..ReserveDataPoint::zero(SeriesLabel::Now {
            timestamp: inputs.now,
        })
    })
}
