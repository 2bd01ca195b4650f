//! Versioned inputs of the reserve series and recompute decisions.
//!
//! The host feeds [`ReserveTracker`] with whatever it fetched, in any order
//! and at any cadence, and ticks its clock explicitly with
//! [`ReserveTracker::set_clock`]. [`ReserveTracker::series`] yields `None`
//! until every input has been provided at least once, and otherwise returns
//! the cached series unless an input relevant under the active
//! [`RecomputePolicy`] changed since the last pass.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    chart::ChartData,
    reserve::{self, PoolSnapshot, ReconcileError, ReserveInputs},
    types::{DrawTx, ManualContribution, PrizeBackstop, ReserveSnapshot, TokenInfo},
};

/// Which input changes trigger a new reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecomputePolicy {
    /// Any input change recomputes the series.
    #[default]
    AllInputs,
    /// Only reserve, draws, first draw timestamp, clock and token changes
    /// recompute the series, ledger event updates alone are picked up
    /// on the next recompute.
    DrawBoundaries,
}

/// Input holder bumping its version whenever the value actually changes.
#[derive(derive_more::Debug)]
struct Slot<T> {
    #[debug(skip)]
    value: Option<Arc<T>>,
    version: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: None,
            version: 0,
        }
    }
}

impl<T: PartialEq> Slot<T> {
    fn set(&mut self, value: T) -> bool {
        if self.value.as_deref() == Some(&value) {
            return false;
        }
        self.value = Some(Arc::new(value));
        self.version += 1;
        true
    }
}

impl<T> Slot<T> {
    fn get(&self) -> Option<&T> {
        self.value.as_deref()
    }
}

/// Version of every input at the time of a pass, ignored inputs are zeroed.
type Signature = [u64; 8];

/// Keeps the latest inputs of the reserve series and recomputes it on demand.
#[derive(derive_more::Debug, Default)]
pub struct ReserveTracker {
    policy: RecomputePolicy,
    reserve: Slot<ReserveSnapshot>,
    draws: Slot<Vec<DrawTx>>,
    manual_contributions: Slot<Vec<ManualContribution>>,
    prize_backstops: Slot<Vec<PrizeBackstop>>,
    first_draw_opened_at: Slot<u64>,
    clock: Slot<u64>,
    prize_token: Slot<TokenInfo>,
    burn_token: Slot<Option<TokenInfo>>,
    #[debug(skip)]
    cached: Option<(Signature, Arc<ChartData>)>,
    passes: u64,
}

impl ReserveTracker {
    pub fn new(policy: RecomputePolicy) -> Self {
        Self {
            policy,
            // No burn token is a valid, known value
            burn_token: Slot {
                value: Some(Arc::new(None)),
                version: 0,
            },
            ..Default::default()
        }
    }

    pub fn policy(&self) -> RecomputePolicy {
        self.policy
    }

    /// Number of reconciliation passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn set_reserve(&mut self, reserve: ReserveSnapshot) -> bool {
        self.reserve.set(reserve)
    }

    pub fn set_draws(&mut self, draws: Vec<DrawTx>) -> bool {
        self.draws.set(draws)
    }

    pub fn set_manual_contributions(&mut self, events: Vec<ManualContribution>) -> bool {
        self.manual_contributions.set(events)
    }

    pub fn set_prize_backstops(&mut self, events: Vec<PrizeBackstop>) -> bool {
        self.prize_backstops.set(events)
    }

    pub fn set_first_draw_opened_at(&mut self, timestamp: u64) -> bool {
        self.first_draw_opened_at.set(timestamp)
    }

    /// Host clock reading (unix seconds) labelling the live point.
    pub fn set_clock(&mut self, timestamp: u64) -> bool {
        self.clock.set(timestamp)
    }

    pub fn set_prize_token(&mut self, token: TokenInfo) -> bool {
        self.prize_token.set(token)
    }

    pub fn set_burn_token(&mut self, token: Option<TokenInfo>) -> bool {
        self.burn_token.set(token)
    }

    /// Replaces every fetched input at once, returns whether anything changed.
    pub fn apply_snapshot(&mut self, snapshot: PoolSnapshot) -> bool {
        let PoolSnapshot {
            instant,
            reserve,
            draws,
            manual_contributions,
            prize_backstops,
            first_draw_opened_at,
            prize_token,
        } = snapshot;

        // Non-short-circuiting: every slot has to be updated
        let changed = [
            self.set_reserve(reserve),
            self.set_draws(draws),
            self.set_manual_contributions(manual_contributions),
            self.set_prize_backstops(prize_backstops),
            self.set_first_draw_opened_at(first_draw_opened_at),
            self.set_prize_token(prize_token),
        ]
        .contains(&true);

        trace!(
            block_number = instant.block_number(),
            changed, "Applied pool snapshot"
        );
        changed
    }

    /// Whether every input has been provided.
    pub fn is_ready(&self) -> bool {
        self.reserve.value.is_some()
            && self.draws.value.is_some()
            && self.manual_contributions.value.is_some()
            && self.prize_backstops.value.is_some()
            && self.first_draw_opened_at.value.is_some()
            && self.clock.value.is_some()
            && self.prize_token.value.is_some()
            && self.burn_token.value.is_some()
    }

    fn signature(&self) -> Signature {
        let ledger = |version| match self.policy {
            RecomputePolicy::AllInputs => version,
            RecomputePolicy::DrawBoundaries => 0,
        };
        [
            self.reserve.version,
            self.draws.version,
            ledger(self.manual_contributions.version),
            ledger(self.prize_backstops.version),
            self.first_draw_opened_at.version,
            self.clock.version,
            self.prize_token.version,
            self.burn_token.version,
        ]
    }

    /// Current reserve series.
    ///
    /// `Ok(None)` while any input is still missing, which means "not ready",
    /// never "empty". A failed pass is not cached, the next call retries it.
    pub fn series(&mut self) -> Result<Option<Arc<ChartData>>, ReconcileError> {
        let (
            Some(reserve),
            Some(draws),
            Some(manual_contributions),
            Some(prize_backstops),
            Some(first_draw_opened_at),
            Some(now),
            Some(prize_token),
            Some(burn_token),
        ) = (
            self.reserve.get(),
            self.draws.get(),
            self.manual_contributions.get(),
            self.prize_backstops.get(),
            self.first_draw_opened_at.get(),
            self.clock.get(),
            self.prize_token.get(),
            self.burn_token.get(),
        )
        else {
            trace!("Reserve series inputs not ready");
            return Ok(None);
        };

        let signature = self.signature();
        if let Some((cached_signature, data)) = &self.cached {
            if *cached_signature == signature {
                return Ok(Some(data.clone()));
            }
        }

        let points = reserve::reconcile(&ReserveInputs {
            reserve,
            draws,
            manual_contributions,
            prize_backstops,
            first_draw_opened_at: *first_draw_opened_at,
            now: *now,
            converter: prize_token.converter(),
        })?;

        let data = Arc::new(ChartData {
            points,
            prize_token: prize_token.clone(),
            burn_token: burn_token.clone(),
        });
        self.passes += 1;
        debug!(
            passes = self.passes,
            points = data.points.len(),
            ?signature,
            "Recomputed reserve series"
        );

        self.cached = Some((signature, data.clone()));
        Ok(Some(data))
    }
}
