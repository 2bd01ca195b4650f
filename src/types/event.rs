use std::{fmt, marker::PhantomData};

use alloy::primitives::{TxHash, U256};

/// Category of a reserve ledger event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedgerCategory {
    /// Tokens contributed directly to the reserve by anyone.
    ManualContribution,
    /// Prize tokens donated to cover a shortfall.
    PrizeBackstop,
}

impl LedgerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManualContribution => "manual_contribution",
            Self::PrizeBackstop => "prize_backstop",
        }
    }
}

impl fmt::Display for LedgerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zero-sized marker tagging [`LedgerEvent`] with its category.
pub trait LedgerKind: Clone + Copy + fmt::Debug + Send + Sync + 'static {
    const CATEGORY: LedgerCategory;
}

/// Marker of reserve contributions (`ContributedReserve` logs).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Manual;

/// Marker of prize backstops (`ContributePrizeTokens` logs from the pool donator).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backstop;

impl LedgerKind for Manual {
    const CATEGORY: LedgerCategory = LedgerCategory::ManualContribution;
}

impl LedgerKind for Backstop {
    const CATEGORY: LedgerCategory = LedgerCategory::PrizeBackstop;
}

/// Token movement logged by the prize pool, along with transaction context.
///
/// Both ledger streams share the same shape, the category lives in the type.
#[derive(Clone, derive_more::Debug, PartialEq, Eq)]
pub struct LedgerEvent<K> {
    instant: super::StateInstant,
    tx_hash: TxHash,
    log_index: u64,
    #[debug("{amount}")]
    amount: U256,
    #[debug(skip)]
    kind: PhantomData<K>,
}

pub type ManualContribution = LedgerEvent<Manual>;
pub type PrizeBackstop = LedgerEvent<Backstop>;

impl<K: LedgerKind> LedgerEvent<K> {
    pub fn new(instant: super::StateInstant, tx_hash: TxHash, log_index: u64, amount: U256) -> Self {
        Self {
            instant,
            tx_hash,
            log_index,
            amount,
            kind: PhantomData,
        }
    }

    /// Event without transaction context, used for fixtures and replays.
    pub fn at(block_number: u64, amount: U256) -> Self {
        Self::new(
            super::StateInstant::new(block_number, 0),
            TxHash::ZERO,
            0,
            amount,
        )
    }

    pub fn category(&self) -> LedgerCategory {
        K::CATEGORY
    }

    pub fn instant(&self) -> super::StateInstant {
        self.instant
    }

    pub fn block_number(&self) -> u64 {
        self.instant.block_number()
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn log_index(&self) -> u64 {
        self.log_index
    }

    /// Amount in token's smallest units.
    pub fn amount(&self) -> U256 {
        self.amount
    }
}
