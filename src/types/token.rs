use alloy::primitives::{Address, U256};
use serde::Serialize;

use crate::num;

/// ERC-20 token metadata needed to present amounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Converter from the token's smallest units.
    pub fn converter(&self) -> num::Converter {
        num::Converter::new(self.decimals)
    }
}

/// Reserve balances of the prize pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReserveSnapshot {
    /// Reserve already accounted for by the pool.
    pub current: U256,

    /// Contributions to the reserve not yet accounted for, released on the next draw.
    pub pending: U256,
}
