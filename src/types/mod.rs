mod draw;
mod event;
mod token;

pub use draw::DrawTx;
pub use event::*;
pub use token::{ReserveSnapshot, TokenInfo};

/// ID of a prize pool draw.
pub type DrawId = u32;

/// Instant in chain history the event was produced at.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct StateInstant {
    block_number: u64,
    block_timestamp: u64,
}

impl StateInstant {
    pub fn new(block_number: u64, block_timestamp: u64) -> Self {
        Self {
            block_number,
            block_timestamp,
        }
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn block_timestamp(&self) -> u64 {
        self.block_timestamp
    }
}
