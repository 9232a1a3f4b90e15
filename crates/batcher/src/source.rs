use harness_primitives::{BlockInfo, L2Block};
use harness_sequencer::Sequencer;

/// A source of L2 blocks to submit.
#[auto_impl::auto_impl(&, Arc)]
pub trait L2BlockSource {
    /// Returns the safe head.
    fn safe_head(&self) -> BlockInfo;

    /// Returns the unsafe head.
    fn unsafe_head(&self) -> BlockInfo;

    /// Returns the unsafe block with the provided number.
    fn unsafe_block(&self, number: u64) -> Option<&L2Block>;
}

impl L2BlockSource for Sequencer {
    fn safe_head(&self) -> BlockInfo {
        Self::safe_head(self).info()
    }

    fn unsafe_head(&self) -> BlockInfo {
        Self::unsafe_head(self).info()
    }

    fn unsafe_block(&self, number: u64) -> Option<&L2Block> {
        Self::unsafe_block(self, number)
    }
}
