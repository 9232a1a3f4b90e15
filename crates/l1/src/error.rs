use alloy_primitives::{Address, B256};
use harness_signer::SignerError;

/// An error that occurred while acting on the [`super::L1Chain`].
#[derive(Debug, thiserror::Error)]
pub enum L1ChainError {
    /// A block is already open.
    #[error("a block is already open")]
    BlockAlreadyOpen,
    /// No block is open.
    #[error("no block is open")]
    NoOpenBlock,
    /// The open block reached its capacity.
    #[error("block is full, capacity {0}")]
    BlockFull(usize),
    /// The sender has no pending transaction.
    #[error("no pending transaction from {0}")]
    NoPendingTransaction(Address),
    /// The signature does not recover to the claimed sender.
    #[error("transaction {hash} is not signed by {sender}")]
    InvalidSignature {
        /// The transaction hash.
        hash: B256,
        /// The claimed sender.
        sender: Address,
    },
    /// The transaction targets another chain.
    #[error("transaction {hash} has chain id {got}, expected {expected}")]
    ChainIdMismatch {
        /// The transaction hash.
        hash: B256,
        /// The L1 chain id.
        expected: u64,
        /// The chain id of the transaction.
        got: u64,
    },
    /// The transaction does not carry the next nonce of the sender.
    #[error("transaction from {sender} has nonce {got}, expected {expected}")]
    NonceMismatch {
        /// The sender.
        sender: Address,
        /// The next nonce of the sender.
        expected: u64,
        /// The nonce of the transaction.
        got: u64,
    },
    /// A system config update was sent by an address other than the owner.
    #[error("system config update from {0} is not sent by the owner")]
    UnauthorizedConfigUpdate(Address),
    /// The system config calldata could not be decoded.
    #[error("transaction {0} is not a valid system config call")]
    InvalidConfigCall(B256),
    /// The rewind depth exceeds the chain height.
    #[error("cannot rewind {depth} blocks from head {head}")]
    RewindTooDeep {
        /// The requested depth.
        depth: u64,
        /// The head number.
        head: u64,
    },
}

/// An error that occurred while mutating the system config.
#[derive(Debug, thiserror::Error)]
pub enum SystemConfigError {
    /// The caller is not the owner of the system config.
    #[error("{0} is not the system config owner")]
    NotOwner(Address),
    /// The update could not be signed.
    #[error(transparent)]
    Signer(#[from] SignerError),
    /// The update could not be queued on L1.
    #[error(transparent)]
    L1(#[from] L1ChainError),
}
