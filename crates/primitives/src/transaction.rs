use alloy_primitives::{keccak256, Address, Bytes, Signature, SignatureError, B256};
use alloy_rlp::RlpEncodable;

/// The unsigned fields of an L1 transaction.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable)]
pub struct TxRequest {
    /// The L1 chain id.
    pub chain_id: u64,
    /// The sender nonce, handed out by the L1 transaction pool.
    pub nonce: u64,
    /// The recipient of the transaction.
    pub to: Address,
    /// The calldata of the transaction.
    pub input: Bytes,
}

impl TxRequest {
    /// Returns the hash signed by the sender.
    pub fn signature_hash(&self) -> B256 {
        keccak256(alloy_rlp::encode(self))
    }
}

/// A signed L1 transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L1Transaction {
    request: TxRequest,
    from: Address,
    signature: Signature,
    hash: B256,
}

impl L1Transaction {
    /// Returns a new [`L1Transaction`] from the request, the claimed sender and its signature.
    pub fn new(request: TxRequest, from: Address, signature: Signature) -> Self {
        let mut buf = alloy_rlp::encode(&request);
        buf.extend_from_slice(&signature.as_bytes());
        let hash = keccak256(buf);
        Self { request, from, signature, hash }
    }

    /// Recovers the signer of the transaction from its signature.
    pub fn recover_signer(&self) -> Result<Address, SignatureError> {
        self.signature.recover_address_from_prehash(&self.request.signature_hash())
    }

    /// Returns the transaction hash.
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// Returns the claimed sender of the transaction.
    pub const fn sender(&self) -> Address {
        self.from
    }

    /// Returns the recipient of the transaction.
    pub const fn to(&self) -> Address {
        self.request.to
    }

    /// Returns the nonce of the transaction.
    pub const fn nonce(&self) -> u64 {
        self.request.nonce
    }

    /// Returns the calldata of the transaction.
    pub const fn input(&self) -> &Bytes {
        &self.request.input
    }

    /// Returns the unsigned request.
    pub const fn request(&self) -> &TxRequest {
        &self.request
    }
}
