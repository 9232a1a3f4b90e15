//! Signing credentials for the actors of the derivation harness.
//!
//! A [`Credential`] couples an address with the capability to sign for it. Credentials are
//! checked when they are created, so an invalid key is rejected before any action runs rather
//! than when a transaction is first signed.

use std::time::Instant;

use alloy_primitives::{keccak256, Address, Signature, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use harness_primitives::{L1Transaction, TxRequest};

mod error;
pub use error::SignerError;

mod metrics;
pub use metrics::SignerMetrics;

/// A named signing identity: an address together with the key that signs for it.
#[derive(Clone)]
pub struct Credential {
    /// The name of the credential, used in logs and reports.
    name: String,
    /// The local signer.
    signer: PrivateKeySigner,
    /// The signer metrics.
    metrics: SignerMetrics,
}

impl Credential {
    /// Returns a new [`Credential`] from a raw secret key.
    pub fn from_secret(name: impl Into<String>, secret: B256) -> Result<Self, SignerError> {
        let name = name.into();
        let signer = PrivateKeySigner::from_bytes(&secret)
            .map_err(|err| SignerError::InvalidKey { name: name.clone(), reason: err.to_string() })?;
        Ok(Self { name, signer, metrics: SignerMetrics::default() })
    }

    /// Returns a deterministic [`Credential`] whose secret is derived from `seed` and `name`.
    pub fn from_seed(seed: &str, name: impl Into<String>) -> Result<Self, SignerError> {
        let name = name.into();
        let secret = keccak256(format!("{seed}/{name}"));
        Self::from_secret(name, secret)
    }

    /// Returns the name of the credential.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the address of the credential.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs the provided prehash.
    pub fn sign_hash(&self, hash: &B256) -> Result<Signature, SignerError> {
        let now = Instant::now();
        let signature = self.signer.sign_hash_sync(hash)?;
        self.metrics.signing_duration.record(now.elapsed().as_secs_f64());
        Ok(signature)
    }

    /// Signs the request, returning the [`L1Transaction`] sent from the credential's address.
    pub fn sign_transaction(&self, request: TxRequest) -> Result<L1Transaction, SignerError> {
        let signature = self.sign_hash(&request.signature_hash())?;
        self.metrics.signed_transactions.increment(1);
        let tx = L1Transaction::new(request, self.address(), signature);
        tracing::trace!(target: "harness::signer", credential = %self.name, hash = %tx.hash(), "signed transaction");
        Ok(tx)
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for Credential {}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("address", &self.address())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Bytes};

    fn request() -> TxRequest {
        TxRequest {
            chain_id: 900,
            nonce: 0,
            to: address!("0xff00000000000000000000000000000000000901"),
            input: Bytes::from_static(&[1, 2, 3]),
        }
    }

    #[test]
    fn test_sign_transaction_recovers_sender() -> eyre::Result<()> {
        let alice = Credential::from_seed("test", "alice")?;
        let tx = alice.sign_transaction(request())?;

        assert_eq!(tx.sender(), alice.address());
        assert_eq!(tx.recover_signer()?, alice.address());

        Ok(())
    }

    #[test]
    fn test_seeded_credentials_are_deterministic() -> eyre::Result<()> {
        let a = Credential::from_seed("test", "alice")?;
        let b = Credential::from_seed("test", "alice")?;
        let bob = Credential::from_seed("test", "bob")?;

        assert_eq!(a, b);
        assert_ne!(a, bob);
        assert_eq!(a.sign_transaction(request())?.hash(), b.sign_transaction(request())?.hash());

        Ok(())
    }

    #[test]
    fn test_invalid_secret_is_rejected() {
        let err = Credential::from_secret("zero", B256::ZERO).unwrap_err();
        assert!(matches!(err, SignerError::InvalidKey { ref name, .. } if name == "zero"));
    }
}
