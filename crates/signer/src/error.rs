/// An enum representing the errors that can occur in the signer.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The provided secret is not a valid secp256k1 private key.
    #[error("invalid private key for credential {name}: {reason}")]
    InvalidKey {
        /// The name of the credential.
        name: String,
        /// The reason the key was rejected.
        reason: String,
    },
    /// An error occurred while signing.
    #[error("Failed to sign: {0}")]
    SigningError(#[from] alloy_signer::Error),
}
