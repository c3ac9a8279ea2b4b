//! Multi-signature aggregation
//!
//! Collects `Signer` entries from co-signers on a payment whose signing key
//! is left empty. Each co-signer signs the multisign hash scoped to its own
//! account id; the aggregator appends, verifies and merges those entries.
//!
//! # Example
//!
//! ```ignore
//! use ripple_sdk::multisig::{append_signer, deserialize_raw_multisign_tx, sign_for, PermissivePolicy};
//!
//! let payment = deserialize_raw_multisign_tx(&raw_hex)?;
//! let signer = sign_for(&payment, account.key_pair())?;
//! let signed = append_signer(&payment, signer, &PermissivePolicy)?;
//!
//! // Hand the re-serialized payment to the next co-signer
//! let next_hex = signed.to_hex()?;
//! ```

pub mod aggregator;
pub mod policy;

pub use aggregator::{
    append_signer, check_multisign, combine_signatures, deserialize_raw_multisign_tx, sign_for,
    verify_signer,
};
pub use policy::{
    MasterKeyPolicy, PermissivePolicy, SignerListError, SignerListPolicy, SignerPolicy,
};
