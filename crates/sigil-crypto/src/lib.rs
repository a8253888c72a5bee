pub mod did;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use did::{derive_did, did_for_key};
pub use error::CryptoError;
pub use hashing::{digests_match, hash, Hash};
pub use keys::{KeyPair, PublicKey};
pub use signing::{random_nonce, sign, verify, Signature};
