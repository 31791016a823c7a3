//! Identity provider adapter.

mod http_verifier;

pub use http_verifier::HttpIdentityVerifier;
