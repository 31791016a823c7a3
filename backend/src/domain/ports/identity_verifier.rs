//! Port for resolving bearer credentials against the identity provider.
//!
//! The verifier performs one outbound call per authenticated request and
//! holds no session state. Implementations must fail closed: there is no
//! default identity, and every error maps to `Unauthorized` at the HTTP
//! boundary.

use async_trait::async_trait;

use crate::domain::{BearerCredential, Identity};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity verifier adapters.
    pub enum IdentityVerifierError {
        /// The provider could not be reached.
        Transport { message: String } =>
            "identity provider transport failure: {message}",
        /// The provider did not answer within the configured timeout.
        Timeout { message: String } =>
            "identity provider timed out: {message}",
        /// The provider rejected the credential.
        Rejected { status: u16 } =>
            "identity provider rejected the credential with status {status}",
        /// The provider answered with a payload the adapter cannot decode.
        Decode { message: String } =>
            "identity provider returned a malformed payload: {message}",
    }
}

/// Port for credential verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve a bearer credential to a caller identity.
    async fn verify(
        &self,
        credential: &BearerCredential,
    ) -> Result<Identity, IdentityVerifierError>;
}

/// Fixture implementation that rejects every credential.
///
/// Use it in tests that exercise unauthenticated paths without standing up a
/// provider stub.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityVerifier;

#[async_trait]
impl IdentityVerifier for FixtureIdentityVerifier {
    async fn verify(
        &self,
        _credential: &BearerCredential,
    ) -> Result<Identity, IdentityVerifierError> {
        Err(IdentityVerifierError::rejected(401_u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_verifier_rejects_all_credentials() {
        let verifier = FixtureIdentityVerifier;
        let credential = BearerCredential::new("token").expect("valid token");

        let error = verifier.verify(&credential).await.expect_err("rejects");
        assert!(matches!(error, IdentityVerifierError::Rejected { status: 401 }));
    }

    #[test]
    fn error_messages_carry_context() {
        let error = IdentityVerifierError::timeout("deadline of 10s exceeded");
        assert!(error.to_string().contains("deadline of 10s exceeded"));
    }
}
