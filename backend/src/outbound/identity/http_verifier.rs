//! Reqwest-backed identity verifier adapter.
//!
//! Owns transport details only: one GET against the provider's whoami
//! endpoint per verification, timeout and HTTP error mapping, and JSON
//! decoding into a domain [`Identity`]. There is no caching and no fallback
//! identity; anything short of a decodable 200 is an error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::ports::{IdentityVerifier, IdentityVerifierError};
use crate::domain::{BearerCredential, Identity, UserId};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire shape of the provider's whoami payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WhoamiDto {
    id: String,
    email: String,
}

impl WhoamiDto {
    fn into_identity(self) -> Result<Identity, IdentityVerifierError> {
        let id = UserId::new(&self.id).map_err(|err| {
            IdentityVerifierError::decode(format!("invalid subject id: {err}"))
        })?;
        if self.email.trim().is_empty() {
            return Err(IdentityVerifierError::decode("empty email in payload"));
        }
        Ok(Identity {
            id,
            email: self.email,
        })
    }
}

/// Identity verifier that calls one whoami endpoint over HTTP.
pub struct HttpIdentityVerifier {
    client: Client,
    endpoint: Url,
}

impl HttpIdentityVerifier {
    /// Build a verifier with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Build a verifier with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

fn map_transport_error(error: reqwest::Error) -> IdentityVerifierError {
    if error.is_timeout() {
        IdentityVerifierError::timeout(error.to_string())
    } else {
        IdentityVerifierError::transport(error.to_string())
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(
        &self,
        credential: &BearerCredential,
    ) -> Result<Identity, IdentityVerifierError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .bearer_auth(credential.token())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityVerifierError::rejected(status.as_u16()));
        }
        if status != StatusCode::OK {
            return Err(IdentityVerifierError::decode(format!(
                "unexpected success status {status}"
            )));
        }

        let dto: WhoamiDto = response.json().await.map_err(|error| {
            IdentityVerifierError::decode(format!("invalid whoami payload: {error}"))
        })?;
        dto.into_identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[test]
    fn whoami_payload_decodes_into_identity() {
        let id = Uuid::new_v4();
        let dto = WhoamiDto {
            id: id.to_string(),
            email: "user@example.com".to_owned(),
        };
        let identity = dto.into_identity().expect("valid payload");
        assert_eq!(identity.id.as_uuid(), &id);
        assert_eq!(identity.email, "user@example.com");
    }

    #[rstest]
    #[case("not-a-uuid", "user@example.com")]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", "")]
    fn malformed_payloads_are_decode_errors(#[case] id: &str, #[case] email: &str) {
        let dto = WhoamiDto {
            id: id.to_owned(),
            email: email.to_owned(),
        };
        let error = dto.into_identity().expect_err("invalid payload");
        assert!(matches!(error, IdentityVerifierError::Decode { .. }));
    }
}
