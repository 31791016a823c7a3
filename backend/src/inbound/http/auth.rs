//! Request authentication.
//!
//! Every protected handler extracts a [`BearerCredential`] and resolves it
//! through the identity verifier port. Verification fails closed: a missing
//! or malformed credential, a provider outage, and an explicit rejection all
//! yield `401 Unauthorized`. There is no fallback identity.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::Deserialize;
use tracing::warn;

use crate::domain::ports::IdentityVerifierError;
use crate::domain::{BearerCredential, Error, Identity};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn credential_from_request(req: &HttpRequest) -> Result<BearerCredential, Error> {
    if let Some(header) = req.headers().get(actix_web::http::header::AUTHORIZATION) {
        let raw = header
            .to_str()
            .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
        let token = raw
            .strip_prefix(BEARER_PREFIX)
            .ok_or_else(|| Error::unauthorized("authorization header must use the Bearer scheme"))?;
        return BearerCredential::new(token)
            .map_err(|_| Error::unauthorized("bearer token must not be empty"));
    }

    // Browser-driven media downloads cannot set headers; allow the token as
    // a query parameter.
    let query = actix_web::web::Query::<TokenQuery>::from_query(req.query_string())
        .map_err(|_| Error::unauthorized("missing bearer credential"))?;
    let token = query
        .into_inner()
        .access_token
        .ok_or_else(|| Error::unauthorized("missing bearer credential"))?;
    BearerCredential::new(token).map_err(|_| Error::unauthorized("bearer token must not be empty"))
}

impl FromRequest for BearerCredential {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(credential_from_request(req))
    }
}

/// Resolve a credential to a caller identity, failing closed.
///
/// The provider-side detail is logged; the client only learns that the
/// credential did not authenticate.
pub async fn authenticate(
    state: &HttpState,
    credential: &BearerCredential,
) -> Result<Identity, Error> {
    state.verifier.verify(credential).await.map_err(|error| {
        match &error {
            IdentityVerifierError::Rejected { status } => {
                warn!(status, "identity provider rejected credential");
            }
            other => {
                warn!(error = %other, "identity verification failed");
            }
        }
        Error::unauthorized("credential could not be verified")
    })
}
