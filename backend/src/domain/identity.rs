//! Caller identity primitives.
//!
//! Identities are resolved per request by the external identity provider; the
//! service never persists them beyond foreign-key references. Keep the types
//! strongly validated so adapters cannot smuggle malformed ids into the
//! domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors for identity primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityValidationError {
    EmptyId,
    InvalidId,
    EmptyCredential,
}

impl fmt::Display for IdentityValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyCredential => write!(f, "bearer credential must not be empty"),
        }
    }
}

impl std::error::Error for IdentityValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(IdentityValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(IdentityValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| IdentityValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Wrap an already-validated UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller identity resolved by the external provider.
///
/// The provider owns this data; the service only references it within a
/// request's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Provider-issued subject id.
    pub id: UserId,
    /// E-mail address associated with the credential.
    pub email: String,
}

/// Opaque bearer credential extracted from a request.
///
/// Only non-empty credentials are representable; an absent or blank token is
/// rejected at the HTTP boundary before any provider round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl BearerCredential {
    /// Validate and construct a credential from raw token text.
    pub fn new(token: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(IdentityValidationError::EmptyCredential);
        }
        Ok(Self(token))
    }

    /// The raw token forwarded to the provider.
    pub fn token(&self) -> &str {
        self.0.as_str()
    }
}
