//! Media access decisions.
//!
//! Every media read, list, and delete flows through [`AccessGate`]. Access
//! is granted to admins, to the owner named by the key's prefix, and to the
//! user the index records as the object's owner; everyone else is refused
//! before any bytes are touched. Admin-only surfaces answer `not_found` to
//! non-admins so their existence is not disclosed.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::domain::media::MediaKey;
use crate::domain::ports::{MediaIndexRepository, MediaIndexRepositoryError};
use crate::domain::{Error, Identity};

/// Policy object deciding who may touch which media object.
pub struct AccessGate {
    admin_emails: HashSet<String>,
    index: Arc<dyn MediaIndexRepository>,
}

impl AccessGate {
    /// Build a gate from the configured admin allow-list.
    ///
    /// Emails are compared case-insensitively.
    pub fn new(
        admin_emails: impl IntoIterator<Item = String>,
        index: Arc<dyn MediaIndexRepository>,
    ) -> Self {
        Self {
            admin_emails: admin_emails
                .into_iter()
                .map(|email| email.trim().to_ascii_lowercase())
                .filter(|email| !email.is_empty())
                .collect(),
            index,
        }
    }

    fn map_index_error(error: MediaIndexRepositoryError) -> Error {
        match error {
            MediaIndexRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("media index unavailable: {message}"))
            }
            MediaIndexRepositoryError::Query { message } => {
                Error::internal(format!("media index error: {message}"))
            }
        }
    }

    /// Whether the identity is on the admin allow-list.
    pub fn is_admin(&self, identity: &Identity) -> bool {
        self.admin_emails
            .contains(&identity.email.to_ascii_lowercase())
    }

    /// Gate an admin-only surface.
    ///
    /// Non-admins get `not_found` rather than `forbidden` so the surface
    /// stays invisible.
    pub fn require_admin(&self, identity: &Identity) -> Result<(), Error> {
        if self.is_admin(identity) {
            Ok(())
        } else {
            debug!(user = %identity.id, "admin surface refused");
            Err(Error::not_found("resource not found"))
        }
    }

    /// Decide whether the identity may access the object at `key`.
    ///
    /// Grants, in order: admin allow-list, ownership by key prefix, then
    /// recorded ownership in the index. Anything else is `forbidden`.
    pub async fn authorize(&self, identity: &Identity, key: &MediaKey) -> Result<(), Error> {
        if self.is_admin(identity) {
            return Ok(());
        }
        if key.is_owned_by(&identity.id) {
            return Ok(());
        }
        let indexed = self
            .index
            .find(&identity.id, key)
            .await
            .map_err(Self::map_index_error)?;
        if indexed.is_some() {
            return Ok(());
        }
        debug!(user = %identity.id, %key, "media access refused");
        Err(Error::forbidden("you do not have access to this object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::MediaObject;
    use crate::domain::ports::MockMediaIndexRepository;
    use crate::domain::{ErrorCode, UserId};
    use chrono::Utc;
    use rstest::rstest;

    fn identity(email: &str) -> Identity {
        Identity {
            id: UserId::random(),
            email: email.to_owned(),
        }
    }

    fn gate(admins: &[&str], index: MockMediaIndexRepository) -> AccessGate {
        AccessGate::new(
            admins.iter().map(|a| (*a).to_owned()),
            Arc::new(index),
        )
    }

    #[rstest]
    #[case("ops@example.com", true)]
    #[case("OPS@Example.COM", true)]
    #[case("user@example.com", false)]
    fn admin_check_is_case_insensitive(#[case] email: &str, #[case] expected: bool) {
        let gate = gate(&["ops@example.com"], MockMediaIndexRepository::new());
        assert_eq!(gate.is_admin(&identity(email)), expected);
    }

    #[rstest]
    fn admin_refusal_masquerades_as_not_found() {
        let gate = gate(&["ops@example.com"], MockMediaIndexRepository::new());
        let error = gate
            .require_admin(&identity("user@example.com"))
            .expect_err("refused");
        assert_eq!(error.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn owner_prefix_grants_without_an_index_lookup() {
        let caller = identity("user@example.com");
        let key = MediaKey::new(format!("{}/progress/1-aa.jpg", caller.id)).expect("valid key");
        let mut index = MockMediaIndexRepository::new();
        index.expect_find().times(0);

        let gate = gate(&[], index);
        gate.authorize(&caller, &key).await.expect("owner allowed");
    }

    #[tokio::test]
    async fn recorded_ownership_grants_access() {
        let caller = identity("user@example.com");
        let caller_id = caller.id;
        let key = MediaKey::new("legacy/progress/1-aa.jpg").expect("valid key");
        let object = MediaObject {
            key: key.clone(),
            owner_id: caller_id,
            content_type: "image/jpeg".to_owned(),
            created_at: Utc::now(),
        };
        let mut index = MockMediaIndexRepository::new();
        index
            .expect_find()
            .withf(move |user, _| *user == caller_id)
            .times(1)
            .return_once(move |_, _| Ok(Some(object)));

        let gate = gate(&[], index);
        gate.authorize(&caller, &key).await.expect("recorded owner allowed");
    }

    #[tokio::test]
    async fn strangers_are_forbidden() {
        let caller = identity("user@example.com");
        let key = MediaKey::new(format!("{}/progress/1-aa.jpg", UserId::random()))
            .expect("valid key");
        let mut index = MockMediaIndexRepository::new();
        index.expect_find().times(1).return_once(|_, _| Ok(None));

        let gate = gate(&[], index);
        let error = gate
            .authorize(&caller, &key)
            .await
            .expect_err("stranger refused");
        assert_eq!(error.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn admins_bypass_ownership_checks() {
        let caller = identity("ops@example.com");
        let key = MediaKey::new(format!("{}/progress/1-aa.jpg", UserId::random()))
            .expect("valid key");
        let mut index = MockMediaIndexRepository::new();
        index.expect_find().times(0);

        let gate = gate(&["ops@example.com"], index);
        gate.authorize(&caller, &key).await.expect("admin allowed");
    }
}
