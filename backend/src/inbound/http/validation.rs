//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, MediaKey, UserId};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn invalid_value(field: FieldName, value: &str, code: &str, message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code,
    }))
}

/// Parse a path or body UUID, reporting the offending field on failure.
pub(crate) fn parse_uuid(field: FieldName, raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| {
        invalid_value(field, raw, "invalid_uuid", "value must be a valid UUID")
    })
}

/// Parse a user id, reporting the offending field on failure.
pub(crate) fn parse_user_id(field: FieldName, raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| {
        invalid_value(field, raw, "invalid_user_id", "value must be a valid user id")
    })
}

/// Parse a media key from its URL-encoded path form.
pub(crate) fn parse_media_key(field: FieldName, raw: &str) -> Result<MediaKey, Error> {
    MediaKey::new(raw).map_err(|_| {
        invalid_value(field, raw, "invalid_media_key", "value must be a valid media key")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn detail(error: &Error, key: &str) -> Value {
        error
            .details
            .as_ref()
            .expect("details present")
            .get(key)
            .expect("detail key present")
            .clone()
    }

    #[test]
    fn parse_uuid_accepts_canonical_form() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let parsed = parse_uuid(FieldName::new("id"), raw).expect("valid uuid");
        assert_eq!(parsed.to_string(), raw);
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn parse_uuid_reports_the_field(#[case] raw: &str) {
        let error = parse_uuid(FieldName::new("challengeId"), raw).expect_err("invalid uuid");
        assert_eq!(detail(&error, "field"), Value::from("challengeId"));
        assert_eq!(detail(&error, "code"), Value::from("invalid_uuid"));
    }

    #[test]
    fn parse_media_key_rejects_traversal() {
        let error =
            parse_media_key(FieldName::new("key"), "../secret").expect_err("invalid key");
        assert_eq!(detail(&error, "code"), Value::from("invalid_media_key"));
    }
}
