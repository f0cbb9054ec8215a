//! Validation adapter between a route's optional schema and its handler.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ServiceError;
use crate::validation::schema::{serde_issue, Schema, ValidationError};

/// Validate `payload` against `schema`.
///
/// Without a schema the payload is re-typed into the handler's payload type
/// without any checks beyond what deserialization requires; for the default
/// `Value` payload type this is the identity.
pub fn validate<S>(schema: Option<&S>, payload: Value) -> Result<S::Output, ServiceError>
where
    S: Schema,
    S::Output: DeserializeOwned,
{
    match schema {
        Some(schema) => schema.parse(payload).map_err(ServiceError::from),
        None => serde_json::from_value(payload)
            .map_err(|e| ServiceError::from(ValidationError::single(serde_issue(&e)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::schema::{Issue, PathSegment, Unchecked};
    use serde_json::json;

    struct RejectAll;

    impl Schema for RejectAll {
        type Output = Value;

        fn parse(&self, _payload: Value) -> Result<Value, ValidationError> {
            Err(ValidationError::single(Issue::new(
                [PathSegment::from("name")],
                "Required",
                "invalid_type",
            )))
        }
    }

    struct Uppercase;

    impl Schema for Uppercase {
        type Output = String;

        fn parse(&self, payload: Value) -> Result<String, ValidationError> {
            payload
                .as_str()
                .map(str::to_uppercase)
                .ok_or_else(|| ValidationError::single(Issue::new(Vec::new(), "Expected string", "invalid_type")))
        }
    }

    #[test]
    fn test_absent_schema_passes_payload_through() {
        let payload = json!({"anything": [1, 2, 3]});
        let out = validate::<Unchecked>(None, payload.clone()).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_present_schema_reshapes_payload() {
        let out = validate(Some(&Uppercase), json!("abc")).unwrap();
        assert_eq!(out, "ABC");
    }

    #[test]
    fn test_schema_failure_becomes_validation_error() {
        let err = validate(Some(&RejectAll), json!({})).unwrap_err();
        match err {
            ServiceError::Validation { issues, status, message } => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].code, "invalid_type");
                assert_eq!(status, None);
                assert_eq!(message, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
