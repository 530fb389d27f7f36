//! The backend's uniform response wrapper and its classification.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::ApiError;

/// Result marker sent by the backend on success.
pub const RESULT_SUCCESS: &str = "SUCCESS";

/// Every response body looks like `{ "result": ..., "data": ..., "error": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub result: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "errorCode")]
    pub error_code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.result.eq_ignore_ascii_case(RESULT_SUCCESS)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.error_code.as_str())
    }
}

/// A raw HTTP reply with its envelope parsed, if the body held one.
#[derive(Debug)]
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: String,
    pub envelope: Option<Envelope>,
}

impl Reply {
    pub fn new(status: StatusCode, body: String) -> Self {
        let envelope = if body.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&body).ok()
        };
        Self {
            status,
            body,
            envelope,
        }
    }

    /// Expiry shows up either at the transport layer or inside a 200 envelope.
    pub fn is_session_expired(&self, expired_code: &str) -> bool {
        self.status == StatusCode::UNAUTHORIZED
            || self
                .envelope
                .as_ref()
                .and_then(Envelope::error_code)
                .is_some_and(|code| code == expired_code)
    }

    /// Unwrap the payload, or turn the reply into the matching error.
    ///
    /// An absent payload is decoded from `null`, so callers that expect no data
    /// ask for `()` or `Option<_>`.
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self.envelope {
            Some(envelope) if envelope.is_success() => decode(envelope.data),
            Some(Envelope {
                error: Some(error), ..
            }) => Err(ApiError::Rejected {
                code: error.error_code,
                message: error.message.unwrap_or_default(),
            }),
            None if self.status.is_success() && self.body.trim().is_empty() => decode(None),
            _ if !self.status.is_success() => Err(ApiError::from_status(self.status, &self.body)),
            Some(envelope) => Err(ApiError::InvalidResponse(format!(
                "Result '{}' without error details",
                envelope.result
            ))),
            None => Err(ApiError::InvalidResponse(format!(
                "Status {} with unrecognized body: {}",
                self.status,
                ApiError::truncate_body(&self.body)
            ))),
        }
    }
}

fn decode<T: DeserializeOwned>(data: Option<serde_json::Value>) -> Result<T, ApiError> {
    Ok(serde_json::from_value(
        data.unwrap_or(serde_json::Value::Null),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EXPIRED: &str = "TOKEN_EXPIRED";

    fn reply(status: u16, body: serde_json::Value) -> Reply {
        Reply::new(
            StatusCode::from_u16(status).expect("valid status"),
            body.to_string(),
        )
    }

    #[test]
    fn test_success_payload() {
        let r = reply(200, json!({ "result": "SUCCESS", "data": { "id": 7 } }));
        assert!(!r.is_session_expired(EXPIRED));
        let data: serde_json::Value = r.into_payload().expect("success");
        assert_eq!(data["id"], 7);
    }

    #[test]
    fn test_success_without_data_is_placeholder() {
        let r = reply(200, json!({ "result": "SUCCESS" }));
        r.into_payload::<()>().expect("unit placeholder");

        let created = Reply::new(StatusCode::CREATED, String::new());
        created.into_payload::<()>().expect("empty 201 is success");

        let r = reply(200, json!({ "result": "SUCCESS", "data": null }));
        assert_eq!(r.into_payload::<Option<i64>>().expect("optional"), None);
    }

    #[test]
    fn test_rejected_carries_code_and_message() {
        let r = reply(
            200,
            json!({ "result": "FAIL", "error": { "errorCode": "E1000", "message": "invalid input" } }),
        );
        assert!(!r.is_session_expired(EXPIRED));
        match r.into_payload::<()>() {
            Err(ApiError::Rejected { code, message }) => {
                assert_eq!(code, "E1000");
                assert_eq!(message, "invalid input");
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_expiry_detection() {
        assert!(Reply::new(StatusCode::UNAUTHORIZED, String::new()).is_session_expired(EXPIRED));

        let sentinel = reply(
            200,
            json!({ "result": "FAIL", "error": { "errorCode": EXPIRED, "message": "expired" } }),
        );
        assert!(sentinel.is_session_expired(EXPIRED));
        assert!(!sentinel.is_session_expired("SOMETHING_ELSE"));
    }

    #[test]
    fn test_non_envelope_error_maps_by_status() {
        let r = Reply::new(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>".to_string());
        assert!(matches!(r.into_payload::<()>(), Err(ApiError::ServerError(_))));

        let r = Reply::new(StatusCode::OK, "not json".to_string());
        assert!(matches!(r.into_payload::<()>(), Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_payload_type_mismatch_is_decode_error() {
        let r = reply(200, json!({ "result": "SUCCESS", "data": "text" }));
        assert!(matches!(r.into_payload::<Vec<i64>>(), Err(ApiError::Decode(_))));
    }
}
