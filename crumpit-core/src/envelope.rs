//! The `{status, data}` response envelope and the outcome it is built from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::StoreValue;

/// Domain status carried in the envelope's `status` field.
///
/// This is not an HTTP status code; see [`build_envelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeCode(i32);

impl OutcomeCode {
    /// The backend call succeeded.
    pub const SUCCESS: Self = Self(1);
    /// The request itself was at fault (media type, parameters).
    pub const CLIENT_ERROR: Self = Self(0);
    /// A backend could not be reached or queried.
    pub const BACKEND_UNAVAILABLE: Self = Self(-1);

    /// Wraps an arbitrary code.
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// The raw integer code.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of one backend interaction, before it is put on the wire.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Outcome {
    /// The operation produced a payload.
    Success(StoreValue),
    /// The operation failed.
    Failure {
        /// Envelope code reported to the client.
        code: OutcomeCode,
        /// Human-readable description sent as `data`.
        reason: String,
    },
}

impl Outcome {
    /// A failure caused by the backend being unreachable or erroring.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Failure { code: OutcomeCode::BACKEND_UNAVAILABLE, reason: reason.into() }
    }

    /// A failure caused by the client's request.
    pub fn client_error(reason: impl Into<String>) -> Self {
        Self::Failure { code: OutcomeCode::CLIENT_ERROR, reason: reason.into() }
    }

    /// The code this outcome maps to.
    #[must_use]
    pub fn code(&self) -> OutcomeCode {
        match self {
            Self::Success(_) => OutcomeCode::SUCCESS,
            Self::Failure { code, .. } => *code,
        }
    }

    /// Split into the `(code, payload)` pair the envelope is built from.
    #[must_use]
    pub fn into_parts(self) -> (OutcomeCode, StoreValue) {
        match self {
            Self::Success(payload) => (OutcomeCode::SUCCESS, payload),
            Self::Failure { code, reason } => (code, StoreValue::Text(reason)),
        }
    }
}

/// Wire-level response object.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub status: OutcomeCode,
    pub data: StoreValue,
}

/// Wrap a `(code, payload)` pair and choose the HTTP status.
///
/// When `explicit_http_status` is `None` the status is `200` for code `0` and
/// `500` for every other code. Route handlers normally pass `Some(200)`.
#[must_use]
pub fn build_envelope(
    code: OutcomeCode,
    payload: StoreValue,
    explicit_http_status: Option<u16>,
) -> (Envelope, u16) {
    let http_status = explicit_http_status.unwrap_or(if code.value() == 0 { 200 } else { 500 });
    (Envelope { status: code, data: payload }, http_status)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn success_with_explicit_ok_status() {
        let (envelope, http) = build_envelope(OutcomeCode::SUCCESS, "payload".into(), Some(200));
        assert_eq!(http, 200);
        assert_eq!(envelope.status, OutcomeCode::SUCCESS);
        assert_eq!(envelope.data.as_text(), Some("payload"));
    }

    #[test]
    fn default_status_is_ok_for_code_zero() {
        let (_, http) = build_envelope(OutcomeCode::CLIENT_ERROR, "Unsupported Media Type".into(), None);
        assert_eq!(http, 200);
    }

    #[test]
    fn default_status_is_500_for_unavailable_and_success() {
        let (_, http) = build_envelope(OutcomeCode::BACKEND_UNAVAILABLE, StoreValue::Null, None);
        assert_eq!(http, 500);
        let (_, http) = build_envelope(OutcomeCode::SUCCESS, StoreValue::Null, None);
        assert_eq!(http, 500, "default rule treats only code 0 as OK");
    }

    #[test]
    fn failure_outcome_becomes_text_payload() {
        let (code, payload) = Outcome::unavailable("could not connect to mongo db").into_parts();
        assert_eq!(code, OutcomeCode::BACKEND_UNAVAILABLE);
        assert_eq!(payload.as_text(), Some("could not connect to mongo db"));
    }

    #[test]
    fn outcome_code_serializes_as_integer() {
        match serde_json::to_string(&OutcomeCode::BACKEND_UNAVAILABLE) {
            Ok(s) => assert_eq!(s, "-1"),
            Err(e) => panic!("serialization failed: {e}"),
        }
    }

    proptest! {
        #[test]
        fn explicit_status_always_wins(code in any::<i32>(), status in 100_u16..600) {
            let (envelope, http) = build_envelope(OutcomeCode::new(code), StoreValue::Null, Some(status));
            prop_assert_eq!(http, status);
            prop_assert_eq!(envelope.status.value(), code);
        }
    }
}
