//! Turns outcomes into HTTP responses carrying the JSON envelope.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use crumpit_core::{build_envelope, Outcome, OutcomeCode, Serializer};
use serde_json::json;

use crate::error::GatewayError;

/// Build the envelope for `outcome` and serialize it.
///
/// A payload the serializer cannot represent turns into an HTTP 500
/// failure envelope; the request never fails without a body.
#[must_use]
pub fn respond(serializer: &Serializer, outcome: Outcome, http_status: Option<u16>) -> Response {
    let (code, payload) = outcome.into_parts();
    let (envelope, status) = build_envelope(code, payload, http_status);
    match serializer.render(&envelope) {
        Ok(body) => json_response(status, body),
        Err(e) => GatewayError::Serialization(e).into_response(),
    }
}

/// Envelope whose `data` is plain text. Rendering text cannot fail.
pub(crate) fn text_envelope(code: OutcomeCode, message: &str, http_status: Option<u16>) -> Response {
    let (_, status) = build_envelope(code, message.into(), http_status);
    json_response(status, json!({ "status": code, "data": message }).to_string())
}

fn json_response(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

#[cfg(test)]
mod tests {
    use crumpit_core::{NativeScalar, StoreValue};

    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = match axum::body::to_bytes(resp.into_body(), 4096).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        }
    }

    #[tokio::test]
    async fn success_outcome_renders_envelope_with_json_content_type() {
        let resp = respond(&Serializer::default(), Outcome::Success("hi".into()), Some(200));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(b"application/json".as_slice())
        );
        assert_eq!(body_json(resp).await, json!({"status": 1, "data": "hi"}));
    }

    #[tokio::test]
    async fn default_status_follows_envelope_rule() {
        let resp = respond(&Serializer::default(), Outcome::client_error("Unsupported Media Type"), None);
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = respond(&Serializer::default(), Outcome::unavailable("down"), None);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unserializable_payload_becomes_500_failure_envelope() {
        struct Opaque;
        let payload = StoreValue::Native(NativeScalar::new(Opaque));
        let resp = respond(&Serializer::default(), Outcome::Success(payload), Some(200));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["status"], -1);
        let message = body["data"].as_str().unwrap_or_default();
        assert!(message.contains("Opaque"), "message must name the type, got {message}");
    }
}
