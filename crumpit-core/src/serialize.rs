//! JSON rendering of [`StoreValue`] trees.
//!
//! Native scalars are converted through an [`Encoders`] registry keyed by
//! type. A scalar whose type is not registered falls back to its display
//! form if it was wrapped with one; otherwise serialization fails with
//! [`CoreError::Serialization`] naming the type.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::{
    envelope::Envelope,
    error::CoreError,
    id::ObjectId,
    value::{NativeScalar, StoreValue},
};

type EncodeFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<Value> + Send + Sync>;

/// Registry of per-type encoders for native scalars.
#[derive(Clone)]
pub struct Encoders {
    by_type: HashMap<TypeId, EncodeFn>,
}

impl Encoders {
    /// A registry with no encoders at all.
    #[must_use]
    pub fn empty() -> Self {
        Self { by_type: HashMap::new() }
    }

    /// Registers `encode` for values of type `T`, replacing any previous encoder.
    pub fn register<T, F>(&mut self, encode: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let erased: EncodeFn =
            Arc::new(move |value: &(dyn Any + Send + Sync)| value.downcast_ref::<T>().map(&encode));
        self.by_type.insert(TypeId::of::<T>(), erased);
        self
    }

    /// Returns `true` if an encoder is registered for `T`.
    #[must_use]
    pub fn contains<T: Any>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    fn encode(&self, scalar: &NativeScalar) -> Option<Value> {
        self.by_type.get(&scalar.type_id()).and_then(|encode| encode(scalar.value()))
    }
}

impl Default for Encoders {
    /// Temporal values as ISO-8601 text, store identifiers as their canonical text.
    fn default() -> Self {
        let mut encoders = Self::empty();
        encoders
            .register::<DateTime<Utc>, _>(|ts| Value::String(iso_datetime(ts)))
            .register::<DateTime<FixedOffset>, _>(|ts| Value::String(iso_datetime(ts)))
            .register::<NaiveDateTime, _>(|ts| Value::String(iso_naive(ts)))
            .register::<NaiveDate, _>(|date| Value::String(date.format("%Y-%m-%d").to_string()))
            .register::<ObjectId, _>(|id| Value::String(id.to_string()))
            .register::<Uuid, _>(|id| Value::String(id.hyphenated().to_string()));
        encoders
    }
}

impl fmt::Debug for Encoders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encoders").field("registered", &self.by_type.len()).finish()
    }
}

// Seconds always present; microseconds only when non-zero. A leap second
// shows as second 60, its fraction taken modulo one second.
fn iso_naive(ts: &NaiveDateTime) -> String {
    let base = ts.format("%Y-%m-%dT%H:%M:%S");
    let micros = (ts.nanosecond() % 1_000_000_000) / 1_000;
    if micros == 0 {
        base.to_string()
    } else {
        format!("{base}.{micros:06}")
    }
}

fn iso_datetime<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    let offset = ts.format("%:z");
    format!("{}{offset}", iso_naive(&ts.naive_local()))
}

/// Converts [`StoreValue`] trees and [`Envelope`]s into JSON.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    encoders: Encoders,
}

impl Serializer {
    /// Create a serializer using the given encoder registry.
    #[must_use]
    pub fn new(encoders: Encoders) -> Self {
        Self { encoders }
    }

    /// The encoder registry in use.
    #[must_use]
    pub fn encoders(&self) -> &Encoders {
        &self.encoders
    }

    /// Convert a value tree into a `serde_json::Value`.
    ///
    /// Document key order is preserved. Non-finite floats become `null`.
    ///
    /// # Errors
    /// Returns [`CoreError::Serialization`] for a native scalar that has neither
    /// a registered encoder nor a display fallback.
    pub fn to_json(&self, value: &StoreValue) -> Result<Value, CoreError> {
        Ok(match value {
            StoreValue::Null => Value::Null,
            StoreValue::Bool(b) => Value::Bool(*b),
            StoreValue::Int(n) => Value::Number((*n).into()),
            StoreValue::UInt(n) => Value::Number((*n).into()),
            StoreValue::Float(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
            StoreValue::Text(s) => Value::String(s.clone()),
            StoreValue::Array(items) => {
                Value::Array(items.iter().map(|item| self.to_json(item)).collect::<Result<_, _>>()?)
            }
            StoreValue::Document(doc) => {
                let mut map = Map::with_capacity(doc.len());
                for (key, field) in doc {
                    map.insert(key.clone(), self.to_json(field)?);
                }
                Value::Object(map)
            }
            StoreValue::Native(scalar) => self.native_to_json(scalar)?,
        })
    }

    fn native_to_json(&self, scalar: &NativeScalar) -> Result<Value, CoreError> {
        if let Some(encoded) = self.encoders.encode(scalar) {
            return Ok(encoded);
        }
        match scalar.fallback_text() {
            Some(text) => Ok(Value::String(text)),
            None => Err(CoreError::Serialization { type_name: scalar.type_name() }),
        }
    }

    /// Serialize a value tree to JSON text.
    ///
    /// # Errors
    /// See [`Serializer::to_json`].
    pub fn to_text(&self, value: &StoreValue) -> Result<String, CoreError> {
        Ok(self.to_json(value)?.to_string())
    }

    /// Render an envelope as the `{"status": ..., "data": ...}` wire body.
    ///
    /// # Errors
    /// See [`Serializer::to_json`].
    pub fn render(&self, envelope: &Envelope) -> Result<String, CoreError> {
        let mut body = Map::with_capacity(2);
        body.insert("status".to_owned(), Value::Number(envelope.status.value().into()));
        body.insert("data".to_owned(), self.to_json(&envelope.data)?);
        Ok(Value::Object(body).to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::{envelope::OutcomeCode, value::Document};

    fn naive(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        match NaiveDate::from_ymd_opt(2019, 5, 1).and_then(|d| d.and_hms_micro_opt(h, m, s, micro)) {
            Some(ts) => ts,
            None => panic!("invalid test timestamp"),
        }
    }

    fn text(serializer: &Serializer, value: &StoreValue) -> String {
        match serializer.to_text(value) {
            Ok(s) => s,
            Err(e) => panic!("serialization failed: {e}"),
        }
    }

    #[test]
    fn naive_timestamp_renders_iso_without_fraction() {
        let s = Serializer::default();
        assert_eq!(text(&s, &naive(12, 30, 0, 0).into()), "\"2019-05-01T12:30:00\"");
    }

    #[test]
    fn timestamp_with_micros_renders_six_digits() {
        let s = Serializer::default();
        assert_eq!(text(&s, &naive(8, 5, 9, 1_500).into()), "\"2019-05-01T08:05:09.001500\"");
    }

    #[test]
    fn leap_second_keeps_six_digit_fraction() {
        let s = Serializer::default();
        let leap = match NaiveDate::from_ymd_opt(2016, 12, 31).and_then(|d| d.and_hms_milli_opt(23, 59, 59, 1_500)) {
            Some(ts) => ts,
            None => panic!("invalid leap-second timestamp"),
        };
        assert_eq!(text(&s, &leap.into()), "\"2016-12-31T23:59:60.500000\"");

        let whole = match NaiveDate::from_ymd_opt(2016, 12, 31).and_then(|d| d.and_hms_milli_opt(23, 59, 59, 1_000)) {
            Some(ts) => ts,
            None => panic!("invalid leap-second timestamp"),
        };
        assert_eq!(text(&s, &whole.into()), "\"2016-12-31T23:59:60\"");
    }

    #[test]
    fn utc_timestamp_renders_offset() {
        let s = Serializer::default();
        let ts = Utc.from_utc_datetime(&naive(23, 59, 59, 0));
        assert_eq!(text(&s, &ts.into()), "\"2019-05-01T23:59:59+00:00\"");
    }

    #[test]
    fn fixed_offset_timestamp_keeps_local_time() {
        let s = Serializer::default();
        let offset = match FixedOffset::east_opt(3600) {
            Some(o) => o,
            None => panic!("invalid offset"),
        };
        let ts = offset.from_utc_datetime(&naive(11, 0, 0, 0));
        assert_eq!(text(&s, &ts.into()), "\"2019-05-01T12:00:00+01:00\"");
    }

    #[test]
    fn date_renders_iso_date() {
        let s = Serializer::default();
        let date = match NaiveDate::from_ymd_opt(2020, 2, 29) {
            Some(d) => d,
            None => panic!("invalid date"),
        };
        assert_eq!(text(&s, &date.into()), "\"2020-02-29\"");
    }

    #[test]
    fn object_id_renders_canonical_hex() {
        let s = Serializer::default();
        let id = ObjectId::from_bytes([0x5c, 0xd9, 0x6a, 0x1f, 0, 0, 0, 0, 0, 0, 0xab, 0xff]);
        assert_eq!(text(&s, &id.into()), "\"5cd96a1f000000000000abff\"");
    }

    #[test]
    fn uuid_renders_hyphenated() {
        let s = Serializer::default();
        assert_eq!(text(&s, &Uuid::nil().into()), "\"00000000-0000-0000-0000-000000000000\"");
    }

    #[test]
    fn nested_document_keeps_insertion_order() {
        let s = Serializer::default();
        let mut run = Document::new();
        run.insert("_id".to_owned(), ObjectId::from_bytes([1; 12]).into());
        run.insert("name".to_owned(), "run_42".into());
        run.insert("started".to_owned(), naive(9, 0, 0, 0).into());
        let mut root = Document::new();
        root.insert("runs".to_owned(), StoreValue::Array(vec![run.into()]));
        root.insert("count".to_owned(), StoreValue::Int(1));
        assert_eq!(
            text(&s, &root.into()),
            r#"{"runs":[{"_id":"010101010101010101010101","name":"run_42","started":"2019-05-01T09:00:00"}],"count":1}"#
        );
    }

    #[test]
    fn unknown_native_type_fails_with_type_name() {
        struct Opaque;
        let s = Serializer::default();
        let value = StoreValue::Array(vec![StoreValue::Int(1), StoreValue::native(Opaque)]);
        match s.to_text(&value) {
            Err(CoreError::Serialization { type_name }) => {
                assert!(type_name.ends_with("Opaque"), "type name must be reported, got {type_name}");
            }
            other => panic!("expected Serialization error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_native_type_with_display_uses_fallback() {
        let s = Serializer::default();
        let value = StoreValue::Native(NativeScalar::with_display(Ipv4Addr::LOCALHOST));
        assert_eq!(text(&s, &value), "\"127.0.0.1\"");
    }

    #[test]
    fn registered_encoder_overrides_fallback() {
        let mut encoders = Encoders::default();
        encoders.register::<Ipv4Addr, _>(|ip| ip.octets().iter().copied().collect());
        let s = Serializer::new(encoders);
        let value = StoreValue::Native(NativeScalar::with_display(Ipv4Addr::LOCALHOST));
        assert_eq!(text(&s, &value), "[127,0,0,1]");
    }

    #[test]
    fn empty_registry_still_renders_identifiers_through_display() {
        let s = Serializer::new(Encoders::empty());
        let id = ObjectId::from_bytes([0xaa; 12]);
        assert_eq!(text(&s, &id.into()), "\"aaaaaaaaaaaaaaaaaaaaaaaa\"");
        assert!(s.to_text(&naive(1, 2, 3, 0).into()).is_err(), "timestamps have no fallback");
    }

    #[test]
    fn integers_beyond_i64_render_exactly() {
        let s = Serializer::default();
        let json = serde_json::json!({"count": u64::MAX, "min": i64::MIN, "ratio": 0.25});
        let value = StoreValue::from(json.clone());
        assert_eq!(text(&s, &value), r#"{"count":18446744073709551615,"min":-9223372036854775808,"ratio":0.25}"#);
        assert!(matches!(s.to_json(&value), Ok(back) if back == json));
    }

    #[test]
    fn non_finite_float_becomes_null() {
        let s = Serializer::default();
        assert_eq!(text(&s, &StoreValue::Float(f64::NAN)), "null");
    }

    #[test]
    fn default_registry_covers_temporal_and_identifier_types() {
        let encoders = Encoders::default();
        assert!(encoders.contains::<DateTime<Utc>>());
        assert!(encoders.contains::<NaiveDate>());
        assert!(encoders.contains::<ObjectId>());
        assert!(encoders.contains::<Uuid>());
        assert!(!encoders.contains::<String>());
    }

    #[test]
    fn render_puts_status_before_data() {
        let s = Serializer::default();
        let envelope = Envelope { status: OutcomeCode::SUCCESS, data: "hello".into() };
        match s.render(&envelope) {
            Ok(body) => assert_eq!(body, r#"{"status":1,"data":"hello"}"#),
            Err(e) => panic!("render failed: {e}"),
        }
    }
}
