//! Fuzz target: run-creation request bodies.
//!
//! Any JSON document converted into a `StoreValue` holds no native scalars,
//! so it must serialize without error and come back unchanged.

#![no_main]

use crumpit_core::{Serializer, StoreValue};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let value = StoreValue::from(json.clone());
    let back = Serializer::default().to_json(&value).expect("plain JSON must always serialize");
    assert_eq!(back, json, "JSON must survive conversion unchanged");
});
