//! Fuzz target: `ObjectId` text parsing.
//!
//! Any string that parses must print back as the same 24 hex digits in
//! lower case.

#![no_main]

use crumpit_core::ObjectId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(id) = ObjectId::parse_str(text) {
        assert_eq!(id.to_string(), text.to_ascii_lowercase());
    }
});
