//! Fuzz target: YAML configuration parsing.
//!
//! Arbitrary text fed to the config parser must either parse or return an
//! error, and a parsed config must always yield a listen port.

#![no_main]

use crumpit_core::{BackendKind, Config};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = Config::from_yaml_str(text) {
        let _ = config.listen_port();
        let _ = config.backend(BackendKind::DocumentStore);
        let _ = config.backend(BackendKind::RelationalStore);
    }
});
