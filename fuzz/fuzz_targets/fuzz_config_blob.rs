//! Fuzz target: persisted `AgentConfig` blob
//!
//! Feeds arbitrary bytes through the same decode + validate path the NVS
//! adapter uses at boot.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A blob that decodes and validates re-encodes to a blob that decodes
//!   to the same config
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use doorwatch::config::AgentConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = postcard::from_bytes::<AgentConfig>(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }

    let bytes = postcard::to_allocvec(&cfg).expect("valid config must encode");
    let again: AgentConfig = postcard::from_bytes(&bytes).expect("re-encoded config must decode");
    assert_eq!(again, cfg);
    assert!(again.validate().is_ok());
});
