//! Fuzz target: `ReportPayload::from_json`
//!
//! The first byte selects the wire format; the rest is the JSON body.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Anything accepted serialises back to a body that parses to the same
//!   payload
//!
//! cargo fuzz run fuzz_report_payload

#![no_main]

use doorwatch::config::WireFormat;
use doorwatch::reporter::ReportPayload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, body)) = data.split_first() else {
        return;
    };
    let format = match selector % 3 {
        0 => WireFormat::Text,
        1 => WireFormat::Numeric,
        _ => WireFormat::ShopStatus,
    };

    if let Ok(payload) = ReportPayload::from_json(body, format) {
        let json = payload.to_json().expect("parsed payload must encode");
        let again = ReportPayload::from_json(&json, format).expect("encoded payload must parse");
        assert_eq!(again, payload);
    }
});
