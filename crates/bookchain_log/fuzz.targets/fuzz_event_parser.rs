#![no_main]
use libfuzzer_sys::fuzz_target;
use bookchain_log::{CanonicalEncode, CheckoutEvent};

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode to bytes that decode to the same event
    if let Ok(event) = serde_json::from_slice::<CheckoutEvent>(data) {
        let bytes = event.canonical_bytes().expect("decoded event must encode");
        let again: CheckoutEvent = serde_json::from_slice(&bytes).expect("canonical bytes must decode");
        assert_eq!(event, again);
    }
});
