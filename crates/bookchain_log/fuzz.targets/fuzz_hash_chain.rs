#![no_main]
use libfuzzer_sys::fuzz_target;
use bookchain_core::FixedClock;
use bookchain_log::{Chain, CheckoutEvent, validate_blocks};
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    let mut chain: Chain = Chain::with_clock(Arc::new(FixedClock::from_unix(0))).unwrap();
    for chunk in data.chunks(8) {
        let user = String::from_utf8_lossy(chunk).into_owned();
        chain.append(CheckoutEvent::new("isbn", user, "")).unwrap();
    }
    assert!(chain.validate().is_ok());

    // Overwriting an earlier block with the tail must be caught
    let mut blocks = chain.into_blocks();
    if let Some(index) = data.first().map(|b| *b as usize % blocks.len()) {
        let last = blocks.len() - 1;
        if index < last {
            blocks[index] = blocks[last].clone();
            assert!(validate_blocks(&blocks).is_err());
        }
    }
});
