//! Fuzz target: `TelegramFramer::feed` + `decode`
//!
//! Drives arbitrary byte sequences through the framer, decodes whatever
//! it accepts and evaluates the result.  Nothing may panic and no body
//! may exceed the telegram limit.
//!
//! cargo fuzz run fuzz_telegram_framer

#![no_main]

use libfuzzer_sys::fuzz_target;
use skyguard::safety::{self, Thresholds};
use skyguard::telegram::{self, FrameResult, MAX_TELEGRAM_LEN, TelegramFramer};

fuzz_target!(|data: &[u8]| {
    let mut framer = TelegramFramer::new();
    let thresholds = Thresholds::default();

    framer.feed_slice(data, |result| {
        if let FrameResult::Accepted(t) = result {
            assert!(t.len() <= MAX_TELEGRAM_LEN, "body exceeds MAX_TELEGRAM_LEN");
            let record = telegram::decode(&t);
            let _ = safety::evaluate(Some(&record), &thresholds);
        }
    });

    // After a reset the framer must accept bytes cleanly again.
    framer.reset();
    framer.feed_slice(data, |_| {});
});
