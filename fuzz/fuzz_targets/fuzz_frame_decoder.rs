//! Fuzz target: `RecordSplitter::feed` → `FrameDecoder::decode`
//!
//! Drives arbitrary byte streams through the splitter and decoder and
//! asserts that nothing panics, every record stays within the splitter's
//! bound, and every acknowledged record carries the marker.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use flemlink::adapters::time::FixedClock;
use flemlink::link::delimiter::{MAX_RECORD_LEN, RecordSplitter};
use flemlink::protocol::frame::FrameDecoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let decoder = FrameDecoder::new(FixedClock(0));
    let mut splitter = RecordSplitter::new();

    splitter.feed(data, |record| {
        assert!(record.len() <= MAX_RECORD_LEN, "record exceeds MAX_RECORD_LEN");
        assert!(record.ends_with(b"\r\n"), "record without terminator");
        if decoder.decode(record).is_some() {
            assert!(record.starts_with(&[0x40, 0x43]));
        }
    });

    // After a reset the splitter must accept bytes cleanly again.
    splitter.reset();
    splitter.feed(data, |_| {});
});
