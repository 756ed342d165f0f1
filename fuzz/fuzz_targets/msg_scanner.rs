#![no_main]

use libfuzzer_sys::fuzz_target;
use sridm_analyzer::{MsgAnalyzer, MsgScanner, split_lines};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut scanner = MsgScanner::new();
    let mut engine = MsgAnalyzer::new();
    for line in split_lines(text) {
        match scanner.feed_line(&line) {
            Ok(Some(scanned)) => {
                assert!(scanned.msg.body.ends_with('"'));
                engine.record(scanned);
            }
            Ok(None) => {}
            Err(_) => break,
        }
    }
    let _ = scanner.finish();
    let _ = engine.matched_messages(".");
});
