#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sridm_analyzer::{MsgAnalyzer, MsgScanner, split_lines};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// IDi 매칭 패턴
    pattern: String,
    /// 메시지 본문 목록 (각각 하나의 디버그 메시지가 됨)
    bodies: Vec<FuzzMsg>,
}

#[derive(Arbitrary, Debug)]
struct FuzzMsg {
    idi: Option<String>,
    continuation: bool,
    text: String,
}

fuzz_target!(|input: FuzzInput| {
    let mut capture = String::new();
    for (seq, msg) in input.bodies.iter().take(16).enumerate() {
        capture.push_str(&format!(
            "{seq} 2024/05/14 09:12:01.000 UTC MINOR: DEBUG #2001 Base IPsec\n"
        ));
        capture.push_str("Source: 10.0.0.1[500]\n");
        if msg.continuation {
            capture.push_str("[...IKE message continuation]\n");
        }
        if let Some(idi) = &msg.idi {
            capture.push_str("IKEv2 Identification - initiator payload\n");
            capture.push_str("   Next Payload: AUTH\n   Payload Length: 0\n   ID Type: ID_FQDN\n");
            capture.push_str(&format!("   ID Data: {}\n", idi.replace('\n', " ")));
        }
        for line in split_lines(&msg.text) {
            if !line.is_empty() {
                capture.push_str(&line);
                capture.push('\n');
            }
        }
        capture.push_str("\"\n\n");
    }

    let mut scanner = MsgScanner::new();
    let mut engine = MsgAnalyzer::new();
    for line in split_lines(&capture) {
        if let Ok(Some(scanned)) = scanner.feed_line(&line) {
            engine.record(scanned);
        }
    }

    if let (Ok(narrow), Ok(wide)) = (
        engine.matched_messages(&input.pattern),
        engine.matched_messages("."),
    ) {
        assert!(narrow.len() <= engine.message_count());
        assert!(wide.len() <= engine.message_count());
    }
});
