#![no_main]

use libfuzzer_sys::fuzz_target;
use sridm_analyzer::{format_sr_endpoint, parse_sr_endpoint};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // 로그 표기에는 scope id가 없으므로 주소와 포트만 비교
    if let Ok(ep) = parse_sr_endpoint(text) {
        let again = parse_sr_endpoint(&format_sr_endpoint(&ep)).map(|a| (a.ip(), a.port()));
        assert_eq!(again.ok(), Some((ep.ip(), ep.port())));
    }
});
