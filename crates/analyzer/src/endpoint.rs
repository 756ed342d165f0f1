//! SR OS 디버그 출력의 엔드포인트 표기
//!
//! 디버그 로그는 터널 엔드포인트를 `<address>[<port>]` 형태로 출력합니다.
//!
//! ```text
//! 172.100.100.1[500]
//! 2001:beef::100[500]
//! ```

use std::net::SocketAddr;

use crate::error::AnalyzerError;

/// `<address>[<port>]` 표기를 소켓 주소로 파싱합니다.
///
/// 주소에 `:`가 있으면 IPv6로 취급하여 `[addr]:port` 형태로 감싼 뒤
/// 파싱하고, 그렇지 않으면 IPv4로 파싱합니다.
pub fn parse_sr_endpoint(input: &str) -> Result<SocketAddr, AnalyzerError> {
    let text = input.trim();
    let invalid = |reason: &str| AnalyzerError::Endpoint {
        input: text.to_owned(),
        reason: reason.to_owned(),
    };

    let (addr, rest) = text
        .split_once('[')
        .ok_or_else(|| invalid("missing '[' before port"))?;
    let port = rest
        .strip_suffix(']')
        .ok_or_else(|| invalid("missing ']' after port"))?;

    let candidate = if addr.contains(':') {
        format!("[{addr}]:{port}")
    } else {
        format!("{addr}:{port}")
    };

    candidate
        .parse::<SocketAddr>()
        .map_err(|e| invalid(&e.to_string()))
}

/// 소켓 주소를 디버그 로그의 `<address>[<port>]` 표기로 변환합니다.
pub fn format_sr_endpoint(endpoint: &SocketAddr) -> String {
    format!("{}[{}]", endpoint.ip(), endpoint.port())
}
