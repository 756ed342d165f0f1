//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 추출기와 CLI가 공유하는 디버그 메시지 구조를 정의합니다.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 디버그 메시지
///
/// 하나의 `DEBUG #2001` 레코드에 해당합니다. 하나의 IPsec 디버그 이벤트
/// (예: IKE_AUTH 패킷 덤프)는 여러 메시지로 나뉘어 출력될 수 있으며,
/// 이 경우 뒤따르는 메시지는 `continuation_of_previous`가 `true`입니다.
///
/// `id`와 `timestamp`는 여는 줄에서 생성 시 한 번만 결정되고,
/// `body`는 빈 줄로 닫힐 때까지 덧붙이기만 합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMsg {
    /// 여는 줄의 시퀀스 번호
    pub id: u64,
    /// 여는 줄의 타임스탬프
    pub timestamp: NaiveDateTime,
    /// 여는 줄부터 종료 빈 줄 직전까지의 전체 텍스트 (`\n` 결합)
    pub body: String,
    /// 직전 메시지의 구조적 연속(조각)인지 여부
    pub continuation_of_previous: bool,
}

impl LogMsg {
    /// 여는 줄 정보로 새 메시지를 생성합니다.
    pub fn new(id: u64, timestamp: NaiveDateTime, header: impl Into<String>) -> Self {
        Self {
            id,
            timestamp,
            body: header.into(),
            continuation_of_previous: false,
        }
    }

    /// 본문에 한 줄을 덧붙입니다.
    pub fn push_line(&mut self, line: &str) {
        if !self.body.is_empty() {
            self.body.push('\n');
        }
        self.body.push_str(line);
    }

    /// 본문의 줄 목록을 반환합니다.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.body.lines()
    }
}

impl fmt::Display for LogMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}\n{}", self.id, self.timestamp, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_milli_opt(10, 20, 30, 456)
            .unwrap()
    }

    #[test]
    fn push_line_joins_with_newline() {
        let mut msg = LogMsg::new(7, ts(), "7 2024/03/01 10:20:30.456 DEBUG #2001");
        msg.push_line("\"IKE message\"");
        msg.push_line("");
        msg.push_line("tail");
        assert_eq!(
            msg.body,
            "7 2024/03/01 10:20:30.456 DEBUG #2001\n\"IKE message\"\n\ntail"
        );
        assert_eq!(msg.lines().count(), 4);
    }

    #[test]
    fn new_message_is_not_continuation() {
        let msg = LogMsg::new(1, ts(), "header");
        assert!(!msg.continuation_of_previous);
    }

    #[test]
    fn display_prints_id_timestamp_and_body() {
        let msg = LogMsg::new(42, ts(), "header");
        let s = msg.to_string();
        assert!(s.starts_with("42 2024-03-01 10:20:30.456"));
        assert!(s.ends_with("\nheader"));
    }

    #[test]
    fn serializes_to_json() {
        let msg = LogMsg::new(3, ts(), "header");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["body"], "header");
        assert_eq!(json["continuation_of_previous"], false);
    }
}
