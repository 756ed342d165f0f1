//! 디버그 메시지 추출 상태 머신
//!
//! SR OS IPsec 디버그 출력은 여러 줄로 된 레코드의 연속입니다.
//!
//! ```text
//! 1234 2024/05/14 09:12:01.123 UTC MINOR: DEBUG #2001 Base IPsec
//! "IPsec(1): IKEv2 Packet Received
//! Source: 172.100.100.1[500]
//! ...
//! "
//! <빈 줄>
//! ```
//!
//! [`MsgScanner`]는 줄을 하나씩 받아 레코드를 [`LogMsg`]로 재조립합니다.
//!
//! # 상태
//! - `ScanningForStart`: `DEBUG #2001` 마커가 있는 줄을 찾습니다.
//!   찾으면 시퀀스 번호와 타임스탬프를 파싱해 새 메시지를 엽니다.
//! - `InMessage`: 본문에 줄을 덧붙입니다. `"`로 끝나는 줄 바로 뒤의
//!   빈 줄에서만 메시지를 닫고 다시 `ScanningForStart`로 돌아갑니다.
//!   따옴표 본문 안의 빈 줄은 본문의 일부로 유지합니다.
//!
//! 메시지를 닫을 때 본문에서 IDi 식별 페이로드를 찾아
//! IDi -> 엔드포인트 관측값([`IdiSighting`])을 함께 내보냅니다.

use std::net::SocketAddr;

use chrono::NaiveDateTime;
use metrics::counter;
use tracing::{debug, warn};

use sridm_core::metrics::{ANALYZER_CORRELATION_ERRORS_TOTAL, ANALYZER_MESSAGES_EXTRACTED_TOTAL};
use sridm_core::types::LogMsg;

use crate::endpoint::parse_sr_endpoint;
use crate::error::AnalyzerError;

/// 디버그 레코드 시작 마커
pub const DEBUG_MSG_START_MARKER: &str = "DEBUG #2001";

/// IKE 메시지 연속 마커 (줄 전체가 일치해야 함)
pub const IKE_CONTINUATION_MARKER: &str = "[...IKE message continuation]";

/// 인증서 덤프 연속 접미사
pub const CERT_CONTINUATION_SUFFIX: &str = "Cert cont:";

/// IKEv2 IDi 페이로드 마커 (줄 전체가 일치해야 함)
pub const IDI_PAYLOAD_MARKER: &str = "IKEv2 Identification - initiator payload";

/// 피어 엔드포인트 줄 접두사
pub const SOURCE_PREFIX: &str = "Source: ";

/// IDi 마커 줄로부터 `ID Data:` 줄까지의 거리
pub const IDI_DATA_LINE_OFFSET: usize = 4;

/// 헤더 타임스탬프 형식 (`YYYY/MM/DD HH:MM:SS.mmm`)
const HEADER_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// 메시지 본문에서 관측한 IDi -> 엔드포인트 쌍
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdiSighting {
    /// 피어가 선언한 IDi
    pub idi: String,
    /// 직전 `Source:` 줄의 엔드포인트
    pub endpoint: SocketAddr,
}

/// 닫힌 메시지와 그 본문에서 관측한 IDi 목록
#[derive(Debug, Clone)]
pub struct ScannedMsg {
    /// 추출된 메시지
    pub msg: LogMsg,
    /// 본문 순서대로의 IDi 관측값
    pub sightings: Vec<IdiSighting>,
}

/// 스캐너 상태
#[derive(Debug, Default)]
enum ScanState {
    /// 시작 마커 대기
    #[default]
    ScanningForStart,
    /// 메시지 본문 수집 중
    InMessage {
        /// 수집 중인 메시지
        msg: LogMsg,
        /// 마지막으로 덧붙인 줄이 `"`로 끝났는지 여부
        quote_closed: bool,
    },
}

/// 디버그 메시지 추출기
///
/// 한 번의 정방향 패스 동안 진행 중인 메시지를 독점 소유하며,
/// 닫는 따옴표 뒤의 빈 줄로 닫힌 메시지만 호출자에게 넘깁니다.
#[derive(Debug, Default)]
pub struct MsgScanner {
    /// 현재 상태
    state: ScanState,
    /// 지금까지 받은 줄 수 (에러 위치 보고용)
    line_no: usize,
    /// 닫힌 메시지 수
    closed_count: u64,
}

impl MsgScanner {
    /// 새 스캐너를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 한 줄을 처리합니다.
    ///
    /// 이 줄로 메시지가 닫히면 `Some`을 반환합니다.
    ///
    /// # Errors
    /// 시작 줄의 시퀀스 번호나 타임스탬프 파싱에 실패하면
    /// [`AnalyzerError::Parse`]를 반환합니다. 이 에러는 치명적이며
    /// 호출자는 추출을 중단해야 합니다.
    pub fn feed_line(&mut self, line: &str) -> Result<Option<ScannedMsg>, AnalyzerError> {
        self.line_no += 1;

        match &mut self.state {
            ScanState::ScanningForStart => {
                if line.contains(DEBUG_MSG_START_MARKER) {
                    let msg = parse_header(line, self.line_no)?;
                    self.state = ScanState::InMessage {
                        msg,
                        quote_closed: false,
                    };
                }
                Ok(None)
            }
            ScanState::InMessage {
                quote_closed: true, ..
            } if line.is_empty() => {
                let ScanState::InMessage { msg, .. } = std::mem::take(&mut self.state) else {
                    return Ok(None);
                };
                Ok(Some(self.close(msg)))
            }
            ScanState::InMessage { msg, quote_closed } => {
                if line == IKE_CONTINUATION_MARKER || line.ends_with(CERT_CONTINUATION_SUFFIX) {
                    msg.continuation_of_previous = true;
                }
                msg.push_line(line);
                *quote_closed = line.ends_with('"');
                Ok(None)
            }
        }
    }

    /// 입력이 끝났음을 알립니다.
    ///
    /// 빈 줄로 닫히지 않은 메시지가 남아 있으면 반환합니다.
    /// 이 메시지는 완결되지 않았으므로 결과에 포함하지 않습니다.
    pub fn finish(self) -> Option<LogMsg> {
        match self.state {
            ScanState::InMessage { msg, .. } => Some(msg),
            ScanState::ScanningForStart => None,
        }
    }

    /// 지금까지 처리한 줄 수를 반환합니다.
    pub fn line_count(&self) -> usize {
        self.line_no
    }

    /// 지금까지 닫힌 메시지 수를 반환합니다.
    pub fn closed_count(&self) -> u64 {
        self.closed_count
    }

    /// 메시지 수집 중인지 여부
    pub fn in_message(&self) -> bool {
        matches!(self.state, ScanState::InMessage { .. })
    }

    fn close(&mut self, msg: LogMsg) -> ScannedMsg {
        self.closed_count += 1;
        counter!(ANALYZER_MESSAGES_EXTRACTED_TOTAL).increment(1);

        let sightings = extract_sightings(&msg);
        ScannedMsg { msg, sightings }
    }
}

/// 시작 줄에서 시퀀스 번호와 타임스탬프를 파싱합니다.
fn parse_header(line: &str, line_no: usize) -> Result<LogMsg, AnalyzerError> {
    let mut fields = line.split_whitespace();

    let id_field = fields.next().unwrap_or_default();
    let id = id_field
        .parse::<u64>()
        .map_err(|e| AnalyzerError::Parse {
            line: line_no,
            reason: format!("invalid sequence id '{id_field}': {e}"),
        })?;

    let (Some(date), Some(time)) = (fields.next(), fields.next()) else {
        return Err(AnalyzerError::Parse {
            line: line_no,
            reason: "missing timestamp".to_owned(),
        });
    };

    let stamp = format!("{date} {time}");
    let timestamp = NaiveDateTime::parse_from_str(&stamp, HEADER_TIMESTAMP_FORMAT).map_err(|e| {
        AnalyzerError::Parse {
            line: line_no,
            reason: format!("invalid timestamp '{stamp}': {e}"),
        }
    })?;

    Ok(LogMsg::new(id, timestamp, line))
}

/// 닫힌 메시지 본문에서 IDi -> 엔드포인트 관측값을 추출합니다.
///
/// IDi 마커 줄로부터 [`IDI_DATA_LINE_OFFSET`]만큼 뒤의 줄에서 IDi를 읽고,
/// 마커 줄부터 거꾸로 가장 가까운 `Source:` 줄에서 엔드포인트를 읽습니다.
/// 어느 쪽이든 실패하면 경고만 남기고 그 관측은 건너뜁니다.
fn extract_sightings(msg: &LogMsg) -> Vec<IdiSighting> {
    let lines: Vec<&str> = msg.lines().collect();
    let mut sightings = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if *line != IDI_PAYLOAD_MARKER {
            continue;
        }

        let Some(data_line) = lines.get(idx + IDI_DATA_LINE_OFFSET) else {
            warn!(msg_id = msg.id, "IDi payload truncated, no ID data line");
            counter!(ANALYZER_CORRELATION_ERRORS_TOTAL).increment(1);
            continue;
        };

        // `ID Data: 2001:db8::1` 같은 IPv6 식별자는 첫 콜론 필드(`2001`)만 남음
        let Some(idi) = data_line
            .split(':')
            .nth(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            warn!(msg_id = msg.id, line = *data_line, "failed to read IDi from data line");
            counter!(ANALYZER_CORRELATION_ERRORS_TOTAL).increment(1);
            continue;
        };

        let Some(source_line) = lines[..=idx]
            .iter()
            .rev()
            .find(|l| l.starts_with(SOURCE_PREFIX))
        else {
            debug!(msg_id = msg.id, idi, "no Source line before IDi payload");
            continue;
        };

        match parse_sr_endpoint(&source_line[SOURCE_PREFIX.len()..]) {
            Ok(endpoint) => sightings.push(IdiSighting {
                idi: idi.to_owned(),
                endpoint,
            }),
            Err(e) => {
                warn!(msg_id = msg.id, line = *source_line, error = %e, "failed to parse line get EP");
                counter!(ANALYZER_CORRELATION_ERRORS_TOTAL).increment(1);
            }
        }
    }

    sightings
}
