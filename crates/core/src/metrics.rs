//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않은 경우 기록은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sridm_`
//! - 모듈명: `analyzer_`, `feed_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(sridm_core::metrics::ANALYZER_MESSAGES_EXTRACTED_TOTAL).increment(1);
//! ```

/// 소스 레이블 키 (file, feed)
pub const LABEL_SOURCE: &str = "source";

// ─── Analyzer 메트릭 ────────────────────────────────────────────────

/// Analyzer: 스캔한 전체 줄 수 (counter)
pub const ANALYZER_LINES_SCANNED_TOTAL: &str = "sridm_analyzer_lines_scanned_total";

/// Analyzer: 추출된 디버그 메시지 수 (counter)
pub const ANALYZER_MESSAGES_EXTRACTED_TOTAL: &str = "sridm_analyzer_messages_extracted_total";

/// Analyzer: 관측된 IDi -> 엔드포인트 쌍 수 (counter)
pub const ANALYZER_IDENTITIES_OBSERVED_TOTAL: &str = "sridm_analyzer_identities_observed_total";

/// Analyzer: 건너뛴 상관관계 추출 실패 수 (counter)
pub const ANALYZER_CORRELATION_ERRORS_TOTAL: &str = "sridm_analyzer_correlation_errors_total";

// ─── Feed 메트릭 ────────────────────────────────────────────────────

/// Feed: 수신한 라이브 피드 이벤트 수 (counter)
pub const FEED_EVENTS_RECEIVED_TOTAL: &str = "sridm_feed_events_received_total";

/// 모든 메트릭 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다. 레코더가 없어도 패닉하지 않습니다.
pub fn describe_all() {
    use metrics::describe_counter;

    describe_counter!(
        ANALYZER_LINES_SCANNED_TOTAL,
        "Total number of debug log lines fed to the message scanner"
    );
    describe_counter!(
        ANALYZER_MESSAGES_EXTRACTED_TOTAL,
        "Total number of debug messages closed by the scanner"
    );
    describe_counter!(
        ANALYZER_IDENTITIES_OBSERVED_TOTAL,
        "Total number of IDi to endpoint observations applied to the table"
    );
    describe_counter!(
        ANALYZER_CORRELATION_ERRORS_TOTAL,
        "Total number of skipped IDi/endpoint correlations"
    );
    describe_counter!(
        FEED_EVENTS_RECEIVED_TOTAL,
        "Total number of live-feed events received"
    );
}
