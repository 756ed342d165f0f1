//! 에러 타입 — 도메인별 에러 정의

/// sridm 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SridmError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 채널 수신 실패
    #[error("channel receive failed: {0}")]
    ChannelRecv(String),

    /// 파이프라인 초기화 실패
    #[error("pipeline init failed: {0}")]
    InitFailed(String),
}

/// 파싱 에러
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 메시지 헤더 파싱 실패 (치명적, 전체 추출 중단)
    #[error("malformed message header at line {line}: {reason}")]
    Header { line: usize, reason: String },

    /// 식별자/엔드포인트 등 본문 데이터 파싱 실패 (복구 가능)
    #[error("malformed embedded data: {0}")]
    Embedded(String),

    /// 유효하지 않은 식별자 패턴
    #[error("invalid pattern: {0}")]
    Pattern(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_error_reports_line() {
        let err = ParseError::Header {
            line: 17,
            reason: "invalid sequence id".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("17"));
        assert!(msg.contains("invalid sequence id"));
    }

    #[test]
    fn config_error_wraps_into_top_level() {
        let err: SridmError = ConfigError::InvalidValue {
            field: "analyzer.channel_capacity".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(err, SridmError::Config(_)));
        assert!(err.to_string().contains("channel_capacity"));
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SridmError = io.into();
        assert!(matches!(err, SridmError::Io(_)));
    }
}
