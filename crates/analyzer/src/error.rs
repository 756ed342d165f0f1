//! 분석기 에러 타입
//!
//! [`AnalyzerError`]는 메시지 추출, IDi 상관관계, 매칭 과정에서 발생하는
//! 모든 에러를 표현합니다. `From<AnalyzerError> for SridmError` 변환이
//! 구현되어 있어 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.
//!
//! # 치명성
//! - 헤더 파싱 실패 ([`AnalyzerError::Parse`])는 추출 전체를 중단합니다.
//! - 엔드포인트/DN 변환 실패는 해당 상관관계 하나만 건너뜁니다.
//! - 패턴 에러는 매칭 호출자에게 동기적으로 반환됩니다.

use sridm_core::error::{ConfigError, ParseError, PipelineError, SridmError};

/// 분석기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// 메시지 헤더 파싱 실패 (치명적)
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// 실패한 줄 번호 (1부터 시작)
        line: usize,
        /// 실패 사유
        reason: String,
    },

    /// `Source:` 줄의 엔드포인트 파싱 실패
    #[error("invalid endpoint '{input}': {reason}")]
    Endpoint {
        /// 원본 엔드포인트 텍스트
        input: String,
        /// 실패 사유
        reason: String,
    },

    /// `=`가 없는 IDi (DN 형식이 아님)
    #[error("not a distinguished name: '{0}'")]
    NotDistinguishedName(String),

    /// 지원하지 않는 DN 속성 타입
    #[error("{0} is not supported")]
    UnsupportedAttribute(String),

    /// `Type=Value` 형식이 아닌 DN 속성
    #[error("malformed attribute: '{0}'")]
    MalformedAttribute(String),

    /// 유효하지 않은 IDi 패턴
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// 라이브 피드 이벤트 변환 실패
    #[error("feed error: {reason}")]
    Feed {
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    /// 추출 전체를 중단해야 하는 에러인지 여부
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Channel(_) | Self::Io(_) | Self::Config { .. }
        )
    }
}

impl From<AnalyzerError> for SridmError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Parse { line, reason } => {
                SridmError::Parse(ParseError::Header { line, reason })
            }
            AnalyzerError::InvalidPattern(e) => {
                SridmError::Parse(ParseError::Pattern(e.to_string()))
            }
            AnalyzerError::Config { field, reason } => {
                SridmError::Config(ConfigError::InvalidValue { field, reason })
            }
            AnalyzerError::Channel(reason) => {
                SridmError::Pipeline(PipelineError::ChannelSend(reason))
            }
            AnalyzerError::Io(e) => SridmError::Io(e),
            other => SridmError::Parse(ParseError::Embedded(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_has_line() {
        let err = AnalyzerError::Parse {
            line: 42,
            reason: "invalid sequence id 'abc'".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn fatal_classification() {
        assert!(
            AnalyzerError::Parse {
                line: 1,
                reason: "x".to_owned()
            }
            .is_fatal()
        );
        assert!(
            !AnalyzerError::Endpoint {
                input: "x".to_owned(),
                reason: "y".to_owned()
            }
            .is_fatal()
        );
        assert!(!AnalyzerError::UnsupportedAttribute("Title".to_owned()).is_fatal());
        assert!(!AnalyzerError::NotDistinguishedName("client1".to_owned()).is_fatal());
    }

    #[test]
    fn converts_parse_error_to_sridm_error() {
        let err = AnalyzerError::Parse {
            line: 3,
            reason: "bad timestamp".to_owned(),
        };
        let top: SridmError = err.into();
        assert!(matches!(
            top,
            SridmError::Parse(ParseError::Header { line: 3, .. })
        ));
    }

    #[test]
    fn converts_pattern_error_to_sridm_error() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let top: SridmError = AnalyzerError::from(regex_err).into();
        assert!(matches!(top, SridmError::Parse(ParseError::Pattern(_))));
    }

    #[test]
    fn unsupported_attribute_display() {
        let err = AnalyzerError::UnsupportedAttribute("SerialNumber".to_owned());
        assert_eq!(err.to_string(), "SerialNumber is not supported");
    }
}
