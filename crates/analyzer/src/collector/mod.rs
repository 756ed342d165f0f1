//! 입력 수집 모듈 -- 디버그 로그 텍스트를 분석 파이프라인으로 공급합니다.
//!
//! # 수집 소스
//! - [`FileSource`]: 저장된 디버그 캡처 파일을 한 번 읽음
//! - [`FeedReceiver`]: 외부 전송 계층이 디코딩한 라이브 피드 이벤트를
//!   `mpsc` 채널로 수신
//!
//! 두 소스 모두 결국 같은 줄 스트림으로 환원되어
//! [`AnalysisPipeline`](crate::pipeline::AnalysisPipeline)에 제출됩니다.

pub mod feed;
pub mod file;

pub use feed::{FeedEvent, FeedReceiver};
pub use file::FileSource;

/// 수집기 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorStatus {
    /// 실행 대기 중
    Idle,
    /// 실행 중
    Running,
    /// 에러로 중단됨
    Error(String),
    /// 정상 종료됨
    Stopped,
}

impl std::fmt::Display for CollectorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Error(msg) => write!(f, "error: {msg}"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}
