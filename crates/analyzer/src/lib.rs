#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`lines`]: 원시 텍스트 -> 논리적 줄 목록 (빈 줄 보존, CRLF 정규화)
//! - [`dn`]: IKE IDi 속성 목록 -> 인증서 DN 변환
//! - [`endpoint`]: `<address>[<port>]` 엔드포인트 표기 파싱/렌더링
//! - [`scanner`]: 디버그 메시지 추출 상태 머신
//! - [`analyzer`]: IDi -> 엔드포인트 테이블과 매칭 엔진
//! - [`pipeline`]: 스캐너 -> 엔진 생산자/소비자 파이프라인
//! - [`progress`]: 라이브 피드 진행률 보고
//! - [`collector`]: 파일 / 라이브 피드 입력 소스
//! - [`config`]: 분석기 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! FileSource / FeedReceiver -> split_lines -> MsgScanner -> mpsc -> MsgAnalyzer
//!                                                |                      |
//!                                        LogMsg + IDi 관측값     matched_messages(pattern)
//! ```

pub mod analyzer;
pub mod config;
pub mod dn;
pub mod endpoint;
pub mod error;
pub mod lines;
pub mod pipeline;
pub mod progress;
pub mod scanner;

pub mod collector;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{AnalysisPipeline, IngestOutcome};

// 엔진
pub use analyzer::MsgAnalyzer;
pub use scanner::{IdiSighting, MsgScanner, ScannedMsg};

// 설정
pub use config::AnalyzerConfig;

// 에러
pub use error::AnalyzerError;

// 변환 함수
pub use dn::ike_dn_to_cert_dn;
pub use endpoint::{format_sr_endpoint, parse_sr_endpoint};
pub use lines::split_lines;

// 수집기
pub use collector::{CollectorStatus, FeedEvent, FeedReceiver, FileSource};

// 진행률
pub use progress::ProgressReporter;
