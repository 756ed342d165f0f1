//! 분석기 설정
//!
//! [`AnalyzerConfig`]는 core의 [`AnalyzerSection`](sridm_core::config::AnalyzerSection)을
//! 기반으로 분석 파이프라인 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use sridm_core::config::SridmConfig;
//! use sridm_analyzer::config::AnalyzerConfig;
//!
//! let core_config = SridmConfig::default();
//! let config = AnalyzerConfig::from_core(&core_config.analyzer);
//! ```

use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use sridm_core::config::MAX_CHANNEL_CAPACITY;

use crate::error::AnalyzerError;

/// 기본 IDi 패턴 (모든 IDi 매칭)
pub const DEFAULT_IDI_PATTERN: &str = ".";

/// 기본 채널 깊이
pub const DEFAULT_CHANNEL_CAPACITY: usize = 102_400;

/// 분석 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// IDi 매칭 패턴 (정규식)
    pub idi_pattern: String,
    /// 스캐너 -> 엔진 채널 용량
    pub channel_capacity: usize,
    /// 진행률 보고 주기 (밀리초)
    pub progress_interval_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            idi_pattern: DEFAULT_IDI_PATTERN.to_owned(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            progress_interval_ms: 1000,
        }
    }
}

impl AnalyzerConfig {
    /// core의 `AnalyzerSection`에서 분석기 설정을 생성합니다.
    pub fn from_core(core: &sridm_core::config::AnalyzerSection) -> Self {
        Self {
            idi_pattern: core.idi_pattern.clone(),
            channel_capacity: core.channel_capacity,
            progress_interval_ms: core.progress_interval_ms,
        }
    }

    /// 진행률 보고 주기
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// 설정 값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.channel_capacity == 0 || self.channel_capacity > MAX_CHANNEL_CAPACITY {
            return Err(AnalyzerError::Config {
                field: "channel_capacity".to_owned(),
                reason: format!("must be between 1 and {MAX_CHANNEL_CAPACITY}"),
            });
        }

        if self.progress_interval_ms == 0 {
            return Err(AnalyzerError::Config {
                field: "progress_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Regex::new(&self.idi_pattern)?;

        Ok(())
    }
}
