//! 설정 관리 — sridm.toml 파싱 및 런타임 설정
//!
//! [`SridmConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SRIDM_ANALYZER_IDI_PATTERN=client` 형식)
//! 3. 설정 파일 (`sridm.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sridm_core::error::SridmError> {
//! use sridm_core::config::SridmConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SridmConfig::load("sridm.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SridmConfig::parse("[analyzer]\nidi_pattern = \"segw\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SridmError};

/// 입력 채널 최대 깊이
pub const MAX_CHANNEL_CAPACITY: usize = 10_000_000;

/// sridm 통합 설정
///
/// `sridm.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SridmConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 분석기 설정
    #[serde(default)]
    pub analyzer: AnalyzerSection,
    /// 라이브 피드 설정
    #[serde(default)]
    pub feed: FeedConfig,
}

impl SridmConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SridmError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값으로 시작하여 설정을 로드합니다.
    ///
    /// 기본 경로의 설정 파일은 선택 사항이므로, CLI는 사용자가 경로를
    /// 명시하지 않은 경우 이 메서드를 사용합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SridmError> {
        let path = path.as_ref();
        let mut config = match tokio::fs::try_exists(path).await {
            Ok(true) => Self::from_file(path).await?,
            _ => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SridmError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SridmError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SridmError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SridmError> {
        toml::from_str(toml_str).map_err(|e| {
            SridmError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SRIDM_{SECTION}_{FIELD}`
    /// 예: `SRIDM_ANALYZER_SHOW_MSGS=true`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SRIDM_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SRIDM_GENERAL_LOG_FORMAT");

        // Analyzer
        override_string(
            &mut self.analyzer.idi_pattern,
            "SRIDM_ANALYZER_IDI_PATTERN",
        );
        override_usize(
            &mut self.analyzer.channel_capacity,
            "SRIDM_ANALYZER_CHANNEL_CAPACITY",
        );
        override_bool(&mut self.analyzer.show_eps, "SRIDM_ANALYZER_SHOW_EPS");
        override_bool(&mut self.analyzer.show_msgs, "SRIDM_ANALYZER_SHOW_MSGS");
        override_u64(
            &mut self.analyzer.progress_interval_ms,
            "SRIDM_ANALYZER_PROGRESS_INTERVAL_MS",
        );

        // Feed
        override_string(&mut self.feed.router, "SRIDM_FEED_ROUTER");
        override_string(&mut self.feed.user, "SRIDM_FEED_USER");
        override_string(&mut self.feed.stream, "SRIDM_FEED_STREAM");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SridmError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.analyzer.channel_capacity == 0
            || self.analyzer.channel_capacity > MAX_CHANNEL_CAPACITY
        {
            return Err(ConfigError::InvalidValue {
                field: "analyzer.channel_capacity".to_owned(),
                reason: format!("must be 1-{}", MAX_CHANNEL_CAPACITY),
            }
            .into());
        }

        if self.analyzer.progress_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "analyzer.progress_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if let Err(e) = regex::Regex::new(&self.analyzer.idi_pattern) {
            return Err(ConfigError::InvalidValue {
                field: "analyzer.idi_pattern".to_owned(),
                reason: e.to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 분석기 설정 섹션
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSection {
    /// IDi 매칭용 정규식 패턴
    pub idi_pattern: String,
    /// 스캐너 -> 분석기 채널 깊이
    pub channel_capacity: usize,
    /// 매칭된 터널 엔드포인트 출력 여부
    pub show_eps: bool,
    /// 매칭된 디버그 메시지 출력 여부
    pub show_msgs: bool,
    /// 라이브 피드 진행 상황 보고 주기 (밀리초)
    pub progress_interval_ms: u64,
}

impl Default for AnalyzerSection {
    fn default() -> Self {
        Self {
            idi_pattern: ".".to_owned(),
            channel_capacity: 102_400,
            show_eps: true,
            show_msgs: false,
            progress_interval_ms: 1000,
        }
    }
}

/// 라이브 피드 설정
///
/// 전송 계층(세션, 인증)은 외부 협력자의 책임이며,
/// 여기서는 구독 대상 식별 정보만 보관합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// 라우터 관리 주소와 포트 (예: 192.168.1.1:830)
    pub router: String,
    /// 관리 세션 사용자명
    pub user: String,
    /// 알림 스트림 이름
    pub stream: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            router: "192.168.1.1:830".to_owned(),
            user: "admin".to_owned(),
            stream: String::new(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
