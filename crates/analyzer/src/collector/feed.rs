//! 라이브 피드 이벤트 수신기
//!
//! 외부 전송 계층(관리 세션, 인증, 구독)이 디코딩한
//! `sros-log-generic-event` 알림을 `tokio::mpsc` 채널로 받아
//! 디버그 캡처 파일과 같은 텍스트 형식으로 변환한 뒤 파이프라인에 제출합니다.
//!
//! # 아키텍처 원칙
//! 이 모듈은 전송 계층에 의존하지 않습니다. 채널을 만드는 쪽이
//! 전송 계층과 수신기를 연결합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sridm_core::metrics::FEED_EVENTS_RECEIVED_TOTAL;

use super::CollectorStatus;
use crate::error::AnalyzerError;
use crate::pipeline::AnalysisPipeline;

/// 디코딩된 `sros-log-generic-event` 알림
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeedEvent {
    /// 알림 발생 시각 (RFC 3339)
    pub event_time: String,
    /// 로그 시퀀스 번호
    pub sequence_number: u64,
    /// 심각도 (minor, major, ...)
    pub severity: String,
    /// 애플리케이션 이름 (debug, ...)
    pub application: String,
    /// 이벤트 ID (2001)
    pub event_id: u32,
    /// 이벤트 이름
    #[serde(default)]
    pub event_name: String,
    /// 라우터 인스턴스 이름
    pub router_name: String,
    /// 이벤트 주제
    pub subject: String,
    /// 디버그 본문
    pub message: String,
}

impl FeedEvent {
    /// JSON 한 줄에서 이벤트를 디코딩합니다.
    pub fn from_json(line: &str) -> Result<Self, AnalyzerError> {
        serde_json::from_str(line).map_err(|e| AnalyzerError::Feed {
            reason: format!("invalid event record: {e}"),
        })
    }

    /// 디버그 캡처 파일 형식으로 렌더링합니다.
    ///
    /// ```text
    /// 1234 2024/05/14 09:12:01.123 UTC MINOR: DEBUG #2001 Base IPsec
    /// "<message>"
    ///
    /// ```
    ///
    /// 시각은 UTC로 변환하며, 마지막 빈 줄이 메시지 하나를 닫습니다.
    pub fn to_debug_text(&self) -> Result<String, AnalyzerError> {
        let time = DateTime::parse_from_rfc3339(&self.event_time)
            .map_err(|e| AnalyzerError::Feed {
                reason: format!("invalid event-time '{}': {e}", self.event_time),
            })?
            .with_timezone(&Utc);

        Ok(format!(
            "{} {} UTC {}: {} #{} {} {}\n\"{}\"\n\n",
            self.sequence_number,
            time.format("%Y/%m/%d %H:%M:%S%.3f"),
            self.severity.to_uppercase(),
            self.application.to_uppercase(),
            self.event_id,
            self.router_name,
            self.subject,
            self.message,
        ))
    }
}

/// 라이브 피드 수신기
///
/// 이벤트 채널이 닫히거나 취소 신호가 오면 종료합니다.
pub struct FeedReceiver {
    /// 디코딩된 이벤트 수신 채널
    event_rx: mpsc::Receiver<FeedEvent>,
    /// 수신 이벤트 카운터 (진행률 보고기와 공유)
    received: Arc<AtomicU64>,
    /// 렌더링에 실패해 건너뛴 이벤트 수
    skipped: u64,
    /// 현재 상태
    status: CollectorStatus,
}

impl FeedReceiver {
    /// 새 수신기를 생성합니다.
    pub fn new(event_rx: mpsc::Receiver<FeedEvent>) -> Self {
        Self {
            event_rx,
            received: Arc::new(AtomicU64::new(0)),
            skipped: 0,
            status: CollectorStatus::Idle,
        }
    }

    /// 진행률 보고용 공유 카운터를 반환합니다.
    pub fn received_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.received)
    }

    /// 수신한 이벤트 수
    pub fn received_count(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// 건너뛴 이벤트 수
    pub fn skipped_count(&self) -> u64 {
        self.skipped
    }

    /// 현재 상태를 반환합니다.
    pub fn status(&self) -> &CollectorStatus {
        &self.status
    }

    /// 이벤트를 수신해 파이프라인에 제출합니다.
    ///
    /// 변환할 수 없는 이벤트는 경고 후 건너뛰며,
    /// 파이프라인의 치명적 에러는 즉시 반환합니다.
    pub async fn run(
        &mut self,
        pipeline: &mut AnalysisPipeline,
        cancel: &CancellationToken,
    ) -> Result<u64, AnalyzerError> {
        self.status = CollectorStatus::Running;
        info!("starting live feed receiver");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("feed receiver received shutdown signal");
                    break;
                }
                event = self.event_rx.recv() => {
                    let Some(event) = event else {
                        info!("feed channel closed, shutting down receiver");
                        break;
                    };

                    self.received.fetch_add(1, Ordering::Relaxed);
                    counter!(FEED_EVENTS_RECEIVED_TOTAL).increment(1);

                    let text = match event.to_debug_text() {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(seq = event.sequence_number, error = %e, "skipping feed event");
                            self.skipped += 1;
                            continue;
                        }
                    };

                    if let Err(e) = pipeline.submit_text(&text).await {
                        self.status = CollectorStatus::Error(e.to_string());
                        return Err(e);
                    }
                    debug!(seq = event.sequence_number, "feed event submitted");
                }
            }
        }

        self.status = CollectorStatus::Stopped;
        Ok(self.received_count())
    }
}
