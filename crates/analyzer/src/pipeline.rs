//! 분석 파이프라인 오케스트레이션
//!
//! [`AnalysisPipeline`]은 스캐너(생산자)와 매칭 엔진(소비자)을
//! 유한 용량 `mpsc` 채널로 연결합니다.
//!
//! # 내부 아키텍처
//! ```text
//! submit_line / ingest_reader
//!     -> MsgScanner (호출자 태스크)
//!     -> mpsc<ScannedMsg>
//!     -> MsgAnalyzer (소비자 태스크, 단독 소유)
//! ```
//!
//! 소비자 태스크가 엔진을 독점 소유하므로 IDi 테이블의 쓰기 주체는 하나뿐입니다.
//! [`AnalysisPipeline::finish`]가 송신측을 닫고 소비자를 기다린 뒤
//! 엔진 소유권을 호출자에게 돌려주며, 그 이후에만 매칭 연산을 할 수 있습니다.
//!
//! # 사용 예시
//! ```ignore
//! use sridm_analyzer::{AnalysisPipeline, AnalyzerConfig};
//!
//! let mut pipeline = AnalysisPipeline::start(&AnalyzerConfig::default(), "file")?;
//! pipeline.submit_text(&capture).await?;
//! let engine = pipeline.finish().await?;
//! println!("{}", engine.eps_summary("client")?);
//! ```

use std::borrow::Cow;

use metrics::counter;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sridm_core::metrics::{ANALYZER_LINES_SCANNED_TOTAL, LABEL_SOURCE};

use crate::analyzer::MsgAnalyzer;
use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::lines::split_lines;
use crate::scanner::{MsgScanner, ScannedMsg};

/// 입력 소비 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// 입력 끝까지 소비함
    Completed {
        /// 읽은 줄 수
        lines: usize,
    },
    /// 취소 신호로 중단됨 (이미 처리한 메시지는 유효)
    Cancelled {
        /// 중단 전까지 읽은 줄 수
        lines: usize,
    },
}

/// 스캐너 -> 엔진 분석 파이프라인
pub struct AnalysisPipeline {
    /// 메시지 추출기
    scanner: MsgScanner,
    /// 닫힌 메시지 송신측
    tx: mpsc::Sender<ScannedMsg>,
    /// 엔진을 소유한 소비자 태스크
    consumer: JoinHandle<MsgAnalyzer>,
    /// 메트릭 소스 레이블
    source: &'static str,
}

impl AnalysisPipeline {
    /// 설정을 검증하고 소비자 태스크를 스폰합니다.
    ///
    /// tokio 런타임 안에서 호출해야 합니다.
    ///
    /// # Arguments
    /// - `config`: 분석기 설정 (채널 용량 사용)
    /// - `source`: 메트릭 레이블로 쓰일 입력 소스 이름 (`file`, `feed`)
    pub fn start(config: &AnalyzerConfig, source: &'static str) -> Result<Self, AnalyzerError> {
        config.validate()?;

        let (tx, mut rx) = mpsc::channel::<ScannedMsg>(config.channel_capacity);

        let consumer = tokio::spawn(async move {
            let mut engine = MsgAnalyzer::new();
            while let Some(scanned) = rx.recv().await {
                engine.record(scanned);
            }
            debug!(
                messages = engine.message_count(),
                identities = engine.identity_count(),
                "analyzer consumer drained"
            );
            engine
        });

        info!(source, capacity = config.channel_capacity, "analysis pipeline started");

        Ok(Self {
            scanner: MsgScanner::new(),
            tx,
            consumer,
            source,
        })
    }

    /// 한 줄을 제출합니다.
    ///
    /// 채널이 가득 차면 소비자가 따라잡을 때까지 기다립니다.
    ///
    /// # Errors
    /// - 헤더 파싱 실패 시 [`AnalyzerError::Parse`] (치명적, 더 제출하지 말 것)
    /// - 소비자 태스크가 사라졌으면 [`AnalyzerError::Channel`]
    pub async fn submit_line(&mut self, line: &str) -> Result<(), AnalyzerError> {
        counter!(ANALYZER_LINES_SCANNED_TOTAL, LABEL_SOURCE => self.source).increment(1);

        if let Some(scanned) = self.scanner.feed_line(line)? {
            self.tx
                .send(scanned)
                .await
                .map_err(|e| AnalyzerError::Channel(e.to_string()))?;
        }
        Ok(())
    }

    /// 텍스트 덩어리를 줄로 나누어 순서대로 제출합니다.
    pub async fn submit_text(&mut self, text: &str) -> Result<(), AnalyzerError> {
        for line in split_lines(text) {
            self.submit_line(&line).await?;
        }
        Ok(())
    }

    /// 비동기 리더를 끝까지 읽어 제출합니다.
    ///
    /// 줄 사이마다 취소 신호를 확인하며, 취소되면 그때까지 처리한 결과를
    /// 유지한 채 [`IngestOutcome::Cancelled`]를 반환합니다.
    /// UTF-8이 아닌 바이트는 대체 문자(U+FFFD)로 바꿔 계속 진행합니다.
    pub async fn ingest_reader<R>(
        &mut self,
        mut reader: R,
        cancel: &CancellationToken,
    ) -> Result<IngestOutcome, AnalyzerError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        let mut count = 0usize;

        loop {
            buf.clear();
            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(lines = count, "ingestion cancelled");
                    return Ok(IngestOutcome::Cancelled { lines: count });
                }
                read = reader.read_until(b'\n', &mut buf) => read?,
            };

            if read == 0 {
                break;
            }

            count += 1;
            let line = decode_line(&buf, count);
            self.submit_line(&line).await?;
        }

        Ok(IngestOutcome::Completed { lines: count })
    }

    /// 지금까지 제출한 줄 수
    pub fn lines_submitted(&self) -> usize {
        self.scanner.line_count()
    }

    /// 지금까지 닫힌 메시지 수
    pub fn messages_closed(&self) -> u64 {
        self.scanner.closed_count()
    }

    /// 입력을 마감하고 소비자가 끝날 때까지 기다린 뒤 엔진을 반환합니다.
    ///
    /// 빈 줄로 닫히지 않은 마지막 메시지는 버립니다.
    /// 치명적 에러 이후에도 호출할 수 있으며, 그 경우 에러 이전까지
    /// 전달된 메시지만 담긴 엔진을 돌려줍니다.
    pub async fn finish(self) -> Result<MsgAnalyzer, AnalyzerError> {
        let Self {
            scanner,
            tx,
            consumer,
            source,
        } = self;

        if let Some(dangling) = scanner.finish() {
            warn!(
                msg_id = dangling.id,
                "input ended inside a message; discarding unterminated message"
            );
        }

        drop(tx);
        let engine = consumer
            .await
            .map_err(|e| AnalyzerError::Channel(format!("analyzer task failed: {e}")))?;

        info!(
            source,
            messages = engine.message_count(),
            identities = engine.identity_count(),
            "analysis pipeline finished"
        );
        Ok(engine)
    }
}

/// 읽은 바이트에서 줄 종료자(`\n`, `\r\n`)를 떼고 문자열로 디코딩합니다.
fn decode_line(raw: &[u8], line_no: usize) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

    match std::str::from_utf8(raw) {
        Ok(line) => Cow::Borrowed(line),
        Err(e) => {
            warn!(line = line_no, error = %e, "invalid UTF-8 in input line, replacing");
            String::from_utf8_lossy(raw)
        }
    }
}
