//! 파일 기반 입력 소스
//!
//! 저장된 SR OS 디버그 캡처 파일을 처음부터 끝까지 한 번 읽어
//! 분석 파이프라인에 제출합니다. `\n`과 `\r\n` 모두 줄 종료자로 취급하며,
//! UTF-8이 아닌 바이트가 있어도 중단하지 않습니다.

use std::path::{Path, PathBuf};

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::CollectorStatus;
use crate::error::AnalyzerError;
use crate::pipeline::{AnalysisPipeline, IngestOutcome};

/// 디버그 캡처 파일 소스
#[derive(Debug)]
pub struct FileSource {
    /// 캡처 파일 경로
    path: PathBuf,
    /// 현재 상태
    status: CollectorStatus,
}

impl FileSource {
    /// 새 파일 소스를 생성합니다.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            status: CollectorStatus::Idle,
        }
    }

    /// 캡처 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 현재 상태를 반환합니다.
    pub fn status(&self) -> &CollectorStatus {
        &self.status
    }

    /// 파일을 열어 끝까지 파이프라인에 제출합니다.
    ///
    /// 줄 사이마다 `cancel`을 확인합니다.
    ///
    /// # Errors
    /// - 파일을 열거나 읽지 못하면 [`AnalyzerError::Io`]
    /// - 헤더 파싱 실패 시 [`AnalyzerError::Parse`]
    pub async fn run(
        &mut self,
        pipeline: &mut AnalysisPipeline,
        cancel: &CancellationToken,
    ) -> Result<IngestOutcome, AnalyzerError> {
        self.status = CollectorStatus::Running;
        info!(path = %self.path.display(), "reading debug capture");

        let file = match tokio::fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(e) => {
                self.status = CollectorStatus::Error(e.to_string());
                return Err(AnalyzerError::Io(e));
            }
        };

        match pipeline.ingest_reader(BufReader::new(file), cancel).await {
            Ok(outcome) => {
                debug!(path = %self.path.display(), ?outcome, "debug capture consumed");
                self.status = CollectorStatus::Stopped;
                Ok(outcome)
            }
            Err(e) => {
                self.status = CollectorStatus::Error(e.to_string());
                Err(e)
            }
        }
    }
}
