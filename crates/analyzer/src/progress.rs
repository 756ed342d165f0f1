//! 라이브 피드 진행률 보고
//!
//! 수신 카운터를 주기적으로 로그에 남기는 저우선순위 태스크입니다.
//! 카운터는 원자적으로 읽기만 하며 결과의 정확성과는 무관합니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// 진행률 보고기
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    /// 공유 수신 카운터
    counter: Arc<AtomicU64>,
    /// 보고 주기
    interval: Duration,
}

impl ProgressReporter {
    /// 새 보고기를 생성합니다.
    pub fn new(counter: Arc<AtomicU64>, interval: Duration) -> Self {
        Self { counter, interval }
    }

    /// 현재 카운터 값
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// 취소될 때까지 주기적으로 보고하는 태스크를 스폰합니다.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<u64> {
        tokio::spawn(self.run(cancel))
    }

    /// 취소될 때까지 주기적으로 보고하고 마지막 카운터 값을 반환합니다.
    pub async fn run(self, cancel: CancellationToken) -> u64 {
        let mut ticker = tokio::time::interval(self.interval);
        // 첫 tick은 즉시 완료되므로 건너뜀
        ticker.tick().await;

        let mut last = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = self.current();
                    if now != last {
                        info!(received = now, "feed progress");
                        last = now;
                    }
                }
                _ = cancel.cancelled() => {
                    debug!("progress reporter shutting down");
                    break;
                }
            }
        }

        self.current()
    }
}
