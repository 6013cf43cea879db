//! 백그라운드 코디네이터
//!
//! 두 작업을 독립적으로 실행합니다:
//! - **Locator**: 호스트 윈도우를 주기적으로 찾아 가로채기를 설치
//! - **Computer**: 인덱스 갱신 + 비교를 프로세스당 한 번 실행하고 결과 게시
//!
//! 두 작업은 UI 상태를 직접 건드리지 않습니다. 결과 게시 후 호스트 윈도우에
//! 갱신 신호만 보냅니다. 윈도우 참조와 준비 플래그는 같은 잠금 아래에서만
//! 바뀌므로, 어느 쪽이 먼저 끝나든 신호가 누락되지 않습니다.

use anyhow::{Context, Result};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::compare::UpdateComparator;
use crate::config::CheckerConfig;
use crate::fetch::IndexSource;
use crate::host::HostPlatform;
use crate::state::UpdateBoard;
use crate::store::CatalogStore;

/// 작업 스레드와 런타임 블로킹 풀의 이름
pub const WORKER_THREAD_NAME: &str = "catalog-update";

/// 호스트 연결 상태
struct HostLink<P: HostPlatform> {
    window: Option<P::Window>,
    handle: Option<P::Handle>,
    /// 결과가 게시되었는지 (보드와 같은 시점에 켜짐)
    ready: bool,
    /// 종료가 시작되었는지
    closed: bool,
}

impl<P: HostPlatform> HostLink<P> {
    fn new() -> Self {
        Self {
            window: None,
            handle: None,
            ready: false,
            closed: false,
        }
    }
}

type SharedLink<P> = Arc<Mutex<HostLink<P>>>;

fn lock<P: HostPlatform>(link: &SharedLink<P>) -> MutexGuard<'_, HostLink<P>> {
    link.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 탐색 재시도 정책
#[derive(Debug, Clone, Copy)]
struct LocatorPolicy {
    attempts: u32,
    interval: Duration,
    budget: Duration,
}

/// 백그라운드 작업 소유자
///
/// 생성 즉시 작업 스레드 하나가 단일 스레드 런타임으로 Locator와 Computer를
/// 함께 돌립니다. 두 작업이 끝나면 런타임을 내리고 스레드도 종료하므로
/// 호스트 프로세스에 남는 스레드가 없습니다.
/// `shutdown()`(또는 Drop)에서 가로채기를 한 번만 해제합니다.
pub struct Coordinator<P: HostPlatform> {
    host: Arc<P>,
    board: Arc<UpdateBoard>,
    link: SharedLink<P>,
    worker: Option<JoinHandle<()>>,
    done: Option<Receiver<()>>,
}

impl<P: HostPlatform> Coordinator<P> {
    /// 작업 스레드를 띄워 Locator/Computer를 시작합니다.
    ///
    /// 결과는 호출자가 넘긴 `board`에 게시됩니다. UI가 먼저 같은 보드를
    /// 잡아둘 수 있으므로 첫 갱신 신호부터 실제 결과를 읽습니다.
    pub fn start(
        host: Arc<P>,
        board: Arc<UpdateBoard>,
        store: CatalogStore,
        source: Arc<dyn IndexSource>,
        config: &CheckerConfig,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .thread_name(WORKER_THREAD_NAME)
            .enable_time()
            .build()
            .context("failed to build the background runtime")?;

        let link: SharedLink<P> = Arc::new(Mutex::new(HostLink::new()));
        let policy = LocatorPolicy {
            attempts: config.locator_attempts,
            interval: config.locator_interval(),
            budget: config.locator_budget(),
        };

        let (done_tx, done_rx) = mpsc::channel();
        let work = {
            let host = host.clone();
            let link = link.clone();
            let board = board.clone();
            move || {
                let locator = locate(host.clone(), link.clone(), policy);
                let computer = compute(host, link, board, store, source);
                runtime.block_on(async move {
                    tokio::join!(locator, computer);
                });
                // 블로킹 풀 스레드까지 정리된 뒤에 완료를 알림
                drop(runtime);
                let _ = done_tx.send(());
            }
        };
        let worker = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(work)
            .context("failed to spawn the background worker")?;

        tracing::info!(
            "[Coordinator] Started (locator: {} x {:?})",
            policy.attempts,
            policy.interval
        );

        Ok(Self {
            host,
            board,
            link,
            worker: Some(worker),
            done: Some(done_rx),
        })
    }

    /// UI가 읽는 결과 게시판
    pub fn board(&self) -> Arc<UpdateBoard> {
        self.board.clone()
    }

    /// 가로채기가 설치된 호스트 윈도우
    pub fn window(&self) -> Option<P::Window> {
        lock(&self.link).window
    }

    /// 작업 스레드가 끝날 때까지 기다립니다. 시간 안에 끝났으면 `true`.
    ///
    /// `true`를 돌려준 뒤에는 이 코디네이터가 만든 스레드가 남아 있지 않습니다.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        if let Some(done) = self.done.take() {
            match done.recv_timeout(timeout) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
                Err(RecvTimeoutError::Timeout) => {
                    self.done = Some(done);
                    return false;
                }
            }
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("[Coordinator] Background worker panicked");
            }
        }
        true
    }

    /// 가로채기를 해제합니다. 여러 번 호출해도 한 번만 동작합니다.
    ///
    /// 작업 스레드는 기다리지 않습니다(로더 잠금 안에서 호출될 수 있음).
    /// 닫힘 표시를 본 작업은 더 이상 호스트를 건드리지 않고 스스로 끝납니다.
    pub fn shutdown(&mut self) {
        let handle = {
            let mut link = lock(&self.link);
            if link.closed {
                return;
            }
            link.closed = true;
            link.handle.take()
        };

        if let Some(handle) = handle {
            self.host.detach(handle);
            tracing::info!("[Coordinator] Host window restored");
        }
    }
}

impl<P: HostPlatform> Drop for Coordinator<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Locator: 보이는 메뉴 윈도우를 찾으면 가로채기를 설치합니다.
async fn locate<P: HostPlatform>(host: Arc<P>, link: SharedLink<P>, policy: LocatorPolicy) {
    let deadline = tokio::time::Instant::now() + policy.budget;

    for attempt in 1..=policy.attempts {
        if lock(&link).closed {
            return;
        }

        if let Some(window) = host.find_menu_window() {
            let handle = match host.attach(window) {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::warn!("[Locator] Could not intercept {:?}: {}", window, e);
                    return;
                }
            };

            let mut guard = lock(&link);
            if guard.closed {
                drop(guard);
                host.detach(handle);
                return;
            }
            guard.window = Some(window);
            guard.handle = Some(handle);
            let ready = guard.ready;
            if ready {
                host.post_refresh(window);
            }
            drop(guard);

            tracing::info!(
                "[Locator] Attached to {:?} after {} attempt(s) (ready: {})",
                window,
                attempt,
                ready
            );
            return;
        }

        if attempt == policy.attempts || tokio::time::Instant::now() >= deadline {
            break;
        }
        tokio::time::sleep(policy.interval).await;
    }

    tracing::info!("[Locator] No host window with a menu found, giving up");
}

/// Computer: 비교를 한 번 실행하고 결과와 준비 플래그를 게시합니다.
async fn compute<P: HostPlatform>(
    host: Arc<P>,
    link: SharedLink<P>,
    board: Arc<UpdateBoard>,
    store: CatalogStore,
    source: Arc<dyn IndexSource>,
) {
    let job = tokio::task::spawn_blocking(move || {
        UpdateComparator::new(&store, source.as_ref()).run()
    });

    let updates = match job.await {
        Ok(outcome) => {
            tracing::info!(
                "[Computer] {} update(s) found ({:?}, refreshed: {})",
                outcome.updates.len(),
                outcome.status,
                outcome.refreshed
            );
            outcome.updates
        }
        Err(e) => {
            tracing::error!("[Computer] Comparison task failed: {}", e);
            Vec::new()
        }
    };

    board.publish(updates);

    let mut guard = lock(&link);
    guard.ready = true;
    if let Some(window) = guard.window {
        if !guard.closed {
            host.post_refresh(window);
        }
    }
}
