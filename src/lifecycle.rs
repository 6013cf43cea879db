//! 플러그인 수명 주기
//!
//! 시작 시 카탈로그 루트 아래에 로그를 켠 뒤 코디네이터를 띄웁니다.
//! 종료는 한 번만 동작하며, 호스트 윈도우의 원래 핸들러를 복원합니다.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::updater::{
    CatalogStore, CheckerConfig, Coordinator, HostPlatform, HttpIndexFetcher, IndexSource,
    UpdateBoard,
};

use crate::logging;

/// 실행 중인 플러그인 인스턴스
pub struct Plugin<P: HostPlatform> {
    coordinator: Coordinator<P>,
    store: CatalogStore,
}

impl<P: HostPlatform> Plugin<P> {
    /// 로그 초기화 + 원격 페처로 시작
    ///
    /// 결과는 `board`에 게시됩니다. UI 쪽은 시작 전에 같은 보드를 잡아둡니다.
    pub fn start(
        host: Arc<P>,
        board: Arc<UpdateBoard>,
        store: CatalogStore,
        config: &CheckerConfig,
    ) -> Result<Self> {
        // 호스트에 콘솔이 없으므로 실패하면 로그 없이 계속
        if let Ok(path) = logging::init(store.root()) {
            tracing::info!("[Plugin] Logging to {}", path.display());
        }

        let source: Arc<dyn IndexSource> = Arc::new(HttpIndexFetcher::new(config));
        Self::start_with_source(host, board, store, source, config)
    }

    /// 인덱스 소스를 직접 지정해서 시작
    pub fn start_with_source(
        host: Arc<P>,
        board: Arc<UpdateBoard>,
        store: CatalogStore,
        source: Arc<dyn IndexSource>,
        config: &CheckerConfig,
    ) -> Result<Self> {
        tracing::info!(
            "[Plugin] Starting update checker v{} (root: {})",
            env!("CARGO_PKG_VERSION"),
            store.root().display()
        );
        let coordinator = Coordinator::start(host, board, store.clone(), source, config)?;
        Ok(Self { coordinator, store })
    }

    pub fn board(&self) -> Arc<UpdateBoard> {
        self.coordinator.board()
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn window(&self) -> Option<P::Window> {
        self.coordinator.window()
    }

    /// 백그라운드 작업 완료 대기 (테스트/진단용)
    pub fn wait(&mut self, timeout: Duration) -> bool {
        self.coordinator.wait(timeout)
    }

    pub fn shutdown(&mut self) {
        self.coordinator.shutdown();
        tracing::info!("[Plugin] Stopped");
    }
}
