//! ═══════════════════════════════════════════════════════════════════
//! 업데이트 체커 통합 테스트
//! ═══════════════════════════════════════════════════════════════════
//!
//! 플러그인 수명 주기 전체를 가짜 호스트로 돌려봅니다:
//!
//! 1. **시작 → 비교 → 게시**: 결과와 준비 플래그, 갱신 신호
//! 2. **메뉴 렌더링**: 준비 전/후 상태 아이콘
//! 3. **종료**: 원래 핸들러 복원 1회
//! 4. **실행 대상 조회**: settings.json 결과 코드
//!
//! 작업 스레드 정리는 `runtime_threads.rs`에서 별도 프로세스로 확인합니다.
//!
//! 모든 테스트는 `tempdir`을 사용해 파일시스템을 격리합니다.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use catalog_update_checker::updater::host::{intercept, render_menu, HostEvent, Reaction, UPDATE_MENU_ID};
use catalog_update_checker::updater::launcher::read_launch_target;
use catalog_update_checker::updater::{
    CatalogStore, CheckerConfig, HostError, HostMenu, HostPlatform, IconCache, IconFactory,
    IndexSource, MenuStatus, StatusIcon, UpdateBoard,
};
use catalog_update_checker::Plugin;

// ═══════════════════════════════════════════════════════
// 가짜 호스트
// ═══════════════════════════════════════════════════════

#[derive(Default)]
struct RecordingHost {
    attached: AtomicUsize,
    detached: AtomicUsize,
    posted: AtomicUsize,
}

impl HostPlatform for RecordingHost {
    type Window = usize;
    type Handle = usize;

    fn find_menu_window(&self) -> Option<usize> {
        Some(42)
    }

    fn attach(&self, window: usize) -> Result<usize, HostError> {
        self.attached.fetch_add(1, Ordering::SeqCst);
        Ok(window)
    }

    fn detach(&self, _handle: usize) {
        self.detached.fetch_add(1, Ordering::SeqCst);
    }

    fn post_refresh(&self, _window: usize) -> bool {
        self.posted.fetch_add(1, Ordering::SeqCst);
        true
    }
}

/// 고정 인덱스를 저장하는 소스
struct FixedIndex(&'static str);

impl IndexSource for FixedIndex {
    fn refresh(&self, store: &CatalogStore) -> anyhow::Result<u64> {
        store.ensure_dir(&store.catalog_dir())?;
        store.write_index(self.0.as_bytes())?;
        Ok(self.0.len() as u64)
    }
}

#[derive(Default)]
struct MenuModel {
    items: Vec<(u16, String, Option<u32>)>,
}

impl HostMenu for MenuModel {
    type Icon = u32;

    fn contains(&self, id: u16) -> bool {
        self.items.iter().any(|(i, _, _)| *i == id)
    }

    fn append(&mut self, id: u16, label: &str) -> bool {
        self.items.push((id, label.to_string(), None));
        true
    }

    fn update(&mut self, id: u16, label: &str, icon: Option<u32>) -> bool {
        match self.items.iter_mut().find(|(i, _, _)| *i == id) {
            Some(item) => {
                item.1 = label.to_string();
                item.2 = icon;
                true
            }
            None => false,
        }
    }

    fn redraw(&mut self) {}
}

/// 만든 순서대로 번호를 매기는 아이콘 팩토리
#[derive(Default)]
struct NumberedIcons(Mutex<u32>);

impl IconFactory for NumberedIcons {
    type Icon = u32;

    fn create(&self, _pixels: &[u32], _size: i32) -> Option<u32> {
        let mut next = self.0.lock().unwrap();
        *next += 1;
        Some(*next)
    }

    fn destroy(&self, _icon: u32) {}
}

const INDEX: &str = r#"[
  {"id":"rigaya.x264","latest-version":"3.2"},
  {"id":"kenkun.lsmash","latest-version":"1.0"}
]"#;

fn prepared_store(dir: &TempDir) -> CatalogStore {
    let store = CatalogStore::new(dir.path(), 1024 * 1024);
    store
        .write_all(
            &store.installed_path(),
            br#"{ "rigaya.x264": "3.1", "kenkun.lsmash": "1.0" }"#,
        )
        .unwrap();
    store
}

fn fast_config(dir: &TempDir) -> CheckerConfig {
    CheckerConfig {
        locator_attempts: 10,
        locator_interval_ms: 5,
        ..CheckerConfig::with_root(dir.path())
    }
}

// ═══════════════════════════════════════════════════════
// 테스트 1: 시작 → 비교 → 게시 → 종료
// ═══════════════════════════════════════════════════════

#[test]
fn plugin_lifecycle_publishes_and_restores() {
    let dir = TempDir::new().unwrap();
    let host = Arc::new(RecordingHost::default());
    let board = Arc::new(UpdateBoard::new());
    let mut plugin = Plugin::start_with_source(
        host.clone(),
        board.clone(),
        prepared_store(&dir),
        Arc::new(FixedIndex(INDEX)),
        &fast_config(&dir),
    )
    .unwrap();

    assert!(plugin.wait(Duration::from_secs(10)), "background work should finish");

    // UI가 시작 전에 잡아둔 보드에 그대로 게시됨
    assert!(Arc::ptr_eq(&plugin.board(), &board));
    let snap = board.snapshot();
    assert!(snap.ready);
    assert_eq!(snap.updates.len(), 1);
    assert_eq!(snap.updates[0].id, "rigaya.x264");
    assert_eq!(snap.updates[0].installed_version, "3.1");
    assert_eq!(snap.updates[0].latest_version, "3.2");
    println!("✓ 업데이트 {}건 게시", snap.updates.len());

    assert_eq!(plugin.window(), Some(42));
    assert_eq!(host.attached.load(Ordering::SeqCst), 1);
    assert_eq!(host.posted.load(Ordering::SeqCst), 1);

    plugin.shutdown();
    plugin.shutdown();
    assert_eq!(host.detached.load(Ordering::SeqCst), 1);
    println!("✓ 종료 시 복원 1회");
}

// ═══════════════════════════════════════════════════════
// 테스트 2: 메뉴 렌더링
// ═══════════════════════════════════════════════════════

#[test]
fn menu_follows_board_state() {
    let dir = TempDir::new().unwrap();
    let host = Arc::new(RecordingHost::default());
    let mut plugin = Plugin::start_with_source(
        host,
        Arc::new(UpdateBoard::new()),
        prepared_store(&dir),
        Arc::new(FixedIndex(INDEX)),
        &fast_config(&dir),
    )
    .unwrap();

    let mut icons = IconCache::new(NumberedIcons::default());
    icons.ensure(10);
    let mut menu = MenuModel::default();

    // 갱신 신호가 오면 메뉴를 다시 그린다
    let routed = intercept(HostEvent::RefreshRequested);
    assert_eq!(routed.reaction, Some(Reaction::RefreshMenu));
    assert!(!routed.forward);

    assert!(plugin.wait(Duration::from_secs(10)));
    let status = render_menu(&mut menu, &plugin.board().snapshot(), &icons).unwrap();

    assert_eq!(status, MenuStatus::UpdatesAvailable);
    assert_eq!(menu.items.len(), 1);
    assert_eq!(menu.items[0].0, UPDATE_MENU_ID);
    assert_eq!(menu.items[0].2, icons.get(StatusIcon::Available));
    plugin.shutdown();
}

#[test]
fn offline_start_without_installed_manifest_is_quiet() {
    struct Offline;
    impl IndexSource for Offline {
        fn refresh(&self, _store: &CatalogStore) -> anyhow::Result<u64> {
            anyhow::bail!("network unreachable")
        }
    }

    let dir = TempDir::new().unwrap();
    let host = Arc::new(RecordingHost::default());
    let store = CatalogStore::new(dir.path(), 1024);
    let board = Arc::new(UpdateBoard::new());
    let mut plugin =
        Plugin::start_with_source(host, board, store, Arc::new(Offline), &fast_config(&dir))
            .unwrap();

    assert!(plugin.wait(Duration::from_secs(10)));
    let snap = plugin.board().snapshot();
    assert!(snap.ready);
    assert!(snap.updates.is_empty());
    assert_eq!(MenuStatus::from_snapshot(&snap), MenuStatus::UpToDate);
}

#[test]
fn unwritable_log_location_does_not_block_start() {
    let dir = TempDir::new().unwrap();
    // 루트의 부모가 일반 파일이라 로그 디렉터리를 만들 수 없음
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    let root = blocker.join("root");

    let config = CheckerConfig {
        index_url: "http://127.0.0.1:1/index.json".to_string(),
        http_timeout_secs: 2,
        ..fast_config(&dir)
    };
    let mut plugin = Plugin::start(
        Arc::new(RecordingHost::default()),
        Arc::new(UpdateBoard::new()),
        CatalogStore::new(&root, 1024),
        &config,
    )
    .unwrap();

    assert!(plugin.wait(Duration::from_secs(10)));
    assert!(plugin.board().is_ready());
    assert!(plugin.board().snapshot().updates.is_empty());
    assert!(!root.exists());
    plugin.shutdown();
}

// ═══════════════════════════════════════════════════════
// 테스트 3: 실행 대상 조회
// ═══════════════════════════════════════════════════════

#[test]
fn launch_target_comes_from_settings() {
    let dir = TempDir::new().unwrap();
    let store = prepared_store(&dir);

    assert_eq!(read_launch_target(&store).unwrap_err().code(), 1);

    store
        .write_all(
            &store.settings_path(),
            br#"{"catalogDir":"C:\\Program Files\\AviUtl2 Catalog\\catalog.exe","theme":"dark"}"#,
        )
        .unwrap();
    assert_eq!(
        read_launch_target(&store).unwrap(),
        r"C:\Program Files\AviUtl2 Catalog\catalog.exe"
    );
}
