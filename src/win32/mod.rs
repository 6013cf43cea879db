//! Win32 바인딩
//!
//! - **entry.rs**: DLL 진입점 (부트스트랩 스레드에서 `start`)
//! - **host.rs**: 호스트 윈도우 탐색, 윈도우 프로시저 교체/복원
//! - **wndproc.rs**: 가로채기 프로시저 (이벤트 분류 → 메뉴 갱신/대화상자)
//! - **menu.rs** / **icons.rs**: 메뉴 항목과 상태 비트맵
//! - **dialog.rs**: 업데이트 목록 대화상자
//! - **dpi.rs**: 윈도우 DPI 조회
//!
//! UI 객체는 모두 호스트 UI 스레드(윈도우 프로시저 안)에서만 다룹니다.

mod dialog;
mod dpi;
mod entry;
mod host;
mod icons;
mod menu;
mod wndproc;

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::lifecycle::Plugin;
use crate::updater::{CatalogStore, CheckerConfig, UpdateBoard, UpdateSnapshot};

pub use host::{HostWindow, Interposition, Win32Host};
pub use wndproc::WM_CATALOG_REFRESH;

/// 윈도우 프로시저에서 읽는 공유 상태
pub(crate) struct Shared {
    pub board: Arc<UpdateBoard>,
    pub store: CatalogStore,
}

static PLUGIN: Mutex<Option<Plugin<Win32Host>>> = Mutex::new(None);
static SHARED: OnceLock<Shared> = OnceLock::new();

pub(crate) fn shared() -> Option<&'static Shared> {
    SHARED.get()
}

/// 현재 결과 스냅샷. 시작 전이면 대기 상태.
pub(crate) fn current_snapshot() -> Arc<UpdateSnapshot> {
    match SHARED.get() {
        Some(shared) => shared.board.snapshot(),
        None => UpdateBoard::new().snapshot(),
    }
}

/// 플러그인을 시작합니다. 이미 시작했으면 아무것도 하지 않습니다.
///
/// 윈도우 프로시저가 읽는 공유 상태를 먼저 채운 뒤 백그라운드 작업을 띄웁니다.
/// 그래야 첫 갱신 신호가 빈 자리표시 보드를 읽지 않습니다.
pub fn start() {
    let mut slot = PLUGIN.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return;
    }

    let config = CheckerConfig::default();
    let shared = match SHARED.get() {
        Some(shared) => shared,
        None => match CatalogStore::from_config(&config) {
            Ok(store) => SHARED.get_or_init(|| Shared {
                board: Arc::new(UpdateBoard::new()),
                store,
            }),
            Err(e) => {
                tracing::error!("[Plugin] Catalog root is unavailable: {}", e);
                return;
            }
        },
    };

    match Plugin::start(
        Arc::new(Win32Host),
        shared.board.clone(),
        shared.store.clone(),
        &config,
    ) {
        Ok(plugin) => *slot = Some(plugin),
        Err(e) => tracing::error!("[Plugin] Failed to start: {:#}", e),
    }
}

/// 원래 윈도우 프로시저를 복원하고 GDI 자원을 해제합니다.
pub fn shutdown() {
    let plugin = PLUGIN.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(mut plugin) = plugin {
        plugin.shutdown();
    }
    icons::release();
    dialog::release_font();
}

/// NUL로 끝나는 UTF-16 문자열
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
