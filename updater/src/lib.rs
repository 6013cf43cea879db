//! # 카탈로그 업데이트 체커 라이브러리
//!
//! 호스트 프로세스 안에서 동작하는 업데이트 알림 플러그인의 플랫폼 독립 코어입니다.
//! 설치된 패키지 목록과 원격 카탈로그 인덱스를 비교해, 결과를 호스트 메뉴와
//! 목록 대화상자에 표시할 수 있는 형태로 제공합니다.
//!
//! ## 동작 원리
//! - **Locator**: 호스트의 메뉴 윈도우를 찾아 이벤트 핸들러를 가로챔
//! - **Computer**: 원격 인덱스 갱신 → 설치 목록과 비교 → 결과 게시 (프로세스당 1회)
//! - **UI 스레드**: 갱신 신호나 메뉴 열림 시 스냅샷을 읽어 메뉴 항목을 다시 그림
//!
//! ## 모듈 구성
//! - **extract.rs**: 필요한 키만 읽는 좁은 텍스트 스캐너
//! - **store.rs**: `%APPDATA%/aviutl2-catalog` 아래 파일 접근
//! - **fetch.rs**: 원격 index.json 다운로드
//! - **compare.rs**: 설치 버전 ↔ 최신 버전 비교
//! - **state.rs**: 결과/준비 플래그 스냅샷
//! - **coordinator.rs**: 두 백그라운드 작업과 호스트 신호
//! - **host.rs**: 호스트 연동 트레이트, 이벤트 라우팅, 메뉴 렌더링
//! - **icon.rs** / **dialog.rs** / **scale.rs**: 런타임 UI 구성
//! - **launcher.rs**: 카탈로그 앱 실행
//!
//! ## 원격 인덱스 형식
//! ```json
//! [
//!   { "id": "Author.Plugin", "latest-version": "1.2.0", ... },
//!   ...
//! ]
//! ```

// ═══════════════════════════════════════════════════════
// 모듈
// ═══════════════════════════════════════════════════════

pub mod compare;
pub mod config;
pub mod coordinator;
pub mod dialog;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod host;
pub mod icon;
pub mod launcher;
pub mod scale;
pub mod state;
pub mod store;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use compare::{ComparisonOutcome, ComparisonStatus, UpdateComparator, UpdateEntry};
pub use config::CheckerConfig;
pub use coordinator::{Coordinator, WORKER_THREAD_NAME};
pub use error::{HostError, LaunchError, MenuError, StoreError};
pub use fetch::{HttpIndexFetcher, IndexSource};
pub use host::{HostEvent, HostMenu, HostPlatform, Interception, MenuStatus, Reaction};
pub use icon::{IconCache, IconFactory, StatusIcon};
pub use launcher::LaunchPlan;
pub use state::{UpdateBoard, UpdateSnapshot};
pub use store::CatalogStore;
