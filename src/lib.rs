//! # 카탈로그 업데이트 체커 플러그인
//!
//! 호스트 애플리케이션 프로세스에 로드되어, 설치된 카탈로그 패키지의
//! 업데이트 여부를 호스트 메뉴의 상태 아이콘과 목록 대화상자로 알려줍니다.
//!
//! - **lifecycle.rs**: 시작/종료, 코디네이터 소유
//! - **logging.rs**: 파일 로그 설정
//! - **win32/**: 호스트 윈도우 가로채기, 메뉴/아이콘/대화상자, DLL 진입점
//!
//! 플랫폼 독립 로직은 `updater` (catalog-updater-lib)에 있습니다.

pub use catalog_updater_lib as updater;

pub mod lifecycle;
pub mod logging;

#[cfg(target_os = "windows")]
pub mod win32;

pub use lifecycle::Plugin;
