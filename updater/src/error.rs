//! 에러 타입
//!
//! ## 분류
//! - `StoreError`: 로컬 파일 접근 실패 (없음, 크기 초과, I/O)
//! - `MenuError`: 호스트 메뉴 조작 실패
//! - `HostError`: 호스트 윈도우 후킹 실패
//! - `LaunchError`: 카탈로그 앱 실행 실패 (사용자에게 표시)
//!
//! 어떤 에러도 호스트 프로세스로 전파되지 않습니다. 호출측은 로그를 남기고
//! "없음"으로 취급하거나, 사용자에게 메시지 박스로 보여줍니다.

use std::path::PathBuf;

/// 카탈로그 저장소 접근 에러
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("per-user application data directory could not be resolved")]
    NoAppDataRoot,

    #[error("'{path}' is {size} bytes, over the {limit} byte read limit")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("I/O error during {operation} on '{path}': {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(operation: &'static str, path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// 파일이 존재하지 않아서 실패했는지 확인
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// 호스트 메뉴 조작 에러
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("host window has no menu")]
    NoMenu,

    #[error("menu item {0:#06x} could not be appended")]
    AppendFailed(u16),

    #[error("menu item {0:#06x} could not be updated")]
    UpdateFailed(u16),
}

/// 호스트 윈도우 후킹 에러
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("failed to replace the window procedure: {0}")]
    AttachFailed(String),

    #[error("window procedure is already intercepted")]
    AlreadyAttached,
}

/// 카탈로그 앱 실행 에러
///
/// `code()`는 설정 읽기 결과 코드와 동일합니다:
/// `1` = settings.json 없음, `2` = catalogDir 없음, `3` = 실행 실패.
#[derive(thiserror::Error, Debug)]
pub enum LaunchError {
    #[error("settings document is missing: {0}")]
    SettingsMissing(#[source] StoreError),

    #[error("settings document has no \"catalogDir\" entry")]
    TargetMissing,

    #[error("failed to launch '{path}'")]
    LaunchFailed { path: String },
}

impl LaunchError {
    /// 결과 코드
    pub fn code(&self) -> i32 {
        match self {
            LaunchError::SettingsMissing(_) => 1,
            LaunchError::TargetMissing => 2,
            LaunchError::LaunchFailed { .. } => 3,
        }
    }

    /// 메시지 박스 제목
    pub fn title(&self) -> &'static str {
        "Launch error"
    }

    /// 사용자에게 표시할 메시지
    pub fn user_message(&self) -> String {
        match self {
            LaunchError::SettingsMissing(_) => {
                "The settings file (settings.json) was not found.\n\
                 Check %APPDATA%\\aviutl2-catalog\\settings.json."
                    .to_string()
            }
            LaunchError::TargetMissing => {
                "The settings file does not contain catalogDir.".to_string()
            }
            LaunchError::LaunchFailed { .. } => {
                "The catalog application could not be started.\n\
                 Check that the path is correct and that it can be executed."
                    .to_string()
            }
        }
    }
}
