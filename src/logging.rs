//! 로그 설정
//!
//! 호스트 프로세스의 콘솔을 쓰지 않고 카탈로그 루트 아래 파일에 기록합니다.
//! 호스트가 이미 전역 subscriber를 설치했다면 건드리지 않습니다.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// 로그 파일 이름 (카탈로그 루트 기준)
pub const LOG_FILE: &str = "update-checker.log";

/// 필터를 지정하는 환경 변수
pub const LOG_ENV: &str = "CATALOG_UPDATE_LOG";

#[derive(thiserror::Error, Debug)]
pub enum LogInitError {
    #[error("could not open log file '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// `CATALOG_UPDATE_LOG` 값으로 필터를 만듭니다. 없거나 잘못되면 `info`.
pub fn build_filter(directive: Option<&str>) -> EnvFilter {
    directive
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// `<root>/update-checker.log`로 가는 subscriber를 설치합니다.
pub fn init(root: &Path) -> Result<PathBuf, LogInitError> {
    let path = root.join(LOG_FILE);
    let open_err = |source| LogInitError::Open {
        path: path.clone(),
        source,
    };
    std::fs::create_dir_all(root).map_err(open_err)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(open_err)?;

    let directive = std::env::var(LOG_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true)
        .with_env_filter(build_filter(directive.as_deref()))
        .try_init()
        .map_err(|_| LogInitError::AlreadyInstalled)?;

    Ok(path)
}
