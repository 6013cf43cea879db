//! 업데이트 체커 설정
//!
//! 런타임에 읽는 사용자 설정은 `settings.json`의 `catalogDir` 하나뿐입니다.
//! 여기 값들은 빌드 시점 기본값이며, 테스트에서 루트/URL을 바꿔 끼울 때 사용합니다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 원격 카탈로그 인덱스 기본 URL
pub const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/Neosku/aviutl2-catalog-data/main/index.json";

/// `%APPDATA%` 아래 카탈로그 디렉터리 이름
pub const DEFAULT_APP_DIR: &str = "aviutl2-catalog";

/// 로컬 파일 읽기 상한 (64 MiB)
pub const DEFAULT_MAX_READ_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// 원격 index.json URL
    pub index_url: String,
    /// 앱 데이터 루트 아래 디렉터리 이름
    pub app_dir_name: String,
    /// 카탈로그 루트 직접 지정 (None이면 `%APPDATA%/<app_dir_name>`)
    pub root_override: Option<PathBuf>,
    /// 파일 읽기 상한 (바이트)
    pub max_read_bytes: u64,
    /// HTTP 요청 타임아웃 (초)
    pub http_timeout_secs: u64,
    /// 호스트 윈도우 탐색 최대 시도 횟수
    pub locator_attempts: u32,
    /// 탐색 간격 (밀리초)
    pub locator_interval_ms: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            app_dir_name: DEFAULT_APP_DIR.to_string(),
            root_override: None,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
            http_timeout_secs: 30,
            locator_attempts: 50,
            locator_interval_ms: 100,
        }
    }
}

impl CheckerConfig {
    /// 카탈로그 루트를 고정한 설정 (테스트/임베딩용)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root_override: Some(root.into()),
            ..Default::default()
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn locator_interval(&self) -> Duration {
        Duration::from_millis(self.locator_interval_ms)
    }

    /// 탐색에 쓸 수 있는 전체 시간 (시도 횟수 × 간격)
    pub fn locator_budget(&self) -> Duration {
        self.locator_interval() * self.locator_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_locator_budget_is_five_seconds() {
        let cfg = CheckerConfig::default();
        assert_eq!(cfg.locator_budget(), Duration::from_secs(5));
        assert_eq!(cfg.max_read_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let cfg: CheckerConfig =
            serde_json::from_str(r#"{ "locator_attempts": 3 }"#).unwrap();
        assert_eq!(cfg.locator_attempts, 3);
        assert_eq!(cfg.index_url, DEFAULT_INDEX_URL);
        assert!(cfg.root_override.is_none());
    }
}
