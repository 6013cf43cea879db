//! 카탈로그 저장소 접근
//!
//! ## 디렉터리 구조
//! ```text
//! %APPDATA%/aviutl2-catalog/
//! ├── catalog/index.json    원격 인덱스 사본
//! ├── installed.json        설치된 패키지 → 버전
//! └── settings.json         카탈로그 앱 경로 (catalogDir)
//! ```
//! 원격에서 받은 문서를 다루므로 읽기에는 크기 상한이 있습니다.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::CheckerConfig;
use crate::error::StoreError;

const CATALOG_DIR: &str = "catalog";
const INDEX_FILE: &str = "index.json";
const INSTALLED_FILE: &str = "installed.json";
const SETTINGS_FILE: &str = "settings.json";

/// 카탈로그 루트 기준 파일 접근자
#[derive(Debug, Clone)]
pub struct CatalogStore {
    root: PathBuf,
    max_read_bytes: u64,
}

impl CatalogStore {
    pub fn new(root: impl Into<PathBuf>, max_read_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_read_bytes,
        }
    }

    /// 설정에서 루트를 결정합니다. 오버라이드가 없으면 사용자 앱 데이터 디렉터리 아래.
    pub fn from_config(config: &CheckerConfig) -> Result<Self, StoreError> {
        let root = match &config.root_override {
            Some(root) => root.clone(),
            None => resolve_app_data_dir()
                .ok_or(StoreError::NoAppDataRoot)?
                .join(&config.app_dir_name),
        };
        Ok(Self::new(root, config.max_read_bytes))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.root.join(CATALOG_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.catalog_dir().join(INDEX_FILE)
    }

    pub fn installed_path(&self) -> PathBuf {
        self.root.join(INSTALLED_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// 디렉터리를 중간 경로까지 생성합니다. 이미 있으면 성공.
    pub fn ensure_dir(&self, dir: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::io("create_dir", dir, e))
    }

    /// 파일 전체를 읽습니다. 상한을 넘는 파일은 읽지 않고 실패로 처리합니다.
    pub fn read_all(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        let file = fs::File::open(path).map_err(|e| StoreError::io("open", path, e))?;
        let size = file
            .metadata()
            .map_err(|e| StoreError::io("metadata", path, e))?
            .len();
        if size > self.max_read_bytes {
            return Err(StoreError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_read_bytes,
            });
        }

        // 메타데이터와 실제 길이가 다를 수 있으므로 상한까지만 읽는다
        let mut buf = Vec::with_capacity(size as usize);
        file.take(self.max_read_bytes + 1)
            .read_to_end(&mut buf)
            .map_err(|e| StoreError::io("read", path, e))?;
        if buf.len() as u64 > self.max_read_bytes {
            return Err(StoreError::TooLarge {
                path: path.to_path_buf(),
                size: buf.len() as u64,
                limit: self.max_read_bytes,
            });
        }
        Ok(buf)
    }

    /// 파일을 덮어씁니다. 상위 디렉터리는 필요하면 생성합니다.
    pub fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }
        fs::write(path, bytes).map_err(|e| StoreError::io("write", path, e))
    }

    pub fn read_installed(&self) -> Result<Vec<u8>, StoreError> {
        self.read_all(&self.installed_path())
    }

    pub fn read_index(&self) -> Result<Vec<u8>, StoreError> {
        self.read_all(&self.index_path())
    }

    pub fn write_index(&self, bytes: &[u8]) -> Result<(), StoreError> {
        self.write_all(&self.index_path(), bytes)
    }

    pub fn read_settings(&self) -> Result<Vec<u8>, StoreError> {
        self.read_all(&self.settings_path())
    }
}

/// 사용자 앱 데이터 디렉터리를 해석합니다.
///
/// Windows: `%APPDATA%` (Roaming)
/// Linux/macOS: `~/.config`
pub fn resolve_app_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("HOME")
            .filter(|v| !v.is_empty())
            .map(|home| PathBuf::from(home).join(".config"))
    }
}
