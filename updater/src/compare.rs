//! 설치 버전 ↔ 최신 버전 비교
//!
//! 버전 비교는 의미 해석 없이 문자열 불일치만 봅니다.
//! 원격 버전이 더 낮아진 경우(롤백)도 업데이트로 취급합니다.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::extract::{parse_installed, scan_catalog};
use crate::fetch::IndexSource;
use crate::store::CatalogStore;

/// 업데이트가 있는 패키지 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEntry {
    pub id: String,
    pub installed_version: String,
    pub latest_version: String,
}

/// 비교 결과가 만들어진 경로
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonStatus {
    /// 두 문서를 모두 읽고 비교함
    Compared,
    /// installed.json 없음 → 빈 결과
    MissingInstalled,
    /// 인덱스 사본 없음 → 빈 결과
    MissingCatalog,
}

#[derive(Debug, Clone)]
pub struct ComparisonOutcome {
    pub updates: Vec<UpdateEntry>,
    pub status: ComparisonStatus,
    /// 이번 실행에서 원격 인덱스 갱신에 성공했는지
    pub refreshed: bool,
}

impl ComparisonOutcome {
    fn aborted(status: ComparisonStatus, refreshed: bool) -> Self {
        Self {
            updates: Vec::new(),
            status,
            refreshed,
        }
    }
}

/// 설치 맵 순서대로, 양쪽에 모두 있고 버전 문자열이 다른 id만 추립니다.
pub fn diff_versions(
    installed: &BTreeMap<String, String>,
    latest: &BTreeMap<String, String>,
) -> Vec<UpdateEntry> {
    installed
        .iter()
        .filter_map(|(id, installed_version)| {
            let latest_version = latest.get(id)?;
            (latest_version != installed_version).then(|| UpdateEntry {
                id: id.clone(),
                installed_version: installed_version.clone(),
                latest_version: latest_version.clone(),
            })
        })
        .collect()
}

/// 인덱스 갱신 → 두 문서 로드 → 필터 스캔 → 비교
pub struct UpdateComparator<'a> {
    store: &'a CatalogStore,
    source: &'a dyn IndexSource,
}

impl<'a> UpdateComparator<'a> {
    pub fn new(store: &'a CatalogStore, source: &'a dyn IndexSource) -> Self {
        Self { store, source }
    }

    pub fn run(&self) -> ComparisonOutcome {
        // 1) 원격 인덱스 갱신 (실패해도 기존 사본으로 계속)
        let refreshed = match self.source.refresh(self.store) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("[Computer] Index refresh failed, using local copy: {:#}", e);
                false
            }
        };

        // 2) installed.json (필수)
        let installed_doc = match self.store.read_installed() {
            Ok(doc) => doc,
            Err(e) => {
                tracing::info!("[Computer] No installed manifest, skipping comparison: {}", e);
                return ComparisonOutcome::aborted(ComparisonStatus::MissingInstalled, refreshed);
            }
        };

        // 3) 인덱스 사본 (필수)
        let index_doc = match self.store.read_index() {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("[Computer] No catalog index available: {}", e);
                return ComparisonOutcome::aborted(ComparisonStatus::MissingCatalog, refreshed);
            }
        };

        // 4) 설치된 id만 인덱스에서 추출
        let installed = parse_installed(&installed_doc);
        let wanted: BTreeSet<String> = installed.keys().cloned().collect();
        let scan = scan_catalog(&index_doc, Some(&wanted));
        tracing::debug!(
            "[Computer] Resolved {}/{} installed id(s) in the index (early stop: {})",
            scan.entries.len(),
            wanted.len(),
            scan.complete
        );

        // 5) 비교
        let updates = diff_versions(&installed, &scan.into_map());
        ComparisonOutcome {
            updates,
            status: ComparisonStatus::Compared,
            refreshed,
        }
    }
}
