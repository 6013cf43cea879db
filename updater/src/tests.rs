//! 업데이트 체커 통합 테스트
//!
//! ## 테스트 시나리오
//! 1. 인덱스 페치: Mock 서버에서 index.json 받아 그대로 저장
//! 2. 페치 실패: 기존 사본 유지 + 그 사본으로 비교 계속
//! 3. 크기 상한: 너무 큰 응답은 저장하지 않음
//! 4. 전체 파이프라인: 페치 → 비교 → 게시 → 메뉴 상태

use crate::{
    CatalogStore, CheckerConfig, ComparisonStatus, HttpIndexFetcher, IndexSource, MenuStatus,
    UpdateBoard, UpdateComparator,
};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::TempDir;

const INDEX: &str = r#"[
  {"id":"A","name":"Alpha","latest-version":"1.1"},
  {"id":"B","name":"Beta","latest-version":"2.0"},
  {"id":"C","name":"Gamma","latest-version":"0.9"},
  {"id":"D","name":"Delta","latest-version":"5.0"}
]"#;

const INSTALLED: &str = r#"{"A":"1.0","B":"2.0","C":"1.0","Z":"9.9"}"#;

/// 고정 응답을 돌려주는 Mock 서버를 띄웁니다.
async fn spawn_mock(status: StatusCode, body: &'static str) -> SocketAddr {
    let app = Router::new().route("/index.json", get(move || async move { (status, body) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn test_config(root: &std::path::Path, url: String) -> CheckerConfig {
    CheckerConfig {
        index_url: url,
        http_timeout_secs: 5,
        ..CheckerConfig::with_root(root)
    }
}

fn store_with_installed(dir: &TempDir) -> CatalogStore {
    let store = CatalogStore::new(dir.path(), 1024 * 1024);
    store
        .write_all(&store.installed_path(), INSTALLED.as_bytes())
        .unwrap();
    store
}

/// 블로킹 페처를 런타임 밖 스레드에서 실행
async fn refresh_blocking(fetcher: HttpIndexFetcher, store: CatalogStore) -> anyhow::Result<u64> {
    tokio::task::spawn_blocking(move || fetcher.refresh(&store))
        .await
        .unwrap()
}

// ═══════════════════════════════════════════════════════
// 테스트 1: 인덱스 페치
// ═══════════════════════════════════════════════════════

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fetch_saves_index_verbatim() {
    let addr = spawn_mock(StatusCode::OK, INDEX).await;
    let dir = TempDir::new().unwrap();
    let store = CatalogStore::new(dir.path(), 1024 * 1024);
    let fetcher = HttpIndexFetcher::new(&test_config(dir.path(), format!("http://{}/index.json", addr)));

    let saved = refresh_blocking(fetcher, store.clone()).await.unwrap();

    assert_eq!(saved, INDEX.len() as u64);
    assert_eq!(store.read_index().unwrap(), INDEX.as_bytes());
    println!("✓ 인덱스 {} bytes 저장", saved);
}

// ═══════════════════════════════════════════════════════
// 테스트 2: 페치 실패 시 기존 사본 사용
// ═══════════════════════════════════════════════════════

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_fetch_keeps_stale_copy() {
    let addr = spawn_mock(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let dir = TempDir::new().unwrap();
    let store = store_with_installed(&dir);
    store.ensure_dir(&store.catalog_dir()).unwrap();
    store.write_index(INDEX.as_bytes()).unwrap();

    let fetcher = HttpIndexFetcher::new(&test_config(dir.path(), format!("http://{}/index.json", addr)));
    let outcome = tokio::task::spawn_blocking({
        let store = store.clone();
        move || UpdateComparator::new(&store, &fetcher).run()
    })
    .await
    .unwrap();

    assert!(!outcome.refreshed);
    assert_eq!(outcome.status, ComparisonStatus::Compared);
    // 오래된 사본은 덮어쓰지 않음
    assert_eq!(store.read_index().unwrap(), INDEX.as_bytes());
    let ids: Vec<_> = outcome.updates.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "C"]);
    println!("✓ 페치 실패 → 기존 사본으로 비교: {:?}", ids);
}

// ═══════════════════════════════════════════════════════
// 테스트 3: 크기 상한
// ═══════════════════════════════════════════════════════

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_oversized_index_is_rejected() {
    let addr = spawn_mock(StatusCode::OK, INDEX).await;
    let dir = TempDir::new().unwrap();
    let store = CatalogStore::new(dir.path(), 1024 * 1024);
    let config = CheckerConfig {
        max_read_bytes: 32,
        ..test_config(dir.path(), format!("http://{}/index.json", addr))
    };

    let err = refresh_blocking(HttpIndexFetcher::new(&config), store.clone())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("exceeds"), "{:#}", err);
    assert!(store.read_index().unwrap_err().is_not_found());
}

// ═══════════════════════════════════════════════════════
// 테스트 4: 전체 파이프라인
// ═══════════════════════════════════════════════════════

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pipeline_publishes_updates() {
    let addr = spawn_mock(StatusCode::OK, INDEX).await;
    let dir = TempDir::new().unwrap();
    let store = store_with_installed(&dir);
    let source: Arc<dyn IndexSource> = Arc::new(HttpIndexFetcher::new(&test_config(
        dir.path(),
        format!("http://{}/index.json", addr),
    )));

    let outcome = tokio::task::spawn_blocking({
        let store = store.clone();
        let source = source.clone();
        move || UpdateComparator::new(&store, source.as_ref()).run()
    })
    .await
    .unwrap();
    assert!(outcome.refreshed);

    let board = UpdateBoard::new();
    assert_eq!(MenuStatus::from_snapshot(&board.snapshot()), MenuStatus::Pending);
    assert!(board.publish(outcome.updates));

    let snap = board.snapshot();
    assert_eq!(MenuStatus::from_snapshot(&snap), MenuStatus::UpdatesAvailable);
    for entry in snap.updates.iter() {
        println!("  - {}: {} → {}", entry.id, entry.installed_version, entry.latest_version);
    }
    assert_eq!(snap.updates.len(), 2);
    assert_eq!(snap.updates[0].installed_version, "1.0");
    assert_eq!(snap.updates[0].latest_version, "1.1");
    // C는 원격 버전이 더 낮아도 업데이트로 취급
    assert_eq!(snap.updates[1].latest_version, "0.9");
}

#[test]
fn test_missing_catalog_yields_empty_ready_result() {
    let dir = TempDir::new().unwrap();
    let store = CatalogStore::new(dir.path(), 1024 * 1024);
    store
        .write_all(&store.installed_path(), br#"{"A":"1.0"}"#)
        .unwrap();
    // 닫힌 포트: 연결 즉시 실패
    let fetcher = HttpIndexFetcher::new(&test_config(
        dir.path(),
        "http://127.0.0.1:1/index.json".to_string(),
    ));

    let outcome = UpdateComparator::new(&store, &fetcher).run();
    assert_eq!(outcome.status, ComparisonStatus::MissingCatalog);
    assert!(outcome.updates.is_empty());

    let board = UpdateBoard::new();
    board.publish(outcome.updates);
    let snap = board.snapshot();
    assert!(snap.ready);
    assert_eq!(MenuStatus::from_snapshot(&snap), MenuStatus::UpToDate);
}

#[test]
fn test_missing_installed_manifest_skips_comparison() {
    let dir = TempDir::new().unwrap();
    let store = CatalogStore::new(dir.path(), 1024 * 1024);
    store.ensure_dir(&store.catalog_dir()).unwrap();
    store.write_index(INDEX.as_bytes()).unwrap();
    let fetcher = HttpIndexFetcher::new(&test_config(
        dir.path(),
        "http://127.0.0.1:1/index.json".to_string(),
    ));

    let outcome = UpdateComparator::new(&store, &fetcher).run();
    assert_eq!(outcome.status, ComparisonStatus::MissingInstalled);
    assert!(outcome.updates.is_empty());
}
