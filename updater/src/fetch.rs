//! 원격 인덱스 페처
//!
//! 고정 URL의 index.json을 받아 로컬 `catalog/index.json`을 덮어씁니다.
//! 한 번만 시도하고 재시도하지 않습니다. 실패해도 기존 사본은 그대로 남습니다
//! (응답을 끝까지 받은 뒤에만 파일을 씁니다).

use anyhow::{Context, Result};
use std::io::Read;

use crate::config::CheckerConfig;
use crate::store::CatalogStore;

/// 인덱스 사본을 갱신하는 소스
pub trait IndexSource: Send + Sync {
    /// 최신 인덱스를 받아 저장소에 씁니다. 반환값은 저장한 바이트 수.
    fn refresh(&self, store: &CatalogStore) -> Result<u64>;
}

/// HTTP(S)로 index.json을 받는 페처
pub struct HttpIndexFetcher {
    url: String,
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpIndexFetcher {
    pub fn new(config: &CheckerConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.http_timeout())
            .user_agent(concat!("catalog-update-checker/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            url: config.index_url.clone(),
            agent,
            max_bytes: config.max_read_bytes,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 본문을 메모리로 받습니다. 상한을 넘으면 실패.
    fn download(&self) -> Result<Vec<u8>> {
        let response = self
            .agent
            .get(&self.url)
            .call()
            .with_context(|| format!("GET {}", self.url))?;

        let mut body = Vec::new();
        response
            .into_reader()
            .take(self.max_bytes + 1)
            .read_to_end(&mut body)
            .context("reading index body")?;
        if body.len() as u64 > self.max_bytes {
            anyhow::bail!("index body exceeds {} bytes", self.max_bytes);
        }
        Ok(body)
    }
}

impl IndexSource for HttpIndexFetcher {
    fn refresh(&self, store: &CatalogStore) -> Result<u64> {
        store.ensure_dir(&store.catalog_dir())?;
        let body = self.download()?;
        store.write_index(&body)?;
        tracing::info!("[Fetch] Saved {} bytes from {}", body.len(), self.url);
        Ok(body.len() as u64)
    }
}
