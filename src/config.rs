use std::path::PathBuf;

/// Canonical embedding vector dimension. Fixed at compile time; migrating it
/// requires a full reindex (spec §6).
pub const EMBEDDING_DIMENSION: usize = 1536;

pub const ENV_STORAGE_DIR: &str = "DOC_INDEXER_STORAGE_DIR";
pub const ENV_EMBEDDING_MODEL: &str = "DOC_INDEXER_EMBEDDING_MODEL";
pub const ENV_CHROME_EXECUTABLE: &str = "DOC_INDEXER_CHROME_EXECUTABLE";
pub const ENV_CONFIG_PATH: &str = "DOC_INDEXER_CONFIG";

const STORE_FILE_NAME: &str = "documents.db";

/// File-based config loaded from `doc-indexer.json`, generalizing the
/// `ShadowConfig` JSON-file + env-var-fallback pattern to every field this
/// crate resolves at startup.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct IndexerConfig {
    pub storage_dir: Option<String>,
    pub embedding_model: Option<String>,
    pub default_max_depth: Option<u32>,
    pub default_max_pages: Option<usize>,
    pub default_max_concurrency: Option<usize>,
    pub worker_pool_size: Option<usize>,
    pub chrome_executable: Option<String>,
}

impl IndexerConfig {
    /// Storage directory: env override > legacy `./.store/` (if it already
    /// exists, for upgrade compatibility) > OS-standard data directory.
    /// File name is always `documents.db` within that directory.
    pub fn resolve_storage_path(&self) -> PathBuf {
        if let Some(dir) = std::env::var(ENV_STORAGE_DIR).ok().filter(|v| !v.trim().is_empty()) {
            return PathBuf::from(dir).join(STORE_FILE_NAME);
        }
        if let Some(dir) = &self.storage_dir {
            if !dir.trim().is_empty() {
                return PathBuf::from(dir).join(STORE_FILE_NAME);
            }
        }
        let legacy = PathBuf::from(".store");
        if legacy.exists() {
            return legacy.join(STORE_FILE_NAME);
        }
        directories::ProjectDirs::from("", "", "doc-indexer")
            .map(|d| d.data_dir().join(STORE_FILE_NAME))
            .unwrap_or_else(|| legacy.join(STORE_FILE_NAME))
    }

    /// Embedding model spec `"<provider>:<model>"`: JSON field → env var →
    /// `openai:text-embedding-3-small`.
    pub fn resolve_embedding_model(&self) -> String {
        if let Some(m) = &self.embedding_model {
            if !m.trim().is_empty() {
                return m.clone();
            }
        }
        std::env::var(ENV_EMBEDDING_MODEL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "openai:text-embedding-3-small".to_string())
    }

    pub fn resolve_max_depth(&self) -> u32 {
        self.default_max_depth.unwrap_or(3)
    }

    pub fn resolve_max_pages(&self) -> usize {
        self.default_max_pages.unwrap_or(100)
    }

    pub fn resolve_max_concurrency(&self) -> usize {
        self.default_max_concurrency.unwrap_or(5)
    }

    /// Worker pool size for the job manager. Default 3, per spec §5.
    pub fn resolve_worker_pool_size(&self) -> usize {
        self.worker_pool_size.unwrap_or(3)
    }

    /// Optional override for the Chromium-family executable used for
    /// dynamic rendering. `None` means auto-discovery is left to the
    /// headless-browser driver.
    pub fn resolve_chrome_executable(&self) -> Option<String> {
        if let Ok(p) = std::env::var(ENV_CHROME_EXECUTABLE) {
            let p = p.trim();
            if !p.is_empty() {
                return Some(p.to_string());
            }
        }
        self.chrome_executable.clone()
    }
}

/// Load `doc-indexer.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `DOC_INDEXER_CONFIG` env var path
/// 2. `./doc-indexer.json`
/// 3. `../doc-indexer.json`
///
/// Missing file → `IndexerConfig::default()` (silent, all env-var fallbacks
/// still apply). Parse error → log a warning, return the default.
pub fn load_config() -> IndexerConfig {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        candidates.push(PathBuf::from(p));
    }
    candidates.push(PathBuf::from("doc-indexer.json"));
    candidates.push(PathBuf::from("../doc-indexer.json"));

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                return match serde_json::from_str::<IndexerConfig>(&contents) {
                    Ok(cfg) => {
                        tracing::info!("doc-indexer.json loaded from {}", path.display());
                        cfg
                    }
                    Err(e) => {
                        tracing::warn!(
                            "doc-indexer.json parse error at {}: {} — using defaults",
                            path.display(),
                            e
                        );
                        IndexerConfig::default()
                    }
                };
            }
            Err(_) => continue,
        }
    }

    IndexerConfig::default()
}
