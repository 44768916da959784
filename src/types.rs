use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// `(library, version)`. `library` is always compared case-folded; `version`
/// is either empty (unversioned) or a strict `MAJOR.MINOR.PATCH` triple with
/// an optional prerelease tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryHandle {
    pub library: String,
    pub version: String,
}

impl LibraryHandle {
    pub fn new(library: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            library: library.into().to_lowercase(),
            version: version.into(),
        }
    }

    pub fn library_fold(&self) -> String {
        self.library.to_lowercase()
    }

    pub fn version_fold(&self) -> String {
        self.version.to_lowercase()
    }
}

#[derive(Debug, Clone)]
pub struct RawContent {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub source: String,
    pub encoding: Option<String>,
}

/// Scope rule bounding link-following during a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Same hostname and `isSubpath`.
    Subpages,
    /// Same hostname.
    Hostname,
    /// Same registrable (public-suffix-aware) domain.
    Domain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMode {
    Fetch,
    Playwright,
    Auto,
}

impl Default for ScrapeMode {
    fn default() -> Self {
        ScrapeMode::Auto
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeOptions {
    pub max_depth: u32,
    pub max_pages: usize,
    pub max_concurrency: usize,
    pub scope: Scope,
    pub follow_redirects: bool,
    pub scrape_mode: ScrapeMode,
    pub ignore_errors: bool,
    #[serde(default)]
    pub exclude_selectors: Vec<String>,
    #[serde(default)]
    pub include_patterns: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            max_pages: 100,
            max_concurrency: 5,
            scope: Scope::Subpages,
            follow_redirects: true,
            scrape_mode: ScrapeMode::Auto,
            ignore_errors: true,
            exclude_selectors: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

pub fn default_exclude_patterns() -> Vec<String> {
    [
        "/login", "/logout", "/signup", "/register", "/cart", "/checkout", "/admin", "/api/",
        ".pdf", ".zip", ".exe", ".dmg", ".tar", ".gz", ".mp4", ".mp3", ".wav", ".avi", ".mov",
        ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Single mutable record flowing through the middleware chain (component C).
///
/// Invariant: `source` never mutates; `errors` never shrinks. Middleware
/// either mutates `content`/`metadata`/`links` in place and returns
/// `Continue`, or appends to `errors` and returns `Continue` — the chain
/// only stops early on `Halt`.
#[derive(Debug, Clone)]
pub struct ProcessingContext {
    pub content: Vec<u8>,
    pub content_type: String,
    pub source: String,
    pub metadata: HashMap<String, String>,
    pub links: HashSet<String>,
    pub errors: Vec<String>,
    pub options: ScrapeOptions,
    /// Parsed DOM handle, populated by the `parse` middleware.
    pub dom: Option<String>,
    pub markdown: Option<String>,
}

impl ProcessingContext {
    pub fn new(raw: RawContent, options: ScrapeOptions) -> Self {
        Self {
            content: raw.bytes,
            content_type: raw.mime_type,
            source: raw.source,
            metadata: HashMap::new(),
            links: HashSet::new(),
            errors: Vec::new(),
            options,
            dom: None,
            markdown: None,
        }
    }

    pub fn push_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn content_as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// `{url, depth}` — BFS queue item. Visited set stores normalized URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueItem {
    pub url: String,
    pub depth: u32,
}

/// A heading breadcrumb path, e.g. `["Getting Started", "Installation"]`.
pub type SectionPath = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: u8,
    pub path: SectionPath,
    pub kind: SectionKind,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Heading,
    Text,
    Code,
    Table,
}

/// Post-split content chunk, ready for embedding and storage.
#[derive(Debug, Clone)]
pub struct ContentChunk {
    pub types: HashSet<ChunkType>,
    pub content: String,
    pub level: u8,
    pub path: SectionPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    Heading,
    Text,
    Code,
    Table,
}

/// Document produced by a scrape, before chunk-splitting: title + Markdown
/// body + extracted links, ready to hand to the splitter.
#[derive(Debug, Clone)]
pub struct ScrapedDocument {
    pub url: String,
    pub title: String,
    pub markdown: String,
    pub links: Vec<String>,
}

/// A row as stored in the `documents` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: i64,
    pub library: String,
    pub version: String,
    pub url: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentMetadata {
    pub title: String,
    pub url: String,
    pub library: String,
    pub version: String,
    pub level: u8,
    pub path: SectionPath,
}

/// Progress payload reported by a scraper strategy at each processed item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperProgress {
    pub pages_scraped: usize,
    pub max_pages: usize,
    pub current_url: String,
    pub depth: u32,
    pub max_depth: u32,
    pub document: Option<ScrapedDocument>,
}

impl Serialize for ScrapedDocument {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("ScrapedDocument", 4)?;
        s.serialize_field("url", &self.url)?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("markdown", &self.markdown)?;
        s.serialize_field("links", &self.links)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for ScrapedDocument {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Shadow {
            url: String,
            title: String,
            markdown: String,
            links: Vec<String>,
        }
        let s = Shadow::deserialize(deserializer)?;
        Ok(ScrapedDocument {
            url: s.url,
            title: s.title,
            markdown: s.markdown,
            links: s.links,
        })
    }
}
