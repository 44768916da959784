//! Component A: URL normalization, validation, and scope predicates.
//!
//! Grounded on `tools/crawl.rs::{normalize_url, resolve_url, should_crawl}`
//! in the teacher, generalized to the spec's public-suffix-aware domain
//! comparison via `psl`.

use crate::error::{IndexerError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

static INDEX_FILE_RE: OnceLock<Regex> = OnceLock::new();

fn index_file_re() -> &'static Regex {
    INDEX_FILE_RE
        .get_or_init(|| Regex::new(r"(?i)/index\.(html|htm|asp|php|jsp)$").unwrap())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    pub lowercase_path: bool,
    pub strip_query: bool,
    pub strip_index_files: bool,
}

/// Canonicalize a URL: lowercase host (and optionally path), drop the
/// fragment, drop a trailing slash except at the root, optionally strip
/// `index.html`-style filenames, and optionally strip the query string.
///
/// Non-parseable input is returned unchanged (best-effort) — callers that
/// need a hard failure should use [`validate_url`].
pub fn normalize_url(input: &str, opts: NormalizeOptions) -> String {
    let Ok(mut parsed) = Url::parse(input) else {
        return input.to_string();
    };

    parsed.set_fragment(None);

    let host = parsed.host_str().map(|h| h.to_lowercase());
    if let Some(h) = host {
        let _ = parsed.set_host(Some(&h));
    }

    if opts.strip_query {
        parsed.set_query(None);
    }

    let mut path = parsed.path().to_string();
    if opts.lowercase_path {
        path = path.to_lowercase();
    }
    if opts.strip_index_files {
        path = index_file_re().replace(&path, "").to_string();
        if path.is_empty() {
            path = "/".to_string();
        }
    }
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    parsed.set_path(&path);

    parsed.to_string()
}

/// Parses `input` as an absolute URL, failing with `invalid-URL` on parse
/// failure or an unsupported scheme.
pub fn validate_url(input: &str) -> Result<Url> {
    let parsed = Url::parse(input).map_err(|e| IndexerError::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" | "file" => Ok(parsed),
        other => Err(IndexerError::InvalidUrl {
            url: input.to_string(),
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

/// Resolve `href` relative to `base`, rejecting non-navigable schemes
/// (`javascript:`, `mailto:`, `tel:`, `data:`) and bare fragments.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }
    let base_url = Url::parse(base).ok()?;
    let resolved = base_url.join(trimmed).ok()?;
    if !matches!(resolved.scheme(), "http" | "https" | "file") {
        return None;
    }
    Some(resolved.to_string())
}

pub fn has_same_hostname(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.host_str().map(|h| h.to_lowercase()) == b.host_str().map(|h| h.to_lowercase()),
        _ => false,
    }
}

/// Public-suffix-aware domain comparison: `docs.example.co.uk` and
/// `api.example.co.uk` match; `example.com` and `example.org` do not.
pub fn has_same_domain(a: &str, b: &str) -> bool {
    let (Ok(a), Ok(b)) = (Url::parse(a), Url::parse(b)) else {
        return false;
    };
    let (Some(ha), Some(hb)) = (a.host_str(), b.host_str()) else {
        return false;
    };
    match (psl::domain(ha.as_bytes()), psl::domain(hb.as_bytes())) {
        (Some(da), Some(db)) => da.as_bytes() == db.as_bytes(),
        _ => ha.eq_ignore_ascii_case(hb),
    }
}

/// `true` when `target`'s path starts with `base`'s path on a segment
/// boundary — `/doc` is not a prefix of `/docs`, but `/docs/sub` is a
/// subpath of `/docs`, and a path is always a subpath of itself.
pub fn is_subpath(base: &str, target: &str) -> bool {
    let (Ok(base), Ok(target)) = (Url::parse(base), Url::parse(target)) else {
        return false;
    };
    let base_segs: Vec<&str> = base.path().split('/').filter(|s| !s.is_empty()).collect();
    let target_segs: Vec<&str> = target.path().split('/').filter(|s| !s.is_empty()).collect();
    if target_segs.len() < base_segs.len() {
        return false;
    }
    base_segs.iter().zip(target_segs.iter()).all(|(a, b)| a == b)
}

/// Glob-ish pattern match used for `include_patterns`/`exclude_patterns`: a
/// plain substring match against the full URL, matching the teacher's
/// `should_crawl` semantics.
pub fn matches_pattern(url: &str, pattern: &str) -> bool {
    url.to_lowercase().contains(&pattern.to_lowercase())
}

pub fn in_scope(scope: crate::types::Scope, seed: &str, candidate: &str) -> bool {
    use crate::types::Scope;
    match scope {
        Scope::Subpages => has_same_hostname(seed, candidate) && is_subpath(seed, candidate),
        Scope::Hostname => has_same_hostname(seed, candidate),
        Scope::Domain => has_same_domain(seed, candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        let opts = NormalizeOptions {
            lowercase_path: false,
            strip_query: false,
            strip_index_files: true,
        };
        let once = normalize_url("https://Example.com/Docs/index.html#frag", opts);
        let twice = normalize_url(&once, opts);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_drops_fragment_and_trailing_slash() {
        let opts = NormalizeOptions::default();
        let out = normalize_url("https://example.com/docs/#frag", opts);
        assert_eq!(out, "https://example.com/docs");
    }

    #[test]
    fn normalize_keeps_root_slash() {
        let opts = NormalizeOptions::default();
        let out = normalize_url("https://example.com/", opts);
        assert_eq!(out, "https://example.com/");
    }

    #[test]
    fn non_parseable_input_passes_through() {
        let opts = NormalizeOptions::default();
        assert_eq!(normalize_url("not a url", opts), "not a url");
    }

    #[test]
    fn subpath_is_reflexive_and_segment_aligned() {
        assert!(is_subpath("https://example.com/docs", "https://example.com/docs"));
        assert!(is_subpath("https://example.com/docs", "https://example.com/docs/sub"));
        assert!(!is_subpath("https://example.com/docs", "https://example.com/doc"));
    }

    #[test]
    fn domain_match_is_public_suffix_aware() {
        assert!(has_same_domain(
            "https://docs.example.co.uk/",
            "https://api.example.co.uk/x"
        ));
        assert!(!has_same_domain("https://example.com/", "https://example.org/"));
    }

    #[test]
    fn resolve_url_filters_non_navigable_schemes() {
        assert!(resolve_url("https://example.com/", "javascript:void(0)").is_none());
        assert!(resolve_url("https://example.com/", "mailto:a@b.com").is_none());
        assert!(resolve_url("https://example.com/", "#top").is_none());
        assert_eq!(
            resolve_url("https://example.com/docs/", "../x").unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn scope_filter_matches_spec_scenario() {
        let base = "https://example.com/docs/";
        assert!(!in_scope(crate::types::Scope::Subpages, base, "https://example.com/api/x"));
        assert!(in_scope(crate::types::Scope::Subpages, base, "https://example.com/docs/sub"));
        assert!(!in_scope(crate::types::Scope::Subpages, base, "https://sub.example.com/docs/x"));
    }
}
