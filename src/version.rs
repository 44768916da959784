//! Semver resolution (spec §6) — matching a requested version string against
//! the set of versions actually indexed for a library, plus ingest-time
//! version coercion (spec §4.9 Scrape tool: "validates + coerces version").
//!
//! No teacher module resolves semver ranges against a stored set; this is
//! grounded directly in the spec §6 table and built on the `semver` crate
//! already present in the teacher's dependency tree for library version
//! bookkeeping.

use semver::{Version, VersionReq};

/// Result of resolving a requested version against a library's stored set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Matched a specific stored version string.
    Version(String),
    /// Matched the unversioned (empty-string) document set.
    Unversioned,
}

/// Parses `available` as semver where possible (invalid entries are ignored
/// for ranged resolution but still count as "available" for unversioned
/// matching when the string is empty).
fn parse_available(available: &[String]) -> Vec<(String, Version)> {
    available
        .iter()
        .filter(|v| !v.is_empty())
        .filter_map(|v| Version::parse(v).ok().map(|parsed| (v.clone(), parsed)))
        .collect()
}

/// Implements the spec §6 table:
///
/// | unspecified / `"latest"` | highest available stable |
/// | exact `X.Y.Z` | that version, else highest `≤ X.Y.Z` |
/// | `X.x` / `X.Y.x` | highest match in range |
/// | `X` / `X.Y` | treated as `~X` / `~X.Y` |
/// | any other | fail |
///
/// `available` is the full set of distinct versions stored for the library,
/// including `""` for an unversioned crawl. Returns `None` if nothing
/// matches (caller turns this into `VersionNotFound`).
pub fn resolve(requested: Option<&str>, available: &[String]) -> Option<Resolution> {
    let has_unversioned = available.iter().any(|v| v.is_empty());
    let parsed = parse_available(available);

    match requested.map(str::trim) {
        None | Some("") | Some("latest") => {
            highest_stable(&parsed).map(|(s, _)| Resolution::Version(s)).or({
                if has_unversioned {
                    Some(Resolution::Unversioned)
                } else {
                    None
                }
            })
        }
        Some(raw) => resolve_explicit(raw, &parsed).or_else(|| {
            if has_unversioned && raw == "latest" {
                Some(Resolution::Unversioned)
            } else {
                None
            }
        }),
    }
}

fn resolve_explicit(raw: &str, parsed: &[(String, Version)]) -> Option<Resolution> {
    if let Ok(exact) = Version::parse(raw) {
        if let Some((s, _)) = parsed.iter().find(|(_, v)| *v == exact) {
            return Some(Resolution::Version(s.clone()));
        }
        return highest_at_most(parsed, &exact).map(|(s, _)| Resolution::Version(s));
    }

    if let Some(req_str) = coerce_to_req(raw) {
        if let Ok(req) = VersionReq::parse(&req_str) {
            return highest_matching(parsed, &req).map(|(s, _)| Resolution::Version(s));
        }
    }

    None
}

/// `X.x` / bare `X` is a major range (`^X`, `>=X.0.0 <(X+1).0.0`). `X.Y.x` /
/// bare `X.Y` is a minor-pin range (`~X.Y`, `>=X.Y.0 <X.(Y+1).0`) — these are
/// NOT the same range, so a bare two-component version must not be handed to
/// `VersionReq::parse` as-is: `semver` parses `"1.2"` itself as the caret
/// range `^1.2` (`>=1.2.0 <2.0.0`), one component looser than spec §6's `~1.2`.
fn coerce_to_req(raw: &str) -> Option<String> {
    let core = raw.strip_suffix(".x").unwrap_or(raw);
    if !core.is_empty() && core.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return match core.split('.').count() {
            1 => Some(core.to_string()),
            2 => Some(format!("~{core}")),
            _ => None,
        };
    }
    // Treat anything else that parses as a VersionReq as-is (explicit ranges
    // like `^1.2` or `>=1.0, <2.0` are accepted verbatim).
    if VersionReq::parse(raw).is_ok() {
        return Some(raw.to_string());
    }
    None
}

fn highest_stable(parsed: &[(String, Version)]) -> Option<(String, Version)> {
    parsed
        .iter()
        .filter(|(_, v)| v.pre.is_empty())
        .max_by(|a, b| a.1.cmp(&b.1))
        .cloned()
}

fn highest_at_most(parsed: &[(String, Version)], ceiling: &Version) -> Option<(String, Version)> {
    parsed.iter().filter(|(_, v)| v <= ceiling).max_by(|a, b| a.1.cmp(&b.1)).cloned()
}

fn highest_matching(parsed: &[(String, Version)], req: &VersionReq) -> Option<(String, Version)> {
    parsed.iter().filter(|(_, v)| req.matches(v)).max_by(|a, b| a.1.cmp(&b.1)).cloned()
}

/// Ingest-time coercion (spec §4.9 Scrape tool): empty string is accepted
/// as-is (unversioned); a full `X.Y.Z[-pre]` is accepted as-is; a bare `X` or
/// `X.Y` is zero-padded to a full triple (`1` -> `1.0.0`, `1.2` -> `1.2.0`);
/// anything else (`latest`, `1.x`, ranges, garbage) is rejected — ingestion
/// stores a concrete version, never a range.
pub fn coerce_for_ingest(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(String::new());
    }
    if Version::parse(raw).is_ok() {
        return Some(raw.to_string());
    }
    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit())) {
        let padded = match parts.len() {
            1 => format!("{}.0.0", parts[0]),
            2 => format!("{}.{}.0", parts[0], parts[1]),
            _ => unreachable!(),
        };
        if Version::parse(&padded).is_ok() {
            return Some(padded);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(vs: &[&str]) -> Vec<String> {
        vs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unspecified_resolves_to_highest_stable() {
        let available = versions(&["1.0.0", "2.1.0", "1.9.9"]);
        assert_eq!(resolve(None, &available), Some(Resolution::Version("2.1.0".to_string())));
        assert_eq!(resolve(Some("latest"), &available), Some(Resolution::Version("2.1.0".to_string())));
    }

    #[test]
    fn exact_version_falls_back_to_highest_at_most() {
        let available = versions(&["1.0.0", "1.5.0", "2.0.0"]);
        assert_eq!(resolve(Some("1.5.0"), &available), Some(Resolution::Version("1.5.0".to_string())));
        assert_eq!(resolve(Some("1.8.0"), &available), Some(Resolution::Version("1.5.0".to_string())));
        assert_eq!(resolve(Some("0.5.0"), &available), None);
    }

    #[test]
    fn partial_version_is_treated_as_tilde_range() {
        let available = versions(&["1.2.0", "1.2.9", "1.3.0"]);
        assert_eq!(resolve(Some("1.2"), &available), Some(Resolution::Version("1.2.9".to_string())));
    }

    #[test]
    fn dot_x_range_matches_highest_in_range() {
        let available = versions(&["1.0.0", "1.9.0", "2.0.0"]);
        assert_eq!(resolve(Some("1.x"), &available), Some(Resolution::Version("1.9.0".to_string())));
    }

    #[test]
    fn three_component_dot_x_is_a_patch_only_range() {
        // "1.2.x" must behave like "~1.2" (patch-only), not like the looser
        // caret range "^1.2" would (which would also admit 1.3.0).
        let available = versions(&["1.2.0", "1.2.9", "1.3.0"]);
        assert_eq!(resolve(Some("1.2.x"), &available), Some(Resolution::Version("1.2.9".to_string())));
    }

    #[test]
    fn garbage_input_fails_version_not_found() {
        let available = versions(&["1.0.0"]);
        assert_eq!(resolve(Some("not-a-version"), &available), None);
    }

    #[test]
    fn unversioned_only_resolves_when_no_semver_request() {
        let available = versions(&[""]);
        assert_eq!(resolve(None, &available), Some(Resolution::Unversioned));
        assert_eq!(resolve(Some("1.2.3"), &available), None);
    }

    #[test]
    fn ingest_coercion_pads_partial_versions() {
        assert_eq!(coerce_for_ingest("1"), Some("1.0.0".to_string()));
        assert_eq!(coerce_for_ingest("1.2"), Some("1.2.0".to_string()));
        assert_eq!(coerce_for_ingest("1.2.3"), Some("1.2.3".to_string()));
        assert_eq!(coerce_for_ingest(""), Some(String::new()));
    }

    #[test]
    fn ingest_coercion_rejects_ranges_and_latest() {
        assert_eq!(coerce_for_ingest("latest"), None);
        assert_eq!(coerce_for_ingest("1.x"), None);
        assert_eq!(coerce_for_ingest("^1.2"), None);
    }
}
