use super::{Middleware, MiddlewareOutcome};
use crate::types::ProcessingContext;
use scraper::{Html, Selector};

/// Default denylist: navigation, script, style, ads, cookie banners, modals
/// — grounded on `scraping/rust_scraper/clean.rs`'s noise-selector list,
/// generalized into a fixed selector set unioned with the caller-supplied
/// `excludeSelectors`.
const DEFAULT_EXCLUDE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "nav",
    "header",
    "footer",
    "aside",
    "[role=\"navigation\"]",
    "[role=\"banner\"]",
    "[role=\"complementary\"]",
    ".advertisement",
    ".ads",
    ".ad-banner",
    ".cookie-banner",
    ".cookie-consent",
    ".modal",
    ".popup",
    "#sidebar",
];

pub struct SanitizeMiddleware;

#[async_trait::async_trait]
impl Middleware for SanitizeMiddleware {
    async fn run(&self, ctx: &mut ProcessingContext) -> MiddlewareOutcome {
        let Some(html) = ctx.dom.clone() else {
            ctx.push_error("sanitize: no parsed DOM".to_string());
            return MiddlewareOutcome::Continue;
        };

        let cleaned = sanitize_html(&html, &ctx.options.exclude_selectors);
        ctx.dom = Some(cleaned);
        MiddlewareOutcome::Continue
    }
}

/// Parses `html`, removes every element matching a default denylist selector
/// union the caller-supplied `extra_selectors`, and re-serializes.
///
/// `scraper`'s tree is not directly mutable in place for removal, so this
/// walks matched node ids and detaches them via the underlying `ego_tree`.
pub fn sanitize_html(html: &str, extra_selectors: &[String]) -> String {
    let mut doc = Html::parse_document(html);

    let mut selectors: Vec<Selector> = DEFAULT_EXCLUDE_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect();
    selectors.extend(extra_selectors.iter().filter_map(|s| Selector::parse(s).ok()));

    let mut to_remove = Vec::new();
    for selector in &selectors {
        for el in doc.select(selector) {
            to_remove.push(el.id());
        }
    }
    for id in to_remove {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    doc.html()
}
