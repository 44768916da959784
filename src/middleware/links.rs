use super::{Middleware, MiddlewareOutcome};
use crate::types::ProcessingContext;
use scraper::{Html, Selector};

/// Collects every `<a href>`, resolves relative to `context.source`, drops
/// non-navigable protocols, and deduplicates into `context.links`.
pub struct LinkExtractMiddleware;

#[async_trait::async_trait]
impl Middleware for LinkExtractMiddleware {
    async fn run(&self, ctx: &mut ProcessingContext) -> MiddlewareOutcome {
        let Some(html) = ctx.dom.clone() else {
            ctx.push_error("link-extract: no parsed DOM".to_string());
            return MiddlewareOutcome::Continue;
        };
        for href in extract_links_from_html(&html) {
            if let Some(resolved) = crate::url_utils::resolve_url(&ctx.source, &href) {
                ctx.links.insert(resolved);
            }
        }
        MiddlewareOutcome::Continue
    }
}

pub fn extract_links_from_html(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse("a[href]").unwrap();
    doc.select(&sel)
        .filter_map(|el| el.value().attr("href"))
        .map(|s| s.to_string())
        .collect()
}
