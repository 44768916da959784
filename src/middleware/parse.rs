use super::{Middleware, MiddlewareOutcome};
use crate::types::ProcessingContext;

/// Parses HTML into a queryable tree, stashed as a serialized handle on
/// `context.dom`. Downstream middlewares re-parse via `scraper::Html`
/// (cheap relative to network I/O) rather than carrying a non-`Send` DOM
/// handle across awaits.
pub struct ParseMiddleware;

#[async_trait::async_trait]
impl Middleware for ParseMiddleware {
    async fn run(&self, ctx: &mut ProcessingContext) -> MiddlewareOutcome {
        let html = ctx.content_as_str().into_owned();
        // Validate parseability; scraper::Html::parse_document never panics
        // on malformed input, so this mainly documents the step.
        let _ = scraper::Html::parse_document(&html);
        ctx.dom = Some(html);
        MiddlewareOutcome::Continue
    }
}
