//! Component C: ordered content-processing middleware chain.
//!
//! Grounded on the teacher's multi-pass extraction (`scraping/rust_scraper/
//! clean.rs`, `metadata.rs`) reorganized behind the spec's explicit
//! continue/abort sentinel (design note in spec §9: no closures-over-state).

mod links;
mod markdown_out;
mod metadata;
mod parse;
mod render;
mod sanitize;

pub use links::LinkExtractMiddleware;
pub use markdown_out::HtmlToMarkdownMiddleware;
pub use metadata::{MarkdownMetadataMiddleware, MetadataExtractMiddleware};
pub use parse::ParseMiddleware;
pub use render::DynamicRenderMiddleware;
pub use sanitize::SanitizeMiddleware;

use crate::types::ProcessingContext;

/// Returned by a middleware to tell the driver whether to advance to the
/// next step or stop the chain early. `next()` in the original language is
/// modeled here as "the driver calls the next middleware after seeing
/// `Continue`" — there is no closure captured across middlewares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiddlewareOutcome {
    Continue,
    Halt,
}

#[async_trait::async_trait]
pub trait Middleware: Send + Sync {
    async fn run(&self, ctx: &mut ProcessingContext) -> MiddlewareOutcome;
}

/// Drives a declared-order chain. A middleware that fails appends to
/// `ctx.errors` and returns `Continue` by convention — only a deliberate
/// `Halt` stops the chain (default pipeline behavior is non-fatal, per
/// spec §4.3/§7).
pub async fn run_chain(chain: &[Box<dyn Middleware>], ctx: &mut ProcessingContext) {
    for middleware in chain {
        if middleware.run(ctx).await == MiddlewareOutcome::Halt {
            break;
        }
    }
}

/// Build the pipeline for a given content type, per spec §4.3's "Pipeline
/// composition per content type" table.
pub fn build_chain_for_content_type(
    content_type: &str,
    extract_links: bool,
    dynamic_render: Option<Box<dyn Middleware>>,
) -> Vec<Box<dyn Middleware>> {
    if content_type == "text/html" {
        let mut chain: Vec<Box<dyn Middleware>> = Vec::new();
        if let Some(render) = dynamic_render {
            chain.push(render);
        }
        chain.push(Box::new(ParseMiddleware));
        chain.push(Box::new(MetadataExtractMiddleware));
        if extract_links {
            chain.push(Box::new(LinkExtractMiddleware));
        }
        chain.push(Box::new(SanitizeMiddleware));
        chain.push(Box::new(HtmlToMarkdownMiddleware));
        chain
    } else if content_type == "text/markdown" || content_type == "text/plain" {
        vec![Box::new(MarkdownMetadataMiddleware { extract_links })]
    } else {
        Vec::new()
    }
}
