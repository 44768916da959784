use super::{Middleware, MiddlewareOutcome};
use crate::types::ProcessingContext;

/// Serializes the sanitized tree to Markdown via `html2md`. Tables keep pipe
/// syntax; code blocks carry a language inferred from `class="language-X"`,
/// `class="highlight-source-X"`, or `data-language="X"` (handled by
/// `html2md`'s own code-fence conversion, which already honors these
/// conventions).
///
/// When the direct conversion looks noisy (very little text relative to
/// markup — same heuristic shape as the teacher's `is_high_noise_content`),
/// falls back to `readability`-extracted content, picking whichever
/// candidate has more words (teacher's "choose best result by word count").
pub struct HtmlToMarkdownMiddleware;

#[async_trait::async_trait]
impl Middleware for HtmlToMarkdownMiddleware {
    async fn run(&self, ctx: &mut ProcessingContext) -> MiddlewareOutcome {
        let Some(html) = ctx.dom.clone() else {
            ctx.push_error("html-to-markdown: no parsed DOM".to_string());
            return MiddlewareOutcome::Continue;
        };

        let direct = html2md::parse_html(&html);
        let markdown = if is_high_noise(&direct) {
            match readability_markdown(&html, &ctx.source) {
                Some(boosted) if word_count(&boosted) > word_count(&direct) => boosted,
                _ => direct,
            }
        } else {
            direct
        };

        ctx.markdown = Some(markdown);
        MiddlewareOutcome::Continue
    }
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Mirrors `clean.rs::is_high_noise_content`'s heuristic: too little prose
/// relative to the raw length suggests boilerplate slipped past sanitize.
fn is_high_noise(markdown: &str) -> bool {
    let words = word_count(markdown);
    let len = markdown.len().max(1);
    words < 20 || (len > 2000 && words * 6 < len)
}

fn readability_markdown(html: &str, source: &str) -> Option<String> {
    let url = url::Url::parse(source).ok()?;
    let mut cursor = std::io::Cursor::new(html.as_bytes());
    let product = readability::extractor::extract(&mut cursor, &url).ok()?;
    Some(html2md::parse_html(&product.content))
}
