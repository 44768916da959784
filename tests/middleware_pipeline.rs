//! Exercises the composed HTML middleware chain (parse -> metadata ->
//! link-extract -> sanitize -> HTML->Markdown) end to end, rather than each
//! middleware in isolation (spec §4.3's "Pipeline composition per content
//! type" table).

use doc_indexer::middleware::{build_chain_for_content_type, run_chain};
use doc_indexer::types::{ProcessingContext, RawContent, ScrapeOptions};

const PAGE: &str = r#"
<html>
<head><title>Widgets Guide</title></head>
<body>
  <nav>site nav</nav>
  <script>track()</script>
  <h1>Widgets Guide</h1>
  <p>Widgets expose a small, composable API for building interactive panels.
  Start with the <a href="/widgets/advanced">advanced usage guide</a> once you
  are comfortable with the basics, and check the
  <a href="https://other.example.com/x">cross-site reference</a> for the full
  protocol description. Most teams only need the default configuration, but
  the advanced guide covers theming, lifecycle hooks, and server-side
  rendering for larger applications.</p>
  <div class="cookie-banner">Accept cookies</div>
</body>
</html>
"#;

fn html_context(options: ScrapeOptions) -> ProcessingContext {
    ProcessingContext::new(
        RawContent {
            bytes: PAGE.as_bytes().to_vec(),
            mime_type: "text/html".to_string(),
            source: "https://example.com/widgets/".to_string(),
            encoding: None,
        },
        options,
    )
}

#[tokio::test]
async fn html_pipeline_extracts_title_links_and_clean_markdown() {
    let mut ctx = html_context(ScrapeOptions::default());
    let chain = build_chain_for_content_type("text/html", true, None);
    run_chain(&chain, &mut ctx).await;

    assert_eq!(ctx.metadata.get("title").map(String::as_str), Some("Widgets Guide"));

    assert!(ctx.links.contains("https://example.com/widgets/advanced"));
    assert!(ctx.links.contains("https://other.example.com/x"));

    let markdown = ctx.markdown.expect("markdown should be populated");
    assert!(!markdown.contains("site nav"));
    assert!(!markdown.contains("track()"));
    assert!(!markdown.contains("Accept cookies"));
    assert!(markdown.contains("Widgets Guide"));
    assert!(ctx.errors.is_empty());
}

#[tokio::test]
async fn non_web_caller_can_skip_link_extraction() {
    // Local-file strategy never extracts links from file content (spec §4.4).
    let mut ctx = html_context(ScrapeOptions::default());
    let chain = build_chain_for_content_type("text/html", false, None);
    run_chain(&chain, &mut ctx).await;
    assert!(ctx.links.is_empty());
}

#[tokio::test]
async fn markdown_content_type_bypasses_html_stages() {
    let mut ctx = ProcessingContext::new(
        RawContent {
            bytes: b"# Top\n\nSome body text with a [link](sub).".to_vec(),
            mime_type: "text/markdown".to_string(),
            source: "https://example.com/docs/".to_string(),
            encoding: None,
        },
        ScrapeOptions::default(),
    );
    let chain = build_chain_for_content_type("text/markdown", true, None);
    run_chain(&chain, &mut ctx).await;

    assert_eq!(ctx.metadata.get("title").map(String::as_str), Some("Top"));
    assert!(ctx.links.contains("https://example.com/docs/sub"));
}

#[tokio::test]
async fn unknown_content_type_gets_an_empty_chain() {
    let chain = build_chain_for_content_type("application/octet-stream", true, None);
    assert!(chain.is_empty());
}
