use super::{links::extract_links_from_html, Middleware, MiddlewareOutcome};
use crate::types::ProcessingContext;
use scraper::{Html, Selector};

/// Fills `context.metadata.title` from `<title>` and `context.metadata.language`
/// from the `<html lang>`/`content-language` attributes, falling back to
/// content-based detection.
pub struct MetadataExtractMiddleware;

#[async_trait::async_trait]
impl Middleware for MetadataExtractMiddleware {
    async fn run(&self, ctx: &mut ProcessingContext) -> MiddlewareOutcome {
        let Some(html) = ctx.dom.clone() else {
            ctx.push_error("metadata-extract: no parsed DOM".to_string());
            return MiddlewareOutcome::Continue;
        };
        let doc = Html::parse_document(&html);
        let title_sel = Selector::parse("title").unwrap();
        if let Some(title) = doc.select(&title_sel).next() {
            let text = title.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                ctx.metadata.insert("title".to_string(), text);
            }
        }
        ctx.metadata.insert("language".to_string(), detect_language(&doc, &html));
        MiddlewareOutcome::Continue
    }
}

/// HTML `lang` attribute, then `<meta http-equiv="content-language">`, then
/// content-based detection via `whatlang` as a last resort.
fn detect_language(doc: &Html, html: &str) -> String {
    if let Ok(sel) = Selector::parse("html") {
        if let Some(el) = doc.select(&sel).next() {
            if let Some(lang) = el.value().attr("lang") {
                let trimmed = lang.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }
    if let Ok(sel) = Selector::parse(r#"meta[http-equiv="content-language"]"#) {
        if let Some(el) = doc.select(&sel).next() {
            if let Some(content) = el.value().attr("content") {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }
    match whatlang::detect(html) {
        Some(info) => whatlang_code(info.lang()),
        None => "unknown".to_string(),
    }
}

fn whatlang_code(lang: whatlang::Lang) -> String {
    use whatlang::Lang;
    match lang {
        Lang::Eng => "en".to_string(),
        Lang::Spa => "es".to_string(),
        Lang::Fra => "fr".to_string(),
        Lang::Deu => "de".to_string(),
        Lang::Ita => "it".to_string(),
        Lang::Por => "pt".to_string(),
        Lang::Rus => "ru".to_string(),
        Lang::Jpn => "ja".to_string(),
        Lang::Kor => "ko".to_string(),
        Lang::Cmn => "zh".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

/// First `# Heading` in Markdown content becomes the title; otherwise
/// `Untitled`. Also runs Markdown link-extraction when enabled, since the
/// Markdown pipeline has no separate link-extract stage in spec §4.3.
pub struct MarkdownMetadataMiddleware {
    pub extract_links: bool,
}

#[async_trait::async_trait]
impl Middleware for MarkdownMetadataMiddleware {
    async fn run(&self, ctx: &mut ProcessingContext) -> MiddlewareOutcome {
        let content = ctx.content_as_str().into_owned();
        let title = content
            .lines()
            .find_map(|line| line.strip_prefix("# ").map(|t| t.trim().to_string()))
            .unwrap_or_else(|| "Untitled".to_string());
        ctx.metadata.insert("title".to_string(), title);
        ctx.markdown = Some(content.clone());

        if self.extract_links {
            for link in extract_markdown_links(&content) {
                if let Some(resolved) = crate::url_utils::resolve_url(&ctx.source, &link) {
                    ctx.links.insert(resolved);
                }
            }
        }
        MiddlewareOutcome::Continue
    }
}

fn extract_markdown_links(markdown: &str) -> Vec<String> {
    // Reuse the HTML link extractor by rendering Markdown to HTML first —
    // keeps a single link-resolution code path (see `links.rs`).
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, pulldown_cmark::Parser::new(markdown));
    extract_links_from_html(&html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProcessingContext, RawContent, ScrapeOptions};

    fn ctx_for(html: &str) -> ProcessingContext {
        let mut ctx = ProcessingContext::new(
            RawContent {
                bytes: html.as_bytes().to_vec(),
                mime_type: "text/html".to_string(),
                source: "https://example.com/".to_string(),
                encoding: None,
            },
            ScrapeOptions::default(),
        );
        ctx.dom = Some(html.to_string());
        ctx
    }

    #[tokio::test]
    async fn prefers_html_lang_attribute_over_content_sniffing() {
        let mut ctx = ctx_for(r#"<html lang="fr"><head><title>Bonjour</title></head><body><p>Salut le monde</p></body></html>"#);
        MetadataExtractMiddleware.run(&mut ctx).await;
        assert_eq!(ctx.metadata.get("language").map(String::as_str), Some("fr"));
        assert_eq!(ctx.metadata.get("title").map(String::as_str), Some("Bonjour"));
    }

    #[tokio::test]
    async fn falls_back_to_content_language_meta_tag() {
        let mut ctx = ctx_for(r#"<html><head><meta http-equiv="content-language" content="de"></head><body><p>hallo</p></body></html>"#);
        MetadataExtractMiddleware.run(&mut ctx).await;
        assert_eq!(ctx.metadata.get("language").map(String::as_str), Some("de"));
    }

    #[tokio::test]
    async fn markdown_title_defaults_to_untitled_without_a_heading() {
        let mut ctx = ProcessingContext::new(
            RawContent {
                bytes: b"just some body text, no heading".to_vec(),
                mime_type: "text/markdown".to_string(),
                source: "https://example.com/docs/".to_string(),
                encoding: None,
            },
            ScrapeOptions::default(),
        );
        MarkdownMetadataMiddleware { extract_links: false }.run(&mut ctx).await;
        assert_eq!(ctx.metadata.get("title").map(String::as_str), Some("Untitled"));
    }
}
