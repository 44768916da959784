use crate::types::{Section, SectionKind, SectionPath};
use scraper::{ElementRef, Html, Selector};

/// Converts Markdown to HTML (via `pulldown-cmark`), walks the resulting
/// tree's body children, and emits a flat sequence of sections — spec §4.5.
pub fn split_into_sections(markdown: &str) -> Vec<Section> {
    let mut html = String::new();
    let parser = pulldown_cmark::Parser::new_ext(markdown, pulldown_cmark::Options::ENABLE_TABLES);
    pulldown_cmark::html::push_html(&mut html, parser);
    let doc = Html::parse_fragment(&html);

    let mut sections = Vec::new();
    let mut stack: Vec<(u8, String)> = Vec::new();

    for child in doc.root_element().children() {
        let Some(el) = ElementRef::wrap(child) else { continue };
        let tag = el.value().name();

        if let Some(level) = heading_level(tag) {
            while stack.last().map(|(l, _)| *l >= level).unwrap_or(false) {
                stack.pop();
            }
            let path: SectionPath = stack.iter().map(|(_, t)| t.clone()).collect();
            let title = el.text().collect::<String>().trim().to_string();
            sections.push(Section {
                level,
                path: path.clone(),
                kind: SectionKind::Heading,
                content: format!("{} {}", "#".repeat(level as usize), title),
            });
            stack.push((level, title));
            continue;
        }

        let path: SectionPath = stack.iter().map(|(_, t)| t.clone()).collect();
        let level = stack.last().map(|(l, _)| *l).unwrap_or(0);

        if tag == "pre" {
            sections.push(Section {
                level,
                path,
                kind: SectionKind::Code,
                content: render_code_block(el),
            });
            continue;
        }

        if tag == "table" {
            sections.push(Section {
                level,
                path,
                kind: SectionKind::Table,
                content: render_table(el),
            });
            continue;
        }

        let text_md = html2md::parse_html(&el.html());
        if !text_md.trim().is_empty() {
            sections.push(Section {
                level,
                path,
                kind: SectionKind::Text,
                content: text_md,
            });
        }
    }

    sections
}

fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn render_code_block(pre: ElementRef) -> String {
    let code_sel = Selector::parse("code").unwrap();
    let code_el = pre.select(&code_sel).next();
    let lang = code_el
        .and_then(|c| c.value().attr("class"))
        .and_then(extract_language)
        .unwrap_or_default();
    let text = code_el.map(|c| c.text().collect::<String>()).unwrap_or_else(|| pre.text().collect());
    format!("```{lang}\n{}\n```", text.trim_end())
}

fn extract_language(class_attr: &str) -> Option<String> {
    class_attr
        .split_whitespace()
        .find_map(|c| c.strip_prefix("language-"))
        .map(|s| s.to_string())
}

fn render_table(table: ElementRef) -> String {
    let row_sel = Selector::parse("tr").unwrap();
    let cell_sel = Selector::parse("th,td").unwrap();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in table.select(&row_sel) {
        let cells: Vec<String> = row
            .select(&cell_sel)
            .map(|c| c.text().collect::<String>().trim().to_string())
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    if rows.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let header = &rows[0];
    out.push_str(&format!("| {} |\n", header.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(header.len())));
    for row in rows.iter().skip(1) {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}
