use crate::error::{IndexerError, Result};

/// Strips outer fences, records the language, splits by line, greedily
/// groups lines so each wrapped chunk (`` ```<lang>\n…\n``` ``) fits the
/// max. Throws `minimum-chunk-size` when a single line + fencing exceeds
/// max (spec §4.5).
pub fn split_code(content: &str, max: usize) -> Result<Vec<String>> {
    if content.len() <= max {
        return Ok(vec![content.to_string()]);
    }

    let (lang, body) = strip_fences(content);
    let fence_overhead = format!("```{lang}\n\n```").len();

    let lines: Vec<&str> = body.lines().collect();
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    let wrap = |lang: &str, lines: &[&str]| format!("```{lang}\n{}\n```", lines.join("\n"));

    for line in lines {
        if line.len() + fence_overhead > max {
            return Err(IndexerError::MinimumChunkSize {
                max,
                detail: format!("single code line of length {} + fencing exceeds max", line.len()),
            });
        }
        let mut candidate = current.clone();
        candidate.push(line);
        if wrap(&lang, &candidate).len() <= max {
            current = candidate;
        } else {
            if !current.is_empty() {
                out.push(wrap(&lang, &current));
            }
            current = vec![line];
        }
    }
    if !current.is_empty() {
        out.push(wrap(&lang, &current));
    }

    if out.is_empty() {
        return Err(IndexerError::MinimumChunkSize {
            max,
            detail: "code block produced no lines".to_string(),
        });
    }
    Ok(out)
}

fn strip_fences(content: &str) -> (String, String) {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let mut lines = rest.lines();
        let lang = lines.next().unwrap_or("").trim().to_string();
        let body: Vec<&str> = lines.collect();
        let mut body = body.join("\n");
        if let Some(stripped) = body.strip_suffix("```") {
            body = stripped.trim_end().to_string();
        }
        (lang, body)
    } else {
        (String::new(), trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_long_code_by_line_groups() {
        let lines: Vec<String> = (0..50).map(|i| format!("line_{i}")).collect();
        let content = format!("```rust\n{}\n```", lines.join("\n"));
        let chunks = split_code(&content, 80).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 80);
            assert!(chunk.starts_with("```rust"));
        }
    }
}
