use crate::error::{IndexerError, Result};

/// Whole content ≤ max → return as-is. Otherwise split by `\n\n`
/// (paragraphs); if every chunk fits, done. Else split by `\n` (lines) and
/// greedily remerge using `\n`. Else last-resort word-boundary split
/// targeting the max. Throws `minimum-chunk-size` when a single indivisible
/// token exceeds max (spec §4.5).
pub fn split_text(content: &str, max: usize) -> Result<Vec<String>> {
    if content.len() <= max {
        return Ok(vec![content.to_string()]);
    }

    let paragraphs: Vec<&str> = content.split("\n\n").collect();
    if paragraphs.iter().all(|p| p.len() <= max) {
        return Ok(greedy_merge(&paragraphs, "\n\n", max));
    }

    let lines: Vec<&str> = content.split('\n').collect();
    if lines.iter().all(|l| l.len() <= max) {
        return Ok(greedy_merge(&lines, "\n", max));
    }

    split_by_words(content, max)
}

fn greedy_merge(parts: &[&str], sep: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for part in parts {
        let candidate = if current.is_empty() {
            part.to_string()
        } else {
            format!("{current}{sep}{part}")
        };
        if candidate.len() <= max {
            current = candidate;
        } else {
            if !current.is_empty() {
                out.push(current.clone());
            }
            current = part.to_string();
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn split_by_words(content: &str, max: usize) -> Result<Vec<String>> {
    let words: Vec<&str> = content.split_whitespace().collect();
    let mut out = Vec::new();
    let mut current = String::new();
    for word in words {
        if word.len() > max {
            return Err(IndexerError::MinimumChunkSize {
                max,
                detail: format!("single token of length {} exceeds max", word.len()),
            });
        }
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if candidate.len() <= max {
            current = candidate;
        } else {
            out.push(current.clone());
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    if out.is_empty() {
        return Err(IndexerError::MinimumChunkSize {
            max,
            detail: "content has no whitespace-delimited tokens".to_string(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_passes_through() {
        assert_eq!(split_text("hello", 100).unwrap(), vec!["hello"]);
    }

    #[test]
    fn splits_on_paragraphs_when_possible() {
        let content = format!("{}\n\n{}", "a".repeat(50), "b".repeat(50));
        let chunks = split_text(&content, 60).unwrap();
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn rejects_indivisible_oversized_token() {
        let token = "x".repeat(200);
        let err = split_text(&token, 50).unwrap_err();
        assert!(matches!(err, IndexerError::MinimumChunkSize { .. }));
    }
}
