use crate::error::{IndexerError, Result};

/// Parses header row + separator + data rows. Emits chunks, each prefixed
/// with the header + separator, greedily appending rows while staying ≤
/// max. Throws `minimum-chunk-size` when header + one row exceeds max.
/// Headers-only (no data rows) input returns unchanged (spec §8 boundary
/// behavior).
pub fn split_table(content: &str, max: usize) -> Result<Vec<String>> {
    if content.len() <= max {
        return Ok(vec![content.to_string()]);
    }

    let mut lines = content.lines();
    let Some(header) = lines.next() else {
        return Ok(vec![content.to_string()]);
    };
    let Some(separator) = lines.next() else {
        return Ok(vec![content.to_string()]);
    };
    let rows: Vec<&str> = lines.collect();

    let prefix = format!("{header}\n{separator}\n");
    if rows.is_empty() {
        return Ok(vec![content.to_string()]);
    }

    if prefix.len() + rows[0].len() > max {
        return Err(IndexerError::MinimumChunkSize {
            max,
            detail: "table header + separator + one row exceeds max".to_string(),
        });
    }

    let mut out = Vec::new();
    let mut current = prefix.clone();
    let mut has_rows = false;

    for row in rows {
        let candidate = format!("{current}{row}\n");
        if candidate.len() <= max {
            current = candidate;
            has_rows = true;
        } else {
            if has_rows {
                out.push(current.trim_end().to_string());
            }
            current = format!("{prefix}{row}\n");
            has_rows = true;
        }
    }
    if has_rows {
        out.push(current.trim_end().to_string());
    }

    if out.is_empty() {
        return Err(IndexerError::MinimumChunkSize {
            max,
            detail: "table produced no rows".to_string(),
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: usize) -> String {
        let mut s = String::from("| a | b |\n|---|---|\n");
        for i in 0..rows {
            s.push_str(&format!("| v{i} | w{i} |\n"));
        }
        s.trim_end().to_string()
    }

    #[test]
    fn headers_only_returns_unchanged() {
        let header_only = "| a | b |\n|---|---|";
        assert_eq!(split_table(header_only, 5).unwrap(), vec![header_only.to_string()]);
    }

    #[test]
    fn splits_rows_keeping_header_in_each_chunk() {
        let content = table(50);
        let chunks = split_table(&content, 60).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.starts_with("| a | b |"));
            assert!(chunk.len() <= 60);
        }
    }
}
