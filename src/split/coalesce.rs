use crate::types::{ContentChunk, SectionPath};

/// Greedy coalescer (spec §4.5): merges small adjacent chunks while
/// respecting a min/max size and never merging across a new H1/H2
/// boundary. Running this again on an already-coalesced sequence is a
/// no-op (idempotent — spec §8).
pub fn coalesce(chunks: Vec<ContentChunk>, min: usize, max: usize) -> Vec<ContentChunk> {
    let mut out: Vec<ContentChunk> = Vec::new();

    for chunk in chunks {
        let is_major_heading = chunk.types.contains(&crate::types::ChunkType::Heading) && chunk.level <= 2;

        if let Some(last) = out.last_mut() {
            let last_is_small = last.content.len() < min;
            let combined_len = last.content.len() + 2 + chunk.content.len();
            if last_is_small && !is_major_heading && combined_len <= max {
                merge_into(last, chunk);
                continue;
            }
        }
        out.push(chunk);
    }

    out
}

fn merge_into(dst: &mut ContentChunk, src: ContentChunk) {
    dst.content = format!("{}\n\n{}", dst.content, src.content);
    dst.types.extend(src.types);
    dst.level = dst.level.min(src.level);
    dst.path = merge_paths(&dst.path, &src.path);
}

/// Merged-section path (spec §4.5): the deeper path when one includes the
/// other, the longest common prefix otherwise, empty when no common
/// prefix.
fn merge_paths(a: &SectionPath, b: &SectionPath) -> SectionPath {
    if a == b {
        return a.clone();
    }
    let common_len = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    if common_len == a.len() {
        return b.clone();
    }
    if common_len == b.len() {
        return a.clone();
    }
    a[..common_len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkType;
    use std::collections::HashSet;

    fn text_chunk(content: &str, level: u8, path: &[&str]) -> ContentChunk {
        let mut types = HashSet::new();
        types.insert(ChunkType::Text);
        ContentChunk {
            types,
            content: content.to_string(),
            level,
            path: path.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn merges_small_adjacent_chunks() {
        let chunks = vec![
            text_chunk("a", 3, &["Intro"]),
            text_chunk("b", 3, &["Intro"]),
        ];
        let out = coalesce(chunks, 500, 1500);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].content, "a\n\nb");
    }

    #[test]
    fn never_merges_across_max_size() {
        let big = "x".repeat(400);
        let chunks = vec![text_chunk(&big, 3, &["A"]), text_chunk(&big, 3, &["B"])];
        let out = coalesce(chunks, 500, 700);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn idempotent_on_already_coalesced_input() {
        let chunks = vec![text_chunk(&"x".repeat(600), 3, &["A"])];
        let once = coalesce(chunks.clone(), 500, 1500);
        let twice = coalesce(once.clone(), 500, 1500);
        assert_eq!(once.len(), twice.len());
        assert_eq!(once[0].content, twice[0].content);
    }
}
