//! Component E: section-aware Markdown splitting, content-type-aware
//! splitters, and the greedy coalescer.

mod coalesce;
mod code;
mod section;
mod table;
mod text;

pub use coalesce::coalesce;
pub use section::split_into_sections;

use crate::error::Result;
use crate::types::{ChunkType, ContentChunk, Section, SectionKind};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy)]
pub struct SplitConfig {
    pub max_chunk_size: usize,
    pub min_chunk_size: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1500,
            min_chunk_size: 500,
        }
    }
}

/// Full pipeline: Markdown -> sections -> per-section content split ->
/// greedy coalesce. This is the single entry point the job worker calls
/// before handing chunks to the store.
pub fn split_document(markdown: &str, config: SplitConfig) -> Vec<ContentChunk> {
    let sections = split_into_sections(markdown);
    let mut chunks = Vec::new();

    for section in sections {
        let pieces = split_section_content(&section, config.max_chunk_size);
        for piece in pieces {
            let mut types = HashSet::new();
            types.insert(match section.kind {
                SectionKind::Heading => ChunkType::Heading,
                SectionKind::Text => ChunkType::Text,
                SectionKind::Code => ChunkType::Code,
                SectionKind::Table => ChunkType::Table,
            });
            chunks.push(ContentChunk {
                types,
                content: piece,
                level: section.level,
                path: section.path.clone(),
            });
        }
    }

    coalesce(chunks, config.min_chunk_size, config.max_chunk_size)
}

fn split_section_content(section: &Section, max: usize) -> Vec<String> {
    let attempt: Result<Vec<String>> = match section.kind {
        SectionKind::Heading => Ok(vec![section.content.clone()]),
        SectionKind::Text => text::split_text(&section.content, max),
        SectionKind::Code => code::split_code(&section.content, max),
        SectionKind::Table => table::split_table(&section.content, max),
    };

    match attempt {
        Ok(pieces) => pieces,
        Err(_) => generic_character_split(&section.content, max),
    }
}

/// Fallback when a content-specific splitter can't meet `max` — a generic
/// recursive character splitter with an aggressive separator list, down to
/// the empty string, to guarantee termination (spec §4.5). As an absolute
/// last resort, truncates to `max`.
fn generic_character_split(content: &str, max: usize) -> Vec<String> {
    const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

    fn go(content: &str, max: usize, seps: &[&str]) -> Vec<String> {
        if content.len() <= max {
            return vec![content.to_string()];
        }
        let Some((sep, rest)) = seps.split_first() else {
            return content
                .as_bytes()
                .chunks(max.max(1))
                .map(|c| String::from_utf8_lossy(c).to_string())
                .collect();
        };

        if sep.is_empty() {
            return content
                .chars()
                .collect::<Vec<_>>()
                .chunks(max.max(1))
                .map(|c| c.iter().collect::<String>())
                .collect();
        }

        let parts: Vec<&str> = content.split(sep.as_str()).collect();
        if parts.len() <= 1 {
            return go(content, max, rest);
        }

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
                if part.len() > max {
                    out.extend(go(part, max, rest));
                    current = String::new();
                } else {
                    current = part.to_string();
                }
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
        out
    }

    go(content, max, SEPARATORS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_a_small_document_into_coalesced_chunks_with_paths() {
        let markdown = "# Intro\n\nA short welcome paragraph.\n\n## Install\n\nRun `cargo add widgets` to get started.\n";
        let chunks = split_document(markdown, SplitConfig { max_chunk_size: 1500, min_chunk_size: 10 });

        assert!(!chunks.is_empty());
        assert!(chunks.iter().any(|c| c.path == vec!["Intro".to_string()]));
        assert!(chunks.iter().any(|c| c.content.contains("cargo add widgets")));
    }

    #[test]
    fn oversized_text_section_is_split_below_max_chunk_size() {
        let long_para = "word ".repeat(2000);
        let markdown = format!("# Big\n\n{long_para}\n");
        let chunks = split_document(&markdown, SplitConfig { max_chunk_size: 200, min_chunk_size: 50 });

        assert!(chunks.len() > 1, "a 10k-char paragraph must not survive as one chunk under a 200-char max");
        for chunk in &chunks {
            assert!(chunk.content.len() <= 200, "coalesce must never merge past max_chunk_size");
        }
    }

    #[test]
    fn generic_character_split_terminates_on_pathological_input() {
        // No whitespace or punctuation anywhere — every separator in
        // SEPARATORS except "" fails to split, exercising the character
        // fallback all the way to the empty-string case.
        let content = "x".repeat(500);
        let pieces = generic_character_split(&content, 50);
        assert!(pieces.iter().all(|p| p.chars().count() <= 50));
        assert_eq!(pieces.iter().map(|p| p.chars().count()).sum::<usize>(), 500);
    }
}
