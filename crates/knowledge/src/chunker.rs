//! Text chunking with configurable size and overlap.
//!
//! Splitting is purely positional and counts Unicode scalar values, so a
//! chunk boundary never falls inside a UTF-8 code point. Chunks are not
//! trimmed; dropping the first `overlap` characters of every chunk after the
//! first and concatenating reproduces the source text.

use crate::types::{Chunk, Document};
use docqa_core::{AppError, AppResult};

/// Split `text` into overlapping chunks of at most `chunk_size` characters.
///
/// Chunk `i + 1` starts `chunk_size - chunk_overlap` characters after chunk
/// `i`. Only the final chunk may be shorter than `chunk_size`. Empty or
/// whitespace-only text produces no chunks.
pub fn split(text: &str, chunk_size: usize, chunk_overlap: usize) -> AppResult<Vec<String>> {
    Ok(split_with_offsets(text, chunk_size, chunk_overlap)?
        .into_iter()
        .map(|(_, chunk)| chunk)
        .collect())
}

/// Split one document, tagging every chunk with its source and position.
pub fn split_document(
    document: &Document,
    chunk_size: usize,
    chunk_overlap: usize,
) -> AppResult<Vec<Chunk>> {
    let chunks: Vec<Chunk> = split_with_offsets(&document.text, chunk_size, chunk_overlap)?
        .into_iter()
        .enumerate()
        .map(|(position, (offset, text))| Chunk {
            source: document.source.clone(),
            position: position as u32,
            offset,
            text,
        })
        .collect();

    tracing::debug!(
        "Chunked '{}' into {} chunks (size: {}, overlap: {})",
        document.source,
        chunks.len(),
        chunk_size,
        chunk_overlap
    );

    Ok(chunks)
}

/// Reject parameter pairs that cannot make forward progress.
pub fn validate_params(chunk_size: usize, chunk_overlap: usize) -> AppResult<()> {
    if chunk_overlap >= chunk_size {
        return Err(AppError::Configuration(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            chunk_overlap, chunk_size
        )));
    }
    Ok(())
}

fn split_with_offsets(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> AppResult<Vec<(usize, String)>> {
    validate_params(chunk_size, chunk_overlap)?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - chunk_overlap;
    let mut chunks = Vec::with_capacity(chars.len() / step + 1);
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push((start, chars[start..end].iter().collect()));
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(chunks: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(chunk);
            } else {
                out.extend(chunk.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_split_1200_chars_default_params() {
        let text: String = (0..1200).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let doc = Document::new("notes.txt", text.clone());
        let chunks = split_document(&doc, 1000, 200).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks[0].text, text[0..1000]);
        assert_eq!(chunks[1].offset, 800);
        assert_eq!(chunks[1].text, text[800..1200]);
        assert_eq!(chunks[1].position, 1);
        assert!(chunks.iter().all(|c| c.source == "notes.txt"));
    }

    #[test]
    fn test_split_chunk_count_formula() {
        for (len, size, overlap) in [(1200, 1000, 200), (301, 100, 0), (1000, 300, 50), (9, 4, 3)] {
            let text = "x".repeat(len);
            let chunks = split(&text, size, overlap).unwrap();
            let expected = (len - overlap).div_ceil(size - overlap);
            assert_eq!(chunks.len(), expected, "len={} size={} overlap={}", len, size, overlap);
            assert!(chunks.iter().all(|c| c.chars().count() <= size));
        }
    }

    #[test]
    fn test_split_short_text_single_chunk() {
        let chunks = split("short text", 1000, 200).unwrap();
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn test_split_exact_size_single_chunk() {
        let text = "y".repeat(100);
        assert_eq!(split(&text, 100, 20).unwrap().len(), 1);
    }

    #[test]
    fn test_split_round_trip() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunks = split(&text, 120, 30).unwrap();
        assert_eq!(reconstruct(&chunks, 30), text);
    }

    #[test]
    fn test_split_multibyte_round_trip() {
        let text = "Gamedex é um aplicativo 🎮 brasileiro! ".repeat(20);
        let chunks = split(&text, 37, 11).unwrap();
        assert!(chunks.iter().all(|c| c.chars().count() <= 37));
        assert_eq!(reconstruct(&chunks, 11), text);
    }

    #[test]
    fn test_split_preserves_whitespace() {
        let chunks = split("  padded  ", 1000, 0).unwrap();
        assert_eq!(chunks[0], "  padded  ");
    }

    #[test]
    fn test_split_empty_and_whitespace() {
        assert!(split("", 100, 10).unwrap().is_empty());
        assert!(split(" \n\t ", 100, 10).unwrap().is_empty());
    }

    #[test]
    fn test_split_rejects_overlap_not_smaller_than_size() {
        assert!(matches!(split("abc", 100, 100), Err(AppError::Configuration(_))));
        assert!(matches!(split("abc", 100, 150), Err(AppError::Configuration(_))));
        assert!(matches!(split("abc", 0, 0), Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_overlap_between_consecutive_chunks() {
        let text = "abcdefghijklmnopqrstuvwxyz".repeat(10);
        let chunks = split(&text, 50, 10).unwrap();
        for pair in chunks.windows(2) {
            let tail: String = pair[0].chars().skip(40).collect();
            let head: String = pair[1].chars().take(10).collect();
            assert_eq!(tail, head);
        }
    }
}
