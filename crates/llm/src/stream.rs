//! Streaming helpers.
//!
//! - [`SseDecoder`] turns raw server-sent-event bytes into `data:` payloads,
//!   buffering partial lines across network reads.
//! - [`fragment_stream`] re-chunks finished text into fixed-size fragments.

use docqa_core::AppResult;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;

/// Stream of plain text fragments, in emission order.
pub type TextStream = Pin<Box<dyn Stream<Item = AppResult<String>> + Send>>;

/// Incremental decoder for `text/event-stream` bodies.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a network read; returns every complete `data:` payload it finished.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(payload) = parse_line(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }
}

fn parse_line(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim_end_matches(['\r', '\n']);

    // Blank lines separate events; ':' lines are comments
    let data = text.strip_prefix("data:")?;
    Some(data.strip_prefix(' ').unwrap_or(data).to_string())
}

/// Split `text` into fragments of at most `fragment_size` characters and
/// stream them, sleeping `pacing` between fragments.
///
/// A `fragment_size` of zero is treated as one.
pub fn fragment_stream(text: &str, fragment_size: usize, pacing: Duration) -> TextStream {
    let fragments = split_fragments(text, fragment_size);

    let stream = futures::stream::iter(fragments.into_iter().enumerate()).then(
        move |(i, fragment)| async move {
            if i > 0 && !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
            Ok(fragment)
        },
    );

    Box::pin(stream)
}

/// Split into fragments of at most `fragment_size` characters.
pub fn split_fragments(text: &str, fragment_size: usize) -> Vec<String> {
    let size = fragment_size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_decoder_handles_split_lines() {
        let mut decoder = SseDecoder::new();

        let first = decoder.push(b"data: {\"a\":1}\n\ndata: {\"b\"");
        assert_eq!(first, vec!["{\"a\":1}".to_string()]);

        let second = decoder.push(b":2}\n\n: keep-alive\ndata: [DONE]\n\n");
        assert_eq!(second, vec!["{\"b\":2}".to_string(), "[DONE]".to_string()]);
    }

    #[test]
    fn test_sse_decoder_crlf_and_utf8_split() {
        let mut decoder = SseDecoder::new();
        let bytes = "data: café\r\n".as_bytes();
        // split inside the two-byte 'é'
        let (a, b) = bytes.split_at(10);
        assert!(decoder.push(a).is_empty());
        assert_eq!(decoder.push(b), vec!["café".to_string()]);
    }

    #[test]
    fn test_sse_decoder_finish_flushes_tail() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_split_fragments() {
        let text = "a".repeat(120);
        let fragments = split_fragments(&text, 50);
        assert_eq!(
            fragments.iter().map(|f| f.len()).collect::<Vec<_>>(),
            vec![50, 50, 20]
        );
        assert!(split_fragments("", 50).is_empty());
    }

    #[tokio::test]
    async fn test_fragment_stream_reassembles() {
        let text = "Amazon DynamoDB is a key-value store. ÅÄÖ ünïcödé text that spans fragments.";
        let fragments: Vec<String> = fragment_stream(text, 7, Duration::ZERO)
            .map(|f| f.unwrap())
            .collect()
            .await;

        assert!(fragments.iter().all(|f| f.chars().count() <= 7));
        assert_eq!(fragments.concat(), text);
    }
}
