//! Paragraph-aware sliding-window chunking.
//!
//! Pure text-to-chunks transformation: no I/O, no error conditions, and
//! deterministic for a given input and parameter pair. Token counts here
//! are whitespace word counts, an approximation of provider tokenization
//! rather than parity with it. The embedding provider's own accounting
//! replaces these estimates downstream.

use serde::{Deserialize, Serialize};

/// Default window size in (approximate) tokens.
pub const DEFAULT_MAX_TOKENS: usize = 800;

/// Default overlap carried between consecutive chunks.
pub const DEFAULT_OVERLAP_TOKENS: usize = 200;

/// A chunk of source text before embedding annotation.
///
/// Deliberately carries no embedding field: the annotated, persistable
/// shape is [`crate::store::ChunkRecord`], produced only by the annotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Zero-based position within the source document.
    pub index: usize,
    /// Paragraphs joined by a blank line.
    pub content: String,
    /// Whitespace word count of `content`.
    pub token_estimate: usize,
}

/// Splits text into paragraphs: maximal runs of non-blank lines, trimmed,
/// with empty paragraphs dropped. A line is blank when it is empty after
/// trimming.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            flush_run(&mut run, &mut paragraphs);
        } else {
            run.push(line);
        }
    }
    flush_run(&mut run, &mut paragraphs);
    paragraphs
}

fn flush_run(run: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let paragraph = run.join("\n").trim().to_string();
    if !paragraph.is_empty() {
        paragraphs.push(paragraph);
    }
    run.clear();
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Chunks `text` into a contiguous `0..N-1` indexed sequence.
///
/// Paragraphs accumulate greedily until the next one would push the
/// running word count past `max_tokens`; the buffer then closes as a chunk
/// and the next buffer is seeded with whole trailing paragraphs totalling
/// at least `overlap_tokens` words (the paragraph crossing the threshold
/// is taken in full, never split). A single paragraph longer than
/// `max_tokens` is emitted whole as one oversized chunk. Empty or
/// whitespace-only input yields no chunks.
pub fn chunk_text(text: &str, max_tokens: usize, overlap_tokens: usize) -> Vec<TextChunk> {
    let paragraphs = split_paragraphs(text);
    let mut chunks: Vec<TextChunk> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut running_count = 0usize;

    for paragraph in paragraphs {
        let words = word_count(&paragraph);

        if running_count + words > max_tokens && !current.is_empty() {
            chunks.push(TextChunk {
                index: chunks.len(),
                content: current.join("\n\n"),
                token_estimate: running_count,
            });

            if overlap_tokens > 0 {
                let mut seed: Vec<String> = Vec::new();
                let mut seed_count = 0usize;
                for prev in current.iter().rev() {
                    seed.push(prev.clone());
                    seed_count += word_count(prev);
                    if seed_count >= overlap_tokens {
                        break;
                    }
                }
                seed.reverse();
                current = seed;
                running_count = seed_count;
            } else {
                current.clear();
                running_count = 0;
            }
        }

        current.push(paragraph);
        running_count += words;
    }

    if !current.is_empty() {
        chunks.push(TextChunk {
            index: chunks.len(),
            content: current.join("\n\n"),
            token_estimate: running_count,
        });
    }

    chunks
}
