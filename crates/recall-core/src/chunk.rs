//! Text chunking strategies.
//!
//! Splits normalized document text into overlapping [`Chunk`]s under one of
//! three policies:
//!
//! - **Fixed** — slides a window of `size` characters with step
//!   `size - overlap`, retracting each boundary to the last whitespace so
//!   words are never split mid-way.
//! - **Sentence** — groups `size` consecutive sentences per chunk, advancing
//!   by `size - overlap` sentences so `overlap` sentences repeat across the
//!   boundary.
//! - **Semantic** — accumulates whole paragraphs up to `size` characters,
//!   seeding each new chunk with the last one or two sentences of the
//!   previous one for continuity.
//!
//! Chunk ids are deterministic SHA-256 prefixes. Fixed-width chunks hash
//! their content, so identical content anywhere in the store produces the
//! same id — an intentional dedup signal, not an accident. Sentence and
//! semantic chunks hash their window position plus a text prefix.
//!
//! # Guarantees
//!
//! - Empty or whitespace-only input yields an empty vector, never an error.
//! - `chunk_num` values are contiguous: `0, 1, 2, …, N-1`.
//! - All boundaries are snapped to valid UTF-8 char boundaries.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::models::Chunk;

/// Chunk-boundary policy. One fixed configuration per store; strategy and
/// parameters are not overridable per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Slide by raw character count.
    Fixed,
    /// Group by sentence count.
    Sentence,
    /// Group by paragraph with sentence-level overlap.
    #[default]
    Semantic,
}

/// Chunking tuning parameters, decoupled from application config.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingParams {
    pub strategy: ChunkStrategy,
    /// Characters per chunk (fixed/semantic) or sentences per chunk (sentence).
    pub size: usize,
    /// Characters (fixed) or sentences (sentence) repeated across a boundary.
    /// Ignored by the semantic strategy, which overlaps by trailing sentences.
    pub overlap: usize,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Semantic,
            size: 512,
            overlap: 100,
        }
    }
}

/// Deterministic 16-hex-char SHA-256 prefix of `input`.
///
/// Used for chunk ids, rerank dedup keys, and document ids derived from
/// source names.
pub fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Collapse whitespace runs for embedding consistency.
///
/// Every whitespace run becomes a single space, except runs containing two
/// or more newlines, which become `"\n\n"` so paragraph boundaries survive
/// for the semantic strategy. Applied identically to indexed text and query
/// text, so distance computations see the same normalization on both sides.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            let mut newlines = usize::from(c == '\n');
            while let Some(&next) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                newlines += usize::from(next == '\n');
                chars.next();
            }
            // Leading and trailing runs are dropped entirely.
            if !out.is_empty() && chars.peek().is_some() {
                out.push_str(if newlines >= 2 { "\n\n" } else { " " });
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// Split text into chunks under the given strategy.
///
/// Returns chunks with contiguous `chunk_num`s starting at 0, in document
/// order. Empty input produces an empty vector.
pub fn chunk_text(text: &str, strategy: ChunkStrategy, size: usize, overlap: usize) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match strategy {
        ChunkStrategy::Fixed => chunk_fixed(text, size, overlap),
        ChunkStrategy::Sentence => chunk_sentences(text, size, overlap),
        ChunkStrategy::Semantic => chunk_semantic(text, size),
    }
}

/// Fixed-width windows with whitespace-aligned boundaries.
fn chunk_fixed(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut chunk_num = 0i64;

    while start < text.len() {
        let mut end = snap_to_char_boundary(text, (start + size).min(text.len()));
        if end <= start {
            // A single multi-byte char straddles the window; take it whole.
            end = next_char_boundary(text, start + 1);
        }

        if end < text.len() {
            // Retract to the last whitespace so the window never ends
            // mid-word. A window with no interior whitespace is kept as-is.
            if let Some(pos) = text[start..end].rfind(char::is_whitespace) {
                if pos > 0 {
                    end = start + pos;
                }
            }
        }

        let piece = text[start..end].trim();
        if !piece.is_empty() {
            chunks.push(Chunk {
                id: short_hash(piece),
                text: piece.to_string(),
                chunk_num,
            });
            chunk_num += 1;
        }

        let next = snap_to_char_boundary(text, end.saturating_sub(overlap));
        start = if next > start { next } else { end };
    }

    chunks
}

/// Sentence-count windows advancing by `size - overlap` sentences.
fn chunk_sentences(text: &str, size: usize, overlap: usize) -> Vec<Chunk> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let size = size.max(1);
    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut covered = 0usize;
    let mut i = 0usize;

    while i < sentences.len() {
        let end = (i + size).min(sentences.len());
        // A window that adds no new sentences is pure overlap tail; skip it.
        if end > covered {
            let chunk_text = sentences[i..end].join(" ");
            if !chunk_text.is_empty() {
                let prefix: String = chunk_text.chars().take(50).collect();
                chunks.push(Chunk {
                    id: short_hash(&format!("{}_{}", i, prefix)),
                    text: chunk_text,
                    chunk_num: chunks.len() as i64,
                });
            }
            covered = end;
        }
        i += step;
    }

    chunks
}

/// Paragraph accumulation with trailing-sentence continuity overlap.
fn chunk_semantic(text: &str, size: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for para in text.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }

        if !current.is_empty() && current.len() + para.len() > size {
            let seed = overlap_seed(&current);
            push_semantic_chunk(&mut chunks, std::mem::take(&mut current));
            current = format!("{}\n\n{}", seed, para);
        } else {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(para);
        }
    }

    // The final buffer is always emitted, regardless of size.
    if !current.trim().is_empty() {
        push_semantic_chunk(&mut chunks, current);
    }

    chunks
}

fn push_semantic_chunk(chunks: &mut Vec<Chunk>, text: String) {
    let chunk_num = chunks.len() as i64;
    let prefix: String = text.chars().take(50).collect();
    chunks.push(Chunk {
        id: short_hash(&format!("{}_{}", chunk_num, prefix)),
        text,
        chunk_num,
    });
}

/// Last one or two sentences of an emitted chunk, used to seed the next
/// buffer so context flows across the boundary.
fn overlap_seed(chunk: &str) -> String {
    let sentences = split_sentences(chunk);
    if sentences.len() > 1 {
        sentences[sentences.len() - 2..].join(" ")
    } else {
        sentences.first().copied().unwrap_or("").to_string()
    }
}

/// Split text on sentence-ending punctuation followed by whitespace.
///
/// Hand-rolled because the `regex` crate has no lookbehind. Runs of
/// terminators (`"..."`, `"?!"`) stay attached to their sentence; text with
/// no terminator is a single sentence. Returned slices are trimmed.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let end = i + c.len_utf8();
                    let sentence = text[start..end].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    start = end;
                }
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

/// Snap a byte index back to the nearest valid UTF-8 char boundary.
fn snap_to_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Snap a byte index forward to the nearest valid UTF-8 char boundary.
fn next_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
