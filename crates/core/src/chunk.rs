//! Boundary-aware text chunking
//!
//! Splits text into pieces no longer than a character ceiling, preferring the
//! coarsest boundary that fits:
//!
//! 1. **Paragraph**: blank lines
//! 2. **Sentence**: `.`, `!`, `?`, danda (`।`, `॥`) followed by whitespace
//! 3. **Clause**: `,`, `;`, `:` followed by whitespace
//! 4. **Word**: any whitespace run
//!
//! Each [`TextChunk`] is an exact slice of the (trimmed) source and carries the
//! separator that followed it, so concatenating `text + separator` over all
//! chunks in index order reproduces the source. A piece that is still too long
//! at the deepest permitted level is emitted whole rather than cut mid-token.
//!
//! # Usage
//!
//! ```ignore
//! use agri_voice_core::chunk::{ChunkConfig, SplitLevel, TextChunker};
//!
//! let chunker = TextChunker::new(ChunkConfig::new(900, SplitLevel::Sentence));
//! let chunks = chunker.chunk(long_answer);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<sep>[ \t]*\n[ \t]*\n\s*)").expect("valid regex"));
static SENTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?।॥]+["'\)\]]*(?P<sep>\s+)"#).expect("valid regex")
});
static CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;:،](?P<sep>\s+)").expect("valid regex"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?P<sep>\s+)").expect("valid regex"));

/// Boundary granularity, coarsest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitLevel {
    Paragraph,
    Sentence,
    Clause,
    Word,
}

impl SplitLevel {
    fn pattern(&self) -> &'static Regex {
        match self {
            SplitLevel::Paragraph => &PARAGRAPH,
            SplitLevel::Sentence => &SENTENCE,
            SplitLevel::Clause => &CLAUSE,
            SplitLevel::Word => &WORD,
        }
    }

    fn finer(&self) -> Option<SplitLevel> {
        match self {
            SplitLevel::Paragraph => Some(SplitLevel::Sentence),
            SplitLevel::Sentence => Some(SplitLevel::Clause),
            SplitLevel::Clause => Some(SplitLevel::Word),
            SplitLevel::Word => None,
        }
    }
}

/// Chunking limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum characters per chunk (Unicode scalar values, not bytes)
    pub max_chars: usize,
    /// Finest boundary the chunker may split on
    pub deepest: SplitLevel,
}

impl ChunkConfig {
    pub fn new(max_chars: usize, deepest: SplitLevel) -> Self {
        Self {
            max_chars: max_chars.max(1),
            deepest,
        }
    }
}

/// A contiguous slice of a larger text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Position in the original text
    pub index: usize,
    /// Chunk content, never empty
    pub text: String,
    /// Whitespace that followed this chunk in the source (empty for the last)
    pub separator: String,
}

impl TextChunk {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Separator to use when the chunk text has been replaced
    ///
    /// Line breaks are kept so paragraphs survive; any other run of
    /// whitespace collapses to one space.
    pub fn join_separator(&self) -> &str {
        if self.separator.is_empty() {
            ""
        } else if self.separator.contains('\n') {
            &self.separator
        } else {
            " "
        }
    }
}

/// A synthesized audio segment tagged with its chunk index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk {
    pub index: usize,
    pub bytes: Vec<u8>,
}

/// Rebuild text from chunks exactly as they were split
pub fn reassemble(chunks: &[TextChunk]) -> String {
    let mut ordered: Vec<&TextChunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.index);
    ordered
        .iter()
        .map(|c| format!("{}{}", c.text, c.separator))
        .collect()
}

/// Join replacement texts (one per chunk, same order) using the chunk separators
pub fn join_replaced<S: AsRef<str>>(chunks: &[TextChunk], replacements: &[S]) -> String {
    let mut out = String::new();
    for (chunk, replacement) in chunks.iter().zip(replacements) {
        out.push_str(replacement.as_ref().trim());
        out.push_str(chunk.join_separator());
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    sep_end: usize,
}

/// Hierarchical boundary chunker
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkConfig,
}

impl TextChunker {
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Split `text` into ordered chunks
    ///
    /// Leading and trailing whitespace of the whole text is dropped; empty or
    /// whitespace-only input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        let start = text.len() - text.trim_start().len();
        let end = text.trim_end().len();
        if start >= end {
            return Vec::new();
        }

        let mut spans = Vec::new();
        self.chunk_span(
            text,
            Span {
                start,
                end,
                sep_end: end,
            },
            SplitLevel::Paragraph,
            &mut spans,
        );

        spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| TextChunk {
                index,
                text: text[span.start..span.end].to_string(),
                separator: text[span.end..span.sep_end].to_string(),
            })
            .collect()
    }

    fn chunk_span(&self, src: &str, span: Span, level: SplitLevel, out: &mut Vec<Span>) {
        if char_len(src, span.start, span.end) <= self.config.max_chars {
            out.push(span);
            return;
        }

        // First level at or below `level` that actually divides this span
        let mut current = Some(level);
        let mut split = None;
        while let Some(lvl) = current {
            if lvl > self.config.deepest {
                break;
            }
            let pieces = split_span(src, span, lvl);
            if pieces.len() > 1 {
                split = Some((lvl, pieces));
                break;
            }
            current = lvl.finer();
        }

        let Some((lvl, pieces)) = split else {
            out.push(span);
            return;
        };

        let mut pending: Option<(Span, usize)> = None;
        for piece in pieces {
            let piece_len = char_len(src, piece.start, piece.end);

            if piece_len > self.config.max_chars {
                if let Some((p, _)) = pending.take() {
                    out.push(p);
                }
                match lvl.finer() {
                    Some(next) if next <= self.config.deepest => {
                        self.chunk_span(src, piece, next, out)
                    }
                    _ => out.push(piece),
                }
                continue;
            }

            pending = match pending {
                None => Some((piece, piece_len)),
                Some((p, len)) => {
                    let merged_len = len + char_len(src, p.end, piece.start) + piece_len;
                    if merged_len <= self.config.max_chars {
                        Some((
                            Span {
                                start: p.start,
                                end: piece.end,
                                sep_end: piece.sep_end,
                            },
                            merged_len,
                        ))
                    } else {
                        out.push(p);
                        Some((piece, piece_len))
                    }
                }
            };
        }
        if let Some((p, _)) = pending {
            out.push(p);
        }
    }
}

fn char_len(src: &str, start: usize, end: usize) -> usize {
    src[start..end].chars().count()
}

fn split_span(src: &str, span: Span, level: SplitLevel) -> Vec<Span> {
    let body = &src[span.start..span.end];
    let mut pieces: Vec<Span> = Vec::new();
    let mut cursor = 0;

    for caps in level.pattern().captures_iter(body) {
        let Some(sep) = caps.name("sep") else { continue };
        if sep.start() <= cursor {
            // Nothing between two separators; fold into the previous one
            if let Some(last) = pieces.last_mut() {
                last.sep_end = span.start + sep.end();
            }
            cursor = sep.end();
            continue;
        }
        pieces.push(Span {
            start: span.start + cursor,
            end: span.start + sep.start(),
            sep_end: span.start + sep.end(),
        });
        cursor = sep.end();
    }

    if cursor < body.len() {
        pieces.push(Span {
            start: span.start + cursor,
            end: span.end,
            sep_end: span.sep_end,
        });
    } else if let Some(last) = pieces.last_mut() {
        last.sep_end = span.sep_end;
    }

    pieces
}
