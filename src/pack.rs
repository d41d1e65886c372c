//! Greedy packing of ordered summary lines into size-bounded chunks.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Unit chunk lengths are measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnit {
    /// Unicode scalar values.
    #[default]
    Chars,
    /// Approximate tokens: one per four characters, rounded up.
    Tokens,
}

impl SizeUnit {
    /// Length of `text` in this unit.
    #[must_use]
    pub fn measure(self, text: &str) -> usize {
        let chars = text.chars().count();
        match self {
            SizeUnit::Chars => chars,
            SizeUnit::Tokens => chars.div_ceil(4),
        }
    }
}

/// Separator placed between lines inside a chunk.
pub const LINE_SEPARATOR: char = '\n';

/// A contiguous run of summary lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the chunk sequence, starting at 0.
    pub index: usize,
    /// Lines in original order.
    pub lines: Vec<String>,
    /// Length in the packer's unit, one unit per separator included.
    pub length: usize,
    /// Set when a single line alone exceeds the limit.
    pub oversized: bool,
}

impl Chunk {
    /// The chunk's lines joined with the line separator.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push(LINE_SEPARATOR);
            }
            out.push_str(line);
        }
        out
    }
}

/// Packs lines into chunks of at most `limit` units.
///
/// Lines are never split or reordered. A chunk's length counts one unit per
/// separator between adjacent lines. A line longer than `limit` is emitted
/// alone in an oversized chunk.
#[must_use]
pub fn pack<S: AsRef<str>>(lines: &[S], limit: usize, unit: SizeUnit) -> Vec<Chunk> {
    let separator = unit.measure("\n");
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_len = 0;

    for line in lines {
        let line = line.as_ref();
        let line_len = unit.measure(line);

        if !current.is_empty() {
            if current_len + separator + line_len > limit {
                flush(&mut chunks, &mut current, current_len, limit);
                current_len = 0;
            } else {
                current_len += separator;
            }
        }

        current_len += line_len;
        current.push(line.to_string());
    }

    if !current.is_empty() {
        flush(&mut chunks, &mut current, current_len, limit);
    }
    chunks
}

fn flush(chunks: &mut Vec<Chunk>, current: &mut Vec<String>, length: usize, limit: usize) {
    let lines = std::mem::take(current);
    let oversized = length > limit;
    debug_assert!(!oversized || lines.len() == 1);
    chunks.push(Chunk { index: chunks.len(), lines, length, oversized });
}
