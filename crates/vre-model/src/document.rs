use crate::chunk::Chunk;
use std::sync::Arc;

/// An ordered sequence of chunks from one input source.
///
/// `filename` is empty for the single piped-stdin document. `is_final`
/// becomes `true` once the Reader has closed the underlying stream; no more
/// chunks will ever be appended after that point.
///
/// Cloning a `Document` clones the `filename` `String` and the outer `Vec`
/// of `Arc<Chunk>` pointers — cheap, and exactly the "shallow copy" the
/// spec calls for since the chunks themselves are reference-counted and
/// immutable once published.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub filename: String,
    pub chunks: Vec<Arc<Chunk>>,
    pub num_lines: usize,
    pub is_final: bool,
}

impl Document {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            chunks: Vec::new(),
            num_lines: 0,
            is_final: false,
        }
    }

    pub fn push_chunk(&mut self, chunk: Chunk) {
        self.num_lines += chunk.len();
        self.chunks.push(chunk.into_shared());
    }

    pub fn line_at(&self, global_line: usize) -> Option<&crate::Line> {
        let (chunk_idx, slot) = (
            global_line / crate::constants::CHUNK_SIZE,
            global_line % crate::constants::CHUNK_SIZE,
        );
        self.chunks.get(chunk_idx)?.line(slot)
    }
}
