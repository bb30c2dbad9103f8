use crate::constants::CHUNK_SIZE;
use crate::line::Line;
use std::sync::Arc;

/// A batch of up to [`CHUNK_SIZE`] lines, the unit of append and scan.
///
/// Backed by a `Vec<Line>` rather than a fixed-size array with a separate
/// occupancy count: the `Vec` already carries its own length, with no
/// padding needed for unfilled slots (see DESIGN.md for the rationale).
///
/// Once constructed and handed to a [`crate::Document`], a `Chunk` is never
/// mutated — callers share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct Chunk {
    lines: Vec<Line>,
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            lines: Vec::with_capacity(CHUNK_SIZE),
        }
    }

    /// Appends a line. Panics if the chunk is already at capacity; callers
    /// (the Reader) are responsible for publishing a full chunk and starting
    /// a fresh one before calling this again.
    pub fn push(&mut self, line: Line) {
        debug_assert!(self.lines.len() < CHUNK_SIZE);
        self.lines.push(line);
    }

    pub fn is_full(&self) -> bool {
        self.lines.len() >= CHUNK_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, slot: usize) -> Option<&Line> {
        self.lines.get(slot)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn into_shared(self) -> Arc<Chunk> {
        Arc::new(self)
    }
}
