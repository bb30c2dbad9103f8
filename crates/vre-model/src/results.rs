use crate::line::Line;

/// A half-open byte interval `[start, end)`, always within the bounds of
/// the line it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Per-chunk match bounds: one slot per line in the chunk, `None` when that
/// line had no match. Matching is always capped at the first hit per line,
/// so a single `Interval` (rather than a `Vec<Interval>`) is enough per slot.
#[derive(Debug, Clone, Default)]
pub struct ChunkBounds {
    slots: Vec<Option<Interval>>,
}

impl ChunkBounds {
    pub fn with_capacity(lines: usize) -> Self {
        Self {
            slots: vec![None; lines],
        }
    }

    pub fn set(&mut self, slot: usize, interval: Option<Interval>) {
        self.slots[slot] = interval;
    }

    pub fn get(&self, slot: usize) -> Option<Interval> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

/// Per-document match bounds: one [`ChunkBounds`] per chunk scanned so far.
/// `chunks.len() <= document.chunks.len()` always holds.
#[derive(Debug, Clone, Default)]
pub struct DocBounds {
    pub chunks: Vec<ChunkBounds>,
}

/// The full per-document, per-chunk, per-line match index (or substitution
/// index — same shape, different meaning of the recorded interval).
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    pub docs: Vec<DocBounds>,
}

impl MatchIndex {
    pub fn doc(&self, idx: usize) -> Option<&DocBounds> {
        self.docs.get(idx)
    }
}

/// A snapshot of the Engine's progress at a given query `version`: bounds,
/// optional substitution bounds, the matching/substituted lines themselves,
/// and their global line numbers. Cheap to clone — everything at or after
/// the scan cursor is simply absent, and the rest is `Arc`-shared lines.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub version: u64,
    pub replace: bool,
    pub bounds: MatchIndex,
    pub sub_bounds: Option<MatchIndex>,
    pub output_lines: Vec<Vec<Line>>,
    pub match_lines: Vec<Vec<usize>>,
}

impl SearchResult {
    pub fn match_lines_for(&self, doc: usize) -> &[usize] {
        self.match_lines.get(doc).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn output_lines_for(&self, doc: usize) -> &[Line] {
        self.output_lines
            .get(doc)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The match interval recorded for `global_line` of `doc`, if that line
    /// falls within the chunks this snapshot has scanned so far.
    pub fn bound_at(&self, doc: usize, global_line: usize) -> Option<Interval> {
        Self::lookup(&self.bounds, doc, global_line)
    }

    /// The substitution-expansion interval for `global_line` of `doc`, only
    /// present in replace mode.
    pub fn sub_bound_at(&self, doc: usize, global_line: usize) -> Option<Interval> {
        Self::lookup(self.sub_bounds.as_ref()?, doc, global_line)
    }

    fn lookup(index: &MatchIndex, doc: usize, global_line: usize) -> Option<Interval> {
        let chunk_idx = global_line / crate::constants::CHUNK_SIZE;
        let slot = global_line % crate::constants::CHUNK_SIZE;
        index.doc(doc)?.chunks.get(chunk_idx)?.get(slot)
    }
}

/// The engine's terminal output, delivered once over the done-channel on
/// commit: the lines to print, per document, in document/chunk/line order.
#[derive(Debug, Clone, Default)]
pub struct Output {
    pub replace: bool,
    pub output_lines: Vec<Vec<Line>>,
}
