use std::sync::Arc;

use vre_model::{ChunkBounds, CorpusSnapshot, DocBounds, MatchIndex, Output, Query, SearchResult};
use vre_regex::Program;

/// Everything the scan loop reads and mutates under the Engine's lock.
///
/// Holds the accumulating per-document, per-chunk match data: a compiled
/// `Program`, the most recent corpus snapshot, the `(curr_doc, curr_chunk)`
/// scan cursor, the termination flags, and the growing `MatchIndex`/
/// substitution index/output lines.
#[derive(Default)]
pub(crate) struct EngineState {
    pub(crate) program: Option<Program>,
    pub(crate) corpus: CorpusSnapshot,
    pub(crate) curr_doc: usize,
    pub(crate) curr_chunk: usize,
    pub(crate) final_doc: bool,
    pub(crate) final_engine: bool,
    pub(crate) asleep: bool,
    pub(crate) version: u64,

    match_index: MatchIndex,
    sub_index: MatchIndex,
    output_lines: Vec<Vec<vre_model::Line>>,
    match_lines: Vec<Vec<usize>>,
}

impl EngineState {
    /// Applies a new query. An empty or uncompilable query clears the
    /// program and resets the cursor — no scanning happens until a valid
    /// query arrives. A query whose version supersedes the one already
    /// installed resets the cursor to the start and discards whatever had
    /// accumulated for the stale version; a query at or behind the current
    /// version is ignored (it arrived out of order and is already stale).
    pub(crate) fn update_program(&mut self, query: Query) {
        let compiled = if query.is_empty() {
            None
        } else {
            Program::compile(&query.input)
        };

        let Some(program) = compiled else {
            if !query.is_empty() {
                tracing::debug!(
                    target: "engine",
                    error = %vre_model::VreError::InvalidQuery,
                    query = %query.input,
                    "query rejected"
                );
            }
            self.program = None;
            self.curr_doc = 0;
            self.curr_chunk = 0;
            return;
        };

        if self.version >= query.version {
            return;
        }
        self.version = query.version;
        self.program = Some(program);
        self.curr_doc = 0;
        self.curr_chunk = 0;
        for lines in self.output_lines.iter_mut() {
            lines.clear();
        }
        for lines in self.match_lines.iter_mut() {
            lines.clear();
        }
    }

    /// If the current document is exhausted but a later one exists, moves
    /// the cursor to the start of the next document. Returns whether the
    /// scan loop should stop for this pass (no corpus, no program, or the
    /// cursor has reached the logical end of the last document).
    pub(crate) fn advance_past_exhausted_doc(&mut self) -> bool {
        if self.corpus.is_empty() {
            return true;
        }
        let last = self.corpus.len() - 1;
        if self.curr_doc < last
            && self.curr_chunk == self.corpus.doc(self.curr_doc).unwrap().chunks.len()
        {
            self.curr_doc += 1;
            self.curr_chunk = 0;
        }
        false
    }

    pub(crate) fn at_scan_end(&self) -> bool {
        self.program.is_none() || self.at_logical_end()
    }

    /// True when there is nothing left to scan: either no corpus is known
    /// yet, or the cursor has reached one past the last chunk of the last
    /// document. A cleared program (no query installed) is treated as
    /// logically exhausted too, so that committing with an empty query
    /// terminates immediately instead of waiting on a scan that can never
    /// run.
    pub(crate) fn at_logical_end(&self) -> bool {
        if self.program.is_none() {
            return true;
        }
        match self.corpus.doc(self.curr_doc) {
            Some(doc) => {
                self.curr_doc == self.corpus.len() - 1 && self.curr_chunk == doc.chunks.len()
            }
            None => true,
        }
    }

    /// Scans the chunk at the cursor, advances the chunk cursor by one, and
    /// returns whether that was the last chunk of its document (used to
    /// decide whether a progress snapshot is due regardless of the 50-chunk
    /// cadence).
    pub(crate) fn scan_one_chunk(&mut self) -> bool {
        let program = self.program.as_ref().expect("scan_one_chunk requires a program");
        let doc_idx = self.curr_doc;
        let chunk_idx = self.curr_chunk;
        let doc = self.corpus.doc(doc_idx).expect("cursor doc out of range");
        let chunk = doc.chunks[chunk_idx].clone();

        self.ensure_doc_allocated(doc_idx + 1);

        let mut bounds = ChunkBounds::with_capacity(chunk.len());
        let mut sub_bounds = ChunkBounds::with_capacity(chunk.len());

        for i in 0..chunk.len() {
            let line = chunk.line(i).expect("slot within chunk length");
            if program.has_replace() {
                if let Some((old, new, new_line)) = program.replace(line) {
                    bounds.set(i, Some(old));
                    sub_bounds.set(i, Some(new));
                    self.output_lines[doc_idx].push(Arc::from(new_line));
                    self.match_lines[doc_idx].push(chunk_idx * vre_model::CHUNK_SIZE + i);
                }
            } else if let Some(m) = program.find(line) {
                bounds.set(i, Some(m));
                self.output_lines[doc_idx].push(line.clone());
                self.match_lines[doc_idx].push(chunk_idx * vre_model::CHUNK_SIZE + i);
            }
        }

        self.match_index.docs[doc_idx].chunks.push(bounds);
        self.sub_index.docs[doc_idx].chunks.push(sub_bounds);
        self.curr_chunk += 1;

        self.curr_chunk == doc.chunks.len()
    }

    fn ensure_doc_allocated(&mut self, count: usize) {
        while self.match_index.docs.len() < count {
            self.match_index.docs.push(DocBounds::default());
            self.sub_index.docs.push(DocBounds::default());
            self.output_lines.push(Vec::new());
            self.match_lines.push(Vec::new());
        }
    }

    /// A point-in-time copy of progress so far: everything strictly before
    /// the scan cursor is included, nothing at or after it is — the
    /// Terminal must never see a half-written chunk.
    pub(crate) fn snapshot(&self) -> SearchResult {
        let replace = self.program.as_ref().is_some_and(Program::has_replace);
        let mut bounds = MatchIndex::default();
        for (doc_idx, doc_bounds) in self.match_index.docs.iter().enumerate() {
            let visible_chunks = if doc_idx < self.curr_doc {
                doc_bounds.chunks.len()
            } else if doc_idx == self.curr_doc {
                self.curr_chunk
            } else {
                break;
            };
            bounds.docs.push(DocBounds {
                chunks: doc_bounds.chunks[..visible_chunks].to_vec(),
            });
        }

        let sub_bounds = if replace { Some(self.sub_index.clone()) } else { None };

        SearchResult {
            version: self.version,
            replace,
            bounds,
            sub_bounds,
            output_lines: self.output_lines.clone(),
            match_lines: self.match_lines.clone(),
        }
    }

    /// The final result sent over the done-channel: every accumulated
    /// output line, in document order, regardless of cursor position (by
    /// termination time the cursor has reached the end of every document).
    pub(crate) fn finish_output(&self) -> Output {
        Output {
            replace: self.program.as_ref().is_some_and(Program::has_replace),
            output_lines: self.output_lines.clone(),
        }
    }
}
