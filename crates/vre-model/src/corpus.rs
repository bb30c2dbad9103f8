use crate::document::Document;
use std::sync::Arc;

/// How the corpus was fed to the Reader. Determines whether output lines
/// are prefixed with their filename on commit: a single named file still
/// gets a `filename:line` prefix, a piped stream never does, regardless of
/// document count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputOrigin {
    #[default]
    PipedStream,
    Files,
}

/// A point-in-time, cheap-to-clone view of every [`Document`] known so far.
///
/// Producing one only clones the outer `Vec<Arc<Document>>`; the documents
/// (and, transitively, their chunks and lines) are shared.
#[derive(Debug, Clone, Default)]
pub struct CorpusSnapshot {
    documents: Vec<Arc<Document>>,
    origin: InputOrigin,
}

impl CorpusSnapshot {
    pub fn new(documents: Vec<Arc<Document>>, origin: InputOrigin) -> Self {
        Self { documents, origin }
    }

    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn doc(&self, idx: usize) -> Option<&Arc<Document>> {
        self.documents.get(idx)
    }

    /// True once every document known to this snapshot has had its source
    /// stream close.
    pub fn all_final(&self) -> bool {
        !self.documents.is_empty() && self.documents.iter().all(|d| d.is_final)
    }

    /// True when output lines must be prefixed with their filename.
    pub fn is_multi_file(&self) -> bool {
        self.origin == InputOrigin::Files
    }
}
