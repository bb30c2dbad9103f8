use std::path::PathBuf;
use std::sync::Arc;
use vre_model::{Query, SearchResult};

/// Discriminant used as the coalescing key in an [`crate::EventBox`].
///
/// Distinct from the payload on purpose: `put`ting the same kind twice
/// between two `wait`s must collapse to the latest payload, which requires
/// keying on something smaller and `Eq`/`Hash` than the payload itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ReadNew,
    ReadDone,
    ReadError,
    SearchNew,
    SearchFinal,
    SearchProgress,
    Quit,
    /// Reserved: a host embedding this core may want to annotate the prompt
    /// without a model change. Unused by the CLI binary.
    Heartbeat,
}

/// The payload carried by one event kind. `SearchNew` carries a `Query`,
/// `SearchProgress` an `Arc<SearchResult>` (cheap to clone across the box
/// and to the Terminal), `ReadError` the offending path, `Heartbeat` free
/// text, `Quit` an optional diagnostic (set when the quit was forced by a
/// fatal TTY failure rather than a normal user abort); the rest carry no
/// data.
#[derive(Debug, Clone)]
pub enum EventPayload {
    None,
    Path(PathBuf),
    Query(Query),
    SearchResult(Arc<SearchResult>),
    Text(String),
}

impl EventPayload {
    pub fn as_path(&self) -> Option<&PathBuf> {
        match self {
            EventPayload::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_query(self) -> Option<Query> {
        match self {
            EventPayload::Query(q) => Some(q),
            _ => None,
        }
    }

    pub fn into_search_result(self) -> Option<Arc<SearchResult>> {
        match self {
            EventPayload::SearchResult(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            EventPayload::Text(t) => Some(t),
            _ => None,
        }
    }
}
