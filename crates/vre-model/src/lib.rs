//! Shared data model for the visual-regex-explorer pipeline: the append-only
//! document/chunk/line hierarchy, the versioned query, and the error kinds
//! the rest of the workspace builds on.

pub mod chunk;
pub mod constants;
pub mod corpus;
pub mod document;
pub mod error;
pub mod line;
pub mod query;
pub mod results;

pub use chunk::Chunk;
pub use constants::{CHUNK_SIZE, PROGRESS_INTERVAL_CHUNKS, TABSTOP};
pub use corpus::{CorpusSnapshot, InputOrigin};
pub use document::Document;
pub use error::VreError;
pub use line::Line;
pub use query::Query;
pub use results::{ChunkBounds, DocBounds, Interval, MatchIndex, Output, SearchResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_accumulates_up_to_capacity() {
        let mut chunk = Chunk::new();
        chunk.push(line::line_from(b"a".to_vec()));
        chunk.push(line::line_from(b"b".to_vec()));
        assert_eq!(chunk.len(), 2);
        assert!(!chunk.is_full());
    }

    #[test]
    fn document_line_at_crosses_chunk_boundary() {
        let mut doc = Document::new("f.txt");
        let mut chunk = Chunk::new();
        for i in 0..CHUNK_SIZE + 3 {
            chunk.push(line::line_from(format!("line{i}").into_bytes()));
            if chunk.is_full() {
                doc.push_chunk(std::mem::replace(&mut chunk, Chunk::new()));
            }
        }
        if !chunk.is_empty() {
            doc.push_chunk(chunk);
        }
        assert_eq!(doc.num_lines, CHUNK_SIZE + 3);
        assert_eq!(&**doc.line_at(0).unwrap(), b"line0");
        assert_eq!(
            &**doc.line_at(CHUNK_SIZE).unwrap(),
            format!("line{CHUNK_SIZE}").as_bytes()
        );
    }

    #[test]
    fn corpus_snapshot_is_shallow() {
        let doc = std::sync::Arc::new(Document::new("a.txt"));
        let snap = CorpusSnapshot::new(vec![doc.clone()], InputOrigin::Files);
        assert_eq!(snap.len(), 1);
        assert!(snap.is_multi_file());
        assert_eq!(std::sync::Arc::strong_count(&doc), 2);
    }

    #[test]
    fn query_version_is_carried() {
        let q = Query::new("abc", 5);
        assert_eq!(q.version, 5);
        assert!(!q.is_empty());
    }

    #[test]
    fn chunk_bounds_default_to_no_match() {
        let mut bounds = results::ChunkBounds::with_capacity(3);
        bounds.set(1, Some(results::Interval::new(2, 5)));
        assert_eq!(bounds.get(0), None);
        assert_eq!(bounds.get(1), Some(results::Interval::new(2, 5)));
        assert_eq!(bounds.get(2), None);
    }
}
