//! The Reader: ingests a piped stream or a sequence of named files into an
//! append-only list of [`vre_model::Document`]s, publishing `ReadNew` /
//! `ReadDone` / `ReadError` on the shared main [`EventBox`] as it goes.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use vre_events::{EventKind, EventPayload, MainEventBox};
use vre_model::{Chunk, CorpusSnapshot, Document, InputOrigin};

const READ_BUFFER_BYTES: usize = 64 * 1024;

struct ReaderState {
    documents: Vec<Document>,
    origin: InputOrigin,
}

/// Owns the append-only document list; runs its ingestion on a dedicated
/// thread per call to [`Reader::read_stream`] / [`Reader::read_files`].
pub struct Reader {
    main_box: Arc<MainEventBox>,
    state: Mutex<ReaderState>,
}

impl Reader {
    pub fn new(main_box: Arc<MainEventBox>) -> Arc<Self> {
        Arc::new(Self {
            main_box,
            state: Mutex::new(ReaderState {
                documents: Vec::new(),
                origin: InputOrigin::PipedStream,
            }),
        })
    }

    /// Returns a cheap, shallow copy of the current document list.
    pub fn snapshot(&self) -> CorpusSnapshot {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        CorpusSnapshot::new(
            state.documents.iter().map(|d| Arc::new(d.clone())).collect(),
            state.origin,
        )
    }

    /// Streams a single piped input (stdin) into one Document with an empty
    /// filename. Emits `ReadNew` as chunks fill and `ReadDone` on EOF.
    pub fn read_stream<R>(self: &Arc<Self>, stream: R) -> JoinHandle<()>
    where
        R: Read + Send + 'static,
    {
        let reader = Arc::clone(self);
        {
            let mut state = reader.state.lock().unwrap_or_else(|e| e.into_inner());
            state.origin = InputOrigin::PipedStream;
            state.documents.push(Document::new(""));
        }
        thread::spawn(move || {
            reader.stream_into(0, stream);
            {
                let mut state = reader.state.lock().unwrap_or_else(|e| e.into_inner());
                state.documents[0].is_final = true;
            }
            tracing::debug!(target: "reader", "piped stream exhausted");
            reader
                .main_box
                .put(EventKind::ReadDone, EventPayload::None);
        })
    }

    /// Opens and streams each of `paths` in order. A file that fails to
    /// open still gets an (empty) Document and still participates in the
    /// `ReadNew`/`ReadDone` sequencing — only `ReadError` additionally fires
    /// for it, so one bad path never stops the rest from being read.
    pub fn read_files(self: &Arc<Self>, paths: Vec<PathBuf>) -> JoinHandle<()> {
        let reader = Arc::clone(self);
        {
            let mut state = reader.state.lock().unwrap_or_else(|e| e.into_inner());
            state.origin = InputOrigin::Files;
        }
        thread::spawn(move || {
            let last = paths.len().saturating_sub(1);
            for (i, path) in paths.into_iter().enumerate() {
                let filename = path.display().to_string();
                let doc_idx = {
                    let mut state = reader.state.lock().unwrap_or_else(|e| e.into_inner());
                    state.documents.push(Document::new(filename.clone()));
                    state.documents.len() - 1
                };

                match File::open(&path) {
                    Ok(file) => {
                        reader.stream_into(doc_idx, file);
                    }
                    Err(err) => {
                        let failure = vre_model::VreError::FileOpenFailure { path: path.clone() };
                        tracing::warn!(target: "reader", file = %filename, %err, error = %failure, "open failed");
                        reader
                            .main_box
                            .put(EventKind::ReadError, EventPayload::Path(path.clone()));
                    }
                }

                {
                    let mut state = reader.state.lock().unwrap_or_else(|e| e.into_inner());
                    state.documents[doc_idx].is_final = true;
                }

                if i == last {
                    reader
                        .main_box
                        .put(EventKind::ReadDone, EventPayload::None);
                } else {
                    reader.main_box.put(EventKind::ReadNew, EventPayload::None);
                }
            }
        })
    }

    fn stream_into<R: Read>(&self, doc_idx: usize, stream: R) {
        let mut buf = BufReader::with_capacity(READ_BUFFER_BYTES, stream);
        let mut chunk = Chunk::new();

        loop {
            let mut raw = Vec::new();
            match buf.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => {
                    if raw.last() == Some(&b'\n') {
                        raw.pop();
                        if raw.last() == Some(&b'\r') {
                            raw.pop();
                        }
                    }
                    chunk.push(Arc::from(raw));
                    if chunk.is_full() {
                        self.publish_chunk(doc_idx, std::mem::replace(&mut chunk, Chunk::new()));
                        self.main_box.put(EventKind::ReadNew, EventPayload::None);
                    }
                }
                Err(err) => {
                    tracing::warn!(target: "reader", %err, "read failed, treating as eof");
                    break;
                }
            }
        }

        if !chunk.is_empty() {
            self.publish_chunk(doc_idx, chunk);
        }
    }

    fn publish_chunk(&self, doc_idx: usize, chunk: Chunk) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.documents[doc_idx].push_chunk(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;

    fn new_reader() -> Arc<Reader> {
        Reader::new(Arc::new(MainEventBox::new()))
    }

    #[test]
    fn read_stream_produces_one_document() {
        let reader = new_reader();
        let handle = reader.read_stream(Cursor::new(b"foo\nbar\nfoobar\n".to_vec()));
        handle.join().unwrap();

        let snap = reader.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(!snap.is_multi_file());
        let doc = snap.doc(0).unwrap();
        assert_eq!(doc.num_lines, 3);
        assert_eq!(&**doc.line_at(0).unwrap(), b"foo");
        assert_eq!(&**doc.line_at(2).unwrap(), b"foobar");
    }

    #[test]
    fn final_line_without_trailing_newline_is_kept() {
        let reader = new_reader();
        let handle = reader.read_stream(Cursor::new(b"a\nb".to_vec()));
        handle.join().unwrap();

        let snap = reader.snapshot();
        let doc = snap.doc(0).unwrap();
        assert_eq!(doc.num_lines, 2);
        assert_eq!(&**doc.line_at(1).unwrap(), b"b");
    }

    #[test]
    fn read_files_reads_in_argument_order_and_prefixes_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        File::create(&a).unwrap().write_all(b"x\ny\n").unwrap();
        File::create(&b).unwrap().write_all(b"x\n").unwrap();

        let reader = new_reader();
        let handle = reader.read_files(vec![a, b]);
        handle.join().unwrap();

        let snap = reader.snapshot();
        assert!(snap.is_multi_file());
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.doc(0).unwrap().filename.ends_with("a.txt"), true);
        assert_eq!(snap.doc(1).unwrap().filename.ends_with("b.txt"), true);
        assert_eq!(snap.doc(0).unwrap().num_lines, 2);
        assert_eq!(snap.doc(1).unwrap().num_lines, 1);
    }

    #[test]
    fn open_failure_emits_read_error_but_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let present = dir.path().join("present.txt");
        File::create(&present).unwrap().write_all(b"hi\n").unwrap();

        let main_box = Arc::new(MainEventBox::new());
        let reader = Reader::new(main_box.clone());
        let handle = reader.read_files(vec![missing.clone(), present]);
        handle.join().unwrap();

        main_box.wait(|events| {
            let path = events
                .get(&EventKind::ReadError)
                .and_then(|p| p.as_path())
                .unwrap();
            assert_eq!(path, &missing);
            events.clear();
        });

        let snap = reader.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.doc(0).unwrap().num_lines, 0);
        assert_eq!(snap.doc(1).unwrap().num_lines, 1);
    }

    #[test]
    fn chunk_boundary_publishes_read_new_before_completion() {
        let mut input = Vec::new();
        for i in 0..(vre_model::CHUNK_SIZE + 5) {
            input.extend_from_slice(format!("line{i}\n").as_bytes());
        }
        let reader = new_reader();
        let handle = reader.read_stream(Cursor::new(input));
        handle.join().unwrap();

        let snap = reader.snapshot();
        let doc = snap.doc(0).unwrap();
        assert_eq!(doc.chunks.len(), 2);
        assert_eq!(doc.num_lines, vre_model::CHUNK_SIZE + 5);
    }
}
