use std::sync::Arc;
use std::time::Duration;

use vre_engine::Engine;
use vre_events::MainEventBox;
use vre_model::{Chunk, CorpusSnapshot, Document, InputOrigin, Query};

fn doc_with_lines(filename: &str, lines: &[&str]) -> Document {
    let mut doc = Document::new(filename);
    let mut chunk = Chunk::new();
    for line in lines {
        chunk.push(Arc::from(line.as_bytes().to_vec()));
        if chunk.is_full() {
            doc.push_chunk(std::mem::replace(&mut chunk, Chunk::new()));
        }
    }
    if !chunk.is_empty() {
        doc.push_chunk(chunk);
    }
    doc.is_final = true;
    doc
}

fn corpus(docs: Vec<Document>) -> CorpusSnapshot {
    CorpusSnapshot::new(docs.into_iter().map(Arc::new).collect(), InputOrigin::Files)
}

/// A burst of queries fired faster than the Engine can finish scanning the
/// first of them must still converge on the last one: the final Output
/// reflects only the last-installed pattern, never an intermediate one.
#[test]
fn rapid_query_edits_coalesce_to_the_last_version() {
    let main_box = Arc::new(MainEventBox::new());
    let (engine, _handle, done_rx) = Engine::spawn(Arc::clone(&main_box));

    engine.update_corpus(
        corpus(vec![doc_with_lines("f.txt", &["a", "b", "ab", "abc"])]),
        true,
    );
    engine.update_program(Query::new("x/a/i", 1));
    engine.update_program(Query::new("x/b/i", 2));
    engine.update_program(Query::new("x/abc/i", 3));
    engine.finish();

    let output = done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(output.output_lines[0].len(), 1);
    assert_eq!(&*output.output_lines[0][0], b"abc");
}

/// The final Output only ever contains matches from chunks the Reader
/// actually published before `ReadDone` — later chunks (simulated here by
/// never appending a second document) cannot leak into it.
#[test]
fn final_output_reflects_only_published_chunks() {
    let main_box = Arc::new(MainEventBox::new());
    let (engine, _handle, done_rx) = Engine::spawn(Arc::clone(&main_box));

    let mut first_batch = Vec::new();
    for i in 0..vre_model::CHUNK_SIZE {
        first_batch.push(format!("line{i}"));
    }
    let refs: Vec<&str> = first_batch.iter().map(String::as_str).collect();
    engine.update_corpus(corpus(vec![doc_with_lines("f.txt", &refs)]), false);
    engine.update_program(Query::new("x/line0$/i", 1));

    // Reader never appends a second chunk; only ReadDone (final_doc) follows.
    engine.update_corpus(corpus(vec![doc_with_lines("f.txt", &refs)]), true);
    engine.finish();

    let output = done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(output.output_lines[0].len(), 1);
    assert_eq!(&*output.output_lines[0][0], b"line0");
}
