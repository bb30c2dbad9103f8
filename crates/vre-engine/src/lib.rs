//! The Engine: incrementally scans the corpus against the latest compiled
//! [`vre_regex::Program`], publishing progress on the main box and a final
//! [`Output`] over a done-channel when the user commits.

mod state;

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use vre_events::{EventKind, EventPayload, MainEventBox};
use vre_model::{CorpusSnapshot, Output, Query};

use state::EngineState;

/// The local wake-up box's vocabulary: the Engine only ever needs to know
/// that *something* changed (new chunks, a new program, or a commit), never
/// what — the scan loop re-reads its own state under lock on every wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Wake {
    Changed,
}

type LocalBox = vre_events::EventBox<Wake, ()>;

/// Owns the scan state; runs the scan loop on a dedicated thread started by
/// [`Engine::spawn`].
pub struct Engine {
    local_box: LocalBox,
    state: Mutex<EngineState>,
}

impl Engine {
    /// Starts the scan loop on its own thread and returns the shared handle
    /// used to feed it corpus/query updates, the thread's `JoinHandle`, and
    /// the receiving end of the done-channel the final [`Output`] arrives
    /// on.
    pub fn spawn(main_box: Arc<MainEventBox>) -> (Arc<Engine>, JoinHandle<()>, Receiver<Output>) {
        let engine = Arc::new(Engine {
            local_box: LocalBox::new(),
            state: Mutex::new(EngineState::default()),
        });
        let (done_tx, done_rx) = crossbeam_channel::bounded(0);
        let handle = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.run(main_box, done_tx))
        };
        (engine, handle, done_rx)
    }

    /// Records a new corpus snapshot. `final` marks that the Reader will
    /// never append another document or chunk.
    pub fn update_corpus(&self, snapshot: CorpusSnapshot, final_doc: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.corpus = snapshot;
        state.final_doc |= final_doc;
        self.wake(&mut state);
    }

    /// Parses and compiles `query.input`. An empty or invalid query clears
    /// the active program and pauses scanning; a newer version than the one
    /// currently installed resets the scan cursors and the accumulated
    /// output, then wakes the scan loop.
    pub fn update_program(&self, query: Query) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.update_program(query);
        self.wake(&mut state);
    }

    /// Marks that the user has committed; the scan loop will exit and send
    /// its final `Output` once the Reader has also finished and the cursors
    /// have caught up to the end of the corpus.
    pub fn finish(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.final_engine = true;
        self.wake(&mut state);
    }

    fn wake(&self, state: &mut EngineState) {
        if state.asleep {
            state.asleep = false;
            self.local_box.put(Wake::Changed, ());
        }
    }

    fn run(self: Arc<Self>, main_box: Arc<MainEventBox>, done_tx: Sender<Output>) {
        let mut done = false;
        while !done {
            let mut scanned_since_progress = 0usize;
            loop {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                if state.advance_past_exhausted_doc() || state.at_scan_end() {
                    break;
                }
                let chunk_is_last_in_doc = state.scan_one_chunk();
                scanned_since_progress += 1;

                if scanned_since_progress % 50 == 0 || chunk_is_last_in_doc {
                    let snapshot = state.snapshot();
                    drop(state);
                    main_box.put(
                        EventKind::SearchProgress,
                        EventPayload::SearchResult(Arc::new(snapshot)),
                    );
                } else {
                    drop(state);
                }
            }

            {
                let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                state.asleep = true;
            }
            self.local_box.wait(|events| {
                events.clear();
            });
            {
                let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                if state.final_doc && state.final_engine {
                    done = state.at_logical_end();
                }
            }
        }

        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let output = state.finish_output();
        drop(state);
        // The dispatcher is always waiting on the other end by the time the
        // loop reaches this point (it only starts waiting after sending
        // `SearchFinal`), so this send never blocks indefinitely.
        let _ = done_tx.send(output);
    }
}
