//! The Terminal: reads the TTY, drives the query/scroll state, and renders
//! the visible window to stderr.

mod backend;
pub mod keymap;
pub mod render;

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::terminal;

use keymap::Action;
use render::{LineStyle, DEFAULT_STYLE, HEADER_STYLE};
use vre_events::{EventKind, EventPayload, MainEventBox};
use vre_model::{CorpusSnapshot, Query, SearchResult};

struct TerminalState {
    pos_y: usize,
    pos_x: usize,
    offset: usize,
    query: String,
    version: u64,
    corpus: CorpusSnapshot,
    result: Option<Arc<SearchResult>>,
    hide: bool,
    displayed: bool,
    prompt: String,
    width: u16,
    height: u16,
}

impl Default for TerminalState {
    fn default() -> Self {
        Self {
            pos_y: 0,
            pos_x: 0,
            offset: 0,
            query: String::new(),
            version: 0,
            corpus: CorpusSnapshot::default(),
            result: None,
            hide: false,
            displayed: true,
            prompt: String::new(),
            width: 80,
            height: 24,
        }
    }
}

/// One row of the visible window: either a filename header (multi-file
/// corpora only) or a reference to a specific document/line.
enum Row {
    Header(String),
    Line { doc: usize, line: usize },
}

pub struct Terminal {
    main_box: Arc<MainEventBox>,
    state: Mutex<TerminalState>,
    stop: AtomicBool,
}

impl Terminal {
    /// Enters raw mode / the alternate screen and starts the input-reading
    /// loop on its own thread. The returned `JoinHandle` only completes once
    /// the loop has decoded `Abort` or `Commit`, errored opening the
    /// terminal, or [`Terminal::shutdown`] was called — the Dispatcher joins
    /// it as its "close the Terminal" step so the TTY guard's `Drop` always
    /// runs before stdout is written.
    pub fn spawn(main_box: Arc<MainEventBox>) -> (Arc<Terminal>, JoinHandle<()>) {
        let terminal = Arc::new(Terminal {
            main_box,
            state: Mutex::new(TerminalState::default()),
            stop: AtomicBool::new(false),
        });
        let handle = {
            let terminal = Arc::clone(&terminal);
            thread::spawn(move || terminal.run())
        };
        (terminal, handle)
    }

    /// Requests that the input loop exit even though it never itself
    /// decoded `Abort`/`Commit` — used when the Dispatcher aborts for a
    /// reason the Terminal has no visibility into (a `ReadError`). The loop
    /// polls for this between blocking reads rather than picking it up
    /// immediately, so callers should still join the handle to wait for the
    /// TTY guard to actually drop.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    fn run(self: Arc<Self>) {
        let guard = match backend::TerminalGuard::enter() {
            Ok(guard) => guard,
            Err(err) => {
                let failure = vre_model::VreError::TtyFailure { message: err.to_string() };
                tracing::error!(target: "terminal", %err, error = %failure, "failed to enter raw mode");
                self.main_box.put(EventKind::Quit, EventPayload::Text(failure.to_string()));
                return;
            }
        };

        if let Ok((w, h)) = terminal::size() {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.width = w;
            state.height = h;
        }
        self.render();

        loop {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            let ready = match crossterm::event::poll(Duration::from_millis(100)) {
                Ok(ready) => ready,
                Err(err) => {
                    let failure = vre_model::VreError::TtyFailure { message: err.to_string() };
                    tracing::warn!(target: "terminal", %err, error = %failure, "poll failed, aborting");
                    self.main_box.put(EventKind::Quit, EventPayload::Text(failure.to_string()));
                    break;
                }
            };
            if !ready {
                continue;
            }
            let event = match crossterm::event::read() {
                Ok(event) => event,
                Err(err) => {
                    let failure = vre_model::VreError::TtyFailure { message: err.to_string() };
                    tracing::warn!(target: "terminal", %err, error = %failure, "read failed, aborting");
                    self.main_box.put(EventKind::Quit, EventPayload::Text(failure.to_string()));
                    break;
                }
            };

            match keymap::decode(event) {
                Action::Abort => {
                    self.main_box.put(EventKind::Quit, EventPayload::None);
                    break;
                }
                Action::Commit => {
                    self.main_box.put(EventKind::SearchFinal, EventPayload::None);
                    break;
                }
                Action::Resize(w, h) => {
                    let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                    state.width = w;
                    state.height = h;
                    drop(state);
                    self.render();
                }
                Action::ScrollDown => self.scroll_vertical(1),
                Action::ScrollUp => self.scroll_vertical(-1),
                Action::PageDown => self.scroll_vertical(self.page_size() as isize),
                Action::PageUp => self.scroll_vertical(-(self.page_size() as isize)),
                Action::ScrollLeft => self.scroll_horizontal(-1),
                Action::ScrollRight => self.scroll_horizontal(1),
                Action::ToggleHide => {
                    let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
                    state.hide = !state.hide;
                    drop(state);
                    self.render();
                }
                Action::CursorLeft => self.move_cursor(1),
                Action::CursorRight => self.move_cursor(-1),
                Action::Backspace => self.edit_query(|s, offset| {
                    let at = s.len() - offset;
                    if at > 0 {
                        s.remove(at - 1);
                        true
                    } else {
                        false
                    }
                }),
                Action::DeleteForward => self.delete_forward(),
                Action::Insert(c) => self.edit_query(move |s, offset| {
                    let at = s.len() - offset;
                    s.insert(at, c);
                    true
                }),
                Action::None => {}
            }
        }

        drop(guard);
    }

    fn page_size(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        (state.height.saturating_sub(1) as usize).max(1)
    }

    fn scroll_vertical(&self, delta: isize) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let max = total_rows(&state.corpus).saturating_sub(1);
        state.pos_y = clamp_scroll(state.pos_y, delta, max);
        drop(state);
        self.render();
    }

    fn scroll_horizontal(&self, delta: isize) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.pos_x = clamp_scroll(state.pos_x, delta, usize::MAX);
        drop(state);
        self.render();
    }

    fn move_cursor(&self, delta: isize) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let len = state.query.len();
        state.offset = clamp_scroll(state.offset, delta, len);
        drop(state);
        self.render();
    }

    /// Applies `edit` to the query string (given the current offset from
    /// the right), and if it reports a change, bumps `version` and emits
    /// `SearchNew`.
    fn edit_query(&self, edit: impl FnOnce(&mut String, usize) -> bool) {
        let query = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if !edit(&mut state.query, state.offset) {
                return;
            }
            state.version += 1;
            Query::new(state.query.clone(), state.version)
        };
        self.render();
        self.main_box
            .put(EventKind::SearchNew, EventPayload::Query(query));
    }

    /// Forward-delete removes the char right after the cursor, which
    /// shrinks the right-hand character count the cursor `offset` tracks —
    /// unlike backspace/insert, it must adjust `offset` as well.
    fn delete_forward(&self) {
        let query = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.offset == 0 {
                return;
            }
            let at = state.query.len() - state.offset;
            state.query.remove(at);
            state.offset -= 1;
            state.version += 1;
            Query::new(state.query.clone(), state.version)
        };
        self.render();
        self.main_box
            .put(EventKind::SearchNew, EventPayload::Query(query));
    }

    /// `update_corpus` triggers a full refresh only when new chunks cause
    /// the visible window's end to become populated; otherwise only the
    /// match count in the prompt would change, and that is redrawn anyway
    /// on the next result/event.
    pub fn update_corpus(&self, snapshot: CorpusSnapshot, _final_doc: bool) {
        let should_render = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            let was_covered = total_rows(&state.corpus) >= state.pos_y + visible_height(&state);
            state.corpus = snapshot;
            !was_covered
        };
        if should_render {
            self.render();
        }
    }

    /// `update_result` sets `displayed = false` on a version bump, then
    /// refreshes the first time either the visible window is covered by
    /// what has been scanned, or scanning of the whole corpus is done.
    pub fn update_result(&self, result: Arc<SearchResult>) {
        let should_render = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if result.version != state.version_seen() {
                state.displayed = false;
            }
            let covers_window = result_covers_window(&result, &state);
            state.result = Some(result);
            if !state.displayed && covers_window {
                state.displayed = true;
                true
            } else {
                false
            }
        };
        if should_render {
            self.render();
        }
    }

    pub fn clear_result(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.result = None;
        state.displayed = true;
        drop(state);
        self.render();
    }

    pub fn update_prompt(&self, text: String) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.prompt = text;
        drop(state);
        self.render();
    }

    fn render(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut buf = String::from("\x1b[H");
        buf.push_str(&self.render_prompt(&state));
        buf.push_str("\r\n");

        let rows = visible_rows(&state);
        for row in rows {
            buf.push_str(&self.render_row(&state, &row));
            buf.push_str("\r\n");
        }
        drop(state);
        let _ = write!(std::io::stderr(), "{buf}");
        let _ = std::io::stderr().flush();
    }

    fn render_prompt(&self, state: &TerminalState) -> String {
        let count = state
            .result
            .as_ref()
            .map(|r| r.match_lines.iter().map(Vec::len).sum::<usize>())
            .unwrap_or(0);
        if state.prompt.is_empty() {
            format!("{count} {}", state.query)
        } else {
            format!("{count} {} [{}]", state.query, state.prompt)
        }
    }

    fn render_row(&self, state: &TerminalState, row: &Row) -> String {
        match row {
            Row::Header(name) => format!("{HEADER_STYLE}{name}\x1b[0m"),
            Row::Line { doc, line } => self.render_line_row(state, *doc, *line),
        }
    }

    fn render_line_row(&self, state: &TerminalState, doc: usize, line: usize) -> String {
        let width = state.width as usize;
        let Some(document) = state.corpus.doc(doc) else {
            return String::new();
        };
        let Some(bytes) = document.line_at(line) else {
            return String::new();
        };
        let bytes: &[u8] = bytes;

        let replace = state.result.as_ref().is_some_and(|r| r.replace);
        let interval = state.result.as_ref().and_then(|r| r.bound_at(doc, line));

        if replace {
            let sub_interval = state.result.as_ref().and_then(|r| r.sub_bound_at(doc, line));
            let substituted = state
                .result
                .as_ref()
                .and_then(|r| match_output_line(r, doc, line))
                .unwrap_or(bytes);
            render::render_split(
                bytes,
                interval,
                substituted,
                sub_interval,
                width,
                &DEFAULT_STYLE,
            )
        } else {
            render::render_line(bytes, interval, state.pos_x, state.pos_x + width, &style_for(state))
        }
    }
}

fn style_for(_state: &TerminalState) -> LineStyle {
    DEFAULT_STYLE
}

/// Finds the output line recorded for `(doc, global_line)`, if that line
/// has been scanned and matched — `match_lines`/`output_lines` are
/// parallel, so the position in one gives the position in the other.
fn match_output_line<'a>(result: &'a SearchResult, doc: usize, global_line: usize) -> Option<&'a [u8]> {
    let idx = result.match_lines_for(doc).iter().position(|&l| l == global_line)?;
    result.output_lines_for(doc).get(idx).map(|l| &**l)
}

impl TerminalState {
    fn version_seen(&self) -> u64 {
        self.result.as_ref().map(|r| r.version).unwrap_or(0)
    }
}

fn visible_height(state: &TerminalState) -> usize {
    (state.height.saturating_sub(1) as usize).max(1)
}

fn total_rows(corpus: &CorpusSnapshot) -> usize {
    let multi = corpus.is_multi_file();
    corpus
        .documents()
        .iter()
        .map(|d| d.num_lines + usize::from(multi))
        .sum()
}

fn result_covers_window(result: &SearchResult, state: &TerminalState) -> bool {
    let scanned: usize = result.bounds.docs.iter().map(|d| d.chunks.len()).sum();
    let total_chunks: usize = state
        .corpus
        .documents()
        .iter()
        .map(|d| d.chunks.len())
        .sum();
    scanned >= total_chunks || (state.pos_y + visible_height(state)) / vre_model::CHUNK_SIZE <= scanned
}

fn visible_rows(state: &TerminalState) -> Vec<Row> {
    let multi = state.corpus.is_multi_file();
    let mut rows = Vec::new();

    if state.hide {
        if let Some(result) = &state.result {
            for (d, doc) in state.corpus.documents().iter().enumerate() {
                let lines = result.match_lines_for(d);
                if lines.is_empty() {
                    continue;
                }
                if multi {
                    rows.push(Row::Header(doc.filename.clone()));
                }
                rows.extend(lines.iter().map(|&line| Row::Line { doc: d, line }));
            }
        }
    } else {
        for (d, doc) in state.corpus.documents().iter().enumerate() {
            if multi {
                rows.push(Row::Header(doc.filename.clone()));
            }
            rows.extend((0..doc.num_lines).map(|line| Row::Line { doc: d, line }));
        }
    }

    let height = visible_height(state);
    rows.into_iter().skip(state.pos_y).take(height).collect()
}

fn clamp_scroll(current: usize, delta: isize, max: usize) -> usize {
    let next = current as isize + delta;
    next.clamp(0, max as isize) as usize
}
