//! `vre` entrypoint: wires the Reader, Engine, and Terminal to the shared
//! main EventBox and runs the Dispatcher loop described in the design docs.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use vre_engine::Engine;
use vre_events::{EventKind, EventPayload, MainEventBox};
use vre_reader::Reader;
use vre_terminal::Terminal;

/// Interactive visual regex explorer over piped input or a list of files.
#[derive(Parser, Debug)]
#[command(name = "vre", version, about = "Interactive visual regex explorer")]
struct Args {
    /// Files to search, in order. With none given, standard input must be a
    /// pipe and is treated as the sole document.
    paths: Vec<PathBuf>,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = std::path::Path::new(".");
    let log_path = log_dir.join("vre.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "vre.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_err) => None,
    }
}

fn install_panic_hook() {
    static HOOK: std::sync::Once = std::sync::Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();

    if args.paths.is_empty() && std::io::stdin().is_terminal() {
        eprintln!("usage: vre [file ...]");
        eprintln!("standard input must be a pipe when no files are given");
        std::process::exit(2);
    }

    tracing::info!(target: "runtime", file_count = args.paths.len(), "startup");

    let main_box = Arc::new(MainEventBox::new());
    let reader = Reader::new(Arc::clone(&main_box));
    let (engine, engine_handle, done_rx) = Engine::spawn(Arc::clone(&main_box));
    let (terminal, terminal_handle) = Terminal::spawn(Arc::clone(&main_box));

    let multi_file = !args.paths.is_empty();
    if multi_file {
        reader.read_files(args.paths);
    } else {
        reader.read_stream(std::io::stdin());
    }

    let mut abort = false;
    let mut abort_path: Option<PathBuf> = None;
    let mut abort_reason: Option<String> = None;
    let mut commit = false;

    while !abort && !commit {
        main_box.wait(|events| {
            for (kind, payload) in events.drain() {
                match kind {
                    EventKind::ReadNew | EventKind::ReadDone => {
                        let snapshot = reader.snapshot();
                        let final_doc = snapshot.all_final();
                        terminal.update_corpus(snapshot.clone(), final_doc);
                        engine.update_corpus(snapshot, final_doc);
                    }
                    EventKind::ReadError => {
                        if let Some(path) = payload.as_path() {
                            abort_path = Some(path.clone());
                        }
                        abort = true;
                    }
                    EventKind::SearchNew => {
                        if let Some(query) = payload.into_query() {
                            let empty = query.is_empty();
                            engine.update_program(query);
                            if empty {
                                terminal.clear_result();
                            }
                        }
                    }
                    EventKind::SearchFinal => {
                        engine.finish();
                        commit = true;
                    }
                    EventKind::SearchProgress => {
                        if let Some(result) = payload.into_search_result() {
                            terminal.update_result(result);
                        }
                    }
                    EventKind::Quit => {
                        abort = true;
                        if let Some(text) = payload.into_text() {
                            abort_reason = Some(text);
                        }
                    }
                    EventKind::Heartbeat => {
                        if let Some(text) = payload.into_text() {
                            terminal.update_prompt(text);
                        }
                    }
                }
            }
        });
    }

    terminal.shutdown();
    let _ = terminal_handle.join();

    if abort {
        tracing::info!(target: "dispatcher", ?abort_path, ?abort_reason, "aborted");
        if let Some(path) = abort_path {
            println!("{}", vre_model::VreError::FileOpenFailure { path });
            return Ok(());
        }
        if let Some(reason) = abort_reason {
            eprintln!("{reason}");
            std::process::exit(1);
        }
        return Ok(());
    }

    let output = done_rx.recv().unwrap_or_default();
    let _ = engine_handle.join();

    write_output(&output, &reader.snapshot(), multi_file)?;
    Ok(())
}

/// Writes every matched (or substituted) line to stdout, in document order,
/// prefixing `filename:` when the run's origin is a list of named files.
fn write_output(
    output: &vre_model::Output,
    corpus: &vre_model::CorpusSnapshot,
    multi_file: bool,
) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (doc_idx, lines) in output.output_lines.iter().enumerate() {
        let filename = corpus.doc(doc_idx).map(|d| d.filename.as_str()).unwrap_or("");
        for line in lines {
            if multi_file {
                write!(out, "{filename}:")?;
            }
            out.write_all(line)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}
