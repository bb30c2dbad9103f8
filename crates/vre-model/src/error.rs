use std::path::PathBuf;

/// Error kinds the dispatcher and top-level run loop branch on.
///
/// Most internal code returns `anyhow::Result` and propagates with `?`;
/// this enum exists at the few boundaries where a caller must distinguish
/// "abort quietly" from "fatal, print a diagnostic" from "this query just
/// doesn't compile, keep going".
#[derive(Debug, thiserror::Error)]
pub enum VreError {
    /// The query string failed to parse into `cmd/pattern/flag` shape, or
    /// the pattern failed to compile. Never fatal: scanning is simply
    /// disabled until the user edits the query into something valid.
    #[error("invalid query")]
    InvalidQuery,

    /// A file named on the command line could not be opened.
    #[error("Problem reading {}", path.display())]
    FileOpenFailure { path: PathBuf },

    /// A TTY control operation (raw mode, size query, `/dev/tty` open)
    /// failed. Fatal: the program cannot safely continue.
    #[error("terminal failure: {message}")]
    TtyFailure { message: String },
}
