//! Compile-time constants shared across the pipeline.
//!
//! Kept as plain `pub const`s rather than a runtime-configurable struct: the
//! core has no configuration file (see the crate-level Non-goals), so there
//! is nothing to load these from at startup.

/// Maximum number of lines held in a single [`crate::Chunk`].
pub const CHUNK_SIZE: usize = 1000;

/// Column width a tab character expands to.
pub const TABSTOP: usize = 8;

/// How many chunks the engine scans between `SearchProgress` publications
/// (also published unconditionally at the end of every chunk run).
pub const PROGRESS_INTERVAL_CHUNKS: usize = 50;
