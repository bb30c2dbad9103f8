use std::sync::Arc;

/// An immutable line of bytes, without its trailing newline.
///
/// Lines are not required to be valid UTF-8: input is treated as an opaque
/// byte stream end to end, matching a terminal tool that must not choke on
/// binary-ish input. `Arc` makes sharing a line between a [`crate::Chunk`]
/// and every snapshot that was taken before the line was superseded free.
pub type Line = Arc<[u8]>;

pub fn line_from(bytes: Vec<u8>) -> Line {
    Arc::from(bytes)
}
