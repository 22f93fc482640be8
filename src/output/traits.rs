//! Output sink traits and types
//!
//! This module defines the interface for chunked, append-only sinks and the
//! cursor that tracks which chunk a crawl is currently writing to.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write chunk {index} at {path}: {source}")]
    Write {
        index: u32,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to inspect chunk {index} at {path}: {source}")]
    Inspect {
        index: u32,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Position of a crawl in its sequence of chunks
///
/// Indices start at 1 and only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCursor {
    index: u32,
}

impl ChunkCursor {
    /// Creates a cursor at chunk 1
    pub fn new() -> Self {
        Self { index: 1 }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Moves to the next chunk and returns its index
    pub fn advance(&mut self) -> u32 {
        self.index += 1;
        self.index
    }
}

impl Default for ChunkCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Where an appended payload ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkWrite {
    /// Chunk index the payload was appended to
    pub index: u32,

    /// Location of that chunk
    pub path: PathBuf,

    /// Size of the payload in bytes
    pub bytes: u64,

    /// Whether this write opened a new chunk
    pub rotated: bool,
}

/// Trait for append-only sinks that rotate by size
///
/// Implementations must decide rotation before writing: when the current
/// chunk already holds data and the payload would push it past the
/// threshold, the cursor advances first. A chunk is never written again once
/// the cursor has moved past it.
///
/// An empty chunk accepts any payload, even one larger than the threshold.
/// Checking only `current + payload > threshold` would rotate away from an
/// empty chunk and leave it unwritten, so the chunk must hold data before a
/// rotation is allowed. Chunk indices on disk therefore never skip.
pub trait ChunkedSink: Send + Sync {
    /// Appends a payload to the cursor's chunk, rotating first if needed
    fn append(&self, cursor: &mut ChunkCursor, payload: &str) -> OutputResult<ChunkWrite>;

    /// The soft size limit of one chunk in bytes
    fn threshold(&self) -> u64;
}
