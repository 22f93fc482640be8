//! File-backed chunked sink
//!
//! Chunks live at `<root>/<key>/<index>.txt`. Files are only ever opened in
//! append mode.

use crate::output::traits::{ChunkCursor, ChunkWrite, ChunkedSink, OutputError, OutputResult};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Rotating append-only text files in one directory
#[derive(Debug, Clone)]
pub struct ChunkedFileSink {
    dir: PathBuf,
    threshold: u64,
}

impl ChunkedFileSink {
    /// Creates a sink writing under `<root>/<key>/`
    ///
    /// Nothing is created on disk until the first append.
    pub fn new(root: impl AsRef<Path>, key: &str, threshold: u64) -> Self {
        Self {
            dir: root.as_ref().join(key),
            threshold,
        }
    }

    /// Directory holding the chunks
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the chunk with the given index
    pub fn chunk_path(&self, index: u32) -> PathBuf {
        self.dir.join(format!("{}.txt", index))
    }

    /// Current size of a chunk; a missing file counts as empty
    fn chunk_size(&self, index: u32) -> OutputResult<u64> {
        let path = self.chunk_path(index);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(source) => Err(OutputError::Inspect {
                index,
                path,
                source,
            }),
        }
    }
}

impl ChunkedSink for ChunkedFileSink {
    fn append(&self, cursor: &mut ChunkCursor, payload: &str) -> OutputResult<ChunkWrite> {
        let bytes = payload.len() as u64;
        let current = self.chunk_size(cursor.index())?;

        // An empty chunk always takes the payload, however large, so indices never skip.
        let rotated = current > 0 && current + bytes > self.threshold;
        if rotated {
            let next = cursor.advance();
            tracing::info!(
                "Chunk {} holds {} bytes, rotating to chunk {}",
                next - 1,
                current,
                next
            );
        }

        fs::create_dir_all(&self.dir).map_err(|source| OutputError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let index = cursor.index();
        let path = self.chunk_path(index);

        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(payload.as_bytes())?;
            file.flush()
        };

        write().map_err(|source| OutputError::Write {
            index,
            path: path.clone(),
            source,
        })?;

        Ok(ChunkWrite {
            index,
            path,
            bytes,
            rotated,
        })
    }

    fn threshold(&self) -> u64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sink(dir: &TempDir, threshold: u64) -> ChunkedFileSink {
        ChunkedFileSink::new(dir.path(), "example.com", threshold)
    }

    #[test]
    fn test_first_write_creates_chunk_one() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir, 1024);
        let mut cursor = ChunkCursor::new();

        let write = sink.append(&mut cursor, "hello").unwrap();

        assert_eq!(write.index, 1);
        assert!(!write.rotated);
        assert_eq!(write.path, dir.path().join("example.com").join("1.txt"));
        assert_eq!(fs::read_to_string(&write.path).unwrap(), "hello");
    }

    #[test]
    fn test_appends_while_under_threshold() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir, 10);
        let mut cursor = ChunkCursor::new();

        sink.append(&mut cursor, "abcde").unwrap();
        let write = sink.append(&mut cursor, "fghij").unwrap();

        // 5 + 5 == 10 is not over the threshold
        assert_eq!(write.index, 1);
        assert_eq!(fs::read_to_string(sink.chunk_path(1)).unwrap(), "abcdefghij");
    }

    #[test]
    fn test_rotates_before_overflowing_write() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir, 1_200_000);
        let mut cursor = ChunkCursor::new();
        let record = "x".repeat(900_000);

        let first = sink.append(&mut cursor, &record).unwrap();
        let second = sink.append(&mut cursor, &record).unwrap();

        assert_eq!(first.index, 1);
        assert_eq!(second.index, 2);
        assert!(second.rotated);
        assert_eq!(fs::metadata(sink.chunk_path(1)).unwrap().len(), 900_000);
        assert_eq!(fs::metadata(sink.chunk_path(2)).unwrap().len(), 900_000);
    }

    #[test]
    fn test_oversized_payload_in_empty_chunk_does_not_skip() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir, 1024);
        let mut cursor = ChunkCursor::new();

        let write = sink.append(&mut cursor, &"y".repeat(4096)).unwrap();

        assert_eq!(write.index, 1);
        assert!(!write.rotated);

        let next = sink.append(&mut cursor, "z").unwrap();
        assert_eq!(next.index, 2);
        assert!(next.rotated);
        assert!(!sink.chunk_path(3).exists());
    }

    #[test]
    fn test_lower_chunks_never_written_after_rotation() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir, 20);
        let mut cursor = ChunkCursor::new();

        sink.append(&mut cursor, &"a".repeat(15)).unwrap();
        sink.append(&mut cursor, &"b".repeat(15)).unwrap();
        let size_one = fs::metadata(sink.chunk_path(1)).unwrap().len();

        // Small enough to have fit in chunk 1, but chunk 1 is superseded
        let write = sink.append(&mut cursor, "c").unwrap();

        assert_eq!(write.index, 2);
        assert_eq!(fs::metadata(sink.chunk_path(1)).unwrap().len(), size_one);
    }

    #[test]
    fn test_continues_existing_chunk_on_disk() {
        let dir = TempDir::new().unwrap();
        let sink = sink(&dir, 10);
        fs::create_dir_all(sink.dir()).unwrap();
        fs::write(sink.chunk_path(1), "12345678").unwrap();

        let mut cursor = ChunkCursor::new();
        let write = sink.append(&mut cursor, "abc").unwrap();

        assert_eq!(write.index, 2);
        assert_eq!(fs::read_to_string(sink.chunk_path(1)).unwrap(), "12345678");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        // A file where the directory should be
        fs::write(dir.path().join("example.com"), "not a directory").unwrap();
        let sink = sink(&dir, 1024);
        let mut cursor = ChunkCursor::new();

        let result = sink.append(&mut cursor, "hello");
        assert!(result.is_err());
    }
}
