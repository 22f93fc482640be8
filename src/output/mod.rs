//! Output module for persisting harvested pages
//!
//! This module handles:
//! - Formatting extracted page records
//! - Appending them to size-bounded rotating chunk files
//! - Recording crawl statistics

mod chunked;
mod record;
pub mod stats;
mod traits;

pub use chunked::ChunkedFileSink;
pub use record::{ExtractedRecord, RECORD_SEPARATOR_WIDTH};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{ChunkCursor, ChunkWrite, ChunkedSink, OutputError, OutputResult};

/// Formats a record and appends it through the sink
///
/// The record is consumed; nothing keeps it after the write.
pub fn persist_record(
    sink: &dyn ChunkedSink,
    cursor: &mut ChunkCursor,
    record: ExtractedRecord,
) -> OutputResult<ChunkWrite> {
    sink.append(cursor, &record.format())
}
