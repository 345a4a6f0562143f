//! Source payload loading and chunk iteration
//!
//! The payload is read fully into memory once at startup and never mutated
//! afterwards. Chunks handed to the registry are `Bytes` slices of the
//! payload: reference-counted views, so fan-out never copies audio data and
//! a slow listener can never observe a chunk being overwritten.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::{Error, Result};

/// The in-memory audio source, shared read-only for the process lifetime
#[derive(Debug, Clone)]
pub struct SourcePayload {
    data: Bytes,
    chunk_size: usize,
}

impl SourcePayload {
    /// Load a payload from disk
    ///
    /// Reads the entire file into memory. An unreadable or empty file is a
    /// fatal startup error; the station cannot run without a source.
    pub fn load(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self> {
        let path = path.as_ref();

        let data = std::fs::read(path).map_err(|source| Error::Source {
            path: path.to_path_buf(),
            source,
        })?;

        if data.is_empty() {
            return Err(Error::EmptyPayload(PathBuf::from(path)));
        }

        tracing::info!(
            path = %path.display(),
            bytes = data.len(),
            chunk_size = chunk_size,
            "Source payload loaded"
        );

        Ok(Self {
            data: Bytes::from(data),
            chunk_size,
        })
    }

    /// Build a payload from bytes already in memory
    pub fn from_bytes(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self {
            data: data.into(),
            chunk_size,
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Chunk size this payload is walked with
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks per pass over the payload (`ceil(len / chunk_size)`)
    pub fn chunk_count(&self) -> usize {
        self.data.len().div_ceil(self.chunk_size)
    }

    /// Get the chunk starting at `offset`
    ///
    /// The last chunk of a payload whose length is not a multiple of the
    /// chunk size is short, not zero-padded. Returns `None` at or past the
    /// end of the payload.
    pub fn chunk_at(&self, offset: usize) -> Option<Bytes> {
        if offset >= self.data.len() {
            return None;
        }
        let end = (offset + self.chunk_size).min(self.data.len());
        Some(self.data.slice(offset..end))
    }

    /// Create a cursor positioned at the start of the payload
    pub fn cursor(&self) -> PayloadCursor {
        PayloadCursor {
            payload: self.clone(),
            offset: 0,
        }
    }
}

/// A looping cursor over a payload
///
/// `next_chunk` walks the payload in `chunk_size` steps and wraps back to
/// offset 0 when the payload is exhausted, so the stream never ends.
#[derive(Debug)]
pub struct PayloadCursor {
    payload: SourcePayload,
    offset: usize,
}

impl PayloadCursor {
    /// Current byte offset into the payload
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Read the next chunk, wrapping to the start on end-of-content
    pub fn next_chunk(&mut self) -> Bytes {
        let chunk = match self.payload.chunk_at(self.offset) {
            Some(chunk) => chunk,
            None => {
                // End of payload: loop back to the beginning.
                self.offset = 0;
                self.payload
                    .chunk_at(0)
                    .unwrap_or_else(Bytes::new)
            }
        };

        self.offset += chunk.len();
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_of(chunks: &[&[u8]], chunk_size: usize) -> SourcePayload {
        let data: Vec<u8> = chunks.concat();
        SourcePayload::from_bytes(data, chunk_size)
    }

    #[test]
    fn test_load_missing_file() {
        let result = SourcePayload::load("/definitely/not/a/real/file.aac", 4096);

        assert!(matches!(result, Err(Error::Source { .. })));
    }

    #[test]
    fn test_load_empty_file() {
        let path = std::env::temp_dir().join("radiocast_empty_source_test.aac");
        std::fs::write(&path, b"").unwrap();

        let result = SourcePayload::load(&path, 4096);
        assert!(matches!(result, Err(Error::EmptyPayload(_))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_reads_whole_file() {
        let path = std::env::temp_dir().join("radiocast_source_test.aac");
        std::fs::write(&path, vec![7u8; 10_000]).unwrap();

        let payload = SourcePayload::load(&path, 4096).unwrap();
        assert_eq!(payload.len(), 10_000);
        assert_eq!(payload.chunk_count(), 3);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_chunk_at_bounds() {
        let payload = SourcePayload::from_bytes(vec![1u8; 10], 4);

        assert_eq!(payload.chunk_at(0).unwrap().len(), 4);
        assert_eq!(payload.chunk_at(8).unwrap().len(), 2); // short final chunk
        assert!(payload.chunk_at(10).is_none());
    }

    #[test]
    fn test_cursor_walks_in_order() {
        let payload = payload_of(&[&[0u8; 4], &[1u8; 4], &[2u8; 4]], 4);
        let mut cursor = payload.cursor();

        assert_eq!(cursor.next_chunk(), Bytes::from_static(&[0u8; 4]));
        assert_eq!(cursor.next_chunk(), Bytes::from_static(&[1u8; 4]));
        assert_eq!(cursor.next_chunk(), Bytes::from_static(&[2u8; 4]));
    }

    #[test]
    fn test_cursor_loops_on_exhaustion() {
        // ceil(10 / 4) = 3 chunks per pass; the 4th chunk is the first again.
        let payload = SourcePayload::from_bytes((0u8..10).collect::<Vec<u8>>(), 4);
        let mut cursor = payload.cursor();

        let first = cursor.next_chunk();
        cursor.next_chunk();
        let last = cursor.next_chunk();
        assert_eq!(last.len(), 2);

        let wrapped = cursor.next_chunk();
        assert_eq!(wrapped, first);
        assert_eq!(cursor.offset(), 4);
    }
}
