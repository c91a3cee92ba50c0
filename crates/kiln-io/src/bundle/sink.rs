// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Concrete bundle sinks: a file on disk and an in-memory buffer.

use async_trait::async_trait;
use kiln_core::bundle::{BundleSink, SinkError, SinkLease, SinkLock, WriteStream};
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

/// Writes bundles to a file, replacing any previous content.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    lock: SinkLock,
}

impl FileSink {
    /// Creates a sink for `path`. The file is created when a stream opens.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: SinkLock::new(),
        }
    }

    /// The destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-use flag of this sink.
    pub fn lock(&self) -> &SinkLock {
        &self.lock
    }
}

#[async_trait]
impl BundleSink for FileSink {
    type Stream = FileWriteStream;

    async fn open_write_stream(&self) -> Result<Self::Stream, SinkError> {
        let lease = self.lock.try_acquire()?;
        let file = tokio::fs::File::create(&self.path).await?;
        log::debug!("Opened bundle file '{}'", self.path.display());
        Ok(FileWriteStream {
            file,
            end: 0,
            _lease: lease,
        })
    }
}

/// An exclusive write stream over a bundle file.
pub struct FileWriteStream {
    file: tokio::fs::File,
    end: u64,
    _lease: SinkLease,
}

#[async_trait]
impl WriteStream for FileWriteStream {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.file.write_all(bytes).await?;
        self.end += bytes.len() as u64;
        Ok(())
    }

    async fn write_at(&mut self, position: u64, bytes: &[u8]) -> Result<(), SinkError> {
        self.file.seek(SeekFrom::Start(position)).await?;
        self.file.write_all(bytes).await?;
        self.end = self.end.max(position + bytes.len() as u64);
        self.file.seek(SeekFrom::Start(self.end)).await?;
        Ok(())
    }

    async fn close(mut self) -> Result<(), SinkError> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(())
    }
}

/// Writes bundles into a shared in-memory buffer.
///
/// Clones share the buffer and the in-use flag. Opening a stream clears the
/// buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
    lock: SinkLock,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the bytes written so far.
    pub async fn contents(&self) -> Vec<u8> {
        self.buffer.lock().await.clone()
    }

    /// The in-use flag of this sink.
    pub fn lock(&self) -> &SinkLock {
        &self.lock
    }
}

#[async_trait]
impl BundleSink for MemorySink {
    type Stream = MemoryWriteStream;

    async fn open_write_stream(&self) -> Result<Self::Stream, SinkError> {
        let lease = self.lock.try_acquire()?;
        self.buffer.lock().await.clear();
        Ok(MemoryWriteStream {
            buffer: self.buffer.clone(),
            _lease: lease,
        })
    }
}

/// An exclusive write stream over a [`MemorySink`].
pub struct MemoryWriteStream {
    buffer: Arc<Mutex<Vec<u8>>>,
    _lease: SinkLease,
}

#[async_trait]
impl WriteStream for MemoryWriteStream {
    async fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        self.buffer.lock().await.extend_from_slice(bytes);
        Ok(())
    }

    async fn write_at(&mut self, position: u64, bytes: &[u8]) -> Result<(), SinkError> {
        let (start, end) = usize::try_from(position)
            .ok()
            .and_then(|start| Some((start, start.checked_add(bytes.len())?)))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("write of {} bytes at {position} is out of range", bytes.len()),
                )
            })?;
        let mut buffer = self.buffer.lock().await;
        if buffer.len() < end {
            buffer.resize(end, 0);
        }
        buffer[start..end].copy_from_slice(bytes);
        Ok(())
    }

    async fn close(self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_stream_overwrites_in_place() {
        let sink = MemorySink::new();
        let mut stream = sink.open_write_stream().await.unwrap();
        stream.write(&[0, 0, 0, 9, 9]).await.unwrap();
        stream.write_at(1, &[7, 7]).await.unwrap();
        stream.write(&[5]).await.unwrap();
        stream.close().await.unwrap();

        assert_eq!(sink.contents().await, vec![0, 7, 7, 9, 9, 5]);
    }

    #[tokio::test]
    async fn memory_stream_rejects_out_of_range_positions() {
        let sink = MemorySink::new();
        let mut stream = sink.open_write_stream().await.unwrap();
        stream.write(&[1, 2]).await.unwrap();

        let error = stream.write_at(u64::MAX, &[7]).await.unwrap_err();
        assert!(matches!(
            &error,
            SinkError::Io(source) if source.kind() == io::ErrorKind::InvalidInput
        ));
        stream.close().await.unwrap();

        assert_eq!(sink.contents().await, vec![1, 2]);
    }

    #[tokio::test]
    async fn second_open_fails_while_the_first_stream_lives() {
        let sink = MemorySink::new();
        let stream = sink.open_write_stream().await.unwrap();
        assert!(matches!(
            sink.open_write_stream().await,
            Err(SinkError::Unavailable)
        ));

        stream.close().await.unwrap();
        assert!(!sink.lock().is_locked());
        assert!(sink.open_write_stream().await.is_ok());
    }

    #[tokio::test]
    async fn file_stream_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bundle");
        let sink = FileSink::new(&path);

        let mut stream = sink.open_write_stream().await.unwrap();
        stream.write(&[0; 4]).await.unwrap();
        stream.write(b"data").await.unwrap();
        stream.write_at(0, &[1, 2, 3, 4]).await.unwrap();
        stream.write(b"!").await.unwrap();
        stream.close().await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"\x01\x02\x03\x04data!");
        assert!(!sink.lock().is_locked());
    }
}
