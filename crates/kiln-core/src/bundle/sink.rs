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

//! Contracts for the destinations a bundle is streamed into.

use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Errors reported by a bundle sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The sink is already being written by someone else.
    #[error("the sink is already in use")]
    Unavailable,
    /// The underlying storage failed.
    #[error("sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A destination that hands out exclusive write streams.
#[async_trait]
pub trait BundleSink: Send + Sync {
    /// The stream type handed out by this sink.
    type Stream: WriteStream;

    /// Opens a stream for exclusive writing.
    ///
    /// Fails with [`SinkError::Unavailable`] while another stream of the same
    /// sink is alive.
    async fn open_write_stream(&self) -> Result<Self::Stream, SinkError>;
}

/// A write stream that supports appending and absolute-position overwrites.
#[async_trait]
pub trait WriteStream: Send {
    /// Appends bytes at the current end of the stream.
    async fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError>;

    /// Overwrites bytes starting at `position`, leaving the append position
    /// untouched.
    async fn write_at(&mut self, position: u64, bytes: &[u8]) -> Result<(), SinkError>;

    /// Flushes and closes the stream, releasing the sink.
    async fn close(self) -> Result<(), SinkError>
    where
        Self: Sized;
}

/// The "in use" flag of a sink.
///
/// [`SinkLock::try_acquire`] hands out a [`SinkLease`]; the flag is cleared
/// when the lease is dropped, whichever way the writer exits.
#[derive(Debug, Default, Clone)]
pub struct SinkLock(Arc<AtomicBool>);

impl SinkLock {
    /// Creates an unlocked flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a lease is alive.
    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Takes the lock, or fails with [`SinkError::Unavailable`].
    pub fn try_acquire(&self) -> Result<SinkLease, SinkError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| SinkLease(self.0.clone()))
            .map_err(|_| SinkError::Unavailable)
    }
}

/// Proof of exclusive access to a sink.
#[derive(Debug)]
pub struct SinkLease(Arc<AtomicBool>);

impl Drop for SinkLease {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
