//! Scoped handles on source buffers.
//!
//! A [`SourceHandle`] stands for the transient reference the pipeline takes on
//! a receipt's bytes while decoding it. Handles are counted by the
//! [`HandleTracker`] that issued them and released on drop, so every exit path
//! out of an optimization gives its handle back.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::types::SourceImage;

/// Issues source handles and counts how many are still alive.
#[derive(Debug, Clone, Default)]
pub struct HandleTracker {
    live: Arc<AtomicUsize>,
}

impl HandleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a handle on a source's byte buffer.
    pub fn acquire(&self, source: &SourceImage) -> SourceHandle {
        let live = self.live.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!("Acquired source handle for {} ({live} live)", source.name());
        SourceHandle {
            data: source.shared_bytes(),
            name: source.name().to_string(),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of handles issued by this tracker that have not been dropped.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// A live reference to a source buffer, released when dropped.
#[derive(Debug)]
pub struct SourceHandle {
    data: Arc<[u8]>,
    name: String,
    live: Arc<AtomicUsize>,
}

impl SourceHandle {
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Shared buffer for work that has to leave the current task.
    pub fn shared(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SourceHandle {
    fn drop(&mut self) {
        let remaining = self.live.fetch_sub(1, Ordering::AcqRel) - 1;
        tracing::trace!("Released source handle for {} ({remaining} live)", self.name);
    }
}
