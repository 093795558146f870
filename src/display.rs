//! Scoped display handles for previewing blobs.
//!
//! A UI showing a result list needs a displayable reference to either the
//! original upload or the processed output of each item, and must never hold
//! more than one at a time per visible item. [`DisplaySlot`] enforces that
//! policy: every transition that changes which blob is shown (a new result
//! arriving, the compare toggle, removal) releases the previous handle
//! before acquiring the next one. [`HandleRegistry`] counts live handles so
//! the policy is checkable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct RegistryInner {
    live: AtomicUsize,
    next_id: AtomicU64,
}

/// Issues display handles and tracks how many are currently live.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    inner: Arc<RegistryInner>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a fresh handle for `blob`. Released on drop or via
    /// [`DisplayHandle::revoke`].
    pub fn acquire(&self, blob: Arc<Vec<u8>>) -> DisplayHandle {
        self.inner.live.fetch_add(1, Ordering::SeqCst);
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        DisplayHandle {
            id,
            blob,
            inner: Arc::clone(&self.inner),
            revoked: false,
        }
    }

    /// Number of handles acquired and not yet released.
    pub fn live_handles(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }
}

/// A displayable reference to a blob, released deterministically.
#[derive(Debug)]
pub struct DisplayHandle {
    id: u64,
    blob: Arc<Vec<u8>>,
    inner: Arc<RegistryInner>,
    revoked: bool,
}

impl DisplayHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The referenced bytes, or `None` once revoked. A revoked handle must
    /// never be rendered.
    pub fn bytes(&self) -> Option<&[u8]> {
        if self.revoked { None } else { Some(&self.blob) }
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    /// Releases the handle early. Idempotent.
    pub fn revoke(&mut self) {
        if !self.revoked {
            self.revoked = true;
            self.inner.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        self.revoke();
    }
}

/// Which blob a visible item is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// The user's unmodified upload
    Original,
    /// The optimized output, when available
    Processed,
}

/// The single display handle owned by one visible item.
#[derive(Debug)]
pub struct DisplaySlot {
    registry: HandleRegistry,
    active: Option<DisplayHandle>,
}

impl DisplaySlot {
    pub fn new(registry: &HandleRegistry) -> Self {
        Self {
            registry: registry.clone(),
            active: None,
        }
    }

    /// Points the slot at the blob matching the current view state.
    ///
    /// `Processed` falls back to the original while no processed blob exists
    /// yet (the item is still queued or running). The previous handle is
    /// released before the new one is acquired, so the slot never holds two
    /// handles, not even transiently.
    pub fn sync(
        &mut self,
        mode: ViewMode,
        original: &Arc<Vec<u8>>,
        processed: Option<&Arc<Vec<u8>>>,
    ) -> &DisplayHandle {
        self.active.take();

        let blob = match (mode, processed) {
            (ViewMode::Processed, Some(processed)) => Arc::clone(processed),
            _ => Arc::clone(original),
        };
        self.active.insert(self.registry.acquire(blob))
    }

    pub fn active(&self) -> Option<&DisplayHandle> {
        self.active.as_ref()
    }

    /// Releases the handle when the item leaves the screen.
    pub fn clear(&mut self) {
        self.active.take();
    }
}

impl Drop for DisplaySlot {
    fn drop(&mut self) {
        self.clear();
    }
}
