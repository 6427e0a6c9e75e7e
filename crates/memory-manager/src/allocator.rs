// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Hierarchical, budget-enforcing buffer allocator.
//!
//! The [`BufferAllocator`] is the source of every [`Buffer`]. It:
//!
//! 1. Enforces a byte ceiling: requests that would exceed the budget of the
//!    allocator, or of any ancestor, return `Err(AllocationExceeded)`.
//! 2. Rounds requests per its [`RoundingPolicy`] (next power of two by
//!    default) and charges the rounded size.
//! 3. Tracks allocation statistics for diagnostics.
//!
//! # Hierarchy
//! [`BufferAllocator::new_child`] creates an allocator whose reservations are
//! also charged to its parent, so a child's effective ceiling is the smaller
//! of its own limit and whatever its ancestors have left.
//!
//! # Thread Safety
//! `BufferAllocator` is a cheap `Clone` handle and is `Send + Sync`. Limits
//! are guarded by a `Mutex`, and locks are always taken child-first, so
//! concurrent acquire/release cannot break the budget invariant.

use crate::buffer::{Lease, Storage};
use crate::{AllocationLimit, AllocationStats, AllocatorConfig, Buffer, MemoryBudget, MemoryError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// How an allocator sizes the storage behind a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingPolicy {
    /// Round up to the next power of two.
    #[default]
    PowerOfTwo,
    /// Allocate exactly the requested size.
    Exact,
}

impl RoundingPolicy {
    /// Returns the size actually reserved for `requested` bytes, or `None`
    /// if rounding would overflow.
    pub fn round(self, requested: usize) -> Option<usize> {
        match self {
            RoundingPolicy::PowerOfTwo if requested == 0 => Some(0),
            RoundingPolicy::PowerOfTwo => requested.checked_next_power_of_two(),
            RoundingPolicy::Exact => Some(requested),
        }
    }
}

/// Shared allocator state, referenced by handles, leases, and buffers.
pub(crate) struct AllocatorInner {
    name: String,
    parent: Option<Arc<AllocatorInner>>,
    rounding: RoundingPolicy,
    limit: Mutex<AllocationLimit>,
    stats: Mutex<AllocationStats>,
    closed: AtomicBool,
    open_children: AtomicUsize,
}

impl AllocatorInner {
    fn new(
        name: String,
        limit: MemoryBudget,
        rounding: RoundingPolicy,
        parent: Option<Arc<AllocatorInner>>,
    ) -> Self {
        Self {
            name,
            parent,
            rounding,
            limit: Mutex::new(AllocationLimit::new(limit)),
            stats: Mutex::new(AllocationStats::default()),
            closed: AtomicBool::new(false),
            open_children: AtomicUsize::new(0),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    fn limit(&self) -> MutexGuard<'_, AllocationLimit> {
        self.limit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_open(&self) -> Result<(), MemoryError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MemoryError::AllocatorClosed {
                allocator: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Reserves `bytes` here and in every ancestor, or nowhere.
    fn reserve(&self, bytes: usize) -> Result<(), MemoryError> {
        let mut limit = self.limit();
        if !limit.can_reserve(bytes) {
            return Err(MemoryError::AllocationExceeded {
                allocator: self.name.clone(),
                requested_bytes: bytes,
                available_bytes: limit.headroom(),
                limit_bytes: limit.max_bytes(),
            });
        }
        if let Some(parent) = &self.parent {
            parent.reserve(bytes)?;
        }
        // Checked above under the same lock.
        let reserved = limit.try_reserve(bytes);
        debug_assert!(reserved, "reservation failed after can_reserve");
        Ok(())
    }

    fn release(&self, bytes: usize) {
        self.limit().release(bytes);
        if let Some(parent) = &self.parent {
            parent.release(bytes);
        }
    }

    /// Reserves and zero-fills a new allocation of exactly `size` bytes.
    /// Fails on a closed allocator.
    pub(crate) fn new_storage(self: &Arc<Self>, size: usize) -> Result<Storage, MemoryError> {
        self.ensure_open()?;
        self.reserve(size)?;
        Ok(Storage::new(vec![0u8; size], Lease::new(Arc::clone(self), size)))
    }

    /// Called by `Lease::drop` once the last handle onto an allocation is gone.
    pub(crate) fn return_bytes(&self, bytes: usize) {
        self.release(bytes);
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_release();
        }
        tracing::debug!(allocator = %self.name, bytes, "allocation returned");
    }

    pub(crate) fn record_shared_slice(&self) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_shared_slice();
        }
    }

    pub(crate) fn record_detach(&self, bytes: usize) {
        if let Ok(mut stats) = self.stats.lock() {
            stats.record_detach(bytes);
        }
    }

    fn available_bytes(&self) -> usize {
        let own = self.limit().headroom();
        match &self.parent {
            Some(parent) => own.min(parent.available_bytes()),
            None => own,
        }
    }
}

impl Drop for AllocatorInner {
    fn drop(&mut self) {
        // A child dropped without an explicit close still stops counting
        // against its parent.
        if !self.closed.load(Ordering::Acquire) {
            if let Some(parent) = &self.parent {
                parent.open_children.fetch_sub(1, Ordering::AcqRel);
            }
        }
    }
}

/// Issues [`Buffer`]s against a byte budget.
///
/// # Example
/// ```
/// use memory_manager::{BufferAllocator, MemoryBudget, MemoryError};
///
/// let allocator = BufferAllocator::new(MemoryBudget::from_bytes(0));
/// assert!(matches!(allocator.acquire(64), Err(MemoryError::AllocationExceeded { .. })));
///
/// allocator.set_limit(MemoryBudget::from_bytes(5000));
/// let buf = allocator.acquire(256).unwrap();
/// assert_eq!(buf.capacity(), 256);
/// assert_eq!(allocator.reserved_bytes(), 256);
///
/// drop(buf);
/// allocator.close().unwrap();
/// ```
#[derive(Clone)]
pub struct BufferAllocator {
    inner: Arc<AllocatorInner>,
}

impl BufferAllocator {
    /// Creates a root allocator named `"root"` with the default rounding policy.
    pub fn new(limit: MemoryBudget) -> Self {
        Self::with_policy("root", limit, RoundingPolicy::default())
    }

    /// Creates a root allocator with no ceiling.
    pub fn unbounded() -> Self {
        Self::new(MemoryBudget::unbounded())
    }

    /// Creates a root allocator with an explicit name and rounding policy.
    pub fn with_policy(name: impl Into<String>, limit: MemoryBudget, rounding: RoundingPolicy) -> Self {
        let name = name.into();
        tracing::debug!(allocator = %name, %limit, ?rounding, "allocator created");
        Self {
            inner: Arc::new(AllocatorInner::new(name, limit, rounding, None)),
        }
    }

    /// Creates a root allocator from configuration.
    pub fn from_config(config: &AllocatorConfig) -> Result<Self, MemoryError> {
        let limit = config.parse_limit()?;
        Ok(Self::with_policy(config.name.clone(), limit, config.rounding))
    }

    /// Creates a child allocator whose reservations also count against this
    /// allocator. The child inherits the rounding policy.
    pub fn new_child(&self, name: impl Into<String>, limit: MemoryBudget) -> Result<Self, MemoryError> {
        self.inner.ensure_open()?;
        let name = name.into();
        self.inner.open_children.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(parent = %self.inner.name, allocator = %name, %limit, "child allocator created");
        Ok(Self {
            inner: Arc::new(AllocatorInner::new(
                name,
                limit,
                self.inner.rounding,
                Some(Arc::clone(&self.inner)),
            )),
        })
    }

    /// Acquires a zeroed buffer of at least `requested_bytes`.
    ///
    /// Returns `Err(AllocationExceeded)` if the rounded size does not fit this
    /// allocator's or an ancestor's remaining budget, in which case no
    /// accounting changes.
    pub fn acquire(&self, requested_bytes: usize) -> Result<Buffer, MemoryError> {
        self.inner.ensure_open()?;

        let result = match self.inner.rounding.round(requested_bytes) {
            Some(size) => self.inner.new_storage(size),
            None => Err(MemoryError::AllocationExceeded {
                allocator: self.inner.name.clone(),
                requested_bytes,
                available_bytes: self.available_bytes(),
                limit_bytes: self.limit().as_bytes(),
            }),
        };

        match result {
            Ok(storage) => {
                let buffer = Buffer::new(storage, Arc::downgrade(&self.inner));
                if let Ok(mut stats) = self.inner.stats.lock() {
                    stats.record_acquisition(requested_bytes, buffer.capacity());
                }
                tracing::debug!(
                    allocator = %self.inner.name,
                    requested_bytes,
                    capacity = buffer.capacity(),
                    "buffer acquired"
                );
                Ok(buffer)
            }
            Err(e) => {
                if let Ok(mut stats) = self.inner.stats.lock() {
                    stats.record_rejection();
                }
                tracing::warn!(allocator = %self.inner.name, requested_bytes, "allocation rejected: {e}");
                Err(e)
            }
        }
    }

    /// Checks, without reserving anything, that `requested_bytes` would fit
    /// once `reclaimable_bytes` have been returned.
    ///
    /// Lets a caller replacing a buffer reject a request before giving up the
    /// buffer it holds. A rejection is counted and logged like a failed
    /// [`acquire`](Self::acquire).
    pub fn check_acquire(&self, requested_bytes: usize, reclaimable_bytes: usize) -> Result<(), MemoryError> {
        self.inner.ensure_open()?;
        let available_bytes = self.available_bytes();
        let fits = self
            .inner
            .rounding
            .round(requested_bytes)
            .is_some_and(|size| size <= available_bytes.saturating_add(reclaimable_bytes));
        if fits {
            return Ok(());
        }

        if let Ok(mut stats) = self.inner.stats.lock() {
            stats.record_rejection();
        }
        tracing::warn!(
            allocator = %self.inner.name,
            requested_bytes,
            reclaimable_bytes,
            available_bytes,
            "allocation rejected before release"
        );
        Err(MemoryError::AllocationExceeded {
            allocator: self.inner.name.clone(),
            requested_bytes,
            available_bytes,
            limit_bytes: self.limit().as_bytes(),
        })
    }

    /// Releases `buffer` back to this allocator.
    ///
    /// Fails with [`MemoryError::AlreadyReleased`] on a second release and
    /// with [`MemoryError::ForeignBuffer`] if another allocator owns it.
    pub fn release(&self, buffer: &mut Buffer) -> Result<(), MemoryError> {
        if buffer.is_released() {
            return Err(MemoryError::AlreadyReleased);
        }
        if !buffer.is_owned_by(&self.inner) {
            return Err(MemoryError::ForeignBuffer {
                owner: buffer.owner_name().unwrap_or_else(|| "<dropped>".into()),
                allocator: self.inner.name.clone(),
            });
        }
        buffer.release()
    }

    /// Replaces this allocator's ceiling. Outstanding buffers are unaffected.
    pub fn set_limit(&self, limit: MemoryBudget) {
        let mut current = self.inner.limit();
        tracing::debug!(
            allocator = %self.inner.name,
            old = %current.max(),
            new = %limit,
            reserved = current.reserved_bytes(),
            "limit changed"
        );
        current.set_max(limit);
    }

    /// Returns this allocator's own ceiling.
    pub fn limit(&self) -> MemoryBudget {
        self.inner.limit().max()
    }

    /// Bytes currently reserved by this allocator and its descendants.
    pub fn reserved_bytes(&self) -> usize {
        self.inner.limit().reserved_bytes()
    }

    /// High-water mark of [`reserved_bytes`](Self::reserved_bytes).
    pub fn peak_reserved_bytes(&self) -> usize {
        self.inner.limit().peak_reserved_bytes()
    }

    /// Bytes that could still be acquired, taking every ancestor into account.
    pub fn available_bytes(&self) -> usize {
        self.inner.available_bytes()
    }

    /// Returns a snapshot of allocation statistics.
    pub fn stats(&self) -> AllocationStats {
        self.inner
            .stats
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Returns the allocator's name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the rounding policy.
    pub fn rounding(&self) -> RoundingPolicy {
        self.inner.rounding
    }

    /// Returns `true` after [`close`](Self::close).
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Number of child allocators that have not been closed or dropped.
    pub fn open_children(&self) -> usize {
        self.inner.open_children.load(Ordering::Acquire)
    }

    /// Closes the allocator. Further acquisitions fail.
    ///
    /// Returns [`MemoryError::Leak`] if bytes are still reserved or child
    /// allocators are still open; those buffers remain valid and still
    /// return their bytes when dropped. Closing twice is a no-op.
    pub fn close(&self) -> Result<(), MemoryError> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if let Some(parent) = &self.inner.parent {
            parent.open_children.fetch_sub(1, Ordering::AcqRel);
        }

        let outstanding_bytes = self.reserved_bytes();
        let open_children = self.open_children();
        if outstanding_bytes > 0 || open_children > 0 {
            tracing::error!(
                allocator = %self.inner.name,
                outstanding_bytes,
                open_children,
                "allocator closed with outstanding allocations"
            );
            return Err(MemoryError::Leak {
                allocator: self.inner.name.clone(),
                outstanding_bytes,
                open_children,
            });
        }
        tracing::debug!(allocator = %self.inner.name, "allocator closed");
        Ok(())
    }

    pub(crate) fn inner(&self) -> &Arc<AllocatorInner> {
        &self.inner
    }
}

impl std::fmt::Debug for BufferAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferAllocator")
            .field("name", &self.inner.name)
            .field("limit", &self.limit())
            .field("reserved_bytes", &self.reserved_bytes())
            .field("available_bytes", &self.available_bytes())
            .field("closed", &self.is_closed())
            .finish()
    }
}
