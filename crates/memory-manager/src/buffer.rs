// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocator-backed byte buffers.
//!
//! A [`Buffer`] is a handle onto a span of an allocation. The allocation
//! itself ([`Storage`]) is reference counted and carries a [`Lease`] that
//! returns its bytes to the issuing allocator when the last handle goes
//! away. This is what makes [`Buffer::slice`] zero-copy: a slice is just a
//! second handle onto the same storage.
//!
//! Handles never observe each other's writes. Mutating a buffer whose storage
//! is shared first moves that handle onto a private allocation charged to its
//! owning allocator (copy-on-write).

use crate::allocator::AllocatorInner;
use crate::MemoryError;
use std::sync::{Arc, Weak};

/// Reservation of `bytes` against an allocator chain, returned on drop.
pub(crate) struct Lease {
    allocator: Arc<AllocatorInner>,
    bytes: usize,
}

impl Lease {
    pub(crate) fn new(allocator: Arc<AllocatorInner>, bytes: usize) -> Self {
        Self { allocator, bytes }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.allocator.return_bytes(self.bytes);
    }
}

/// One underlying allocation, shared by every buffer sliced from it.
pub(crate) struct Storage {
    bytes: Vec<u8>,
    _lease: Lease,
}

impl Storage {
    pub(crate) fn new(bytes: Vec<u8>, lease: Lease) -> Self {
        Self {
            bytes,
            _lease: lease,
        }
    }
}

/// A fixed-length span of bytes issued by a [`BufferAllocator`](crate::BufferAllocator).
///
/// The capacity never changes after acquisition. A buffer is released exactly
/// once: explicitly via [`release`](Buffer::release) (a second call fails with
/// [`MemoryError::AlreadyReleased`]) or implicitly on drop.
///
/// # Example
/// ```
/// use memory_manager::{BufferAllocator, MemoryBudget};
///
/// let allocator = BufferAllocator::new(MemoryBudget::from_kb(4));
/// let mut buf = allocator.acquire(16).unwrap();
/// buf.set_bytes(4, &[1, 2, 3, 4]).unwrap();
///
/// let mut out = [0u8; 4];
/// buf.get_bytes(4, &mut out).unwrap();
/// assert_eq!(out, [1, 2, 3, 4]);
///
/// buf.release().unwrap();
/// assert!(buf.release().is_err());
/// assert_eq!(allocator.reserved_bytes(), 0);
/// ```
pub struct Buffer {
    /// `None` once released.
    storage: Option<Arc<Storage>>,
    offset: usize,
    len: usize,
    /// Allocator that owns this handle. Only used to route release checks
    /// and to charge copy-on-write detaches.
    owner: Weak<AllocatorInner>,
}

impl Buffer {
    pub(crate) fn new(storage: Storage, owner: Weak<AllocatorInner>) -> Self {
        let len = storage.bytes.len();
        Self {
            storage: Some(Arc::new(storage)),
            offset: 0,
            len,
            owner,
        }
    }

    /// Capacity of this buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.len
    }

    /// Returns `true` once the buffer has been released.
    pub fn is_released(&self) -> bool {
        self.storage.is_none()
    }

    /// Returns `true` if another buffer currently shares this storage.
    pub fn is_shared(&self) -> bool {
        self.storage
            .as_ref()
            .is_some_and(|storage| Arc::strong_count(storage) > 1)
    }

    /// Bytes that would go back to the issuing allocator if this handle were
    /// released now: the whole allocation when no other handle shares it,
    /// otherwise `0`.
    pub fn reclaimable_bytes(&self) -> usize {
        match &self.storage {
            Some(storage) if Arc::strong_count(storage) == 1 => storage.bytes.len(),
            _ => 0,
        }
    }

    /// Name of the allocator that owns this handle, if it is still alive.
    pub fn owner_name(&self) -> Option<String> {
        self.owner.upgrade().map(|inner| inner.name().to_string())
    }

    /// Returns a read-only view of the buffer.
    pub fn as_slice(&self) -> Result<&[u8], MemoryError> {
        let storage = self.storage.as_ref().ok_or(MemoryError::AlreadyReleased)?;
        Ok(&storage.bytes[self.offset..self.offset + self.len])
    }

    /// Returns a mutable view, detaching from shared storage first.
    pub fn as_mut_slice(&mut self) -> Result<&mut [u8], MemoryError> {
        self.unique_bytes(true)
    }

    /// Copies `out.len()` bytes starting at `offset` into `out`.
    pub fn get_bytes(&self, offset: usize, out: &mut [u8]) -> Result<(), MemoryError> {
        let bytes = self.as_slice()?;
        let end = self.check_range(offset, out.len())?;
        out.copy_from_slice(&bytes[offset..end]);
        Ok(())
    }

    /// Writes `src` starting at `offset`.
    pub fn set_bytes(&mut self, offset: usize, src: &[u8]) -> Result<(), MemoryError> {
        if self.is_released() {
            return Err(MemoryError::AlreadyReleased);
        }
        let end = self.check_range(offset, src.len())?;
        let bytes = self.unique_bytes(true)?;
        bytes[offset..end].copy_from_slice(src);
        Ok(())
    }

    /// Overwrites every byte with `value`.
    pub fn fill(&mut self, value: u8) -> Result<(), MemoryError> {
        // The old contents are about to be overwritten, so a detach need not
        // copy them.
        let bytes = self.unique_bytes(false)?;
        bytes.fill(value);
        Ok(())
    }

    /// Returns a new handle onto `len` bytes starting at `offset`, sharing
    /// this buffer's storage. No bytes are copied.
    pub fn slice(&self, offset: usize, len: usize) -> Result<Buffer, MemoryError> {
        let storage = self.storage.as_ref().ok_or(MemoryError::AlreadyReleased)?;
        self.check_range(offset, len)?;
        if let Some(owner) = self.owner.upgrade() {
            owner.record_shared_slice();
        }
        Ok(Buffer {
            storage: Some(Arc::clone(storage)),
            offset: self.offset + offset,
            len,
            owner: self.owner.clone(),
        })
    }

    /// Re-homes this handle under `allocator`.
    ///
    /// Future copy-on-write detaches and release checks go through
    /// `allocator`. Bytes already reserved stay charged to the allocator
    /// that issued the storage until the last handle onto it is gone.
    pub fn transfer_ownership(&mut self, allocator: &crate::BufferAllocator) {
        self.owner = Arc::downgrade(allocator.inner());
    }

    /// Releases this handle.
    pub fn release(&mut self) -> Result<(), MemoryError> {
        match self.storage.take() {
            Some(_) => Ok(()),
            None => Err(MemoryError::AlreadyReleased),
        }
    }

    pub(crate) fn is_owned_by(&self, inner: &Arc<AllocatorInner>) -> bool {
        std::ptr::eq(self.owner.as_ptr(), Arc::as_ptr(inner))
    }

    fn check_range(&self, offset: usize, len: usize) -> Result<usize, MemoryError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.len => Ok(end),
            _ => Err(MemoryError::OutOfRange {
                offset,
                len,
                capacity: self.len,
            }),
        }
    }

    fn unique_bytes(&mut self, preserve: bool) -> Result<&mut [u8], MemoryError> {
        let shared = match &self.storage {
            Some(storage) => Arc::strong_count(storage) > 1,
            None => return Err(MemoryError::AlreadyReleased),
        };
        if shared {
            self.detach(preserve)?;
        }

        let (offset, len) = (self.offset, self.len);
        match self.storage.as_mut().and_then(Arc::get_mut) {
            Some(storage) => Ok(&mut storage.bytes[offset..offset + len]),
            None => Err(MemoryError::AlreadyReleased),
        }
    }

    fn detach(&mut self, preserve: bool) -> Result<(), MemoryError> {
        let owner = self
            .owner
            .upgrade()
            .ok_or_else(|| MemoryError::AllocatorClosed {
                allocator: "<dropped>".into(),
            })?;
        let mut fresh = owner.new_storage(self.len)?;
        if preserve {
            fresh.bytes.copy_from_slice(self.as_slice()?);
        }
        owner.record_detach(self.len);
        tracing::debug!(
            allocator = owner.name(),
            bytes = self.len,
            "detached shared buffer"
        );

        self.storage = Some(Arc::new(fresh));
        self.offset = 0;
        Ok(())
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("capacity", &self.len)
            .field("offset", &self.offset)
            .field("released", &self.is_released())
            .field("shared", &self.is_shared())
            .finish()
    }
}
