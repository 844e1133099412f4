//! Injected mutual-exclusion capability.
//!
//! The registry and individual commands never create OS primitives. They are
//! handed something that implements [`Lock`]: an RTOS port wraps its mutex,
//! while bare-metal firmware can use the bundled [`SpinLock`].

use core::fmt;

/// A lock/unlock pair.
///
/// # Safety
///
/// Between a `lock` call returning and the matching `unlock`, no other caller
/// on any thread or interrupt context may return from `lock` on the same
/// object. [`Registry`](super::Registry) relies on this to hand out exclusive
/// access to its storage.
pub unsafe trait Lock: Sync {
    /// Acquire the lock, waiting for as long as it takes.
    fn lock(&self);

    /// Release the lock.
    fn unlock(&self);
}

// SAFETY: forwards to a lock that already upholds the contract.
unsafe impl<L: Lock + ?Sized> Lock for &L {
    fn lock(&self) {
        (**self).lock();
    }

    fn unlock(&self) {
        (**self).unlock();
    }
}

/// RAII holder that releases the lock when dropped, on every exit path.
pub struct LockGuard<'l, L: Lock + ?Sized> {
    lock: &'l L,
}

impl<'l, L: Lock + ?Sized> LockGuard<'l, L> {
    /// Acquire `lock` until the guard is dropped.
    pub fn new(lock: &'l L) -> Self {
        lock.lock();
        Self { lock }
    }
}

impl<L: Lock + ?Sized> Drop for LockGuard<'_, L> {
    fn drop(&mut self) {
        self.lock.unlock();
    }
}

impl<L: Lock + ?Sized> fmt::Debug for LockGuard<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard").finish_non_exhaustive()
    }
}

/// Busy-waiting lock built on `spin`.
#[derive(Debug, Default)]
pub struct SpinLock {
    inner: spin::Mutex<()>,
}

impl SpinLock {
    /// Create an unlocked spin lock.
    pub const fn new() -> Self {
        Self {
            inner: spin::Mutex::new(()),
        }
    }

    /// Whether someone currently holds the lock.
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

// SAFETY: `spin::Mutex` grants the lock to one holder at a time.
unsafe impl Lock for SpinLock {
    fn lock(&self) {
        // the mutex stays held until `unlock`
        core::mem::forget(self.inner.lock());
    }

    fn unlock(&self) {
        // SAFETY: only reached from `LockGuard::drop`, after a matching `lock`.
        unsafe { self.inner.force_unlock() }
    }
}
