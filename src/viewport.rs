//! Host-side "viewport lock" (e.g. suppressing page scroll) held while the store is entered.

use std::cell::Cell;
use std::rc::Rc;

use log::debug;

/// Capability injected by the host
pub trait ViewportLock {
    fn acquire(&mut self);
    fn release(&mut self);
}

/// Lock that does nothing, for hosts without a scrollable page
#[derive(Debug, Default)]
pub struct NoopViewportLock;

impl ViewportLock for NoopViewportLock {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

/// Lock backed by a shared flag the host polls
#[derive(Debug, Clone, Default)]
pub struct FlagViewportLock {
    locked: Rc<Cell<bool>>,
}

impl FlagViewportLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }
}

impl ViewportLock for FlagViewportLock {
    fn acquire(&mut self) {
        self.locked.set(true);
    }

    fn release(&mut self) {
        self.locked.set(false);
    }
}

/// Balances acquire/release on an injected lock: at most one outstanding acquire
pub struct ScopedViewportLock {
    lock: Box<dyn ViewportLock>,
    held: bool,
}

impl ScopedViewportLock {
    pub fn new(lock: Box<dyn ViewportLock>) -> Self {
        Self { lock, held: false }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn acquire(&mut self) {
        if !self.held {
            debug!("viewport lock acquired");
            self.lock.acquire();
            self.held = true;
        }
    }

    pub fn release(&mut self) {
        if self.held {
            debug!("viewport lock released");
            self.lock.release();
            self.held = false;
        }
    }
}

impl Drop for ScopedViewportLock {
    fn drop(&mut self) {
        self.release();
    }
}
