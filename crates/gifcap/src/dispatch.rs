//! Result dispatcher
//!
//! Worker threads hand completions back to the owning thread through a
//! callback queue. Any thread may enqueue; only the bound thread may drain,
//! so every callback mutates owner state on the owner. A dispatcher starts
//! bound to the thread that created it and can be rebound by whoever holds
//! it mutably.

use crate::result::{CaptureError, CaptureResult};
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, ThreadId};

/// Callback run on the owning thread with mutable access to its context
pub type Callback<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Cloneable, thread-safe enqueue handle
pub struct DispatchSender<C> {
    tx: Sender<Callback<C>>,
}

impl<C> Clone for DispatchSender<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<C> std::fmt::Debug for DispatchSender<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchSender")
            .field("pending", &self.tx.len())
            .finish()
    }
}

impl<C> DispatchSender<C> {
    /// Queue a callback for the next drain
    ///
    /// Returns false when the dispatcher is gone and the callback was dropped.
    pub fn enqueue<F>(&self, callback: F) -> bool
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.tx.send(Box::new(callback)).is_ok()
    }
}

/// Single-threaded FIFO callback queue
pub struct ResultDispatcher<C> {
    tx: Sender<Callback<C>>,
    rx: Receiver<Callback<C>>,
    owner: ThreadId,
}

impl<C> Default for ResultDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for ResultDispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
            owner: self.owner,
        }
    }
}

impl<C> std::fmt::Debug for ResultDispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultDispatcher")
            .field("pending", &self.rx.len())
            .field("owner", &self.owner)
            .finish()
    }
}

impl<C> ResultDispatcher<C> {
    /// Create a dispatcher owned by the current thread
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            owner: thread::current().id(),
        }
    }

    /// Make the calling thread the one allowed to drain
    pub fn bind_to_current_thread(&mut self) {
        self.owner = thread::current().id();
    }

    /// Handle for worker threads
    #[must_use]
    pub fn sender(&self) -> DispatchSender<C> {
        DispatchSender {
            tx: self.tx.clone(),
        }
    }

    /// Queue a callback from any thread
    pub fn enqueue<F>(&self, callback: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        // The dispatcher holds a receiver, so the channel cannot be disconnected.
        let _ = self.tx.send(Box::new(callback));
    }

    /// Number of callbacks waiting for a drain
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Whether the calling thread owns this dispatcher
    #[must_use]
    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Run every callback queued so far, oldest first
    ///
    /// Callbacks queued while draining wait for the next call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` without running anything when called off the
    /// owning thread.
    pub fn drain_once(&self, ctx: &mut C) -> CaptureResult<usize> {
        if !self.is_owner_thread() {
            return Err(CaptureError::invalid_state(
                "result dispatcher drained outside its owning thread",
            ));
        }

        let batch: Vec<Callback<C>> = self.rx.try_iter().take(self.rx.len()).collect();
        let count = batch.len();
        for callback in batch {
            callback(ctx);
        }
        Ok(count)
    }
}
