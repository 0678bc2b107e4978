//! Bounded frame store
//!
//! The store is shared between the capture producer (pushing frames) and the
//! owning thread (snapshotting and clearing). A single mutex guards the frame
//! sequence, so readers never observe a frame half-appended.
//!
//! Overflow policy: once `capacity` frames are held, further pushes are
//! rejected. The store keeps the earliest window of a recording.

use crate::config::PriorityHint;
use crate::frame::Frame;
use crate::session::SessionId;
use std::ops::Index;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Result of offering a frame to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Frame stored with this capture index
    Stored {
        /// Capture index stamped on the frame
        index: u64,
    },
    /// Store is at capacity, frame dropped
    Full,
}

impl PushOutcome {
    /// Whether the frame was stored
    #[must_use]
    pub const fn is_stored(self) -> bool {
        matches!(self, Self::Stored { .. })
    }
}

#[derive(Debug)]
struct StoreInner {
    frames: Vec<Frame>,
    capacity: usize,
    session_id: Option<SessionId>,
    priority: PriorityHint,
    next_index: u64,
    rejected: u64,
}

/// Thread-safe, bounded, ordered collection of frames
#[derive(Debug)]
pub struct FrameStore {
    inner: Mutex<StoreInner>,
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new(0)
    }
}

impl FrameStore {
    /// Create an empty store; nothing is admitted until [`FrameStore::start`]
    /// or with a non-zero `capacity`
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                frames: Vec::new(),
                capacity,
                session_id: None,
                priority: PriorityHint::default(),
                next_index: 0,
                rejected: 0,
            }),
        }
    }

    // A panic while holding the lock cannot leave `Vec<Frame>` half-updated.
    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the store for a new session
    pub fn start(&self, session_id: SessionId, priority: PriorityHint, capacity: usize) {
        let mut inner = self.lock();
        inner.frames = Vec::with_capacity(capacity.min(1024));
        inner.capacity = capacity;
        inner.session_id = Some(session_id);
        inner.priority = priority;
        inner.next_index = 0;
        inner.rejected = 0;
    }

    /// Append a frame if there is room
    pub fn push(&self, frame: Frame) -> PushOutcome {
        let mut inner = self.lock();
        if inner.frames.len() >= inner.capacity {
            inner.rejected += 1;
            if inner.rejected == 1 {
                warn!(
                    capacity = inner.capacity,
                    session = ?inner.session_id,
                    "frame store full, rejecting further frames"
                );
            } else {
                debug!(rejected = inner.rejected, "frame rejected, store full");
            }
            return PushOutcome::Full;
        }

        let index = inner.next_index;
        inner.next_index += 1;
        inner.frames.push(frame.with_index(index));
        PushOutcome::Stored { index }
    }

    /// Immutable view of the current contents
    ///
    /// Later pushes and clears do not affect a snapshot already taken.
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot {
        let inner = self.lock();
        FrameSnapshot {
            frames: inner.frames.as_slice().into(),
            session_id: inner.session_id.clone(),
            priority: inner.priority,
        }
    }

    /// Release all frames
    pub fn clear(&self) {
        let released = {
            let mut inner = self.lock();
            std::mem::take(&mut inner.frames)
        };
        if !released.is_empty() {
            debug!(frames = released.len(), "frame store cleared");
        }
        drop(released);
    }

    /// Number of stored frames
    #[must_use]
    pub fn count(&self) -> usize {
        self.lock().frames.len()
    }

    /// Whether the store holds no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Maximum number of frames
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Priority hint for downstream consumers
    #[must_use]
    pub fn priority(&self) -> PriorityHint {
        self.lock().priority
    }

    /// Current session, if started
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.lock().session_id.clone()
    }

    /// Frames rejected since the session started
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.lock().rejected
    }
}

/// Frozen, cheaply cloneable view of a store's frames
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    frames: Arc<[Frame]>,
    session_id: Option<SessionId>,
    priority: PriorityHint,
}

impl FrameSnapshot {
    /// Build a snapshot directly from frames
    #[must_use]
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            session_id: None,
            priority: PriorityHint::default(),
        }
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether there is nothing to encode
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at position `i`
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&Frame> {
        self.frames.get(i)
    }

    /// Frames in capture order
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Iterate frames in capture order
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Session the frames belong to
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Priority hint recorded by the store
    #[must_use]
    pub fn priority(&self) -> PriorityHint {
        self.priority
    }
}

impl Index<usize> for FrameSnapshot {
    type Output = Frame;

    fn index(&self, i: usize) -> &Frame {
        &self.frames[i]
    }
}

impl<'a> IntoIterator for &'a FrameSnapshot {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn frame(shade: u8) -> Frame {
        Frame::solid(2, 2, [shade, shade, shade, 255]).unwrap()
    }

    fn started(capacity: usize) -> FrameStore {
        let store = FrameStore::default();
        store.start(SessionId::new("t", 0), PriorityHint::Normal, capacity);
        store
    }

    fn shades(snapshot: &FrameSnapshot) -> Vec<u8> {
        snapshot.iter().map(|f| f.data()[0]).collect()
    }

    mod push_tests {
        use super::*;

        #[test]
        fn test_unstarted_store_rejects() {
            let store = FrameStore::default();
            assert_eq!(store.push(frame(1)), PushOutcome::Full);
            assert!(store.is_empty());
        }

        #[test]
        fn test_push_assigns_indices() {
            let store = started(4);
            assert_eq!(store.push(frame(1)), PushOutcome::Stored { index: 0 });
            assert_eq!(store.push(frame(2)), PushOutcome::Stored { index: 1 });
            let snap = store.snapshot();
            assert_eq!(snap[0].index(), 0);
            assert_eq!(snap[1].index(), 1);
        }

        #[test]
        fn test_capacity_three_keeps_first_three() {
            let store = started(3);
            let outcomes: Vec<_> = [10, 20, 30, 40].into_iter().map(|s| store.push(frame(s))).collect();

            assert!(outcomes[..3].iter().all(|o| o.is_stored()));
            assert_eq!(outcomes[3], PushOutcome::Full);
            assert_eq!(store.count(), 3);
            assert_eq!(store.rejected(), 1);
            assert_eq!(shades(&store.snapshot()), vec![10, 20, 30]);
        }

        #[test]
        fn test_start_resets_contents() {
            let store = started(2);
            let _ = store.push(frame(1));
            let _ = store.push(frame(2));
            let _ = store.push(frame(3));

            store.start(SessionId::new("t", 1), PriorityHint::Lowest, 5);
            assert!(store.is_empty());
            assert_eq!(store.capacity(), 5);
            assert_eq!(store.rejected(), 0);
            assert_eq!(store.priority(), PriorityHint::Lowest);
            assert_eq!(store.session_id(), Some(SessionId::new("t", 1)));
            assert_eq!(store.push(frame(4)), PushOutcome::Stored { index: 0 });
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_snapshot_is_frozen() {
            let store = started(5);
            let _ = store.push(frame(1));
            let snap = store.snapshot();

            let _ = store.push(frame(2));
            store.clear();

            assert_eq!(snap.len(), 1);
            assert_eq!(shades(&snap), vec![1]);
            assert_eq!(snap.session_id(), Some(&SessionId::new("t", 0)));
            assert_eq!(snap.priority(), PriorityHint::Normal);
        }

        #[test]
        fn test_clear_is_idempotent() {
            let store = started(5);
            let _ = store.push(frame(1));
            store.clear();
            store.clear();
            assert_eq!(store.count(), 0);
            assert!(store.snapshot().is_empty());
        }

        #[test]
        fn test_concurrent_producer_and_reader() {
            let store = Arc::new(started(500));
            let producer = {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..500u32 {
                        let _ = store.push(frame((i % 256) as u8));
                    }
                })
            };

            for _ in 0..50 {
                let snap = store.snapshot();
                for (i, f) in snap.iter().enumerate() {
                    assert_eq!(f.index(), i as u64);
                    assert_eq!(f.data().len(), 16);
                }
            }

            producer.join().unwrap();
            assert_eq!(store.count(), 500);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_count_matches_successful_pushes(capacity in 1usize..40, pushes in 0usize..80) {
                let store = started(capacity);
                let mut stored = 0usize;
                for i in 0..pushes {
                    if store.push(frame((i % 256) as u8)).is_stored() {
                        stored += 1;
                    }
                    prop_assert!(store.count() <= capacity);
                }
                prop_assert_eq!(store.count(), stored);
                prop_assert_eq!(stored, pushes.min(capacity));
            }

            #[test]
            fn prop_order_preserved(shades_in in proptest::collection::vec(any::<u8>(), 0..30)) {
                let store = started(shades_in.len().max(1));
                for s in &shades_in {
                    let _ = store.push(frame(*s));
                }
                prop_assert_eq!(shades(&store.snapshot()), shades_in);
            }
        }
    }
}
