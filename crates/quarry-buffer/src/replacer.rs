//! Page replacement policies for the buffer pool.

use crate::frame::FrameId;
use parking_lot::Mutex;
use quarry_common::page::AccessType;
use quarry_common::{QuarryError, Result};
use std::collections::{HashMap, VecDeque};

/// Trait for page replacement algorithms.
pub trait Replacer: Send + Sync {
    /// Records that the given frame was accessed.
    fn record_access(&self, frame_id: FrameId, access_type: AccessType) -> Result<()>;

    /// Marks a frame as evictable or not, maintaining the evictable count.
    fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> Result<()>;

    /// Selects and removes a victim frame, or None if nothing is evictable.
    fn evict(&self) -> Option<FrameId>;

    /// Removes a frame's access history. The frame must be evictable.
    fn remove(&self, frame_id: FrameId) -> Result<()>;

    /// Returns the number of evictable frames.
    fn size(&self) -> usize;
}

/// Per-frame access history for the LRU-K policy.
#[derive(Debug, Default)]
struct LruKNode {
    /// Timestamps of the most recent accesses, oldest first, at most k.
    history: VecDeque<u64>,
    /// Whether this frame may be chosen as a victim.
    is_evictable: bool,
}

struct LruKInner {
    /// Access history per tracked frame.
    node_store: HashMap<FrameId, LruKNode>,
    /// Logical clock, incremented on every recorded access.
    current_timestamp: u64,
    /// Number of evictable frames. Invariant: equals the count of nodes
    /// with `is_evictable` set.
    curr_size: usize,
}

/// LRU-K replacement policy.
///
/// The victim is the frame with the largest backward k-distance: the age
/// of its k-th most recent access, or +infinity for frames with fewer
/// than k recorded accesses. Ties among +infinity frames break toward the
/// earliest oldest access, and a frame with no recorded history at all
/// wins immediately.
pub struct LruKReplacer {
    /// Number of frames this replacer tracks; valid ids are [0, num_frames).
    num_frames: usize,
    /// History window size.
    k: usize,
    /// State protected by a single mutex. Operations never block on I/O.
    inner: Mutex<LruKInner>,
}

impl LruKReplacer {
    /// Creates a new LRU-K replacer for `num_frames` frames with window `k`.
    pub fn new(num_frames: usize, k: usize) -> Self {
        Self {
            num_frames,
            k,
            inner: Mutex::new(LruKInner {
                node_store: HashMap::new(),
                current_timestamp: 0,
                curr_size: 0,
            }),
        }
    }

    /// Returns the number of frames this replacer tracks.
    pub fn capacity(&self) -> usize {
        self.num_frames
    }

    fn check_frame(&self, frame_id: FrameId) -> Result<()> {
        if (frame_id.0 as usize) >= self.num_frames {
            return Err(QuarryError::InvalidFrame {
                frame_id: frame_id.0,
            });
        }
        Ok(())
    }
}

impl Replacer for LruKReplacer {
    fn record_access(&self, frame_id: FrameId, _access_type: AccessType) -> Result<()> {
        self.check_frame(frame_id)?;
        let mut inner = self.inner.lock();
        inner.current_timestamp += 1;
        let ts = inner.current_timestamp;
        let k = self.k;
        // New nodes start non-evictable; the pool flips them when the pin
        // count reaches zero.
        let node = inner.node_store.entry(frame_id).or_default();
        node.history.push_back(ts);
        if node.history.len() > k {
            node.history.pop_front();
        }
        Ok(())
    }

    fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> Result<()> {
        self.check_frame(frame_id)?;
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let Some(node) = inner.node_store.get_mut(&frame_id) else {
            return Ok(());
        };
        if evictable && !node.is_evictable {
            node.is_evictable = true;
            inner.curr_size += 1;
        } else if !evictable && node.is_evictable {
            node.is_evictable = false;
            inner.curr_size -= 1;
        }
        Ok(())
    }

    fn evict(&self) -> Option<FrameId> {
        let mut inner = self.inner.lock();
        if inner.curr_size == 0 {
            return None;
        }

        let mut candidate: Option<FrameId> = None;
        let mut min_ts = u64::MAX;
        let mut seen_less_than_k = false;
        for (&id, node) in &inner.node_store {
            if !node.is_evictable {
                continue;
            }
            // A frame with no recorded accesses wins immediately.
            let Some(&earliest) = node.history.front() else {
                candidate = Some(id);
                break;
            };
            if node.history.len() < self.k {
                if !seen_less_than_k || earliest < min_ts {
                    candidate = Some(id);
                    min_ts = earliest;
                    seen_less_than_k = true;
                }
            } else if !seen_less_than_k && (candidate.is_none() || earliest < min_ts) {
                candidate = Some(id);
                min_ts = earliest;
            }
        }

        let victim = candidate.expect("curr_size > 0 but no evictable frame found");
        inner.node_store.remove(&victim);
        inner.curr_size -= 1;
        Some(victim)
    }

    fn remove(&self, frame_id: FrameId) -> Result<()> {
        self.check_frame(frame_id)?;
        let mut inner = self.inner.lock();
        let Some(node) = inner.node_store.get(&frame_id) else {
            return Ok(());
        };
        if !node.is_evictable {
            return Err(QuarryError::NotEvictable {
                frame_id: frame_id.0,
            });
        }
        inner.node_store.remove(&frame_id);
        inner.curr_size -= 1;
        Ok(())
    }

    fn size(&self) -> usize {
        self.inner.lock().curr_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(replacer: &LruKReplacer, frame: u32) {
        replacer
            .record_access(FrameId(frame), AccessType::Unknown)
            .unwrap();
    }

    #[test]
    fn test_new_replacer_is_empty() {
        let replacer = LruKReplacer::new(10, 2);
        assert_eq!(replacer.capacity(), 10);
        assert_eq!(replacer.size(), 0);
        assert!(replacer.evict().is_none());
    }

    #[test]
    fn test_evict_prefers_infinite_distance() {
        // Accesses 1,2,3,4,1,2 with k=2: frames 3 and 4 have fewer than
        // k accesses (infinite backward distance); frame 3 has the
        // earliest oldest timestamp, so it goes first.
        let replacer = LruKReplacer::new(8, 2);
        for frame in [1, 2, 3, 4, 1, 2] {
            record(&replacer, frame);
        }
        for frame in [1, 2, 3, 4] {
            replacer.set_evictable(FrameId(frame), true).unwrap();
        }
        assert_eq!(replacer.size(), 4);

        assert_eq!(replacer.evict(), Some(FrameId(3)));
        assert_eq!(replacer.evict(), Some(FrameId(4)));
        // Among full histories, frame 1's oldest-of-k (ts 1) precedes
        // frame 2's (ts 2).
        assert_eq!(replacer.evict(), Some(FrameId(1)));
        assert_eq!(replacer.evict(), Some(FrameId(2)));
        assert_eq!(replacer.size(), 0);
        assert!(replacer.evict().is_none());
    }

    #[test]
    fn test_evict_by_oldest_of_k() {
        let replacer = LruKReplacer::new(8, 2);
        // Frame 1: accesses at ts 1, 3. Frame 2: accesses at ts 2, 4.
        record(&replacer, 1);
        record(&replacer, 2);
        record(&replacer, 1);
        record(&replacer, 2);
        replacer.set_evictable(FrameId(1), true).unwrap();
        replacer.set_evictable(FrameId(2), true).unwrap();

        // Frame 1's k-th most recent access (ts 1) is older.
        assert_eq!(replacer.evict(), Some(FrameId(1)));
        assert_eq!(replacer.evict(), Some(FrameId(2)));
    }

    #[test]
    fn test_history_window_trims_to_k() {
        let replacer = LruKReplacer::new(8, 2);
        // Frame 1 accessed four times; only ts 3,4 are retained.
        // Frame 2 accessed twice at ts 5,6.
        for frame in [1, 1, 1, 1, 2, 2] {
            record(&replacer, frame);
        }
        replacer.set_evictable(FrameId(1), true).unwrap();
        replacer.set_evictable(FrameId(2), true).unwrap();

        // oldest-of-k: frame 1 -> 3, frame 2 -> 5.
        assert_eq!(replacer.evict(), Some(FrameId(1)));
    }

    #[test]
    fn test_set_evictable_maintains_size() {
        let replacer = LruKReplacer::new(8, 2);
        record(&replacer, 1);
        record(&replacer, 2);

        replacer.set_evictable(FrameId(1), true).unwrap();
        replacer.set_evictable(FrameId(2), true).unwrap();
        assert_eq!(replacer.size(), 2);

        replacer.set_evictable(FrameId(1), false).unwrap();
        assert_eq!(replacer.size(), 1);

        // Toggling to the same state is a no-op.
        replacer.set_evictable(FrameId(1), false).unwrap();
        assert_eq!(replacer.size(), 1);

        // Unknown frames are ignored.
        replacer.set_evictable(FrameId(5), true).unwrap();
        assert_eq!(replacer.size(), 1);
    }

    #[test]
    fn test_non_evictable_frames_are_skipped() {
        let replacer = LruKReplacer::new(8, 2);
        record(&replacer, 1);
        record(&replacer, 2);
        replacer.set_evictable(FrameId(2), true).unwrap();

        assert_eq!(replacer.evict(), Some(FrameId(2)));
        assert!(replacer.evict().is_none());
    }

    #[test]
    fn test_remove() {
        let replacer = LruKReplacer::new(8, 2);
        record(&replacer, 1);
        record(&replacer, 2);
        replacer.set_evictable(FrameId(1), true).unwrap();
        replacer.set_evictable(FrameId(2), true).unwrap();

        replacer.remove(FrameId(1)).unwrap();
        assert_eq!(replacer.size(), 1);
        assert_eq!(replacer.evict(), Some(FrameId(2)));

        // Removing an untracked frame is a no-op.
        replacer.remove(FrameId(1)).unwrap();
    }

    #[test]
    fn test_remove_non_evictable_fails() {
        let replacer = LruKReplacer::new(8, 2);
        record(&replacer, 1);

        let err = replacer.remove(FrameId(1)).unwrap_err();
        assert!(matches!(err, QuarryError::NotEvictable { frame_id: 1 }));
    }

    #[test]
    fn test_out_of_range_frame_fails() {
        let replacer = LruKReplacer::new(4, 2);

        assert!(matches!(
            replacer.record_access(FrameId(4), AccessType::Unknown),
            Err(QuarryError::InvalidFrame { frame_id: 4 })
        ));
        assert!(replacer.set_evictable(FrameId(100), true).is_err());
        assert!(replacer.remove(FrameId(100)).is_err());
    }

    #[test]
    fn test_reaccess_after_eviction_starts_fresh() {
        let replacer = LruKReplacer::new(8, 2);
        record(&replacer, 1);
        record(&replacer, 1);
        replacer.set_evictable(FrameId(1), true).unwrap();
        assert_eq!(replacer.evict(), Some(FrameId(1)));

        // Frame 1 re-enters with a single access: infinite distance again.
        record(&replacer, 1);
        record(&replacer, 2);
        record(&replacer, 2);
        replacer.set_evictable(FrameId(1), true).unwrap();
        replacer.set_evictable(FrameId(2), true).unwrap();

        assert_eq!(replacer.evict(), Some(FrameId(1)));
    }
}
