//! Score-ordered open set with in-place priority updates.
//!
//! A* needs three things from its frontier: pop-lowest, a membership
//! check, and a key decrease when a cheaper approach to a queued
//! intersection turns up.  `std::collections::BinaryHeap` gives only the
//! first, so this is a hand-indexed binary min-heap: `entries` holds the
//! heap array and `position` maps each queued intersection to its slot so
//! an update can re-score it in place instead of pushing a duplicate.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use cm_core::NodeId;

/// An f-score with a total order.
///
/// `f64` alone cannot key a heap; `total_cmp` supplies the ordering.
/// Entries compare as `(Score, NodeId)` pairs, so equal scores fall back
/// to the intersection ID and the pop order stays reproducible.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Score(pub f64);

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// The open set: a binary min-heap over `(f-score, intersection)`.
#[derive(Default)]
pub struct OpenSet {
    entries:  Vec<(Score, NodeId)>,
    position: FxHashMap<NodeId, usize>,
}

impl OpenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.position.contains_key(&id)
    }

    /// The lowest-scored entry, left in place.
    pub fn peek(&self) -> Option<(Score, NodeId)> {
        self.entries.first().copied()
    }

    /// Queue an intersection, or re-score it if it is already queued.
    /// Lowered and raised scores both sift to their proper slot.
    pub fn insert(&mut self, id: NodeId, score: Score) {
        match self.position.get(&id) {
            Some(&at) => {
                self.entries[at].0 = score;
                let at = self.sift_up(at);
                self.sift_down(at);
            }
            None => {
                let at = self.entries.len();
                self.entries.push((score, id));
                self.position.insert(id, at);
                self.sift_up(at);
            }
        }
    }

    /// Remove and return the lowest-scored entry.
    pub fn pop(&mut self) -> Option<(Score, NodeId)> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap_entries(0, last);
        let (score, id) = self.entries.pop()?;
        self.position.remove(&id);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some((score, id))
    }

    /// Queued intersections in heap (not sorted) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|&(_, id)| id)
    }

    /// Restore the heap upward from `at`; returns the final slot.
    fn sift_up(&mut self, mut at: usize) -> usize {
        while at > 0 {
            let parent = (at - 1) / 2;
            if self.entries[parent] <= self.entries[at] {
                break;
            }
            self.swap_entries(at, parent);
            at = parent;
        }
        at
    }

    /// Restore the heap downward from `at`.
    fn sift_down(&mut self, mut at: usize) {
        loop {
            let mut smallest = at;
            for child in [2 * at + 1, 2 * at + 2] {
                if child < self.entries.len() && self.entries[child] < self.entries[smallest] {
                    smallest = child;
                }
            }
            if smallest == at {
                return;
            }
            self.swap_entries(at, smallest);
            at = smallest;
        }
    }

    /// Swap two slots and keep the position index in step.
    fn swap_entries(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.position.insert(self.entries[a].1, a);
        self.position.insert(self.entries[b].1, b);
    }
}
