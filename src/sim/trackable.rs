//! Shared trackable contract: identifier, pose and state-change lifecycle

use std::collections::HashSet;
use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use super::geometry::Pose;

/// 128-bit trackable identifier, fixed for the trackable's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackableId {
    pub sub_id1: u64,
    pub sub_id2: u64,
}

impl TrackableId {
    /// Never issued by [`IdGenerator`]
    pub const INVALID: Self = Self {
        sub_id1: 0,
        sub_id2: 0,
    };

    pub fn new(sub_id1: u64, sub_id2: u64) -> Self {
        Self { sub_id1, sub_id2 }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for TrackableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}-{:016X}", self.sub_id1, self.sub_id2)
    }
}

/// Issues unique random identifiers.
///
/// Seeded generators produce the same id sequence every run.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: Pcg64,
    issued: HashSet<TrackableId>,
}

impl IdGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_rng(&mut rand::rng()),
        };
        Self {
            rng,
            issued: HashSet::new(),
        }
    }

    /// Draw a fresh identifier (never zero, never previously issued)
    pub fn next_id(&mut self) -> TrackableId {
        loop {
            let id = TrackableId::new(self.rng.random(), self.rng.random());
            if id.is_valid() && self.issued.insert(id) {
                return id;
            }
        }
    }
}

/// Pending change reported by the next consume call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StateChange {
    #[default]
    Unchanged,
    Added,
    Updated,
    Removed,
}

/// State-change bookkeeping for one trackable.
///
/// A removal requested while an update is pending is held back until the
/// update has been consumed, so consumers always see Updated before Removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lifecycle {
    state_change: StateChange,
    removal_pending: bool,
}

impl Lifecycle {
    pub fn added() -> Self {
        Self {
            state_change: StateChange::Added,
            removal_pending: false,
        }
    }

    pub fn state_change(&self) -> StateChange {
        self.state_change
    }

    /// Removed now, or after the pending update is consumed
    pub fn is_removing(&self) -> bool {
        self.removal_pending || self.state_change == StateChange::Removed
    }

    pub(crate) fn mark_added(&mut self) {
        self.state_change = StateChange::Added;
        self.removal_pending = false;
    }

    /// Returns false once the trackable is on its way out
    pub(crate) fn mark_updated(&mut self) -> bool {
        if self.is_removing() {
            return false;
        }
        // A not-yet-consumed Added already carries the latest data
        if self.state_change == StateChange::Unchanged {
            self.state_change = StateChange::Updated;
        }
        true
    }

    pub(crate) fn mark_removed(&mut self) {
        match self.state_change {
            StateChange::Updated => self.removal_pending = true,
            _ => self.state_change = StateChange::Removed,
        }
    }

    /// Report the current change and advance to the post-consume state
    pub(crate) fn consume(&mut self) -> StateChange {
        let observed = self.state_change;
        self.state_change = if self.removal_pending {
            self.removal_pending = false;
            StateChange::Removed
        } else {
            StateChange::Unchanged
        };
        observed
    }
}

/// Capability shared by every simulated trackable kind
pub trait Trackable {
    fn id(&self) -> TrackableId;

    /// World-space pose
    fn pose(&self) -> Pose;

    fn lifecycle(&self) -> &Lifecycle;

    fn state_change(&self) -> StateChange {
        self.lifecycle().state_change()
    }
}

/// Registry-side write access to a trackable's lifecycle
pub(crate) trait TrackableStorage: Trackable {
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;
}

/// Result of a consume call: immutable snapshots taken before the reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackableChanges<T> {
    pub added: Vec<T>,
    pub updated: Vec<T>,
    pub removed: Vec<TrackableId>,
}

impl<T> Default for TrackableChanges<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T> TrackableChanges<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// Snapshot-then-clear pass over one collection.
///
/// Partitions by current state, resets every reported entry and deletes the
/// removed ones, all within this call.
pub(crate) fn drain_changes<T>(items: &mut Vec<T>) -> TrackableChanges<T>
where
    T: TrackableStorage + Clone,
{
    let mut changes = TrackableChanges::default();

    for item in items.iter_mut() {
        match item.state_change() {
            StateChange::Unchanged => continue,
            StateChange::Added => changes.added.push(item.clone()),
            StateChange::Updated => changes.updated.push(item.clone()),
            StateChange::Removed => changes.removed.push(item.id()),
        }
        item.lifecycle_mut().consume();
    }

    if !changes.removed.is_empty() {
        let removed: HashSet<TrackableId> = changes.removed.iter().copied().collect();
        items.retain(|item| !removed.contains(&item.id()));
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generator_seeded_is_deterministic() {
        let mut a = IdGenerator::new(Some(42));
        let mut b = IdGenerator::new(Some(42));
        for _ in 0..16 {
            assert_eq!(a.next_id(), b.next_id());
        }
    }

    #[test]
    fn test_id_generator_unique() {
        let mut ids = IdGenerator::new(None);
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let id = ids.next_id();
            assert!(id.is_valid());
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn test_id_display() {
        let id = TrackableId::new(0xAB, 1);
        assert_eq!(id.to_string(), "00000000000000AB-0000000000000001");
    }

    #[test]
    fn test_lifecycle_added_then_consumed() {
        let mut lc = Lifecycle::added();
        assert_eq!(lc.consume(), StateChange::Added);
        assert_eq!(lc.state_change(), StateChange::Unchanged);
        assert_eq!(lc.consume(), StateChange::Unchanged);
    }

    #[test]
    fn test_lifecycle_update_then_remove_is_observed_in_order() {
        let mut lc = Lifecycle::default();
        assert!(lc.mark_updated());
        lc.mark_removed();
        assert_eq!(lc.state_change(), StateChange::Updated);
        assert_eq!(lc.consume(), StateChange::Updated);
        assert_eq!(lc.state_change(), StateChange::Removed);
        assert!(!lc.mark_updated());
    }

    #[test]
    fn test_lifecycle_update_keeps_added() {
        let mut lc = Lifecycle::added();
        assert!(lc.mark_updated());
        assert_eq!(lc.state_change(), StateChange::Added);
    }

    #[test]
    fn test_drain_deletes_every_removed_entry() {
        use crate::sim::anchor::SimulatedAnchor;

        let mut ids = IdGenerator::new(Some(9));
        let mut items: Vec<SimulatedAnchor> = (0..6)
            .map(|_| SimulatedAnchor::new(ids.next_id(), Pose::IDENTITY, None))
            .collect();
        assert_eq!(drain_changes(&mut items).added.len(), 6);

        let doomed: Vec<TrackableId> = items.iter().step_by(2).map(|a| a.id()).collect();
        for item in items.iter_mut().step_by(2) {
            item.lifecycle_mut().mark_removed();
        }

        let changes = drain_changes(&mut items);
        assert_eq!(changes.removed, doomed);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|a| !doomed.contains(&a.id())));
        assert!(drain_changes(&mut items).is_empty());
    }
}
