//! Multi-body reconciliation.
//!
//! Each frame the set of tracked ids reported by the sensor is diffed against
//! the ids already known.  Lost ids are dropped first, then new ids get fresh
//! per-body state, so an id that comes back is never aliased to stale
//! gesture progress.
//!
//! The table also decides which body is in control (lowest tracking id) and
//! reports the edges of the multiple-visitors override: entered when more
//! than one body is tracked, left when exactly one remains.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::body::{Body, SkeletonView};
use crate::config::GestureConfig;
use crate::gesture::{SwipeDetectors, SwipeDirection};

// ════════════════════════════════════════════════════════════════════════════
// TrackedBody
// ════════════════════════════════════════════════════════════════════════════

/// State kept for one tracked visitor between frames.
#[derive(Debug, Clone)]
pub struct TrackedBody {
    pub tracking_id: u64,
    /// Frame number on which this id was first seen.
    pub first_seen:  u64,
    pub swipes:      SwipeDetectors,
    /// Render data from the latest frame.
    pub skeleton:    SkeletonView,
}

// ════════════════════════════════════════════════════════════════════════════
// Reconciliation — per-frame diff result
// ════════════════════════════════════════════════════════════════════════════

/// Edge of the multiple-visitors override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrowdChange {
    Entered,
    Left,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub lost:        Vec<u64>,
    pub appeared:    Vec<u64>,
    pub crowd:       Option<CrowdChange>,
    pub controlling: Option<u64>,
}

// ════════════════════════════════════════════════════════════════════════════
// BodyTable
// ════════════════════════════════════════════════════════════════════════════

/// Per-body state keyed by tracking id.
#[derive(Debug, Clone)]
pub struct BodyTable {
    bodies:  BTreeMap<u64, TrackedBody>,
    gesture: GestureConfig,
    crowd:   bool,
    frame:   u64,
}

impl BodyTable {
    pub fn new(gesture: GestureConfig) -> Self {
        BodyTable { bodies: BTreeMap::new(), gesture, crowd: false, frame: 0 }
    }

    /// Diff this frame's bodies against the known set.
    pub fn reconcile(&mut self, frame: &[Body]) -> Reconciliation {
        self.frame += 1;

        let mut tracked: Vec<u64> = frame.iter().filter(|b| b.is_tracked).map(|b| b.tracking_id).collect();
        tracked.sort_unstable();
        tracked.dedup();

        let lost: Vec<u64> = self
            .bodies
            .keys()
            .copied()
            .filter(|id| tracked.binary_search(id).is_err())
            .collect();
        for id in &lost {
            self.bodies.remove(id);
            info!(body = *id, "visitor lost");
        }

        let mut appeared = Vec::new();
        for &id in &tracked {
            if self.bodies.contains_key(&id) {
                continue;
            }
            self.bodies.insert(
                id,
                TrackedBody {
                    tracking_id: id,
                    first_seen:  self.frame,
                    swipes:      SwipeDetectors::new(&self.gesture),
                    skeleton:    SkeletonView { tracking_id: id, points: Vec::new(), bones: Vec::new() },
                },
            );
            appeared.push(id);
            info!(body = id, "visitor appeared");
        }

        let crowd = self.update_crowd();

        Reconciliation { lost, appeared, crowd, controlling: self.controlling() }
    }

    fn update_crowd(&mut self) -> Option<CrowdChange> {
        let count = self.bodies.len();
        if count > 1 && !self.crowd {
            self.crowd = true;
            info!(count, "multiple visitors");
            Some(CrowdChange::Entered)
        } else if count == 1 && self.crowd {
            self.crowd = false;
            info!("single visitor again");
            Some(CrowdChange::Left)
        } else {
            None
        }
    }

    /// Feed a tracked body's frame to its gesture recognizers and refresh its
    /// render data.  Unknown ids are ignored.
    pub fn observe(&mut self, body: &Body) -> Vec<SwipeDirection> {
        let Some(entry) = self.bodies.get_mut(&body.tracking_id) else {
            debug!(body = body.tracking_id, "frame for unknown body ignored");
            return Vec::new();
        };
        entry.skeleton = body.skeleton();
        entry.swipes.update(body)
    }

    /// The body that drives the camera and navigation: lowest tracking id.
    pub fn controlling(&self) -> Option<u64> {
        self.bodies.keys().next().copied()
    }

    pub fn crowd(&self) -> bool { self.crowd }

    pub fn len(&self) -> usize { self.bodies.len() }

    pub fn is_empty(&self) -> bool { self.bodies.is_empty() }

    pub fn get(&self, id: u64) -> Option<&TrackedBody> { self.bodies.get(&id) }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedBody> {
        self.bodies.values()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{standing_body, swipe_pose};
    use glam::Vec3;

    fn table() -> BodyTable {
        BodyTable::new(GestureConfig::default())
    }

    fn visitor(id: u64) -> Body {
        standing_body(id, Vec3::new(0.0, 0.6, 2.5))
    }

    fn untracked(id: u64) -> Body {
        Body { tracking_id: id, is_tracked: false, ..Body::default() }
    }

    #[test]
    fn first_sight_creates_entry() {
        let mut t = table();
        let r = t.reconcile(&[visitor(5)]);
        assert_eq!(r.appeared, vec![5]);
        assert!(r.lost.is_empty());
        assert_eq!(r.controlling, Some(5));
        assert_eq!(t.get(5).map(|b| b.first_seen), Some(1));
    }

    #[test]
    fn untracked_entries_are_ignored() {
        let mut t = table();
        let r = t.reconcile(&[untracked(1), visitor(2), untracked(3)]);
        assert_eq!(r.appeared, vec![2]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn empty_frame_drops_everyone() {
        let mut t = table();
        t.reconcile(&[visitor(1), visitor(2)]);
        let r = t.reconcile(&[]);
        assert_eq!(r.lost, vec![1, 2]);
        assert!(t.is_empty());
        assert_eq!(r.controlling, None);
    }

    #[test]
    fn controlling_is_lowest_id_regardless_of_order() {
        let mut t = table();
        let r = t.reconcile(&[visitor(42), visitor(7), visitor(19)]);
        assert_eq!(r.controlling, Some(7));
        let r = t.reconcile(&[visitor(42), visitor(19)]);
        assert_eq!(r.controlling, Some(19));
    }

    #[test]
    fn crowd_edges_fire_once() {
        let mut t = table();
        assert_eq!(t.reconcile(&[visitor(1)]).crowd, None);
        assert_eq!(t.reconcile(&[visitor(1), visitor(2)]).crowd, Some(CrowdChange::Entered));
        assert_eq!(t.reconcile(&[visitor(1), visitor(2)]).crowd, None);
        assert_eq!(t.reconcile(&[visitor(1), visitor(2), visitor(3)]).crowd, None);
        assert_eq!(t.reconcile(&[visitor(2)]).crowd, Some(CrowdChange::Left));
        assert_eq!(t.reconcile(&[visitor(2)]).crowd, None);
    }

    #[test]
    fn crowd_persists_when_room_empties() {
        let mut t = table();
        t.reconcile(&[visitor(1), visitor(2)]);
        assert_eq!(t.reconcile(&[]).crowd, None);
        assert!(t.crowd());
        assert_eq!(t.reconcile(&[visitor(3)]).crowd, Some(CrowdChange::Left));
    }

    #[test]
    fn returning_id_starts_fresh() {
        let mut t = table();
        t.reconcile(&[visitor(1)]);
        let pose = swipe_pose(1, crate::gesture::SwipeDirection::Left);
        t.observe(&pose);
        t.observe(&pose);
        assert_eq!(t.get(1).map(|b| b.swipes.left.segment()), Some(2));

        t.reconcile(&[]);
        t.reconcile(&[visitor(1)]);
        let entry = t.get(1).map(|b| (b.swipes.left.segment(), b.first_seen));
        assert_eq!(entry, Some((0, 3)));
    }

    #[test]
    fn duplicate_ids_count_once() {
        let mut t = table();
        let r = t.reconcile(&[visitor(4), visitor(4)]);
        assert_eq!(r.appeared, vec![4]);
        assert_eq!(r.crowd, None);
    }

    #[test]
    fn observe_refreshes_skeleton() {
        let mut t = table();
        t.reconcile(&[visitor(1)]);
        assert!(t.observe(&visitor(1)).is_empty());
        assert_eq!(t.get(1).map(|b| b.skeleton.points.len()), Some(25));
        assert!(t.observe(&visitor(9)).is_empty());
    }
}
