//! Graph building blocks: nodes, roads, intersections, connections.
//!
//! These are plain data carriers; all pipeline logic lives in
//! [`crate::map`] and [`crate::builder`].  Cross-references are typed IDs
//! into the owning [`Map`](crate::Map)'s tables, never pointers, so
//! entities can be moved, removed, and rebuilt freely during analysis.

use cm_core::{GeoPoint, LocalPoint, NodeId, RoadClass, RoadId};

// ── Node ──────────────────────────────────────────────────────────────────────

/// A single geo-referenced point of the source data.
///
/// Immutable once created: the local position is assigned exactly once, by
/// the [`Map`](crate::Map) at ingestion time when the projection is known.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id:     NodeId,
    pub global: GeoPoint,
    pub local:  LocalPoint,
}

impl Node {
    pub fn new(id: NodeId, global: GeoPoint, local: LocalPoint) -> Self {
        Self { id, global, local }
    }

    /// Euclidean distance to `other` on the projected plane.
    #[inline]
    pub fn local_distance(&self, other: &Node) -> f64 {
        self.local.distance(other.local)
    }

    /// Euclidean distance to `other` in raw degree space.
    #[inline]
    pub fn global_distance(&self, other: &Node) -> f64 {
        self.global.distance(other.global)
    }
}

// ── Road ──────────────────────────────────────────────────────────────────────

/// Which terminus of a road an endpoint binding refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoadEnd {
    Start,
    End,
}

/// An ordered polyline of nodes with a name and classification.
///
/// `nodes` always holds at least two entries once a road is in the map.
/// The cached lengths are the sums of consecutive vertex distances in each
/// coordinate space; they are recomputed whenever the node sequence
/// changes (ingestion, splitting, fusing).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Road {
    pub id:            RoadId,
    pub name:          String,
    pub class:         RoadClass,
    pub nodes:         Vec<NodeId>,
    pub local_length:  f64,
    pub global_length: f64,
    endpoints: [Option<NodeId>; 2],
}

impl Road {
    pub fn new(id: RoadId, name: String, class: RoadClass) -> Self {
        Self {
            id,
            name,
            class,
            nodes: Vec::new(),
            local_length: 0.0,
            global_length: 0.0,
            endpoints: [None; 2],
        }
    }

    #[inline]
    pub fn first_node(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    #[inline]
    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Bind one endpoint to the intersection sitting on it.
    ///
    /// Each slot is assigned exactly once; a second bind is refused and
    /// returns `false` so the caller can report it.
    pub fn bind_endpoint(&mut self, end: RoadEnd, intersection: NodeId) -> bool {
        let slot = match end {
            RoadEnd::Start => 0,
            RoadEnd::End   => 1,
        };
        if self.endpoints[slot].is_some() {
            return false;
        }
        self.endpoints[slot] = Some(intersection);
        true
    }

    #[inline]
    pub fn endpoint(&self, end: RoadEnd) -> Option<NodeId> {
        match end {
            RoadEnd::Start => self.endpoints[0],
            RoadEnd::End   => self.endpoints[1],
        }
    }

    /// Both endpoint bindings, start first.
    #[inline]
    pub fn endpoints(&self) -> (Option<NodeId>, Option<NodeId>) {
        (self.endpoints[0], self.endpoints[1])
    }

    /// The intersection at the opposite end from `here`.
    ///
    /// Requires both endpoints to be bound and `here` to be one of them;
    /// otherwise `None`.  A road looping back onto one intersection
    /// answers with `here` itself.
    pub fn other_endpoint(&self, here: NodeId) -> Option<NodeId> {
        match self.endpoints {
            [Some(a), Some(b)] if a == here => Some(b),
            [Some(a), Some(b)] if b == here => Some(a),
            _ => None,
        }
    }
}

// ── Intersection ──────────────────────────────────────────────────────────────

/// A node where roads meet (or terminate, for degree-1 dead ends).
///
/// Identified by the `NodeId` of the node it sits on.  The incident list
/// holds one entry per road *occurrence*: a road looping back onto this
/// intersection appears twice.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intersection {
    pub id:    NodeId,
    pub local: LocalPoint,
    roads: Vec<RoadId>,
}

impl Intersection {
    pub fn new(id: NodeId, local: LocalPoint) -> Self {
        Self { id, local, roads: Vec::new() }
    }

    #[inline]
    pub fn push_road(&mut self, road: RoadId) {
        self.roads.push(road);
    }

    /// Remove every occurrence of `road`; `true` if anything was removed.
    pub fn remove_road(&mut self, road: RoadId) -> bool {
        let before = self.roads.len();
        self.roads.retain(|&r| r != road);
        self.roads.len() != before
    }

    #[inline]
    pub fn roads(&self) -> &[RoadId] {
        &self.roads
    }

    /// Number of incident road occurrences (the node's graph degree).
    #[inline]
    pub fn road_count(&self) -> usize {
        self.roads.len()
    }
}

// ── Connection ────────────────────────────────────────────────────────────────

/// Traversal view of one incident road: leaving the owning intersection
/// over `road` arrives at intersection `other`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    pub road:  RoadId,
    pub other: NodeId,
}
