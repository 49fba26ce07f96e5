//! The map arena: id-keyed tables of nodes, roads, and intersections.
//!
//! # Data layout
//!
//! All entities live in `BTreeMap`s keyed by their typed ID.  Input IDs are
//! sparse 64-bit dataset identifiers, so ordered maps (rather than dense
//! vectors) are the natural arena here, and their sorted iteration keeps
//! every pass of the pipeline deterministic.  Cross-references between
//! entities are IDs, never references, so the builder passes can insert and
//! remove entries freely.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over local coordinates answers
//! nearest-intersection queries.  It is rebuilt once per analysis, after the
//! intersection set has settled.
//!
//! # Failure policy
//!
//! Malformed input degrades locally: a duplicate road, an unprojectable
//! node, or a dangling reference is skipped with a `log` diagnostic and the
//! rest of the map carries on.  Nothing here panics on bad data.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use cm_core::{GeoPoint, LocalPoint, NodeId, Projection, RoadClass, RoadId};

use crate::builder;
use crate::components::{Connection, Intersection, Node, Road};
use crate::network::NetworkFinder;

// ── Fresh-ID allocation ───────────────────────────────────────────────────────

/// Monotonic allocator for road IDs minted during analysis.
///
/// Seeded above every identifier observed at ingestion, so fresh IDs can
/// never collide with dataset IDs.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdAlloc {
    last: u64,
}

impl IdAlloc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identifier seen in the input so fresh IDs stay above it.
    #[inline]
    pub fn observe(&mut self, raw: u64) {
        self.last = self.last.max(raw);
    }

    /// Mint a fresh road ID.
    #[inline]
    pub fn next_road_id(&mut self) -> RoadId {
        self.last += 1;
        RoadId(self.last)
    }
}

// ── Ingestion value types ─────────────────────────────────────────────────────

/// One geo-referenced vertex of an incoming road.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawNode {
    pub id:       NodeId,
    pub position: GeoPoint,
}

impl RawNode {
    pub fn new(id: u64, lat: f64, lon: f64) -> Self {
        Self { id: NodeId(id), position: GeoPoint::new(lat, lon) }
    }
}

/// An incoming road polyline, as handed to [`Map::add_road`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRoad {
    pub id:    RoadId,
    pub name:  String,
    pub class: RoadClass,
    pub nodes: Vec<RawNode>,
}

impl RawRoad {
    pub fn new(id: u64, name: &str, class: RoadClass, nodes: Vec<RawNode>) -> Self {
        Self { id: RoadId(id), name: name.to_string(), class, nodes }
    }
}

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry in the spatial index: an intersection's local position.
#[derive(Clone)]
struct IntersectionEntry {
    point: [f64; 2], // [x, y]
    id: NodeId,
}

impl RTreeObject for IntersectionEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IntersectionEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Map ───────────────────────────────────────────────────────────────────────

/// A road map: the entity arena, the projection, and the analysis entry
/// points.
///
/// Typical lifecycle: set bounds, add roads, analyse, then either query
/// directly or extract the dominant connected network first.
///
/// ```
/// use cm_core::RoadClass;
/// use cm_map::{Map, RawNode, RawRoad};
///
/// let mut map = Map::new();
/// map.set_global_bounds(0.0, 10.0, 0.0, 10.0);
/// map.add_road(RawRoad::new(1, "High Street", RoadClass::Residential, vec![
///     RawNode::new(1, 5.0, 2.0),
///     RawNode::new(2, 5.0, 8.0),
/// ]));
/// map.analyse_road_network();
///
/// assert_eq!(map.road_count(), 1);
/// assert_eq!(map.intersection_count(), 2); // both termini anchored as dead ends
/// ```
pub struct Map {
    pub(crate) projection:    Option<Projection>,
    pub(crate) nodes:         BTreeMap<NodeId, Node>,
    pub(crate) roads:         BTreeMap<RoadId, Road>,
    pub(crate) intersections: BTreeMap<NodeId, Intersection>,
    pub(crate) id_alloc:      IdAlloc,
    pub(crate) analysed:      bool,
    spatial_idx: RTree<IntersectionEntry>,
}

impl Map {
    pub fn new() -> Self {
        Self {
            projection:    None,
            nodes:         BTreeMap::new(),
            roads:         BTreeMap::new(),
            intersections: BTreeMap::new(),
            id_alloc:      IdAlloc::new(),
            analysed:      false,
            spatial_idx:   RTree::new(),
        }
    }

    // ── Ingestion ─────────────────────────────────────────────────────────

    /// Install the projection for the dataset's global bounding box.
    ///
    /// Must happen before any road is added; once nodes have been
    /// projected the bounds are fixed for the lifetime of the map.
    pub fn set_global_bounds(&mut self, min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) {
        if !self.nodes.is_empty() {
            warn!(
                "global bounds change ignored: {} nodes already projected",
                self.nodes.len()
            );
            return;
        }
        let projection = Projection::fit(min_lat, max_lat, min_lon, max_lon);
        if projection.is_degenerate() {
            warn!(
                "degenerate global bounds [{min_lat}, {max_lat}] x [{min_lon}, {max_lon}]: \
                 falling back to a square fit"
            );
        }
        self.projection = Some(projection);
    }

    /// Add a road polyline to the map.
    ///
    /// Nodes are de-duplicated by ID across roads: an ID seen before is
    /// reused as-is (its stored coordinates win), new IDs are projected and
    /// inserted.  A road whose ID is already taken, or that is left with
    /// fewer than two vertices, is dropped with a diagnostic.
    pub fn add_road(&mut self, raw: RawRoad) {
        let Some(projection) = self.projection else {
            warn!("road {} rejected: global bounds not set", raw.id);
            return;
        };
        self.id_alloc.observe(raw.id.raw());
        if self.roads.contains_key(&raw.id) {
            warn!("duplicate road id {}: keeping the existing road", raw.id);
            return;
        }
        if raw.nodes.len() < 2 {
            warn!("road {} rejected: fewer than 2 vertices", raw.id);
            return;
        }

        let mut sequence = Vec::with_capacity(raw.nodes.len());
        for vertex in raw.nodes {
            self.id_alloc.observe(vertex.id.raw());
            self.nodes
                .entry(vertex.id)
                .or_insert_with(|| Node::new(vertex.id, vertex.position, projection.to_local(vertex.position)));
            sequence.push(vertex.id);
        }

        let mut road = Road::new(raw.id, raw.name, raw.class);
        road.nodes = sequence;
        recompute_lengths(&self.nodes, &mut road);
        self.roads.insert(raw.id, road);
    }

    // ── Analysis ──────────────────────────────────────────────────────────

    /// Run the full normalization pipeline: discover intersections, split
    /// roads at interior junctions, fuse degree-2 segment pairs, anchor
    /// every road endpoint.  Idempotent; a second call is a no-op.
    pub fn analyse_road_network(&mut self) {
        if self.analysed {
            debug!("road network already analysed, skipping");
            return;
        }
        builder::run(self);
        self.analysed = true;
        self.rebuild_spatial_index();
    }

    /// Extract the dominant connected network as a fresh, analysed map.
    ///
    /// Picks the network with the most roads (ties: discovery order),
    /// rebuilds a map from those roads under the same bounds, re-analyses
    /// it, and repeats until no further nodes drop out — discarding
    /// fragments can turn junctions into dead ends and orphan more pieces.
    ///
    /// Returns `None` if the network has not been analysed yet.  Logs a
    /// warning when more than a third of the nodes were lost, which
    /// usually means the source data is heavily fragmented.
    pub fn main_network(&self) -> Option<Map> {
        if !self.analysed {
            debug!("main network requested before analysis");
            return None;
        }

        let original_nodes = self.node_count();
        let mut current = self.extract_dominant();
        loop {
            let next = current.extract_dominant();
            let stable = next.node_count() == current.node_count();
            current = next;
            if stable {
                break;
            }
        }

        let lost = original_nodes.saturating_sub(current.node_count());
        if lost * 3 > original_nodes {
            warn!(
                "main network kept only {} of {} nodes: source data looks fragmented",
                current.node_count(),
                original_nodes
            );
        }
        info!(
            "main network: {} roads, {} intersections, {} nodes ({} nodes dropped)",
            current.road_count(),
            current.intersection_count(),
            current.node_count(),
            lost
        );
        Some(current)
    }

    /// One round of dominant-network extraction: largest network by road
    /// count, rebuilt through ingestion and re-analysed.
    fn extract_dominant(&self) -> Map {
        let mut rebuilt = Map::new();
        rebuilt.projection = self.projection;

        let finder = NetworkFinder::new(self);
        if let Some(best) = finder.largest_by_roads() {
            for rid in finder.network_roads(best) {
                let Some(road) = self.roads.get(&rid) else {
                    debug!("network references missing road {rid}");
                    continue;
                };
                let vertices = road
                    .nodes
                    .iter()
                    .filter_map(|nid| self.nodes.get(nid))
                    .map(|n| RawNode { id: n.id, position: n.global })
                    .collect();
                rebuilt.add_road(RawRoad {
                    id:    road.id,
                    name:  road.name.clone(),
                    class: road.class,
                    nodes: vertices,
                });
            }
        }
        rebuilt.analyse_road_network();
        rebuilt
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[inline]
    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(&id)
    }

    #[inline]
    pub fn intersection(&self, id: NodeId) -> Option<&Intersection> {
        self.intersections.get(&id)
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    pub fn roads(&self) -> &BTreeMap<RoadId, Road> {
        &self.roads
    }

    pub fn intersections(&self) -> &BTreeMap<NodeId, Intersection> {
        &self.intersections
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_analysed(&self) -> bool {
        self.analysed
    }

    /// Width of the projected plane (0 until bounds are set).
    pub fn local_width(&self) -> f64 {
        self.projection.map_or(0.0, |p| p.local_width())
    }

    /// Height of the projected plane (0 until bounds are set).
    pub fn local_height(&self) -> f64 {
        self.projection.map_or(0.0, |p| p.local_height())
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    /// Traversal view of an intersection: one [`Connection`] per usable
    /// incident road.  Unknown intersections and roads with unbound far
    /// endpoints contribute nothing (with a diagnostic for the latter).
    pub fn connections(&self, intersection: NodeId) -> Vec<Connection> {
        let Some(inter) = self.intersections.get(&intersection) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(inter.road_count());
        for &rid in inter.roads() {
            let Some(road) = self.roads.get(&rid) else {
                debug!("intersection {intersection} lists missing road {rid}");
                continue;
            };
            match road.other_endpoint(intersection) {
                Some(other) => out.push(Connection { road: rid, other }),
                None => debug!("road {rid} at {intersection} has no bound far endpoint"),
            }
        }
        out
    }

    /// Nearest analysed intersection to a local-plane position.
    ///
    /// `None` until [`analyse_road_network`](Self::analyse_road_network)
    /// has run (the index is built from the settled intersection set).
    pub fn nearest_intersection(&self, at: LocalPoint) -> Option<NodeId> {
        self.spatial_idx.nearest_neighbor(&[at.x, at.y]).map(|e| e.id)
    }

    fn rebuild_spatial_index(&mut self) {
        let entries: Vec<IntersectionEntry> = self
            .intersections
            .values()
            .map(|i| IntersectionEntry { point: [i.local.x, i.local.y], id: i.id })
            .collect();
        self.spatial_idx = RTree::bulk_load(entries);
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

// ── Length bookkeeping ────────────────────────────────────────────────────────

/// Recompute a road's cached lengths from the node table.
///
/// Vertices missing from the table are skipped with a diagnostic; the
/// remaining sequence still yields a usable (if approximate) length.
pub(crate) fn recompute_lengths(nodes: &BTreeMap<NodeId, Node>, road: &mut Road) {
    let mut missing = 0usize;
    let present: Vec<&Node> = road
        .nodes
        .iter()
        .filter_map(|id| {
            let node = nodes.get(id);
            if node.is_none() {
                missing += 1;
            }
            node
        })
        .collect();

    let mut local = 0.0;
    let mut global = 0.0;
    for pair in present.windows(2) {
        local += pair[0].local_distance(pair[1]);
        global += pair[0].global_distance(pair[1]);
    }

    if missing > 0 {
        debug!("road {}: {missing} vertices missing from node table, lengths approximate", road.id);
    }
    road.local_length = local;
    road.global_length = global;
}
