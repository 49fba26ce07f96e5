//! Connected-component analysis over an analysed map.
//!
//! Real-world extracts are rarely one connected graph: clipped boundaries,
//! tagging gaps, and isolated service loops leave islands behind.  The
//! finder labels every intersection with its component so callers can pick
//! the dominant one (see [`Map::main_network`](crate::map::Map::main_network))
//! or inspect the fragments.

use std::collections::BTreeSet;

use log::debug;
use rustc_hash::FxHashMap;

use cm_core::{NodeId, RoadId};

use crate::map::Map;

/// One connected network: the intersections reachable from its seed, in
/// discovery order.
#[derive(Clone, Debug, Default)]
pub struct Network {
    members: Vec<NodeId>,
}

impl Network {
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Labels every intersection of a map with its connected network.
///
/// Traversal walks bound road endpoints, so the map must already be
/// analysed; on a raw map every intersection comes out as its own
/// singleton.  Networks are numbered in ascending seed-ID order, which
/// makes the labelling reproducible for a given map.
pub struct NetworkFinder<'m> {
    map: &'m Map,
    assignment: FxHashMap<NodeId, usize>,
    networks: Vec<Network>,
}

impl<'m> NetworkFinder<'m> {
    pub fn new(map: &'m Map) -> Self {
        let mut finder = Self {
            map,
            assignment: FxHashMap::default(),
            networks: Vec::new(),
        };
        if !map.is_analysed() {
            debug!("network finder run before analysis; components will be singletons");
        }
        finder.find_all();
        finder
    }

    /// Flood-fill from each unassigned intersection, ascending ID order.
    /// Nodes are labelled when pushed, so revisits never double-count.
    fn find_all(&mut self) {
        let seeds: Vec<NodeId> = self.map.intersections().keys().copied().collect();
        for seed in seeds {
            if self.assignment.contains_key(&seed) {
                continue;
            }
            let index = self.networks.len();
            let mut members = Vec::new();
            let mut stack = vec![seed];
            self.assignment.insert(seed, index);

            while let Some(nid) = stack.pop() {
                members.push(nid);
                for conn in self.map.connections(nid) {
                    if self.assignment.contains_key(&conn.other) {
                        continue;
                    }
                    if self.map.intersection(conn.other).is_none() {
                        debug!("road {} leads to unknown intersection {}", conn.road, conn.other);
                        continue;
                    }
                    self.assignment.insert(conn.other, index);
                    stack.push(conn.other);
                }
            }

            debug!("network {index}: {} intersections from seed {seed}", members.len());
            self.networks.push(Network { members });
        }
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Which network an intersection landed in.
    pub fn network_of(&self, intersection: NodeId) -> Option<usize> {
        self.assignment.get(&intersection).copied()
    }

    /// Index of the network with the most roads.  Ties keep the earlier
    /// (lower-seed) network.  `None` only when the map has no
    /// intersections at all.
    pub fn largest_by_roads(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None; // (index, road count)
        for index in 0..self.networks.len() {
            let roads = self.network_roads(index).len();
            match best {
                Some((_, count)) if roads <= count => {}
                _ => best = Some((index, roads)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// The distinct roads incident to a network's intersections.
    pub fn network_roads(&self, index: usize) -> BTreeSet<RoadId> {
        let mut roads = BTreeSet::new();
        if let Some(network) = self.networks.get(index) {
            for nid in &network.members {
                if let Some(inter) = self.map.intersection(*nid) {
                    roads.extend(inter.roads().iter().copied());
                }
            }
        }
        roads
    }

    /// Total vertex count over a network's roads.  Shared junction
    /// vertices count once per road, so this overstates the true node
    /// count; it is a comparison metric, not a census.
    pub fn network_node_count(&self, index: usize) -> usize {
        self.network_roads(index)
            .iter()
            .filter_map(|rid| self.map.road(*rid))
            .map(|road| road.nodes.len())
            .sum()
    }
}
