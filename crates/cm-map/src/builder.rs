//! The normalization pipeline run by [`Map::analyse_road_network`].
//!
//! Ingested polylines may cross anywhere along their length.  The passes
//! here rewrite them into a routable graph where roads touch intersections
//! only at their termini:
//!
//! 1. discover: find every shared node and record incident roads
//! 2. split: cut roads at interior intersections
//! 3. discover again: splitting raises degrees at the cut vertices
//! 4. fuse: merge degree-2 same-name pairs back into single roads
//! 5. anchor: bind both endpoints of every road, minting dead ends
//!
//! Node degree counts *occurrences*, not distinct roads: a road that
//! revisits a node raises its degree on each pass through it, and incident
//! lists hold one entry per occurrence.  All passes walk the ID-ordered
//! tables, so fresh road IDs are reproducible for a given input.

use log::{debug, info, warn};
use rustc_hash::FxHashMap;

use cm_core::{NodeId, RoadId};

use crate::components::{Intersection, Road, RoadEnd};
use crate::map::{recompute_lengths, Map};

pub(crate) fn run(map: &mut Map) {
    discover_intersections(map);
    split_roads(map);
    discover_intersections(map);
    fuse_segments(map);
    anchor_endpoints(map);
    info!(
        "road network analysed: {} roads, {} intersections, {} nodes",
        map.roads.len(),
        map.intersections.len(),
        map.nodes.len()
    );
}

// ── Pass 1 and 3: intersection discovery ──────────────────────────────────────

/// Rebuild the intersection table from scratch.
///
/// Every node with degree > 1 becomes an intersection; its incident list
/// gets one entry per occurrence, in road-ID order.
fn discover_intersections(map: &mut Map) {
    map.intersections.clear();

    let mut degree: FxHashMap<NodeId, usize> = FxHashMap::default();
    for road in map.roads.values() {
        for nid in &road.nodes {
            *degree.entry(*nid).or_insert(0) += 1;
        }
    }

    for (rid, road) in map.roads.iter() {
        for &nid in &road.nodes {
            if degree.get(&nid).copied().unwrap_or(0) < 2 {
                continue;
            }
            if !map.intersections.contains_key(&nid) {
                let Some(node) = map.nodes.get(&nid) else {
                    warn!("junction node {nid} missing from node table, skipping");
                    continue;
                };
                map.intersections.insert(nid, Intersection::new(nid, node.local));
            }
            if let Some(inter) = map.intersections.get_mut(&nid) {
                inter.push_road(*rid);
            }
        }
    }

    debug!("discovered {} intersections", map.intersections.len());
}

// ── Pass 2: splitting ─────────────────────────────────────────────────────────

/// Cut every road at its interior intersections.
///
/// Adjacent fragments share the cut vertex.  The final fragment keeps the
/// original road ID; the ones before it are minted fresh IDs in sequence
/// order.
fn split_roads(map: &mut Map) {
    let road_ids: Vec<RoadId> = map.roads.keys().copied().collect();
    let mut created = 0usize;

    for rid in road_ids {
        let Some(road) = map.roads.get(&rid) else {
            continue;
        };
        let interior = road.nodes.len().saturating_sub(2);
        let cuts: Vec<usize> = road
            .nodes
            .iter()
            .enumerate()
            .skip(1)
            .take(interior)
            .filter(|(_, nid)| map.intersections.contains_key(nid))
            .map(|(i, _)| i)
            .collect();
        if cuts.is_empty() {
            continue;
        }

        let Some(mut road) = map.roads.remove(&rid) else {
            continue;
        };
        let sequence = std::mem::take(&mut road.nodes);

        let mut start = 0usize;
        for cut in cuts {
            let fid = map.id_alloc.next_road_id();
            if map.roads.contains_key(&fid) {
                warn!("fresh road id {fid} already taken, skipping a fragment of {rid}");
                continue;
            }
            let mut fragment = Road::new(fid, road.name.clone(), road.class);
            fragment.nodes = sequence[start..=cut].to_vec();
            recompute_lengths(&map.nodes, &mut fragment);
            map.roads.insert(fid, fragment);
            start = cut;
            created += 1;
        }

        road.nodes = sequence[start..].to_vec();
        recompute_lengths(&map.nodes, &mut road);
        map.roads.insert(rid, road);
    }

    if created > 0 {
        debug!("split pass carved {created} extra fragments");
    }
}

// ── Pass 4: fusing ────────────────────────────────────────────────────────────

/// Merge the two roads meeting at a degree-2 junction when they carry the
/// same name and class.
///
/// The pair is replaced by one fused road running through the junction,
/// the junction entry is dropped (its node stays, as an ordinary interior
/// vertex), and the far endpoints' incident lists are rewritten to the
/// fused ID.  Incident lists stay accurate throughout, so one ID-ordered
/// sweep also collapses whole chains of segments.
fn fuse_segments(map: &mut Map) {
    let junction_ids: Vec<NodeId> = map.intersections.keys().copied().collect();
    let mut fused = 0usize;

    for nid in junction_ids {
        // Reload on every iteration: earlier fusions rewrite incident lists.
        let Some(inter) = map.intersections.get(&nid) else {
            continue;
        };
        if inter.road_count() != 2 {
            continue;
        }
        let a_id = inter.roads()[0];
        let b_id = inter.roads()[1];
        if a_id == b_id {
            continue; // one road looping through the junction
        }
        let (Some(a), Some(b)) = (map.roads.get(&a_id), map.roads.get(&b_id)) else {
            debug!("junction {nid} lists a missing road, skipping");
            continue;
        };
        if a.name != b.name || a.class != b.class {
            continue;
        }

        // Orient A to finish at the junction and B to leave it, then join,
        // dropping B's duplicated first vertex.
        let Some(head) = oriented_towards(a, nid) else {
            warn!("road {a_id} does not terminate at junction {nid}, skipping fuse");
            continue;
        };
        let Some(tail) = oriented_from(b, nid) else {
            warn!("road {b_id} does not terminate at junction {nid}, skipping fuse");
            continue;
        };
        let far_a = head[0];
        let far_b = tail[tail.len() - 1];
        let name = a.name.clone();
        let class = a.class;

        let mut joined = head;
        joined.extend_from_slice(&tail[1..]);

        let fused_id = map.id_alloc.next_road_id();
        let mut road = Road::new(fused_id, name, class);
        road.nodes = joined;
        recompute_lengths(&map.nodes, &mut road);
        map.roads.insert(fused_id, road);
        map.roads.remove(&a_id);
        map.roads.remove(&b_id);
        map.intersections.remove(&nid);
        rewire_far_end(map, fused_id, a_id, far_a);
        rewire_far_end(map, fused_id, b_id, far_b);

        debug!("fused roads {a_id} and {b_id} into {fused_id} at junction {nid}");
        fused += 1;
    }

    let before = map.intersections.len();
    map.intersections.retain(|_, inter| inter.road_count() > 0);
    let emptied = before - map.intersections.len();
    if emptied > 0 {
        debug!("dropped {emptied} intersections left without roads");
    }
    if fused > 0 {
        debug!("fuse pass merged {fused} segment pairs");
    }
}

/// The road's vertex sequence oriented to finish at `junction`, or `None`
/// if the road does not terminate there.
fn oriented_towards(road: &Road, junction: NodeId) -> Option<Vec<NodeId>> {
    if road.last_node() == Some(junction) {
        Some(road.nodes.clone())
    } else if road.first_node() == Some(junction) {
        let mut nodes = road.nodes.clone();
        nodes.reverse();
        Some(nodes)
    } else {
        None
    }
}

/// The road's vertex sequence oriented to start at `junction`.
fn oriented_from(road: &Road, junction: NodeId) -> Option<Vec<NodeId>> {
    oriented_towards(road, junction).map(|mut nodes| {
        nodes.reverse();
        nodes
    })
}

/// Swap `old` for `fused` in the incident list at a fused road's far
/// endpoint.  Plain termini have no intersection entry and need nothing.
fn rewire_far_end(map: &mut Map, fused: RoadId, old: RoadId, far: NodeId) {
    let Some(inter) = map.intersections.get_mut(&far) else {
        return;
    };
    if inter.remove_road(old) {
        inter.push_road(fused);
    } else {
        debug!("far endpoint {far} did not list road {old}");
    }
}

// ── Pass 5: anchoring ─────────────────────────────────────────────────────────

/// Bind both endpoints of every road to an intersection.
///
/// Termini that are not already intersections become degree-1 dead ends.
/// Each endpoint binds exactly once; a rebind means an earlier pass
/// misbehaved and is logged.
fn anchor_endpoints(map: &mut Map) {
    let road_ids: Vec<RoadId> = map.roads.keys().copied().collect();
    let mut dead_ends = 0usize;

    for rid in road_ids {
        let Some(road) = map.roads.get(&rid) else {
            continue;
        };
        let (Some(first), Some(last)) = (road.first_node(), road.last_node()) else {
            warn!("road {rid} has no vertices to anchor");
            continue;
        };

        for (end, nid) in [(RoadEnd::Start, first), (RoadEnd::End, last)] {
            if !map.intersections.contains_key(&nid) {
                let Some(node) = map.nodes.get(&nid) else {
                    warn!("terminus {nid} of road {rid} missing from node table");
                    continue;
                };
                let mut dead_end = Intersection::new(nid, node.local);
                dead_end.push_road(rid);
                map.intersections.insert(nid, dead_end);
                dead_ends += 1;
            }
            if let Some(road) = map.roads.get_mut(&rid) {
                if !road.bind_endpoint(end, nid) {
                    warn!("endpoint {end:?} of road {rid} was already bound");
                }
            }
        }
    }

    if dead_ends > 0 {
        debug!("anchored {dead_ends} dead ends");
    }
}
