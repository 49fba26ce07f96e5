//! OSM PBF loader — enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use cm_map::osm::load_from_pbf;
//!
//! let mut map = load_from_pbf(Path::new("city.osm.pbf"))?;
//! map.analyse_road_network();
//! ```
//!
//! # What is loaded
//!
//! Only ways whose `highway` tag names a road class this crate models are
//! included (see [`RoadClass::from_highway`]).  Footways, buildings, POIs,
//! and relations are ignored.  The returned map is *not* analysed: callers
//! decide when to run the pipeline and whether to reduce to the main
//! network afterwards.
//!
//! # Memory note
//!
//! The loader buffers all OSM nodes in a `HashMap<i64, GeoPoint>` for the
//! first pass (needed because ways reference node IDs by OSM integer ID).
//! A metro-area extract is typically a few million entries.  The buffer is
//! freed once the kept ways have been ingested.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};
use osmpbf::{Element, ElementReader};

use cm_core::{GeoPoint, RoadClass};

use crate::map::{Map, RawNode, RawRoad};
use crate::MapError;

// ── Public entry point ────────────────────────────────────────────────────────

/// Load a map from an OSM PBF file.
///
/// The dataset's global bounds are measured from the kept ways' own
/// geometry, so clipped extracts project onto the full local plane.  Use
/// [`Map::add_road`] directly for non-OSM sources.
///
/// # Errors
///
/// Returns [`MapError::Osm`] on parse errors, [`MapError::Io`] on file
/// errors.
pub fn load_from_pbf(path: &Path) -> Result<Map, MapError> {
    // ── Phase 1: collect all OSM nodes + road ways in one sequential pass ──
    let reader = ElementReader::from_path(path)?;

    let mut all_nodes: HashMap<i64, GeoPoint> = HashMap::new();
    let mut road_ways: Vec<OsmWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                // Collect tags eagerly so &str lifetimes don't escape the closure.
                let tags: Vec<(&str, &str)> = w.tags().collect();
                let highway = tags
                    .iter()
                    .find(|(k, _)| *k == "highway")
                    .map(|(_, v)| *v);

                if let Some(tag) = highway {
                    match RoadClass::from_highway(tag) {
                        Some(class) => {
                            let name = tags
                                .iter()
                                .find(|(k, _)| *k == "name")
                                .map(|(_, v)| (*v).to_string())
                                .unwrap_or_default();
                            let refs: Vec<i64> = w.refs().collect();
                            road_ways.push(OsmWay { id: w.id(), name, class, refs });
                        }
                        None => {
                            debug!("skipping way {}: highway={tag} is not a modelled road", w.id());
                        }
                    }
                }
            }
            _ => {}
        })
        .map_err(|e| MapError::Osm(e.to_string()))?;

    // ── Phase 2: measure global bounds over the kept ways' geometry ───────
    let mut bounds: Option<[f64; 4]> = None; // [min_lat, max_lat, min_lon, max_lon]
    for way in &road_ways {
        for osm_id in &way.refs {
            if let Some(pos) = all_nodes.get(osm_id) {
                let b = bounds.get_or_insert([pos.lat, pos.lat, pos.lon, pos.lon]);
                b[0] = b[0].min(pos.lat);
                b[1] = b[1].max(pos.lat);
                b[2] = b[2].min(pos.lon);
                b[3] = b[3].max(pos.lon);
            }
        }
    }
    let Some([min_lat, max_lat, min_lon, max_lon]) = bounds else {
        info!("no road geometry found in {}", path.display());
        return Ok(Map::new());
    };

    // ── Phase 3: ingest ways in file order ────────────────────────────────
    let mut map = Map::new();
    map.set_global_bounds(min_lat, max_lat, min_lon, max_lon);

    let way_count = road_ways.len();
    for way in road_ways {
        let mut vertices = Vec::with_capacity(way.refs.len());
        for osm_id in way.refs {
            match all_nodes.get(&osm_id) {
                Some(pos) => vertices.push(RawNode::new(osm_id as u64, pos.lat, pos.lon)),
                None => debug!("way {} references missing node {osm_id}", way.id),
            }
        }
        map.add_road(RawRoad {
            id:    (way.id as u64).into(),
            name:  way.name,
            class: way.class,
            nodes: vertices,
        });
    }

    info!(
        "loaded {} of {way_count} ways from {} ({} nodes)",
        map.road_count(),
        path.display(),
        map.node_count()
    );
    Ok(map)
}

// ── Internal types ────────────────────────────────────────────────────────────

struct OsmWay {
    id:    i64,
    name:  String,
    class: RoadClass,
    refs:  Vec<i64>,
}
