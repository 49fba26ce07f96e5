//! Demo binary: build a small synthetic city, reduce it to its main road
//! network, and route across it with the steppable A* solver.
//!
//! Run on the built-in city:
//!
//! ```text
//! cargo run -p route
//! ```
//!
//! Or, with the `osm` feature, on a real extract:
//!
//! ```text
//! cargo run -p route --features osm -- extract.osm.pbf
//! ```
//!
//! Set `RUST_LOG=debug` to watch the normalization passes and the search
//! frontier at work.

use std::time::Instant;

use anyhow::{Context, Result};
use cm_core::{LocalPoint, RoadClass};
use cm_map::{Map, RawNode, RawRoad};
use cm_solve::{select_start_goal, SolveError, Solver};
use rand::{rngs::SmallRng, SeedableRng};

const ENDPOINT_SEED: u64 = 42;

fn main() -> Result<()> {
    env_logger::init();

    // 1. Source map: an OSM extract if a path was given, the synthetic
    //    city otherwise.
    let mut map = match std::env::args().nth(1) {
        Some(path) => load_extract(&path)?,
        None => synthetic_city(),
    };

    // 2. Normalize the raw roads into a routable graph.
    let t0 = Instant::now();
    map.analyse_road_network();
    println!(
        "Analysed in {:.1?}: {} roads, {} intersections, {} nodes",
        t0.elapsed(),
        map.road_count(),
        map.intersection_count(),
        map.node_count()
    );

    // 3. Drop everything outside the dominant connected component.
    let map = map
        .main_network()
        .context("network analysis produced no main network")?;
    println!(
        "Main network kept {} roads across {} intersections",
        map.road_count(),
        map.intersection_count()
    );

    // 4. Pick two well-separated endpoints.
    let mut rng = SmallRng::seed_from_u64(ENDPOINT_SEED);
    let Some((start, goal)) = select_start_goal(&map, &mut rng) else {
        anyhow::bail!("map is too small to pick route endpoints");
    };
    println!("Routing from {start} to {goal}");

    // 5. Run the solver one relaxation at a time, the way an animated
    //    client would.
    let mut solver = Solver::new(&map, start, goal)?;
    let t1 = Instant::now();
    let mut advances = 0usize;
    let mut examined = 0usize;
    while !solver.is_done() {
        match solver.sub_step() {
            Some(_) => examined += 1,
            None => advances += 1,
        }
    }
    println!(
        "Search finished in {:.1?}: {} frontier advances, {} roads examined, {} still queued",
        t1.elapsed(),
        advances,
        examined,
        solver.open_len()
    );

    // 6. Walk the predecessor chain back into a printable route.
    match solver.solution() {
        Ok(route) => print_route(&map, &route),
        Err(SolveError::NoRoute { from, to }) => {
            println!("No route exists from {from} to {to}");
        }
        Err(err) => return Err(err.into()),
    }

    // 7. Snap an arbitrary point to the road network.
    let probe = LocalPoint::new(0.25 * map.local_width(), 0.25 * map.local_height());
    if let Some(snapped) = map.nearest_intersection(probe) {
        println!(
            "Nearest intersection to ({:.0}, {:.0}) is {snapped}",
            probe.x, probe.y
        );
    }

    Ok(())
}

fn print_route(map: &Map, route: &[cm_map::Connection]) {
    let total: f64 = route
        .iter()
        .filter_map(|hop| map.road(hop.road))
        .map(|road| road.local_length)
        .sum();
    println!("Route: {} hops, {:.1} local units", route.len(), total);
    println!(
        "{:<5} {:<22} {:<14} {:>10}   {}",
        "Hop", "Road", "Class", "Length", "Reaches"
    );
    println!("{}", "-".repeat(64));
    for (i, hop) in route.iter().enumerate() {
        let Some(road) = map.road(hop.road) else {
            continue;
        };
        let name = if road.name.is_empty() {
            "(unnamed)"
        } else {
            road.name.as_str()
        };
        println!(
            "{:<5} {:<22} {:<14} {:>10.1}   {}",
            i + 1,
            name,
            road.class.as_str(),
            road.local_length,
            hop.other
        );
    }
}

/// A hand-drawn town on a 10x10 degree patch.
///
/// Three streets cross three avenues on a regular grid, a diagonal cuts
/// through the middle, and Harbor Road runs off the south-west corner in
/// two same-name segments that the analysis fuses back together. Hamlet
/// Lane sits detached in the north-east so the main-network pass has
/// something to discard.
fn synthetic_city() -> Map {
    let mut map = Map::new();
    map.set_global_bounds(0.0, 10.0, 0.0, 10.0);

    // Grid vertices are numbered row-major: node 23 is row 2, column 3,
    // at latitude 5 and longitude 8.
    let streets = [
        (1, "First Street", [(11, 2.0, 2.0), (12, 2.0, 5.0), (13, 2.0, 8.0)]),
        (2, "Second Street", [(21, 5.0, 2.0), (22, 5.0, 5.0), (23, 5.0, 8.0)]),
        (3, "Third Street", [(31, 8.0, 2.0), (32, 8.0, 5.0), (33, 8.0, 8.0)]),
    ];
    for (id, name, vertices) in streets {
        map.add_road(raw_road(id, name, RoadClass::Residential, &vertices));
    }

    let avenues = [
        (4, "Ash Avenue", [(11, 2.0, 2.0), (21, 5.0, 2.0), (31, 8.0, 2.0)]),
        (5, "Birch Avenue", [(12, 2.0, 5.0), (22, 5.0, 5.0), (32, 8.0, 5.0)]),
        (6, "Cedar Avenue", [(13, 2.0, 8.0), (23, 5.0, 8.0), (33, 8.0, 8.0)]),
    ];
    for (id, name, vertices) in avenues {
        map.add_road(raw_road(id, name, RoadClass::Secondary, &vertices));
    }

    map.add_road(raw_road(
        7,
        "Diagonal Way",
        RoadClass::Tertiary,
        &[(11, 2.0, 2.0), (22, 5.0, 5.0), (33, 8.0, 8.0)],
    ));

    // Harbor Road arrives in two pieces meeting at a plain degree-2
    // vertex; the fuse pass rebuilds the single road.
    map.add_road(raw_road(
        8,
        "Harbor Road",
        RoadClass::Primary,
        &[(52, 2.0, 0.5), (11, 2.0, 2.0)],
    ));
    map.add_road(raw_road(
        9,
        "Harbor Road",
        RoadClass::Primary,
        &[(53, 0.5, 0.5), (52, 2.0, 0.5)],
    ));

    // Disconnected from everything above.
    map.add_road(raw_road(
        10,
        "Hamlet Lane",
        RoadClass::Service,
        &[(61, 9.0, 9.2), (62, 9.5, 9.5)],
    ));

    map
}

fn raw_road(id: u64, name: &str, class: RoadClass, vertices: &[(u64, f64, f64)]) -> RawRoad {
    let nodes = vertices
        .iter()
        .map(|&(node, lat, lon)| RawNode::new(node, lat, lon))
        .collect();
    RawRoad::new(id, name, class, nodes)
}

#[cfg(feature = "osm")]
fn load_extract(path: &str) -> Result<Map> {
    let map = cm_map::osm::load_from_pbf(std::path::Path::new(path))?;
    Ok(map)
}

#[cfg(not(feature = "osm"))]
fn load_extract(_path: &str) -> Result<Map> {
    anyhow::bail!("reading OSM extracts needs the `osm` feature (cargo run -p route --features osm)")
}
