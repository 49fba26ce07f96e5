//! Unit tests for cm-solve.
//!
//! All tests run on small hand-built maps with square bounds
//! [0, 10] x [0, 10], so the local plane is 1000 x 1000 and one degree
//! is 100 local units.

#[cfg(test)]
mod helpers {
    use cm_core::RoadClass;
    use cm_map::{Map, RawNode, RawRoad};

    pub fn bounded_map() -> Map {
        let mut map = Map::new();
        map.set_global_bounds(0.0, 10.0, 0.0, 10.0);
        map
    }

    pub fn add_road(map: &mut Map, id: u64, name: &str, verts: &[(u64, f64, f64)]) {
        let nodes = verts
            .iter()
            .map(|&(nid, lat, lon)| RawNode::new(nid, lat, lon))
            .collect();
        map.add_road(RawRoad::new(id, name, RoadClass::Residential, nodes));
    }

    /// A three-hop zigzag from 1 to 4 next to a straight road 1-4.
    ///
    /// Local positions:
    ///   1:(100,500)  2:(200,400)  3:(300,600)  4:(400,500)
    ///
    /// The zigzag is about 506 local units, the straight road exactly
    /// 300, so the one-hop route always wins.
    pub fn zigzag_map() -> Map {
        let mut map = bounded_map();
        add_road(&mut map, 1, "Hop One", &[(1, 5.0, 1.0), (2, 6.0, 2.0)]);
        add_road(&mut map, 2, "Hop Two", &[(2, 6.0, 2.0), (3, 4.0, 3.0)]);
        add_road(&mut map, 3, "Hop Three", &[(3, 4.0, 3.0), (4, 5.0, 4.0)]);
        add_road(&mut map, 4, "Straight Shot", &[(1, 5.0, 1.0), (4, 5.0, 4.0)]);
        map.analyse_road_network();
        map
    }

    /// A map where the first approach queued for the goal is later
    /// improved, exercising the open set's key decrease.
    ///
    /// Local positions:
    ///   1:(100,500)  2:(300,500)  3:(500,700)  4:(700,500)
    ///   5:(500,900)  (plain bend vertex of the Bypass, not an intersection)
    ///
    /// From 2 the Bypass reaches 4 directly but bends through 5 (about
    /// 894 units); the Cutoff + Finish detour through 3 costs about 566.
    /// The search queues 4 via the Bypass first, then pops 3 and rewrites
    /// 4's record with the cheaper approach.
    pub fn detour_map() -> Map {
        let mut map = bounded_map();
        add_road(&mut map, 1, "Approach", &[(1, 5.0, 1.0), (2, 5.0, 3.0)]);
        add_road(&mut map, 2, "Bypass", &[(2, 5.0, 3.0), (5, 1.0, 5.0), (4, 5.0, 7.0)]);
        add_road(&mut map, 3, "Cutoff", &[(2, 5.0, 3.0), (3, 3.0, 5.0)]);
        add_road(&mut map, 4, "Finish", &[(3, 3.0, 5.0), (4, 5.0, 7.0)]);
        map.analyse_road_network();
        map
    }
}

// ── Open set ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod heap {
    use cm_core::NodeId;
    use crate::heap::{OpenSet, Score};

    #[test]
    fn pops_in_score_order() {
        let mut open = OpenSet::new();
        open.insert(NodeId(1), Score(3.0));
        open.insert(NodeId(2), Score(1.0));
        open.insert(NodeId(3), Score(2.0));

        assert_eq!(open.pop(), Some((Score(1.0), NodeId(2))));
        assert_eq!(open.pop(), Some((Score(2.0), NodeId(3))));
        assert_eq!(open.pop(), Some((Score(3.0), NodeId(1))));
        assert_eq!(open.pop(), None);
    }

    #[test]
    fn equal_scores_pop_by_id() {
        let mut open = OpenSet::new();
        open.insert(NodeId(9), Score(1.0));
        open.insert(NodeId(4), Score(1.0));
        open.insert(NodeId(7), Score(1.0));

        assert_eq!(open.pop(), Some((Score(1.0), NodeId(4))));
        assert_eq!(open.pop(), Some((Score(1.0), NodeId(7))));
        assert_eq!(open.pop(), Some((Score(1.0), NodeId(9))));
    }

    #[test]
    fn insert_lowers_a_queued_score() {
        let mut open = OpenSet::new();
        open.insert(NodeId(1), Score(5.0));
        open.insert(NodeId(2), Score(3.0));
        open.insert(NodeId(1), Score(1.0)); // re-score, not a duplicate

        assert_eq!(open.len(), 2);
        assert_eq!(open.peek(), Some((Score(1.0), NodeId(1))));
        assert_eq!(open.pop(), Some((Score(1.0), NodeId(1))));
        assert_eq!(open.pop(), Some((Score(3.0), NodeId(2))));
    }

    #[test]
    fn insert_can_raise_a_queued_score() {
        let mut open = OpenSet::new();
        open.insert(NodeId(1), Score(1.0));
        open.insert(NodeId(2), Score(2.0));
        open.insert(NodeId(1), Score(9.0));

        assert_eq!(open.pop(), Some((Score(2.0), NodeId(2))));
        assert_eq!(open.pop(), Some((Score(9.0), NodeId(1))));
    }

    #[test]
    fn empty_set_behaves() {
        let mut open = OpenSet::new();
        assert!(open.is_empty());
        assert_eq!(open.peek(), None);
        assert_eq!(open.pop(), None);
    }

    #[test]
    fn membership_tracks_pops() {
        let mut open = OpenSet::new();
        open.insert(NodeId(1), Score(1.0));
        open.insert(NodeId(2), Score(2.0));
        open.insert(NodeId(3), Score(3.0));
        assert!(open.contains(NodeId(1)));

        open.pop();
        assert!(!open.contains(NodeId(1)));
        assert!(open.contains(NodeId(2)));
        assert_eq!(open.len(), 2);
        assert_eq!(open.ids().count(), 2);
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod solver {
    use cm_core::{NodeId, RoadId};
    use cm_map::Connection;
    use crate::{SearchState, SolveError, Solver};
    use super::helpers;

    #[test]
    fn straight_road_beats_zigzag() {
        let map = helpers::zigzag_map();
        let mut solver = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();
        solver.solve();

        assert_eq!(solver.state(), SearchState::Solved);
        let route = solver.solution().unwrap();
        assert_eq!(route, vec![Connection { road: RoadId(4), other: NodeId(4) }]);
    }

    #[test]
    fn cheaper_detour_rewrites_queued_goal() {
        let map = helpers::detour_map();
        let mut solver = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();
        solver.solve();

        // The Bypass queued 4 first; the detour through 3 replaced it.
        let route = solver.solution().unwrap();
        assert_eq!(
            route,
            vec![
                Connection { road: RoadId(1), other: NodeId(2) },
                Connection { road: RoadId(3), other: NodeId(3) },
                Connection { road: RoadId(4), other: NodeId(4) },
            ]
        );

        // 200 + 2 * sqrt(80_000) local units.
        let traveled: f64 = route
            .iter()
            .map(|hop| map.road(hop.road).unwrap().local_length)
            .sum();
        assert!((traveled - 765.685_424_949_238).abs() < 1e-6);
    }

    #[test]
    fn goal_stays_parked_in_open_set() {
        let map = helpers::zigzag_map();
        let mut solver = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();
        solver.solve();

        assert_eq!(solver.state(), SearchState::Solved);
        assert!(solver.open_intersections().contains(&NodeId(4)));
    }

    #[test]
    fn goal_is_never_expanded() {
        let mut map = helpers::bounded_map();
        helpers::add_road(&mut map, 1, "Hop One", &[(1, 5.0, 1.0), (2, 6.0, 2.0)]);
        helpers::add_road(&mut map, 2, "Hop Two", &[(2, 6.0, 2.0), (3, 4.0, 3.0)]);
        helpers::add_road(&mut map, 3, "Hop Three", &[(3, 4.0, 3.0), (4, 5.0, 4.0)]);
        helpers::add_road(&mut map, 4, "Straight Shot", &[(1, 5.0, 1.0), (4, 5.0, 4.0)]);
        // Beyond the goal, only reachable by expanding it.
        helpers::add_road(&mut map, 5, "Beyond", &[(4, 5.0, 4.0), (6, 5.0, 9.0)]);
        map.analyse_road_network();

        let mut solver = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();
        solver.solve();

        assert_eq!(solver.state(), SearchState::Solved);
        assert!(!solver.open_intersections().contains(&NodeId(6)));
    }

    #[test]
    fn coincident_start_and_goal() {
        let map = helpers::zigzag_map();
        let mut solver = Solver::new(&map, NodeId(2), NodeId(2)).unwrap();
        assert!(!solver.is_done()); // nothing happens until the first step

        solver.step();
        assert_eq!(solver.state(), SearchState::Solved);
        assert!(solver.solution().unwrap().is_empty());
    }

    #[test]
    fn disconnected_goal_exhausts() {
        let mut map = helpers::bounded_map();
        helpers::add_road(&mut map, 1, "Here", &[(1, 1.0, 1.0), (2, 1.0, 2.0)]);
        helpers::add_road(&mut map, 2, "There", &[(3, 9.0, 8.0), (4, 9.0, 9.0)]);
        map.analyse_road_network();

        let mut solver = Solver::new(&map, NodeId(1), NodeId(3)).unwrap();
        solver.solve();

        assert_eq!(solver.state(), SearchState::Exhausted);
        assert!(matches!(
            solver.solution(),
            Err(SolveError::NoRoute { from: NodeId(1), to: NodeId(3) })
        ));
    }

    #[test]
    fn endpoints_must_be_intersections() {
        let map = helpers::detour_map();
        assert!(matches!(
            Solver::new(&map, NodeId(99), NodeId(4)),
            Err(SolveError::UnknownIntersection(NodeId(99)))
        ));
        // Node 5 exists but is a plain bend vertex, not an intersection.
        assert!(matches!(
            Solver::new(&map, NodeId(1), NodeId(5)),
            Err(SolveError::UnknownIntersection(NodeId(5)))
        ));
    }

    #[test]
    fn solution_requires_a_terminal_state() {
        let map = helpers::zigzag_map();
        let mut solver = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();
        assert!(matches!(solver.solution(), Err(SolveError::NotFinished)));

        solver.step(); // still mid-search after expanding the start
        assert!(matches!(solver.solution(), Err(SolveError::NotFinished)));
    }

    #[test]
    fn sub_steps_report_each_examined_road() {
        let map = helpers::zigzag_map();
        let mut solver = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();

        let mut seen = Vec::new();
        while !solver.is_done() {
            seen.push(solver.sub_step());
        }

        // Adopt 1, examine its two roads in incident order, then the next
        // frontier inspection finds the goal in front.
        assert_eq!(seen, vec![None, Some(RoadId(1)), Some(RoadId(4)), None]);
        assert_eq!(solver.state(), SearchState::Solved);
    }

    #[test]
    fn sub_stepping_matches_stepping() {
        let map = helpers::detour_map();

        let mut whole = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();
        whole.solve();

        let mut fine = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();
        while !fine.is_done() {
            fine.sub_step();
        }

        assert_eq!(whole.state(), fine.state());
        assert_eq!(whole.solution().unwrap(), fine.solution().unwrap());

        // Interleaving is fine too: a step finishes whatever sub-steps
        // left half-done.
        let mut mixed = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();
        mixed.sub_step();
        mixed.sub_step();
        while !mixed.is_done() {
            mixed.step();
        }
        assert_eq!(mixed.solution().unwrap(), whole.solution().unwrap());
    }

    #[test]
    fn reports_its_endpoints() {
        let map = helpers::zigzag_map();
        let solver = Solver::new(&map, NodeId(1), NodeId(4)).unwrap();
        assert_eq!(solver.start(), NodeId(1));
        assert_eq!(solver.goal(), NodeId(4));
        assert_eq!(solver.state(), SearchState::Searching);
        assert_eq!(solver.open_len(), 1); // just the seeded start
    }
}

// ── Endpoint selection ────────────────────────────────────────────────────────

#[cfg(test)]
mod select {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::select_start_goal;
    use super::helpers;

    #[test]
    fn needs_two_intersections() {
        let mut map = helpers::bounded_map();
        // A loop road: its single shared terminus is the only intersection.
        helpers::add_road(&mut map, 1, "Ring", &[(1, 5.0, 5.0), (2, 5.0, 6.0), (1, 5.0, 5.0)]);
        map.analyse_road_network();
        assert_eq!(map.intersection_count(), 1);

        let mut rng = SmallRng::seed_from_u64(1);
        assert!(select_start_goal(&map, &mut rng).is_none());
    }

    #[test]
    fn picks_a_distinct_pair_on_a_spread_map() {
        let map = helpers::zigzag_map();
        let mut rng = SmallRng::seed_from_u64(7);

        let (a, b) = select_start_goal(&map, &mut rng).unwrap();
        assert_ne!(a, b);
        assert!(map.intersection(a).is_some());
        assert!(map.intersection(b).is_some());
    }

    #[test]
    fn relaxes_until_a_tight_pair_passes() {
        let mut map = helpers::bounded_map();
        // Two dead ends 0.1 local units apart; the initial demand is 500.
        helpers::add_road(&mut map, 1, "Tiny", &[(1, 5.0, 5.0), (2, 5.0, 5.001)]);
        map.analyse_road_network();

        let mut rng = SmallRng::seed_from_u64(3);
        let (a, b) = select_start_goal(&map, &mut rng).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn coincident_intersections_still_resolve() {
        let mut map = helpers::bounded_map();
        // Distinct node IDs at the same position: separation is exactly 0,
        // so only the floor lets a pair through.
        helpers::add_road(&mut map, 1, "Zero Span", &[(1, 5.0, 5.0), (2, 5.0, 5.0)]);
        map.analyse_road_network();

        let mut rng = SmallRng::seed_from_u64(11);
        let (a, b) = select_start_goal(&map, &mut rng).unwrap();
        assert_ne!(a, b);
    }
}
