//! Steppable A* search over an analysed map.
//!
//! The solver is an inspectable state machine rather than a one-shot
//! routine.  Each [`Solver::step`] adopts the most promising frontier
//! intersection and relaxes all of its connections; [`Solver::sub_step`]
//! splits that into single-connection increments so a caller can watch
//! every road as it is examined.  Costs and the straight-line heuristic
//! both live in local-plane units, which keeps the heuristic admissible
//! and the arithmetic uniform.
//!
//! The goal itself is never expanded: the search finishes the moment the
//! goal reaches the front of the open set, and it stays parked there
//! while [`Solver::solution`] walks the predecessor records back to the
//! start.

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use cm_core::{NodeId, RoadId};
use cm_map::{Connection, Map};

use crate::error::{SolveError, SolveResult};
use crate::heap::{OpenSet, Score};

// ── Search state ──────────────────────────────────────────────────────────────

/// Where a search currently stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchState {
    /// The frontier still has candidates to examine.
    Searching,
    /// The goal reached the front of the open set; a route exists.
    Solved,
    /// The open set drained without reaching the goal.
    Exhausted,
}

/// Per-intersection bookkeeping: the best known approach and its cost.
#[derive(Copy, Clone, Debug)]
struct PathRecord {
    predecessor: Option<NodeId>,
    via:         Option<RoadId>,
    traveled:    f64,
    to_goal:     f64,
}

impl PathRecord {
    fn fresh(to_goal: f64) -> Self {
        Self { predecessor: None, via: None, traveled: f64::INFINITY, to_goal }
    }
}

// ── Solver ────────────────────────────────────────────────────────────────────

/// A* search over the intersections of an analysed [`Map`].
///
/// ```
/// use cm_core::{NodeId, RoadClass};
/// use cm_map::{Map, RawNode, RawRoad};
/// use cm_solve::Solver;
///
/// let mut map = Map::new();
/// map.set_global_bounds(0.0, 10.0, 0.0, 10.0);
/// map.add_road(RawRoad::new(1, "High Street", RoadClass::Residential, vec![
///     RawNode::new(1, 5.0, 2.0),
///     RawNode::new(2, 5.0, 8.0),
/// ]));
/// map.analyse_road_network();
///
/// let mut solver = Solver::new(&map, NodeId(1), NodeId(2))?;
/// solver.solve();
/// let route = solver.solution()?;
/// assert_eq!(route.len(), 1);
/// # Ok::<(), cm_solve::SolveError>(())
/// ```
pub struct Solver<'m> {
    map:     &'m Map,
    start:   NodeId,
    goal:    NodeId,
    state:   SearchState,
    open:    OpenSet,
    closed:  FxHashSet<NodeId>,
    records: FxHashMap<NodeId, PathRecord>,
    /// The intersection whose connections are being relaxed, if any.
    current: Option<NodeId>,
    /// Connections still to relax at `current`, staged in reverse so
    /// `pop()` walks them in incident-list order.
    pending: Vec<Connection>,
}

impl<'m> Solver<'m> {
    /// Prepare a search between two intersections.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError::UnknownIntersection`] when either end is not
    /// an intersection of the map.
    pub fn new(map: &'m Map, start: NodeId, goal: NodeId) -> SolveResult<Self> {
        if map.intersection(start).is_none() {
            return Err(SolveError::UnknownIntersection(start));
        }
        if map.intersection(goal).is_none() {
            return Err(SolveError::UnknownIntersection(goal));
        }

        let mut solver = Self {
            map,
            start,
            goal,
            state: SearchState::Searching,
            open: OpenSet::new(),
            closed: FxHashSet::default(),
            records: FxHashMap::default(),
            current: None,
            pending: Vec::new(),
        };

        let to_goal = solver.estimate_to_goal(start);
        let mut seed = PathRecord::fresh(to_goal);
        seed.traveled = 0.0;
        solver.records.insert(start, seed);
        solver.open.insert(start, Score(to_goal));
        Ok(solver)
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Run one full step: adopt the best frontier intersection and relax
    /// every connection it has.  A no-op once the search is done.
    pub fn step(&mut self) {
        if self.is_done() {
            return;
        }
        if self.current.is_none() {
            self.advance_frontier();
        }
        while self.current.is_some() {
            self.relax_next();
        }
    }

    /// Run one sub-step: either adopt the next frontier intersection
    /// (returning `None`) or relax exactly one connection, returning the
    /// road that was just examined.
    ///
    /// Interleaving `sub_step` and [`step`](Self::step) is fine; a step
    /// simply finishes whatever the sub-steps left half-done.
    pub fn sub_step(&mut self) -> Option<RoadId> {
        if self.is_done() {
            return None;
        }
        if self.current.is_none() {
            self.advance_frontier();
            return None;
        }
        self.relax_next()
    }

    /// Drive the search to a terminal state.
    pub fn solve(&mut self) {
        while !self.is_done() {
            self.step();
        }
    }

    /// Inspect the best open entry: finish the search if it is the goal
    /// (or the set is empty), otherwise adopt it as the current
    /// intersection and stage its connections.
    fn advance_frontier(&mut self) {
        match self.open.peek() {
            None => {
                debug!("open set exhausted before reaching {}", self.goal);
                self.state = SearchState::Exhausted;
            }
            Some((score, id)) if id == self.goal => {
                debug!("goal {id} at the front of the open set (f = {:.3})", score.0);
                self.state = SearchState::Solved;
            }
            Some(_) => {
                if let Some((_, id)) = self.open.pop() {
                    self.closed.insert(id);
                    self.current = Some(id);
                    self.stage_connections(id);
                }
            }
        }
    }

    fn stage_connections(&mut self, at: NodeId) {
        self.pending = self.map.connections(at);
        self.pending.reverse();
        if self.pending.is_empty() {
            debug!("intersection {at} has no connections to relax");
            self.current = None;
        }
    }

    /// Relax the next staged connection.  Every examined road is
    /// reported, including ones that improve nothing.
    fn relax_next(&mut self) -> Option<RoadId> {
        let current = self.current?;
        let conn = match self.pending.pop() {
            Some(conn) => conn,
            None => {
                self.current = None;
                return None;
            }
        };
        if self.pending.is_empty() {
            self.current = None; // frontier advances on the next call
        }

        let road_id = conn.road;
        if self.closed.contains(&conn.other) {
            return Some(road_id); // already settled, nothing to improve
        }
        let Some(road) = self.map.road(road_id) else {
            debug!("connection via missing road {road_id}");
            return Some(road_id);
        };
        let Some(here) = self.records.get(&current) else {
            debug!("no path record for current intersection {current}");
            return Some(road_id);
        };
        let candidate = here.traveled + road.local_length;

        let to_goal = self.estimate_to_goal(conn.other);
        let record = self
            .records
            .entry(conn.other)
            .or_insert_with(|| PathRecord::fresh(to_goal));
        if self.open.contains(conn.other) && record.traveled <= candidate {
            return Some(road_id); // the queued approach is at least as good
        }

        record.predecessor = Some(current);
        record.via = Some(road_id);
        record.traveled = candidate;
        let f = candidate + record.to_goal;
        self.open.insert(conn.other, Score(f));
        Some(road_id)
    }

    /// Straight-line local distance to the goal.
    fn estimate_to_goal(&self, from: NodeId) -> f64 {
        match (self.map.intersection(from), self.map.intersection(self.goal)) {
            (Some(a), Some(b)) => a.local.distance(b.local),
            _ => 0.0,
        }
    }

    // ── Results & introspection ───────────────────────────────────────────

    /// The finished route as hops of (road taken, intersection reached).
    /// The start intersection is not an entry, so coincident start and
    /// goal yield an empty route.
    ///
    /// # Errors
    ///
    /// [`SolveError::NotFinished`] while the search is still running,
    /// [`SolveError::NoRoute`] after exhaustion, and
    /// [`SolveError::MissingPredecessor`] if the record chain is broken
    /// (which means a bug, not bad input).
    pub fn solution(&self) -> SolveResult<Vec<Connection>> {
        match self.state {
            SearchState::Searching => return Err(SolveError::NotFinished),
            SearchState::Exhausted => {
                return Err(SolveError::NoRoute { from: self.start, to: self.goal });
            }
            SearchState::Solved => {}
        }

        let mut hops = Vec::new();
        let mut cursor = self.goal;
        while cursor != self.start {
            if hops.len() > self.records.len() {
                return Err(SolveError::MissingPredecessor(cursor));
            }
            let Some(record) = self.records.get(&cursor) else {
                return Err(SolveError::MissingPredecessor(cursor));
            };
            let (Some(previous), Some(via)) = (record.predecessor, record.via) else {
                return Err(SolveError::MissingPredecessor(cursor));
            };
            hops.push(Connection { road: via, other: cursor });
            cursor = previous;
        }
        hops.reverse();
        Ok(hops)
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// `true` once the search reached [`SearchState::Solved`] or
    /// [`SearchState::Exhausted`].
    pub fn is_done(&self) -> bool {
        self.state != SearchState::Searching
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn goal(&self) -> NodeId {
        self.goal
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    /// Intersections currently queued in the open set, in heap order.
    pub fn open_intersections(&self) -> Vec<NodeId> {
        self.open.ids().collect()
    }
}
