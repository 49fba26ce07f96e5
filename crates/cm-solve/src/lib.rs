//! `cm-solve` — steppable A* routing over analysed maps.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`solver`] | `Solver` state machine, `SearchState`, route reconstruction  |
//! | [`heap`]   | `OpenSet` indexed min-heap, `Score`                          |
//! | [`select`] | random far-apart endpoint selection                          |
//! | [`error`]  | `SolveError`, `SolveResult<T>`                               |

pub mod error;
pub mod heap;
pub mod select;
pub mod solver;

#[cfg(test)]
mod tests;

pub use error::{SolveError, SolveResult};
pub use heap::{OpenSet, Score};
pub use select::select_start_goal;
pub use solver::{SearchState, Solver};
