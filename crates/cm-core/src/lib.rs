//! `cm-core` — foundational types for the citymap routing toolkit.
//!
//! This crate is a dependency of every other `cm-*` crate.  It intentionally
//! has no `cm-*` dependencies and no mandatory external ones (only optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`ids`]        | `NodeId`, `RoadId`                                    |
//! | [`geo`]        | `GeoPoint`, `LocalPoint`, `Projection`                |
//! | [`road_class`] | `RoadClass` (accepted `highway` tag values)           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.          |

pub mod geo;
pub mod ids;
pub mod road_class;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::{GeoPoint, LocalPoint, Projection};
pub use ids::{NodeId, RoadId};
pub use road_class::RoadClass;
