//! `cm-map` — road map arena, network normalization, and component
//! analysis.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`components`] | `Node`, `Road`, `Intersection`, `Connection`             |
//! | [`map`]        | `Map` arena, ingestion, analysis entry points            |
//! | [`network`]    | `NetworkFinder`, connected-component labelling           |
//! | [`osm`]        | `load_from_pbf` (feature = `"osm"` only)                 |
//! | [`error`]      | `MapError`, `MapResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.              |
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod components;
pub mod error;
pub mod map;
pub mod network;

mod builder;

#[cfg(feature = "osm")]
pub mod osm;


pub use components::{Connection, Intersection, Node, Road, RoadEnd};
pub use error::{MapError, MapResult};
pub use map::{Map, RawNode, RawRoad};
pub use network::{Network, NetworkFinder};
