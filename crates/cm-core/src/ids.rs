//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` because
//! IDs come straight from the source dataset (OSM node/way IDs are 64-bit);
//! they are stable across the whole pipeline and are never recycled.  Fresh
//! road IDs minted during graph normalization start above the largest
//! observed input ID, so the two ranges cannot collide.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw dataset identifier.
            #[inline(always)]
            pub fn raw(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Identifier of a map node (a single geo-referenced point).
    ///
    /// Intersections are addressed by the `NodeId` of the node they sit on;
    /// there is no separate intersection ID space.
    pub struct NodeId(u64);
}

typed_id! {
    /// Identifier of a road (an ordered polyline of nodes).
    pub struct RoadId(u64);
}
