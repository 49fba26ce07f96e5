//! Coordinate types and the global→local map projection.
//!
//! The pipeline works in two coordinate spaces:
//!
//! - **global** — raw WGS-84 latitude/longitude as found in the source data;
//! - **local**  — a flat plane fitted to the dataset's bounding box, where
//!   the longer side measures [`Projection::REF_SIZE`] units and the shorter
//!   side scales proportionally (aspect preserved).
//!
//! Distances in both spaces are plain Euclidean.  Global distance over raw
//! degree deltas is deliberately not geodesic: every value is only ever
//! compared against other distances from the same dataset, so the shared
//! distortion cancels out.  All coordinates are `f64`, matching the
//! precision of the source data.

/// A raw WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Euclidean distance over raw (lat, lon) deltas, in degrees.
    ///
    /// Not geodesic and not metres — see the module docs for why that is
    /// acceptable here.
    #[inline]
    pub fn distance(self, other: GeoPoint) -> f64 {
        let d_lat = other.lat - self.lat;
        let d_lon = other.lon - self.lon;
        (d_lat * d_lat + d_lon * d_lon).sqrt()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// A position on the projected local plane.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
}

impl LocalPoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in local units.
    #[inline]
    pub fn distance(self, other: LocalPoint) -> f64 {
        let d_x = other.x - self.x;
        let d_y = other.y - self.y;
        (d_x * d_x + d_y * d_y).sqrt()
    }
}

impl std::fmt::Display for LocalPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Affine fit of a global bounding box onto the local plane.
///
/// The x axis grows with longitude.  The y axis **flips**: global north-up
/// becomes local top-down, so `y = 0` is the northern edge of the box.
///
/// ```
/// use cm_core::{GeoPoint, Projection};
///
/// // A box twice as wide as it is tall.
/// let proj = Projection::fit(10.0, 11.0, 20.0, 22.0);
/// assert_eq!(proj.local_width(), 1000.0);
/// assert_eq!(proj.local_height(), 500.0);
///
/// // North-west corner lands at the local origin.
/// let nw = proj.to_local(GeoPoint::new(11.0, 20.0));
/// assert_eq!((nw.x, nw.y), (0.0, 0.0));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projection {
    min_lat:       f64,
    min_lon:       f64,
    global_width:  f64,
    global_height: f64,
    local_width:   f64,
    local_height:  f64,
    degenerate:    bool,
}

impl Projection {
    /// Length of the longer local side, in local units.
    pub const REF_SIZE: f64 = 1000.0;

    /// Fit a projection to the given global bounds, preserving aspect ratio.
    ///
    /// Bounds with a non-positive (or non-finite) extent in either axis
    /// cannot preserve aspect; the fit degrades to a `REF_SIZE` square with
    /// unit global extents so projected coordinates stay finite.  Callers
    /// can detect this via [`is_degenerate`](Self::is_degenerate).
    pub fn fit(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        let global_width  = max_lon - min_lon;
        let global_height = max_lat - min_lat;

        let usable = global_width > 0.0
            && global_height > 0.0
            && global_width.is_finite()
            && global_height.is_finite();

        if !usable {
            return Self {
                min_lat,
                min_lon,
                global_width: 1.0,
                global_height: 1.0,
                local_width: Self::REF_SIZE,
                local_height: Self::REF_SIZE,
                degenerate: true,
            };
        }

        // The longer global side gets REF_SIZE; the other scales to match.
        let (local_width, local_height) = if global_width >= global_height {
            (Self::REF_SIZE, Self::REF_SIZE * global_height / global_width)
        } else {
            (Self::REF_SIZE * global_width / global_height, Self::REF_SIZE)
        };

        Self {
            min_lat,
            min_lon,
            global_width,
            global_height,
            local_width,
            local_height,
            degenerate: false,
        }
    }

    /// Project a global coordinate onto the local plane.
    #[inline]
    pub fn to_local(&self, p: GeoPoint) -> LocalPoint {
        let x = (p.lon - self.min_lon) / self.global_width * self.local_width;
        let y = self.local_height
            - (p.lat - self.min_lat) / self.global_height * self.local_height;
        LocalPoint::new(x, y)
    }

    #[inline]
    pub fn local_width(&self) -> f64 {
        self.local_width
    }

    #[inline]
    pub fn local_height(&self) -> f64 {
        self.local_height
    }

    /// `true` if the bounds could not support an aspect-preserving fit.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}
