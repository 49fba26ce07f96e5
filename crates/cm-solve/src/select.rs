//! Random selection of far-apart route endpoints.

use log::debug;
use rand::Rng;

use cm_core::NodeId;
use cm_map::Map;

/// Required separation below which any distinct pair is accepted.  Keeps
/// the draw loop finite on maps whose intersections all coincide.
const SEPARATION_FLOOR: f64 = 1e-9;

/// Pick two distinct intersections roughly far apart.
///
/// The first draw demands at least half the local map extent between the
/// pair; every failed draw relaxes the demand by 3%, so dense or
/// lopsided maps still settle on a pair quickly.  Drawing the same
/// intersection twice does not count as an attempt.  Returns `None` when
/// the map has fewer than two intersections.
pub fn select_start_goal<R: Rng>(map: &Map, rng: &mut R) -> Option<(NodeId, NodeId)> {
    let count = map.intersection_count();
    if count < 2 {
        return None;
    }

    let mut threshold = map.local_width().max(map.local_height()) / 2.0;
    loop {
        let i = rng.gen_range(0..count);
        let j = rng.gen_range(0..count);
        if i == j {
            continue;
        }
        let a = map.intersections().values().nth(i)?;
        let b = map.intersections().values().nth(j)?;
        if a.local.distance(b.local) > threshold || threshold < SEPARATION_FLOOR {
            debug!("selected {} and {} (separation threshold {threshold:.3})", a.id, b.id);
            return Some((a.id, b.id));
        }
        threshold *= 0.97;
    }
}
