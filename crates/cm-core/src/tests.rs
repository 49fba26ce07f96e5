//! Unit tests for cm-core primitives.

#[cfg(test)]
mod ids {
    use std::collections::BTreeMap;

    use crate::{NodeId, RoadId};

    #[test]
    fn ordering() {
        assert!(NodeId(0) < NodeId(1));
        assert!(RoadId(100) > RoadId(99));
    }

    #[test]
    fn display() {
        assert_eq!(NodeId(7).to_string(), "NodeId(7)");
        assert_eq!(RoadId(31_337).to_string(), "RoadId(31337)");
    }

    #[test]
    fn raw_and_from() {
        let id: NodeId = 42u64.into();
        assert_eq!(id, NodeId(42));
        assert_eq!(id.raw(), 42);
    }

    #[test]
    fn usable_as_map_key() {
        let mut m: BTreeMap<RoadId, &str> = BTreeMap::new();
        m.insert(RoadId(2), "b");
        m.insert(RoadId(1), "a");
        let keys: Vec<_> = m.keys().copied().collect();
        assert_eq!(keys, vec![RoadId(1), RoadId(2)]);
    }
}

#[cfg(test)]
mod geo {
    use crate::{GeoPoint, LocalPoint, Projection};

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(48.137, 11.575);
        assert_eq!(p.distance(p), 0.0);
    }

    #[test]
    fn global_distance_is_plain_euclidean() {
        // 3-4-5 triangle in degree space: deliberately not geodesic.
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn local_distance() {
        let a = LocalPoint::new(1.0, 1.0);
        let b = LocalPoint::new(4.0, 5.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn landscape_fit() {
        // Box twice as wide (lon) as tall (lat).
        let proj = Projection::fit(10.0, 11.0, 20.0, 22.0);
        assert_eq!(proj.local_width(), 1000.0);
        assert_eq!(proj.local_height(), 500.0);
        assert!(!proj.is_degenerate());
    }

    #[test]
    fn portrait_fit() {
        let proj = Projection::fit(0.0, 4.0, 0.0, 2.0);
        assert_eq!(proj.local_width(), 500.0);
        assert_eq!(proj.local_height(), 1000.0);
    }

    #[test]
    fn y_axis_flips() {
        let proj = Projection::fit(10.0, 11.0, 20.0, 22.0);

        // South-west corner: x = 0, y = full height.
        let sw = proj.to_local(GeoPoint::new(10.0, 20.0));
        assert_eq!((sw.x, sw.y), (0.0, 500.0));

        // North-east corner: x = full width, y = 0.
        let ne = proj.to_local(GeoPoint::new(11.0, 22.0));
        assert_eq!((ne.x, ne.y), (1000.0, 0.0));

        // Centre lands in the centre.
        let c = proj.to_local(GeoPoint::new(10.5, 21.0));
        assert_eq!((c.x, c.y), (500.0, 250.0));
    }

    #[test]
    fn degenerate_bounds_stay_finite() {
        // Zero latitude extent: aspect fit impossible.
        let proj = Projection::fit(5.0, 5.0, 0.0, 1.0);
        assert!(proj.is_degenerate());
        assert_eq!(proj.local_width(), 1000.0);
        assert_eq!(proj.local_height(), 1000.0);

        let p = proj.to_local(GeoPoint::new(5.0, 0.5));
        assert!(p.x.is_finite() && p.y.is_finite());
    }
}

#[cfg(test)]
mod road_class {
    use crate::RoadClass;

    #[test]
    fn accepted_tags_roundtrip() {
        for tag in [
            "motorway",
            "primary",
            "secondary_link",
            "residential",
            "living_street",
            "footway",
            "unclassified",
        ] {
            let class = RoadClass::from_highway(tag)
                .unwrap_or_else(|| panic!("{tag} should be accepted"));
            assert_eq!(class.as_str(), tag);
        }
    }

    #[test]
    fn unknown_tags_rejected() {
        assert_eq!(RoadClass::from_highway("proposed"), None);
        assert_eq!(RoadClass::from_highway("razed"), None);
        assert_eq!(RoadClass::from_highway(""), None);
    }

    #[test]
    fn display() {
        assert_eq!(RoadClass::Motorway.to_string(), "motorway");
        assert_eq!(RoadClass::BusStop.to_string(), "bus_stop");
    }
}
