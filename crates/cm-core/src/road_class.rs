//! Road classification taken from the OSM `highway` tag.
//!
//! The variant set is exactly the tag values the ingestion accepts; a way
//! whose `highway` value is not listed here is not a road for our purposes
//! and is skipped at load time.  Classification currently feeds two things:
//! the fuse pass (only same-name, same-class roads merge) and display
//! output.  It carries no cost semantics.

/// Classification of a road, mirroring the accepted `highway` tag values.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    MotorwayLink,
    TrunkLink,
    PrimaryLink,
    SecondaryLink,
    TertiaryLink,
    Road,
    Residential,
    Service,
    LivingStreet,
    Track,
    Pedestrian,
    Cycleway,
    Footway,
    Path,
    Bridleway,
    Crossing,
    Platform,
    Steps,
    Construction,
    BusStop,
    Corridor,
    Elevator,
    Unclassified,
}

impl RoadClass {
    /// Map an OSM `highway` tag value to a class.
    ///
    /// Returns `None` for values outside the accepted set (railway
    /// platforms, proposed roads, lifecycle tags…) — the caller drops the
    /// way.
    pub fn from_highway(tag: &str) -> Option<RoadClass> {
        let class = match tag {
            "motorway"       => RoadClass::Motorway,
            "trunk"          => RoadClass::Trunk,
            "primary"        => RoadClass::Primary,
            "secondary"      => RoadClass::Secondary,
            "tertiary"       => RoadClass::Tertiary,
            "motorway_link"  => RoadClass::MotorwayLink,
            "trunk_link"     => RoadClass::TrunkLink,
            "primary_link"   => RoadClass::PrimaryLink,
            "secondary_link" => RoadClass::SecondaryLink,
            "tertiary_link"  => RoadClass::TertiaryLink,
            "road"           => RoadClass::Road,
            "residential"    => RoadClass::Residential,
            "service"        => RoadClass::Service,
            "living_street"  => RoadClass::LivingStreet,
            "track"          => RoadClass::Track,
            "pedestrian"     => RoadClass::Pedestrian,
            "cycleway"       => RoadClass::Cycleway,
            "footway"        => RoadClass::Footway,
            "path"           => RoadClass::Path,
            "bridleway"      => RoadClass::Bridleway,
            "crossing"       => RoadClass::Crossing,
            "platform"       => RoadClass::Platform,
            "steps"          => RoadClass::Steps,
            "construction"   => RoadClass::Construction,
            "bus_stop"       => RoadClass::BusStop,
            "corridor"       => RoadClass::Corridor,
            "elevator"       => RoadClass::Elevator,
            "unclassified"   => RoadClass::Unclassified,
            _ => return None,
        };
        Some(class)
    }

    /// The `highway` tag value this class came from.
    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Motorway      => "motorway",
            RoadClass::Trunk         => "trunk",
            RoadClass::Primary       => "primary",
            RoadClass::Secondary     => "secondary",
            RoadClass::Tertiary      => "tertiary",
            RoadClass::MotorwayLink  => "motorway_link",
            RoadClass::TrunkLink     => "trunk_link",
            RoadClass::PrimaryLink   => "primary_link",
            RoadClass::SecondaryLink => "secondary_link",
            RoadClass::TertiaryLink  => "tertiary_link",
            RoadClass::Road          => "road",
            RoadClass::Residential   => "residential",
            RoadClass::Service       => "service",
            RoadClass::LivingStreet  => "living_street",
            RoadClass::Track         => "track",
            RoadClass::Pedestrian    => "pedestrian",
            RoadClass::Cycleway      => "cycleway",
            RoadClass::Footway       => "footway",
            RoadClass::Path          => "path",
            RoadClass::Bridleway     => "bridleway",
            RoadClass::Crossing      => "crossing",
            RoadClass::Platform      => "platform",
            RoadClass::Steps         => "steps",
            RoadClass::Construction  => "construction",
            RoadClass::BusStop       => "bus_stop",
            RoadClass::Corridor      => "corridor",
            RoadClass::Elevator      => "elevator",
            RoadClass::Unclassified  => "unclassified",
        }
    }
}

impl std::fmt::Display for RoadClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
