use bitflags::bitflags;
use layers::{AirportSize, Waypoint, WaypointKind};

use crate::facility::FacilityType;

bitflags! {
    /// Which nearest-facility results the map currently shows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FacilityVisibility: u8 {
        const AIRPORT_LARGE = 1;
        const AIRPORT_MEDIUM = 1 << 1;
        const AIRPORT_SMALL = 1 << 2;
        const VOR = 1 << 3;
        const NDB = 1 << 4;
        const INTERSECTION = 1 << 5;

        const AIRPORTS = Self::AIRPORT_LARGE.bits()
            | Self::AIRPORT_MEDIUM.bits()
            | Self::AIRPORT_SMALL.bits();
    }
}

impl FacilityVisibility {
    pub fn for_airport(size: AirportSize) -> Self {
        match size {
            AirportSize::Large => Self::AIRPORT_LARGE,
            AirportSize::Medium => Self::AIRPORT_MEDIUM,
            AirportSize::Small => Self::AIRPORT_SMALL,
        }
    }

    /// Flags that make a search category worth running. Airports run when
    /// any size class shows.
    pub fn for_category(category: FacilityType) -> Self {
        match category {
            FacilityType::Airport => Self::AIRPORTS,
            FacilityType::Vor => Self::VOR,
            FacilityType::Ndb => Self::NDB,
            FacilityType::Intersection => Self::INTERSECTION,
        }
    }

    pub fn shows_category(self, category: FacilityType) -> bool {
        self.intersects(Self::for_category(category))
    }

    /// Whether a nearest-search waypoint of this kind may be drawn.
    pub fn shows(self, waypoint: &Waypoint) -> bool {
        let required = match waypoint.kind {
            WaypointKind::Airport(size) => Self::for_airport(size),
            WaypointKind::Vor => Self::VOR,
            WaypointKind::Ndb => Self::NDB,
            WaypointKind::Intersection => Self::INTERSECTION,
            WaypointKind::User | WaypointKind::FlightPath => return false,
        };
        self.contains(required)
    }
}
