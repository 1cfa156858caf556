use std::fmt;

use foundation::math::GeoPoint;
use layers::{AirportSize, Waypoint, WaypointKind};
use serde::{Deserialize, Serialize};

/// Stable facility identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Icao(pub String);

impl Icao {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Icao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Facility categories with their own nearest-search session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    Airport,
    Vor,
    Ndb,
    Intersection,
}

impl FacilityType {
    pub const ALL: [FacilityType; 4] = [
        FacilityType::Airport,
        FacilityType::Vor,
        FacilityType::Ndb,
        FacilityType::Intersection,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FacilityType::Airport => "airport",
            FacilityType::Vor => "vor",
            FacilityType::Ndb => "ndb",
            FacilityType::Intersection => "intersection",
        }
    }
}

impl fmt::Display for FacilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A navigation facility record as returned by a facility service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub icao: Icao,
    pub ident: String,
    #[serde(rename = "type")]
    pub facility_type: FacilityType,
    pub location: GeoPoint,
    /// Only meaningful for airports; missing sizes draw as small.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport_size: Option<AirportSize>,
}

impl Facility {
    pub fn new(
        icao: impl Into<String>,
        ident: impl Into<String>,
        facility_type: FacilityType,
        location: GeoPoint,
    ) -> Self {
        Self {
            icao: Icao::new(icao),
            ident: ident.into(),
            facility_type,
            location,
            airport_size: None,
        }
    }

    pub fn with_airport_size(mut self, size: AirportSize) -> Self {
        self.airport_size = Some(size);
        self
    }

    pub fn kind(&self) -> WaypointKind {
        match self.facility_type {
            FacilityType::Airport => {
                WaypointKind::Airport(self.airport_size.unwrap_or(AirportSize::Small))
            }
            FacilityType::Vor => WaypointKind::Vor,
            FacilityType::Ndb => WaypointKind::Ndb,
            FacilityType::Intersection => WaypointKind::Intersection,
        }
    }

    /// The renderer waypoint for this facility. Its uid is the ICAO, so every
    /// layer showing the same facility shares one renderer entry.
    pub fn to_waypoint(&self) -> Waypoint {
        Waypoint::new(self.icao.as_str(), &self.ident, self.location, self.kind())
    }
}
