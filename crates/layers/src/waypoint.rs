use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportSize {
    Large,
    Medium,
    Small,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointKind {
    Airport(AirportSize),
    Vor,
    Ndb,
    Intersection,
    User,
    /// A computed flight-plan point with no backing facility.
    FlightPath,
}

/// A drawable point of interest.
///
/// `uid` is stable for the same underlying point no matter which layer
/// produced it, so independent registrants share one renderer entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub uid: String,
    pub ident: String,
    pub location: GeoPoint,
    pub kind: WaypointKind,
}

impl Waypoint {
    pub fn new(
        uid: impl Into<String>,
        ident: impl Into<String>,
        location: GeoPoint,
        kind: WaypointKind,
    ) -> Self {
        Self {
            uid: uid.into(),
            ident: ident.into(),
            location,
            kind,
        }
    }
}
