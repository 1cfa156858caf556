use foundation::bounds::Margins;
use foundation::math::{GeoPoint, Vec2};
use layers::Waypoint;
use scene::{AutoNorthUp, Focus, MapOrientation};
use streaming::FacilityVisibility;

/// Change notifications delivered to a [`crate::NavMap`] between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    // Settings
    RangeIndex(usize),
    RangeIndexDelta(i64),
    Orientation(MapOrientation),
    AutoNorthUp(AutoNorthUp),
    FacilityVisibility(FacilityVisibility),

    // Airplane
    AirplanePosition(GeoPoint),
    GroundTrack(f64),
    TrueHeading(f64),
    OnGround(bool),
    GpsValid(bool),
    HeadingValid(bool),

    // Viewport
    DeadZone(Margins),
    Resize(Vec2),

    // Pointer
    PointerActivate,
    PointerMove(Vec2),
    PointerRelease,
    PointerTarget(GeoPoint),

    // Registrant layers
    Highlight(Option<Waypoint>),
    FlightPlanWaypoints(Vec<Waypoint>),
    FlightPlanActive(bool),

    // Flight-plan focus
    Focus(Option<Focus>),
    Focused(bool),
    PlanCalculated,
}
