use std::collections::BTreeMap;

use tracing::debug;

use crate::layer::WaypointLayer;
use crate::renderer::WaypointRenderer;
use crate::role::RenderRole;
use crate::waypoint::Waypoint;

pub const FLIGHT_PLAN_SOURCE_ID: &str = "flight-plan-layer";

/// Registers a flight plan's waypoints, in the active or inactive
/// flight-plan role.
///
/// Plan changes are diffed by uid so unchanged waypoints keep their
/// registration.
#[derive(Debug, Default)]
pub struct FlightPlanLayer {
    waypoints: BTreeMap<String, Waypoint>,
    active: bool,
}

impl FlightPlanLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self) -> RenderRole {
        if self.active {
            RenderRole::FLIGHT_PLAN_ACTIVE
        } else {
            RenderRole::FLIGHT_PLAN_INACTIVE
        }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn set_active(&mut self, active: bool, renderer: &mut WaypointRenderer) {
        if active == self.active {
            return;
        }
        let old_role = self.role();
        self.active = active;
        let new_role = self.role();
        for waypoint in self.waypoints.values() {
            renderer.register(waypoint, new_role, FLIGHT_PLAN_SOURCE_ID);
            renderer.deregister(waypoint, old_role, FLIGHT_PLAN_SOURCE_ID);
        }
    }

    pub fn set_waypoints(
        &mut self,
        waypoints: impl IntoIterator<Item = Waypoint>,
        renderer: &mut WaypointRenderer,
    ) {
        let role = self.role();
        let mut next: BTreeMap<String, Waypoint> = BTreeMap::new();
        for waypoint in waypoints {
            next.entry(waypoint.uid.clone()).or_insert(waypoint);
        }

        let mut removed = 0;
        for (uid, waypoint) in &self.waypoints {
            if !next.contains_key(uid) {
                renderer.deregister(waypoint, role, FLIGHT_PLAN_SOURCE_ID);
                removed += 1;
            }
        }
        let mut added = 0;
        for (uid, waypoint) in &next {
            if !self.waypoints.contains_key(uid) {
                renderer.register(waypoint, role, FLIGHT_PLAN_SOURCE_ID);
                added += 1;
            }
        }
        debug!("flight plan waypoints: +{added} -{removed}");
        self.waypoints = next;
    }
}

impl WaypointLayer for FlightPlanLayer {
    fn source_id(&self) -> &str {
        FLIGHT_PLAN_SOURCE_ID
    }

    fn clear(&mut self, renderer: &mut WaypointRenderer) {
        self.set_waypoints(std::iter::empty(), renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waypoint::WaypointKind;
    use foundation::math::GeoPoint;

    fn wp(uid: &str) -> Waypoint {
        Waypoint::new(uid, uid, GeoPoint::new(0.0, 0.0), WaypointKind::Intersection)
    }

    #[test]
    fn diffs_plan_changes() {
        let mut renderer = WaypointRenderer::new();
        let mut layer = FlightPlanLayer::new();
        layer.set_waypoints([wp("A"), wp("B"), wp("A")], &mut renderer);
        assert_eq!(layer.len(), 2);

        layer.set_waypoints([wp("B"), wp("C")], &mut renderer);
        assert!(!renderer.is_registered(&wp("A")));
        assert!(renderer.is_registered_as(&wp("B"), RenderRole::FLIGHT_PLAN_INACTIVE));
        assert!(renderer.is_registered_as(&wp("C"), RenderRole::FLIGHT_PLAN_INACTIVE));
    }

    #[test]
    fn activation_swaps_roles() {
        let mut renderer = WaypointRenderer::new();
        let mut layer = FlightPlanLayer::new();
        layer.set_waypoints([wp("A")], &mut renderer);
        layer.set_active(true, &mut renderer);
        assert_eq!(renderer.roles(&wp("A")), RenderRole::FLIGHT_PLAN_ACTIVE);

        layer.clear(&mut renderer);
        assert!(renderer.is_empty());
        assert!(layer.is_empty());
    }
}
