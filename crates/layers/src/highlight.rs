use crate::layer::WaypointLayer;
use crate::renderer::WaypointRenderer;
use crate::role::RenderRole;
use crate::waypoint::Waypoint;

pub const HIGHLIGHT_SOURCE_ID: &str = "waypoint-highlight-layer";

/// Keeps at most one waypoint registered in the highlight role.
#[derive(Debug, Default)]
pub struct HighlightLayer {
    highlighted: Option<Waypoint>,
}

impl HighlightLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlighted(&self) -> Option<&Waypoint> {
        self.highlighted.as_ref()
    }

    pub fn set_waypoint(&mut self, waypoint: Option<Waypoint>, renderer: &mut WaypointRenderer) {
        if self.highlighted.as_ref().map(|w| &w.uid) == waypoint.as_ref().map(|w| &w.uid) {
            return;
        }
        if let Some(old) = self.highlighted.take() {
            renderer.deregister(&old, RenderRole::HIGHLIGHT, HIGHLIGHT_SOURCE_ID);
        }
        if let Some(new) = &waypoint {
            renderer.register(new, RenderRole::HIGHLIGHT, HIGHLIGHT_SOURCE_ID);
        }
        self.highlighted = waypoint;
    }
}

impl WaypointLayer for HighlightLayer {
    fn source_id(&self) -> &str {
        HIGHLIGHT_SOURCE_ID
    }

    fn clear(&mut self, renderer: &mut WaypointRenderer) {
        self.set_waypoint(None, renderer);
    }
}
