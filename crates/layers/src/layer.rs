use crate::renderer::WaypointRenderer;

/// A collaborator that registers waypoints with the shared renderer under
/// its own source id.
pub trait WaypointLayer {
    fn source_id(&self) -> &str;

    /// Withdraws every registration this layer holds.
    fn clear(&mut self, renderer: &mut WaypointRenderer);
}
