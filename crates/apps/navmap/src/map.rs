use std::rc::Rc;

use foundation::math::MapProjection;
use layers::{
    CanvasId, CanvasSink, FlightPlanLayer, HighlightLayer, RenderRole, RenderStats, RoleStyle,
    StyledIconFactory, StyledLabelFactory, TextLabelManager, WaypointRenderer,
};
use runtime::{EventBus, Frame, Gauge, Metrics};
use scene::CameraController;
use streaming::{FacilitySearchManager, FacilityService};
use tracing::trace;

use crate::config::MapConfig;
use crate::event::MapEvent;

/// Canvas holding nearest-facility icons.
pub const NORMAL_CANVAS: CanvasId = CanvasId(0);
/// Canvas holding flight-plan icons, drawn over the normal canvas.
pub const FLIGHT_PLAN_CANVAS: CanvasId = CanvasId(1);
/// Topmost canvas, for the highlighted waypoint.
pub const HIGHLIGHT_CANVAS: CanvasId = CanvasId(2);

/// A moving map: camera, facility search and waypoint rendering driven
/// together once per frame.
#[derive(Debug)]
pub struct NavMap<S> {
    frame: Frame,
    bus: EventBus<MapEvent>,
    projection: MapProjection,
    camera: CameraController,
    search: FacilitySearchManager,
    service: S,
    renderer: WaypointRenderer,
    labels: TextLabelManager,
    highlight: HighlightLayer,
    flight_plan: FlightPlanLayer,
    gauges: Metrics,
}

impl<S: FacilityService> NavMap<S> {
    pub fn new(config: &MapConfig, service: S) -> Self {
        let size = config.projected_size();
        let mut camera = CameraController::new(&config.camera, size);
        camera.set_dead_zone(config.dead_zone);

        let mut search = FacilitySearchManager::new(config.search.clone());
        search.set_dead_zone(config.dead_zone);
        search.set_visibility(config.visibility.flags());

        let mut renderer = WaypointRenderer::new();
        configure_roles(&mut renderer, config.symbol_scale);
        search.attach(&mut renderer);

        Self {
            frame: Frame::first(),
            bus: EventBus::new(),
            projection: MapProjection::new(size.x, size.y),
            camera,
            search,
            service,
            renderer,
            labels: TextLabelManager::new(config.label_culling),
            highlight: HighlightLayer::new(),
            flight_plan: FlightPlanLayer::new(),
            gauges: Metrics::new(),
        }
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn search(&self) -> &FacilitySearchManager {
        &self.search
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn renderer(&self) -> &WaypointRenderer {
        &self.renderer
    }

    pub fn labels(&self) -> &TextLabelManager {
        &self.labels
    }

    pub fn highlight(&self) -> &HighlightLayer {
        &self.highlight
    }

    pub fn flight_plan(&self) -> &FlightPlanLayer {
        &self.flight_plan
    }

    /// Counters from every component plus the latest render gauges.
    pub fn metrics(&self) -> Metrics {
        let mut metrics = Metrics::new();
        metrics.merge(self.camera.metrics());
        metrics.merge(self.search.metrics());
        metrics.merge(&self.gauges);
        metrics
    }

    /// Queues an event for the next frame.
    pub fn emit(&mut self, event: MapEvent) {
        self.bus.emit(self.frame, event);
    }

    /// Runs one frame: events, camera, facility search, waypoints, labels.
    pub fn on_updated(&mut self, elapsed_ms: f64, canvas: &mut dyn CanvasSink) -> RenderStats {
        self.frame = self.frame.next(elapsed_ms);
        let elapsed_ms = self.frame.elapsed_ms;

        for event in self.bus.drain() {
            self.dispatch(event.payload);
        }

        let change = self.camera.update(elapsed_ms, &mut self.projection);
        if !change.is_empty() {
            trace!("projection changed: {change:?}");
        }
        // Also runs on empty changes so a pending dead-zone resync lands.
        self.search.on_projection_changed(change, &self.projection);

        self.search
            .update(elapsed_ms, &mut self.service, &mut self.renderer);

        let stats = self
            .renderer
            .update(&self.projection, &mut self.labels, canvas);
        self.labels.update(&self.projection);

        self.gauges
            .set_gauge(Gauge::RegisteredWaypoints, stats.registered as i64);
        self.gauges.set_gauge(Gauge::DrawnIcons, stats.drawn as i64);
        self.gauges
            .set_gauge(Gauge::VisibleLabels, self.labels.visible_labels().count() as i64);
        stats
    }

    fn dispatch(&mut self, event: MapEvent) {
        match event {
            MapEvent::RangeIndex(index) => self.camera.set_range_index(index),
            MapEvent::RangeIndexDelta(delta) => {
                self.camera.change_range_index(delta);
            }
            MapEvent::Orientation(setting) => self.camera.set_orientation_setting(setting),
            MapEvent::AutoNorthUp(auto) => self.camera.set_auto_north_up(auto),
            MapEvent::FacilityVisibility(flags) => self.search.set_visibility(flags),

            MapEvent::AirplanePosition(position) => self.camera.set_airplane_position(position),
            MapEvent::GroundTrack(track) => self.camera.set_track(track),
            MapEvent::TrueHeading(heading) => self.camera.set_heading(heading),
            MapEvent::OnGround(on_ground) => self.camera.set_on_ground(on_ground),
            MapEvent::GpsValid(valid) => self.camera.set_gps_valid(valid),
            MapEvent::HeadingValid(valid) => self.camera.set_heading_valid(valid),

            MapEvent::DeadZone(dead_zone) => {
                self.camera.set_dead_zone(dead_zone);
                self.search.set_dead_zone(dead_zone);
            }
            MapEvent::Resize(size) => self.camera.set_projected_size(size),

            MapEvent::PointerActivate => self.camera.activate_pointer(),
            MapEvent::PointerMove(delta) => self.camera.move_pointer(delta),
            MapEvent::PointerRelease => self.camera.deactivate_pointer(),
            MapEvent::PointerTarget(target) => self.camera.set_pointer_target(target),

            MapEvent::Highlight(waypoint) => {
                self.highlight.set_waypoint(waypoint, &mut self.renderer)
            }
            MapEvent::FlightPlanWaypoints(waypoints) => {
                self.flight_plan.set_waypoints(waypoints, &mut self.renderer)
            }
            MapEvent::FlightPlanActive(active) => {
                self.flight_plan.set_active(active, &mut self.renderer)
            }

            MapEvent::Focus(focus) => self.camera.set_focus(focus),
            MapEvent::Focused(focused) => self.camera.set_focused(focused),
            MapEvent::PlanCalculated => self.camera.on_plan_calculated(),
        }
    }
}

/// Styles each registrant role and stacks their canvases: nearest results at
/// the bottom, then the flight plan, then the highlight.
fn configure_roles(renderer: &mut WaypointRenderer, scale: f64) {
    let roles = [
        (RenderRole::NORMAL, RoleStyle::normal(0.0, 0.0, scale), NORMAL_CANVAS, false),
        (
            RenderRole::FLIGHT_PLAN_INACTIVE,
            RoleStyle::flight_plan(false, 1.0, 1.0, scale),
            FLIGHT_PLAN_CANVAS,
            false,
        ),
        (
            RenderRole::FLIGHT_PLAN_ACTIVE,
            RoleStyle::flight_plan(true, 2.0, 2.0, scale),
            FLIGHT_PLAN_CANVAS,
            false,
        ),
        (
            RenderRole::HIGHLIGHT,
            RoleStyle::highlight(3.0, 3.0, scale),
            HIGHLIGHT_CANVAS,
            true,
        ),
    ];
    for (role, style, canvas, always_show) in roles {
        let style = Rc::new(style);
        let labels = StyledLabelFactory::new(style.clone());
        let labels = if always_show { labels.always_show() } else { labels };
        renderer.set_icon_factory(role, Rc::new(StyledIconFactory::new(style)));
        renderer.set_label_factory(role, Rc::new(labels));
        renderer.set_canvas(role, canvas);
    }
}
