mod focus_mode;

pub use focus_mode::FocusModeConfig;

use foundation::bounds::Margins;
use foundation::math::{GeoPoint, Projection, ProjectionChange, ProjectionParams, Vec2};
use runtime::{Counter, Metrics};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::focus::{Focus, FocusRangeTarget};
use crate::orientation::{
    AutoNorthUp, MapOrientation, OrientationInputs, RotationSource, resolve_orientation,
};
use crate::pointer::{PointerState, pointer_bounds};
use crate::range::{RangeContext, RangePolicy, RangeTable, ViewKind};
use focus_mode::FocusMode;

/// Solved focus ranges are mapped back to the first nominal range whose
/// north-up true range covers them.
const FOCUS_RANGE_FACTOR: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub view: ViewKind,
    pub ranges: RangeTable,
    pub default_range_index: usize,
    pub orientation: MapOrientation,
    pub auto_north_up: AutoNorthUp,
    /// Enables flight-plan focus mode.
    pub focus: Option<FocusModeConfig>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            view: ViewKind::default(),
            ranges: RangeTable::default(),
            default_range_index: 11,
            orientation: MapOrientation::HeadingUp,
            auto_north_up: AutoNorthUp::default(),
            focus: None,
        }
    }
}

/// Camera parameters pushed to the projection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    /// Great-arc radians.
    pub range: f64,
    pub target: GeoPoint,
    pub target_offset: Vec2,
    /// Radians.
    pub rotation: f64,
}

/// Latest airplane data seen by the camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AirplaneState {
    pub position: GeoPoint,
    pub track_deg: f64,
    pub heading_deg: f64,
    pub on_ground: bool,
    pub gps_valid: bool,
    pub heading_valid: bool,
}

impl Default for AirplaneState {
    fn default() -> Self {
        Self {
            position: GeoPoint::invalid(),
            track_deg: 0.0,
            heading_deg: 0.0,
            on_ground: false,
            gps_valid: true,
            heading_valid: true,
        }
    }
}

/// Turns range, orientation, airplane, pointer and focus inputs into one
/// [`CameraState`], applied to the projection at most once per update.
///
/// Inputs only mark the state dirty; nothing touches the projection until
/// [`CameraController::update`].
#[derive(Debug)]
pub struct CameraController {
    policy: Box<dyn RangePolicy>,
    ranges: RangeTable,
    range_setting: usize,
    range_index: usize,
    orientation_setting: MapOrientation,
    auto_north_up: AutoNorthUp,
    orientation: MapOrientation,
    rotation_source: Option<RotationSource>,
    airplane: AirplaneState,
    projected_size: Vec2,
    dead_zone: Margins,
    state: CameraState,
    pointer: PointerState,
    pointer_scroll: Vec2,
    focus: Option<FocusMode>,
    needs_update: bool,
    metrics: Metrics,
}

impl CameraController {
    pub fn new(config: &CameraConfig, projected_size: Vec2) -> Self {
        Self::with_policy(config.view.range_policy(), config, projected_size)
    }

    pub fn with_policy(
        policy: Box<dyn RangePolicy>,
        config: &CameraConfig,
        projected_size: Vec2,
    ) -> Self {
        let ranges = config.ranges.clone();
        let range_index = ranges.clamp_index(config.default_range_index);
        let mut camera = Self {
            policy,
            range_setting: range_index,
            range_index,
            ranges,
            orientation_setting: config.orientation,
            auto_north_up: config.auto_north_up,
            orientation: MapOrientation::NorthUp,
            rotation_source: None,
            airplane: AirplaneState::default(),
            projected_size,
            dead_zone: Margins::ZERO,
            state: CameraState {
                range: 0.0,
                target: GeoPoint::new(0.0, 0.0),
                target_offset: Vec2::ZERO,
                rotation: 0.0,
            },
            pointer: PointerState::new(pointer_bounds(projected_size, Margins::ZERO)),
            pointer_scroll: Vec2::ZERO,
            focus: config.focus.map(FocusMode::new),
            needs_update: true,
            metrics: Metrics::new(),
        };
        camera.orientation = camera.desired_orientation();
        camera.apply_orientation();
        camera
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn airplane(&self) -> &AirplaneState {
        &self.airplane
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn ranges(&self) -> &RangeTable {
        &self.ranges
    }

    /// Effective range index; may differ from the setting while focus or the
    /// pointer owns the range.
    pub fn range_index(&self) -> usize {
        self.range_index
    }

    pub fn range_setting(&self) -> usize {
        self.range_setting
    }

    pub fn orientation(&self) -> MapOrientation {
        self.orientation
    }

    pub fn dead_zone(&self) -> Margins {
        self.dead_zone
    }

    pub fn projected_size(&self) -> Vec2 {
        self.projected_size
    }

    pub fn needs_projection_update(&self) -> bool {
        self.needs_update
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn is_focus_active(&self) -> bool {
        self.focus.as_ref().is_some_and(|f| f.active)
    }

    pub fn focus_solution(&self) -> Option<FocusRangeTarget> {
        self.focus.as_ref().map(|f| f.solution)
    }

    /// Whether airplane position and on-ground inputs drive the camera.
    pub fn is_tracking(&self) -> bool {
        !self.pointer.active && !self.is_focus_active()
    }

    fn range_setting_ignored(&self) -> bool {
        self.focus.is_some() && (self.pointer.active || self.is_focus_active())
    }

    // Range

    pub fn set_range_index(&mut self, index: usize) {
        self.range_setting = self.ranges.clamp_index(index);
        if !self.range_setting_ignored() {
            self.apply_range_index(self.range_setting);
        }
    }

    /// Steps the range setting by `delta`, clamped at both ends.
    pub fn change_range_index(&mut self, delta: i64) -> usize {
        let last = self.ranges.last_index() as i64;
        let index = (self.range_setting as i64).saturating_add(delta).clamp(0, last);
        self.set_range_index(index as usize);
        self.range_setting
    }

    pub fn set_range_table(&mut self, ranges: RangeTable) {
        self.ranges = ranges;
        self.range_setting = self.ranges.clamp_index(self.range_setting);
        self.range_index = self.ranges.clamp_index(self.range_index);
        self.update_orientation();
        self.recompute_range();
    }

    fn apply_range_index(&mut self, index: usize) {
        let index = self.ranges.clamp_index(index);
        if index == self.range_index {
            return;
        }
        debug!("range index {} -> {index}", self.range_index);
        self.range_index = index;
        self.update_orientation();
        self.recompute_range();
    }

    fn recompute_range(&mut self) {
        let ctx = RangeContext {
            orientation: self.orientation,
            projected_size: self.projected_size,
            dead_zone: self.dead_zone,
        };
        self.state.range = self
            .policy
            .true_range(self.ranges.nominal(self.range_index), &ctx);
        self.state.target_offset = self.policy.target_offset(&ctx);
        self.needs_update = true;
    }

    // Orientation

    pub fn set_orientation_setting(&mut self, setting: MapOrientation) {
        self.orientation_setting = setting;
        self.update_orientation();
    }

    pub fn set_auto_north_up(&mut self, auto_north_up: AutoNorthUp) {
        self.auto_north_up = auto_north_up;
        self.update_orientation();
    }

    fn desired_orientation(&self) -> MapOrientation {
        if self.is_focus_active() {
            return MapOrientation::NorthUp;
        }
        resolve_orientation(&OrientationInputs {
            setting: self.orientation_setting,
            heading_valid: self.airplane.heading_valid,
            auto_north_up: self.auto_north_up,
            range_index: self.range_index,
            on_ground: self.airplane.on_ground,
        })
    }

    fn update_orientation(&mut self) {
        let orientation = self.desired_orientation();
        if orientation == self.orientation {
            return;
        }
        debug!("map orientation {:?} -> {orientation:?}", self.orientation);
        self.orientation = orientation;
        self.apply_orientation();
    }

    /// Rebinds the rotation source and recomputes range-dependent state.
    fn apply_orientation(&mut self) {
        if self.orientation == MapOrientation::NorthUp {
            self.state.rotation = 0.0;
        }
        self.bind_rotation_source();
        self.recompute_range();
    }

    fn bind_rotation_source(&mut self) {
        self.rotation_source = if self.pointer.active {
            None
        } else {
            self.orientation.rotation_source()
        };
        match self.rotation_source {
            Some(RotationSource::GroundTrack) => self.apply_rotation(self.airplane.track_deg),
            Some(RotationSource::Heading) => self.apply_rotation(self.airplane.heading_deg),
            None => {}
        }
    }

    fn apply_rotation(&mut self, angle_deg: f64) {
        if !angle_deg.is_finite() {
            return;
        }
        self.state.rotation = -angle_deg.to_radians();
        self.needs_update = true;
    }

    // Airplane

    pub fn set_airplane_position(&mut self, position: GeoPoint) {
        if !position.is_valid() {
            return;
        }
        self.airplane.position = position;
        if self.is_tracking() && self.airplane.gps_valid {
            self.state.target = position;
            self.needs_update = true;
        }
    }

    pub fn set_track(&mut self, track_deg: f64) {
        self.airplane.track_deg = track_deg;
        if self.rotation_source == Some(RotationSource::GroundTrack) {
            self.apply_rotation(track_deg);
        }
    }

    pub fn set_heading(&mut self, heading_deg: f64) {
        self.airplane.heading_deg = heading_deg;
        if self.rotation_source == Some(RotationSource::Heading) {
            self.apply_rotation(heading_deg);
        }
    }

    pub fn set_on_ground(&mut self, on_ground: bool) {
        self.airplane.on_ground = on_ground;
        if self.is_tracking() {
            self.update_orientation();
        }
    }

    pub fn set_gps_valid(&mut self, valid: bool) {
        let was_valid = std::mem::replace(&mut self.airplane.gps_valid, valid);
        if valid && !was_valid && self.is_tracking() {
            self.retarget_airplane();
        }
    }

    pub fn set_heading_valid(&mut self, valid: bool) {
        self.airplane.heading_valid = valid;
        self.update_orientation();
    }

    fn retarget_airplane(&mut self) {
        if self.airplane.gps_valid && self.airplane.position.is_valid() {
            self.state.target = self.airplane.position;
            self.needs_update = true;
        }
    }

    fn on_tracking_resumed(&mut self) {
        self.retarget_airplane();
        self.update_orientation();
    }

    // Viewport

    pub fn set_dead_zone(&mut self, dead_zone: Margins) {
        if dead_zone == self.dead_zone {
            return;
        }
        self.dead_zone = dead_zone;
        self.on_viewport_changed();
    }

    pub fn set_projected_size(&mut self, size: Vec2) {
        if size == self.projected_size {
            return;
        }
        self.projected_size = size;
        self.on_viewport_changed();
    }

    fn on_viewport_changed(&mut self) {
        self.recompute_range();
        self.pointer.bounds = pointer_bounds(self.projected_size, self.dead_zone);
        if self.pointer.active {
            self.pointer.position = self.pointer.bounds.clamp(self.pointer.position);
        }
    }

    // Pointer

    /// Hands the camera to the pointer, starting at the target's position.
    pub fn activate_pointer(&mut self) {
        if self.pointer.active {
            return;
        }
        let target_position = self.projected_size * 0.5 + self.state.target_offset;
        self.pointer.active = true;
        self.pointer.position = self.pointer.bounds.clamp(target_position);
        self.pointer_scroll = Vec2::ZERO;
        debug!("pointer active");

        if let Some(focus) = self.focus.as_mut() {
            focus.follow_focused = false;
            focus.set_active(false);
        }
        self.rotation_source = None;
        self.update_orientation();
    }

    /// Moves the pointer by `delta` pixels. Movement past the pointer bounds
    /// scrolls the map on the next update.
    pub fn move_pointer(&mut self, delta: Vec2) {
        if !self.pointer.active || !delta.is_finite() {
            return;
        }
        let desired = self.pointer.position + delta;
        let clamped = self.pointer.bounds.clamp(desired);
        self.pointer_scroll = self.pointer_scroll + (desired - clamped);
        self.pointer.position = clamped;
    }

    pub fn set_pointer_target(&mut self, target: GeoPoint) {
        if self.pointer.active && target.is_valid() {
            self.state.target = target;
            self.needs_update = true;
        }
    }

    pub fn deactivate_pointer(&mut self) {
        if !self.pointer.active {
            return;
        }
        self.pointer.active = false;
        self.pointer_scroll = Vec2::ZERO;
        debug!("pointer released");

        if let Some(focus) = self.focus.as_mut() {
            focus.follow_focused = true;
            let focused = focus.focused;
            focus.set_active(focused);
        }
        self.after_control_released();
    }

    /// Restores whatever the pointer or focus suspended.
    fn after_control_released(&mut self) {
        if !self.range_setting_ignored() {
            self.apply_range_index(self.range_setting);
        }
        self.bind_rotation_source();
        if self.is_tracking() {
            self.on_tracking_resumed();
        } else {
            self.update_orientation();
        }
    }

    // Focus

    /// Replaces the focus. While focus is active the camera re-fits after the
    /// debounce delay; bursts of changes coalesce into one solve.
    pub fn set_focus(&mut self, focus: Option<Focus>) {
        if let Some(mode) = self.focus.as_mut() {
            mode.set_focus(focus);
        }
    }

    /// Upstream "focused" flag, followed unless the pointer is active.
    pub fn set_focused(&mut self, focused: bool) {
        let Some(mode) = self.focus.as_mut() else {
            return;
        };
        mode.focused = focused;
        if !mode.follow_focused || !mode.set_active(focused) {
            return;
        }
        debug!("flight plan focus {}", if focused { "on" } else { "off" });
        if focused {
            self.update_orientation();
        } else {
            self.after_control_released();
        }
    }

    pub fn on_plan_calculated(&mut self) {
        if let Some(mode) = self.focus.as_mut() {
            mode.on_plan_calculated();
        }
    }

    pub fn is_focus_solve_pending(&self) -> bool {
        self.focus.as_ref().is_some_and(FocusMode::is_solve_pending)
    }

    fn apply_focus_solution(&mut self, solution: FocusRangeTarget) {
        self.metrics.inc(Counter::FocusSolves);
        if !solution.is_solved() {
            debug!("flight plan focus has no solution");
            return;
        }
        let index = if solution.range == 0.0 {
            self.focus
                .as_ref()
                .map_or(self.range_index, |f| f.config.default_range_index)
        } else {
            self.ranges
                .first_index_covering(solution.range, FOCUS_RANGE_FACTOR)
                .unwrap_or(self.ranges.last_index())
        };
        debug!(
            "flight plan focus solved: range {} index {index}",
            solution.range
        );
        self.state.target = solution.target;
        self.needs_update = true;
        self.apply_range_index(index);
    }

    // Frame

    /// Runs the focus solve, pointer scroll and projection apply, in that
    /// order. Returns the projection's change flags, empty when the camera
    /// was clean.
    pub fn update<P: Projection + ?Sized>(
        &mut self,
        elapsed_ms: f64,
        projection: &mut P,
    ) -> ProjectionChange {
        let mut change = ProjectionChange::empty();
        let solve_due = self
            .focus
            .as_ref()
            .is_some_and(|f| f.solve_due(elapsed_ms));
        if solve_due && self.needs_update {
            // The fit must see the rotation and offset focus just forced.
            change |= self.apply_state(projection);
        }

        let dead_zone = self.dead_zone;
        let solution = self
            .focus
            .as_mut()
            .and_then(|f| f.tick(elapsed_ms, dead_zone, &*projection));
        if let Some(solution) = solution {
            self.apply_focus_solution(solution);
        }

        let scroll = std::mem::replace(&mut self.pointer_scroll, Vec2::ZERO);
        if self.pointer.active && scroll != Vec2::ZERO {
            let target = projection.invert(projection.project(self.state.target) + scroll);
            if target.is_valid() {
                self.state.target = target;
                self.needs_update = true;
            }
        }

        if self.needs_update {
            change |= self.apply_state(projection);
        }
        change
    }

    fn apply_state<P: Projection + ?Sized>(&mut self, projection: &mut P) -> ProjectionChange {
        self.needs_update = false;
        self.metrics.inc(Counter::ProjectionUpdates);
        projection.set(
            &ProjectionParams::new()
                .with_projected_size(self.projected_size)
                .with_target(self.state.target)
                .with_target_offset(self.state.target_offset)
                .with_range(self.state.range)
                .with_rotation(self.state.rotation),
        )
    }
}
