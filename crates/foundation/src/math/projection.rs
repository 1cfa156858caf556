use bitflags::bitflags;

use super::{GeoPoint, Vec2, normalize_lon};
use crate::units::{METERS_PER_GA_RADIAN, METERS_PER_NMILE};

const SCALE_FACTOR_MAX_ITER: usize = 20;
const SCALE_FACTOR_TOLERANCE: f64 = 1e-6;

bitflags! {
    /// Which projection parameters changed during a [`Projection::set`] call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProjectionChange: u32 {
        const TARGET = 1;
        const CENTER = 1 << 1;
        const TARGET_PROJECTED = 1 << 2;
        const RANGE = 1 << 3;
        const ROTATION = 1 << 4;
        const PROJECTED_SIZE = 1 << 5;
        const PROJECTED_RESOLUTION = 1 << 6;
    }
}

/// Partial update for a projection; `None` fields are left untouched.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ProjectionParams {
    pub target: Option<GeoPoint>,
    pub target_offset: Option<Vec2>,
    /// Great-arc radians spanned by the projected height.
    pub range: Option<f64>,
    /// Post-projection rotation in radians.
    pub rotation: Option<f64>,
    pub projected_size: Option<Vec2>,
}

impl ProjectionParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: GeoPoint) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_target_offset(mut self, offset: Vec2) -> Self {
        self.target_offset = Some(offset);
        self
    }

    pub fn with_range(mut self, range: f64) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_projected_size(mut self, size: Vec2) -> Self {
        self.projected_size = Some(size);
        self
    }
}

/// Maps geographic points to screen pixels and back under a camera.
pub trait Projection {
    fn project(&self, point: GeoPoint) -> Vec2;

    fn invert(&self, projected: Vec2) -> GeoPoint;

    fn projected_size(&self) -> Vec2;

    /// Great-arc radians spanned by the projected height at the center.
    fn range(&self) -> f64;

    fn rotation(&self) -> f64;

    fn target(&self) -> GeoPoint;

    fn target_projected(&self) -> Vec2;

    /// Geographic point under the center of the projected area.
    fn center(&self) -> GeoPoint;

    fn set(&mut self, params: &ProjectionParams) -> ProjectionChange;

    /// Great-arc radians per pixel.
    fn projected_resolution(&self) -> f64 {
        self.range() / self.projected_size().y
    }
}

/// Spherical Mercator plus the post-projection transforms a map view needs.
#[derive(Debug, Clone, PartialEq)]
struct Mercator {
    /// Raw-projected position of the center point.
    center_translation: Vec2,
    /// Longitude pre-rotation in degrees.
    pre_rotation: f64,
    scale_factor: f64,
    translation: Vec2,
    rotation: f64,
    rotation_sin: f64,
    rotation_cos: f64,
}

impl Mercator {
    fn new() -> Self {
        Self {
            center_translation: Vec2::ZERO,
            pre_rotation: 0.0,
            // One pixel per nautical mile.
            scale_factor: METERS_PER_GA_RADIAN / METERS_PER_NMILE,
            translation: Vec2::ZERO,
            rotation: 0.0,
            rotation_sin: 0.0,
            rotation_cos: 1.0,
        }
    }

    fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
        self.rotation_sin = rotation.sin();
        self.rotation_cos = rotation.cos();
    }

    /// Recenters on `center`, pre-rotating longitudes so the center sits on
    /// the prime meridian and nothing near it wraps.
    fn set_center(&mut self, center: GeoPoint) {
        self.pre_rotation = -center.lon;
        let (lon, lat) = self.pre_rotate_forward(center.lon, center.lat);
        self.center_translation = project_raw(lon, lat);
    }

    fn pre_rotate_forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        if self.pre_rotation == 0.0 {
            return (lon, lat);
        }
        (normalize_lon(lon + self.pre_rotation), lat)
    }

    fn pre_rotate_reverse(&self, lon: f64, lat: f64) -> (f64, f64) {
        if self.pre_rotation == 0.0 {
            return (lon, lat);
        }
        (normalize_lon(lon - self.pre_rotation), lat)
    }

    fn project(&self, point: GeoPoint) -> Vec2 {
        let (lon, lat) = self.pre_rotate_forward(point.lon, point.lat);
        let raw = project_raw(lon, lat);

        // Y is reflected so north is up on screen.
        let x = (raw.x - self.center_translation.x) * self.scale_factor;
        let y = -(raw.y - self.center_translation.y) * self.scale_factor;

        Vec2::new(
            x * self.rotation_cos - y * self.rotation_sin + self.translation.x,
            x * self.rotation_sin + y * self.rotation_cos + self.translation.y,
        )
    }

    fn invert(&self, projected: Vec2) -> GeoPoint {
        let p = projected - self.translation;
        let x = (p.x * self.rotation_cos + p.y * self.rotation_sin) / self.scale_factor;
        let y = (-p.x * self.rotation_sin + p.y * self.rotation_cos) / self.scale_factor;

        let raw = Vec2::new(
            x + self.center_translation.x,
            -y + self.center_translation.y,
        );
        let (lon, lat) = invert_raw(raw);
        let (lon, lat) = self.pre_rotate_reverse(lon, lat);
        GeoPoint::new(lat, lon)
    }
}

fn project_raw(lon: f64, lat: f64) -> Vec2 {
    Vec2::new(
        lon.to_radians(),
        ((90.0 + lat).to_radians() / 2.0).tan().ln(),
    )
}

fn invert_raw(raw: Vec2) -> (f64, f64) {
    let lon = raw.x.to_degrees();
    let lat = (2.0 * raw.y.exp().atan()).to_degrees() - 90.0;
    (lon, lat)
}

#[derive(Debug, Copy, Clone)]
struct ProjectionSnapshot {
    target: GeoPoint,
    center: GeoPoint,
    target_projected: Vec2,
    range: f64,
    rotation: f64,
    projected_size: Vec2,
    projected_resolution: f64,
}

/// Map camera over a Mercator projection.
///
/// The camera is described by a target point, a pixel offset of that target
/// from the viewport center, a range and a rotation. The Mercator scale factor
/// is solved so the projected height spans exactly `range` at the center.
#[derive(Debug, Clone, PartialEq)]
pub struct MapProjection {
    mercator: Mercator,
    target: GeoPoint,
    target_offset: Vec2,
    target_projected: Vec2,
    range: f64,
    projected_size: Vec2,
    center: GeoPoint,
    center_projected: Vec2,
}

impl MapProjection {
    pub fn new(width: f64, height: f64) -> Self {
        let projected_size = Vec2::new(width, height);
        let center_projected = projected_size * 0.5;
        let mut mercator = Mercator::new();
        mercator.translation = center_projected;

        let mut projection = Self {
            mercator,
            target: GeoPoint::new(0.0, 0.0),
            target_offset: Vec2::ZERO,
            target_projected: center_projected,
            range: 1.0,
            projected_size,
            center: GeoPoint::new(0.0, 0.0),
            center_projected,
        };
        projection.recompute();
        projection
    }

    pub fn target_offset(&self) -> Vec2 {
        self.target_offset
    }

    pub fn center_projected(&self) -> Vec2 {
        self.center_projected
    }

    /// Pixels per Mercator unit; grows as the range shrinks.
    pub fn scale_factor(&self) -> f64 {
        self.mercator.scale_factor
    }

    pub fn is_in_projected_bounds(&self, point: GeoPoint) -> bool {
        let p = self.project(point);
        p.x >= 0.0 && p.x <= self.projected_size.x && p.y >= 0.0 && p.y <= self.projected_size.y
    }

    fn set_projected_size(&mut self, size: Vec2) {
        self.projected_size = size;
        self.center_projected = size * 0.5;
        self.mercator.translation = self.center_projected;
        self.target_projected = self.center_projected + self.target_offset;
    }

    fn range_at_center(&self, center_projected: Vec2) -> f64 {
        let half_height = self.projected_size.y / 2.0;
        let top = self
            .mercator
            .invert(Vec2::new(center_projected.x, center_projected.y - half_height));
        let bottom = self
            .mercator
            .invert(Vec2::new(center_projected.x, center_projected.y + half_height));
        top.distance(bottom)
    }

    fn recompute(&mut self) {
        let target_projected = self.mercator.project(self.target);
        if !target_projected.is_finite() {
            return;
        }

        let mut center_projected = target_projected - self.target_offset;
        let mut ratio = self.range_at_center(center_projected) / self.range;
        if !ratio.is_finite() || ratio == 0.0 {
            return;
        }

        // Converges in a handful of iterations in practice.
        let mut iterations = 0;
        let mut ratio_error = (ratio - 1.0).abs();
        let mut delta_ratio_error = SCALE_FACTOR_TOLERANCE + 1.0;
        while iterations < SCALE_FACTOR_MAX_ITER
            && ratio_error > SCALE_FACTOR_TOLERANCE
            && delta_ratio_error > SCALE_FACTOR_TOLERANCE
        {
            iterations += 1;
            self.mercator.scale_factor *= ratio;

            center_projected = self.mercator.project(self.target) - self.target_offset;
            ratio = self.range_at_center(center_projected) / self.range;

            let new_ratio_error = (ratio - 1.0).abs();
            delta_ratio_error = (new_ratio_error - ratio_error).abs();
            ratio_error = new_ratio_error;
        }

        self.center = self.mercator.invert(center_projected);
        self.mercator.set_center(self.center);
    }

    fn snapshot(&self) -> ProjectionSnapshot {
        ProjectionSnapshot {
            target: self.target,
            center: self.center,
            target_projected: self.target_projected,
            range: self.range,
            rotation: self.mercator.rotation,
            projected_size: self.projected_size,
            projected_resolution: self.projected_resolution(),
        }
    }

    fn change_flags(&self, old: &ProjectionSnapshot) -> ProjectionChange {
        let mut flags = ProjectionChange::empty();
        flags.set(ProjectionChange::TARGET, !old.target.equals(self.target));
        flags.set(ProjectionChange::CENTER, !old.center.equals(self.center));
        flags.set(
            ProjectionChange::TARGET_PROJECTED,
            old.target_projected != self.target_projected,
        );
        flags.set(ProjectionChange::RANGE, old.range != self.range);
        flags.set(ProjectionChange::ROTATION, old.rotation != self.mercator.rotation);
        flags.set(
            ProjectionChange::PROJECTED_SIZE,
            old.projected_size != self.projected_size,
        );
        flags.set(
            ProjectionChange::PROJECTED_RESOLUTION,
            old.projected_resolution != self.projected_resolution(),
        );
        flags
    }
}

impl Projection for MapProjection {
    fn project(&self, point: GeoPoint) -> Vec2 {
        self.mercator.project(point)
    }

    fn invert(&self, projected: Vec2) -> GeoPoint {
        self.mercator.invert(projected)
    }

    fn projected_size(&self) -> Vec2 {
        self.projected_size
    }

    fn range(&self) -> f64 {
        self.range
    }

    fn rotation(&self) -> f64 {
        self.mercator.rotation
    }

    fn target(&self) -> GeoPoint {
        self.target
    }

    fn target_projected(&self) -> Vec2 {
        self.target_projected
    }

    fn center(&self) -> GeoPoint {
        self.center
    }

    fn set(&mut self, params: &ProjectionParams) -> ProjectionChange {
        let old = self.snapshot();

        if let Some(size) = params.projected_size {
            self.set_projected_size(size);
        }
        if let Some(target) = params.target {
            self.target = target;
        }
        if let Some(offset) = params.target_offset {
            self.target_offset = offset;
            self.target_projected = self.center_projected + offset;
        }
        if let Some(range) = params.range {
            self.range = range;
        }
        if let Some(rotation) = params.rotation {
            self.mercator.set_rotation(rotation);
        }

        self.recompute();
        self.change_flags(&old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn nm(v: f64) -> f64 {
        v * METERS_PER_NMILE / METERS_PER_GA_RADIAN
    }

    fn projection_at(target: GeoPoint, range: f64) -> MapProjection {
        let mut p = MapProjection::new(600.0, 400.0);
        p.set(&ProjectionParams::new().with_target(target).with_range(range));
        p
    }

    #[test]
    fn target_projects_to_viewport_center() {
        let target = GeoPoint::new(47.45, -122.31);
        let p = projection_at(target, nm(20.0));
        let projected = p.project(target);
        assert_close(projected.x, 300.0, 1e-6);
        assert_close(projected.y, 200.0, 1e-6);

        let back = p.invert(Vec2::new(300.0, 200.0));
        assert_close(back.lat, target.lat, 1e-9);
        assert_close(back.lon, target.lon, 1e-9);
    }

    #[test]
    fn projected_height_spans_range() {
        let range = nm(30.0);
        let p = projection_at(GeoPoint::new(51.5, -0.12), range);
        let top = p.invert(Vec2::new(300.0, 0.0));
        let bottom = p.invert(Vec2::new(300.0, 400.0));
        assert_close(top.distance(bottom) / range, 1.0, 1e-5);
        assert_close(p.projected_resolution(), range / 400.0, 1e-15);
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let target = GeoPoint::new(10.0, 10.0);
        let p = projection_at(target, nm(10.0));
        let north = p.project(target.offset(0.0, nm(1.0)));
        let east = p.project(target.offset(90.0, nm(1.0)));
        assert!(north.y < 200.0);
        assert_close(north.x, 300.0, 1e-6);
        assert!(east.x > 300.0);
    }

    #[test]
    fn heading_up_rotation_puts_north_left_when_flying_east() {
        let target = GeoPoint::new(10.0, 10.0);
        let mut p = projection_at(target, nm(10.0));
        p.set(&ProjectionParams::new().with_rotation(-FRAC_PI_2));
        let north = p.project(target.offset(0.0, nm(1.0)));
        assert!(north.x < 300.0);
        assert_close(north.y, 200.0, 1e-6);
    }

    #[test]
    fn target_offset_moves_target_on_screen() {
        let target = GeoPoint::new(35.0, 139.0);
        let mut p = projection_at(target, nm(10.0));
        let flags = p.set(&ProjectionParams::new().with_target_offset(Vec2::new(0.0, 60.0)));
        let projected = p.project(target);
        assert_close(projected.x, 300.0, 1e-6);
        assert_close(projected.y, 260.0, 1e-6);
        assert_eq!(p.target_projected(), Vec2::new(300.0, 260.0));
        assert!(flags.contains(ProjectionChange::TARGET_PROJECTED | ProjectionChange::CENTER));
        assert!(p.center().lat > target.lat);
    }

    #[test]
    fn reports_only_changed_parameters() {
        let target = GeoPoint::new(0.0, 0.0);
        let mut p = projection_at(target, nm(10.0));
        assert!(p.set(&ProjectionParams::new().with_range(nm(10.0))).is_empty());

        let flags = p.set(&ProjectionParams::new().with_range(nm(20.0)));
        assert!(flags.contains(ProjectionChange::RANGE | ProjectionChange::PROJECTED_RESOLUTION));
        assert!(!flags.contains(ProjectionChange::TARGET));

        let flags = p.set(&ProjectionParams::new().with_projected_size(Vec2::new(300.0, 300.0)));
        assert!(flags.contains(ProjectionChange::PROJECTED_SIZE));
        assert_eq!(p.target_projected(), Vec2::new(150.0, 150.0));
    }

    #[test]
    fn antimeridian_does_not_wrap_across_screen() {
        let target = GeoPoint::new(0.0, 179.9);
        let p = projection_at(target, nm(60.0));
        let across = p.project(GeoPoint::new(0.0, -179.9));
        assert!(across.x > 300.0);
        assert!(across.x < 600.0);
    }
}
