use foundation::bounds::Margins;
use foundation::math::{EQUALITY_TOLERANCE, GeoPoint, MapProjection, Projection, ProjectionParams, Vec2};

const MAX_ITER: usize = 20;
const RANGE_TOLERANCE: f64 = 0.01;

/// A set of geographic points the camera should contain.
#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    Point(GeoPoint),
    /// Ordered points, typically flight-plan leg endpoints.
    Path(Vec<GeoPoint>),
}

/// Camera range and target that contain a focus.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FocusRangeTarget {
    /// Great-arc radians; NaN when there is no solution.
    pub range: f64,
    pub target: GeoPoint,
}

impl FocusRangeTarget {
    pub const fn none() -> Self {
        Self {
            range: f64::NAN,
            target: GeoPoint::invalid(),
        }
    }

    pub fn is_solved(&self) -> bool {
        !self.range.is_nan() && self.target.is_valid()
    }
}

impl Default for FocusRangeTarget {
    fn default() -> Self {
        Self::none()
    }
}

/// Solves for the smallest range that fits a focus inside a margin-reduced
/// viewport.
///
/// Screen size is not linear in range once the projection rotates, so the
/// range is refined by bounded fixed-point iteration on a trial projection.
#[derive(Debug, Clone)]
pub struct FocusFitCalculator {
    trial: MapProjection,
    min_range: f64,
}

impl Default for FocusFitCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusFitCalculator {
    pub fn new() -> Self {
        Self {
            trial: MapProjection::new(100.0, 100.0),
            min_range: EQUALITY_TOLERANCE,
        }
    }

    /// Overrides the range floor below which refinement stops.
    pub fn with_min_range(mut self, min_range: f64) -> Self {
        self.min_range = min_range;
        self
    }

    pub fn min_range(&self) -> f64 {
        self.min_range
    }

    pub fn calculate<P: Projection + ?Sized>(
        &mut self,
        focus: Option<&Focus>,
        margins: Margins,
        projection: &P,
    ) -> FocusRangeTarget {
        let points = match focus {
            None => return FocusRangeTarget::none(),
            Some(Focus::Point(point)) => {
                if !point.is_valid() {
                    return FocusRangeTarget::none();
                }
                return FocusRangeTarget {
                    range: 0.0,
                    target: *point,
                };
            }
            Some(Focus::Path(points)) => points,
        };

        let size = projection.projected_size();
        let target_width = size.x - margins.left - margins.right;
        let target_height = size.y - margins.top - margins.bottom;
        if target_width <= 0.0 || target_height <= 0.0 {
            return FocusRangeTarget::none();
        }

        let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        let mut previous: Option<GeoPoint> = None;
        let mut count = 0usize;
        for point in points.iter().copied().filter(GeoPoint::is_valid) {
            if previous.is_some_and(|p| p.equals(point)) {
                continue;
            }
            previous = Some(point);
            count += 1;

            let projected = projection.project(point);
            min.x = min.x.min(projected.x);
            min.y = min.y.min(projected.y);
            max.x = max.x.max(projected.x);
            max.y = max.y.max(projected.y);
        }

        if count == 0 {
            return FocusRangeTarget::none();
        }

        let box_center = (min + max) * 0.5;
        let mut out = FocusRangeTarget {
            range: f64::NAN,
            target: projection.invert(box_center),
        };

        let width = max.x - min.x;
        let height = max.y - min.y;
        if width == 0.0 && height == 0.0 {
            out.range = 0.0;
            return out;
        }

        let mut constrained = (width / target_width).max(height / target_height);
        out.range = projection.range();

        let top_left = projection.invert(min);
        let bottom_right = projection.invert(max);

        self.trial.set(
            &ProjectionParams::new()
                .with_projected_size(size)
                .with_rotation(projection.rotation())
                .with_target(out.target)
                .with_target_offset(Vec2::ZERO)
                .with_range(out.range),
        );

        let mut iterations = 0;
        let mut error = (constrained - 1.0).abs();
        let mut delta_error = RANGE_TOLERANCE + 1.0;
        while iterations < MAX_ITER && error > RANGE_TOLERANCE && delta_error > RANGE_TOLERANCE {
            iterations += 1;

            out.range = self.trial.range() * constrained;
            if out.range <= self.min_range {
                out.range = self.min_range;
                return out;
            }
            self.trial.set(&ProjectionParams::new().with_range(out.range));

            let a = self.trial.project(top_left);
            let b = self.trial.project(bottom_right);
            constrained =
                ((b.x - a.x).abs() / target_width).max((b.y - a.y).abs() / target_height);

            let new_error = (constrained - 1.0).abs();
            delta_error = (new_error - error).abs();
            error = new_error;
        }

        out
    }
}
