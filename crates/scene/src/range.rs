use foundation::bounds::Margins;
use foundation::math::Vec2;
use foundation::units::Distance;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orientation::MapOrientation;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeTableError {
    #[error("range table must contain at least one range")]
    Empty,
    #[error("range {index} is not a positive finite distance")]
    NonPositive { index: usize },
}

/// Ordered list of user-facing nominal ranges ("ring" distances).
///
/// Never empty, so every clamped index resolves to a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Distance>", into = "Vec<Distance>")]
pub struct RangeTable {
    ranges: Vec<Distance>,
}

impl RangeTable {
    pub fn new(ranges: Vec<Distance>) -> Result<Self, RangeTableError> {
        if ranges.is_empty() {
            return Err(RangeTableError::Empty);
        }
        if let Some(index) = ranges
            .iter()
            .position(|r| !(r.value.is_finite() && r.value > 0.0))
        {
            return Err(RangeTableError::NonPositive { index });
        }
        Ok(Self { ranges })
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn last_index(&self) -> usize {
        self.ranges.len() - 1
    }

    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// The nominal range at `index`, clamped into the table.
    pub fn nominal(&self, index: usize) -> Distance {
        self.ranges[self.clamp_index(index)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Distance> {
        self.ranges.iter()
    }

    /// First index whose nominal range times `factor` reaches `true_range`.
    pub fn first_index_covering(&self, true_range: f64, factor: f64) -> Option<usize> {
        self.ranges
            .iter()
            .position(|r| r.as_ga_radians() * factor >= true_range)
    }
}

impl Default for RangeTable {
    fn default() -> Self {
        let mut ranges = vec![
            Distance::feet(250.0),
            Distance::feet(500.0),
            Distance::feet(750.0),
            Distance::feet(1000.0),
            Distance::feet(1500.0),
        ];
        ranges.extend(
            [
                0.5, 0.75, 1.0, 1.5, 2.5, 4.0, 5.0, 7.5, 10.0, 15.0, 25.0, 40.0, 50.0, 75.0,
                100.0, 150.0, 250.0, 400.0, 500.0, 750.0, 1000.0,
            ]
            .into_iter()
            .map(Distance::nautical_miles),
        );
        Self { ranges }
    }
}

impl TryFrom<Vec<Distance>> for RangeTable {
    type Error = RangeTableError;

    fn try_from(ranges: Vec<Distance>) -> Result<Self, Self::Error> {
        Self::new(ranges)
    }
}

impl From<RangeTable> for Vec<Distance> {
    fn from(table: RangeTable) -> Self {
        table.ranges
    }
}

/// Inputs a view needs to turn a nominal range into camera parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RangeContext {
    pub orientation: MapOrientation,
    pub projected_size: Vec2,
    pub dead_zone: Margins,
}

/// Per-view conversion from nominal range to camera range and target offset.
pub trait RangePolicy: std::fmt::Debug {
    /// Camera range in great-arc radians for `nominal`.
    fn true_range(&self, nominal: Distance, ctx: &RangeContext) -> f64;

    /// Desired pixel offset of the camera target from the viewport center.
    fn target_offset(&self, ctx: &RangeContext) -> Vec2;
}

/// Navigation-style view: the nominal range is measured from the target to
/// the edge of the usable (dead-zone-free) height, and rotated orientations
/// push the target down the screen to show more ahead.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NavMapRangePolicy {
    pub north_up_factor: f64,
    pub rotated_factor: f64,
    /// Target offset as a fraction of the viewport size when not north-up.
    pub rotated_offset_rel: Vec2,
}

impl NavMapRangePolicy {
    pub const MFD: Self = Self {
        north_up_factor: 4.0,
        rotated_factor: 3.0,
        rotated_offset_rel: Vec2::new(0.0, 1.0 / 6.0),
    };

    pub const PFD_INSET: Self = Self {
        north_up_factor: 2.5,
        rotated_factor: 2.0,
        rotated_offset_rel: Vec2::new(0.0, 1.0 / 6.0),
    };
}

impl RangePolicy for NavMapRangePolicy {
    fn true_range(&self, nominal: Distance, ctx: &RangeContext) -> f64 {
        let height = ctx.projected_size.y;
        let corrected_height = height - ctx.dead_zone.top - ctx.dead_zone.bottom;
        let height_ratio = if height > 0.0 && corrected_height > 0.0 {
            height / corrected_height
        } else {
            1.0
        };
        let factor = if ctx.orientation == MapOrientation::NorthUp {
            self.north_up_factor
        } else {
            self.rotated_factor
        };
        nominal.as_ga_radians() * height_ratio * factor
    }

    fn target_offset(&self, ctx: &RangeContext) -> Vec2 {
        let rel = if ctx.orientation == MapOrientation::NorthUp {
            Vec2::ZERO
        } else {
            self.rotated_offset_rel
        };
        Vec2::new(
            rel.x * ctx.projected_size.x,
            rel.y * ctx.projected_size.y,
        ) + ctx.dead_zone.center_shift()
    }
}

/// Fixed multiple of the nominal range, target centered in the usable area.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScaledRangePolicy {
    pub factor: f64,
}

impl ScaledRangePolicy {
    pub const WAYPOINT_INFO: Self = Self { factor: 4.0 };
    pub const TRAFFIC: Self = Self { factor: 1.0 / 0.45 };
}

impl RangePolicy for ScaledRangePolicy {
    fn true_range(&self, nominal: Distance, _ctx: &RangeContext) -> f64 {
        nominal.as_ga_radians() * self.factor
    }

    fn target_offset(&self, ctx: &RangeContext) -> Vec2 {
        ctx.dead_zone.center_shift()
    }
}

/// The map views sharing the camera engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    NavMap,
    FlightPlanMap,
    PfdInset,
    WaypointInfo,
    ProcedurePreview,
    Traffic,
}

impl ViewKind {
    pub fn range_policy(self) -> Box<dyn RangePolicy> {
        match self {
            ViewKind::NavMap | ViewKind::FlightPlanMap => Box::new(NavMapRangePolicy::MFD),
            ViewKind::PfdInset => Box::new(NavMapRangePolicy::PFD_INSET),
            ViewKind::WaypointInfo | ViewKind::ProcedurePreview => {
                Box::new(ScaledRangePolicy::WAYPOINT_INFO)
            }
            ViewKind::Traffic => Box::new(ScaledRangePolicy::TRAFFIC),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::units::DistanceUnit;
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn ctx(orientation: MapOrientation, dead_zone: Margins) -> RangeContext {
        RangeContext {
            orientation,
            projected_size: Vec2::new(600.0, 400.0),
            dead_zone,
        }
    }

    #[test]
    fn default_table_matches_ring_distances() {
        let table = RangeTable::default();
        assert_eq!(table.len(), 26);
        assert_eq!(table.nominal(0), Distance::feet(250.0));
        assert_eq!(table.nominal(11), Distance::nautical_miles(5.0));
        assert_eq!(table.nominal(17), Distance::nautical_miles(50.0));
        assert_eq!(table.nominal(500), Distance::nautical_miles(1000.0));
    }

    #[test]
    fn rejects_empty_and_non_positive_tables() {
        assert_eq!(RangeTable::new(vec![]), Err(RangeTableError::Empty));
        assert_eq!(
            RangeTable::new(vec![Distance::nautical_miles(1.0), Distance::feet(0.0)]),
            Err(RangeTableError::NonPositive { index: 1 })
        );
        let parsed: Result<RangeTable, _> = serde_json::from_str("[]");
        assert!(parsed.is_err());
    }

    #[test]
    fn table_round_trips_through_json() {
        let json = r#"[{"value": 1.0, "unit": "nautical_mile"}, {"value": 2000.0, "unit": "foot"}]"#;
        let table: RangeTable = serde_json::from_str(json).expect("parse");
        assert_eq!(table.len(), 2);
        assert_eq!(table.nominal(1).unit, DistanceUnit::Foot);
    }

    #[test]
    fn first_index_covering_uses_factor() {
        let table = RangeTable::default();
        let five_nm = Distance::nautical_miles(5.0).as_ga_radians();
        assert_eq!(table.first_index_covering(five_nm * 4.0, 4.0), Some(11));
        assert_eq!(table.first_index_covering(five_nm * 4.0 + 1e-9, 4.0), Some(12));
        // 1000 NM x 4 is about 1.16 GA radians.
        assert_eq!(table.first_index_covering(1.0, 4.0), Some(25));
        assert_eq!(table.first_index_covering(2.0, 4.0), None);
    }

    #[test]
    fn nav_map_factor_depends_on_orientation() {
        let nominal = Distance::nautical_miles(5.0);
        let ga = nominal.as_ga_radians();
        let policy = NavMapRangePolicy::MFD;
        assert_close(
            policy.true_range(nominal, &ctx(MapOrientation::NorthUp, Margins::ZERO)),
            ga * 4.0,
            1e-15,
        );
        assert_close(
            policy.true_range(nominal, &ctx(MapOrientation::HeadingUp, Margins::ZERO)),
            ga * 3.0,
            1e-15,
        );
    }

    #[test]
    fn nav_map_range_corrects_for_dead_zone_height() {
        let nominal = Distance::nautical_miles(10.0);
        let dz = Margins::new(0.0, 50.0, 0.0, 150.0);
        let range = NavMapRangePolicy::MFD.true_range(nominal, &ctx(MapOrientation::NorthUp, dz));
        assert_close(range, nominal.as_ga_radians() * 2.0 * 4.0, 1e-15);
    }

    #[test]
    fn nav_map_offset_pushes_target_down_when_rotated() {
        let dz = Margins::new(20.0, 0.0, 0.0, 0.0);
        let policy = NavMapRangePolicy::MFD;
        assert_eq!(
            policy.target_offset(&ctx(MapOrientation::NorthUp, dz)),
            Vec2::new(10.0, 0.0)
        );
        let rotated = policy.target_offset(&ctx(MapOrientation::TrackUp, dz));
        assert_close(rotated.x, 10.0, 1e-12);
        assert_close(rotated.y, 400.0 / 6.0, 1e-12);
    }

    #[test]
    fn scaled_policies() {
        let nominal = Distance::nautical_miles(6.0);
        let c = ctx(MapOrientation::HeadingUp, Margins::new(0.0, 10.0, 0.0, 30.0));
        assert_close(
            ScaledRangePolicy::TRAFFIC.true_range(nominal, &c),
            nominal.as_ga_radians() / 0.45,
            1e-15,
        );
        assert_close(
            ScaledRangePolicy::WAYPOINT_INFO.true_range(nominal, &c),
            nominal.as_ga_radians() * 4.0,
            1e-15,
        );
        assert_eq!(
            ScaledRangePolicy::TRAFFIC.target_offset(&c),
            Vec2::new(0.0, -10.0)
        );
    }
}
