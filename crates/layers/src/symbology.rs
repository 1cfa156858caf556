use foundation::bounds::Margins;
use foundation::math::Vec2;

use crate::labels::{LabelBackground, LabelStyle};
use crate::waypoint::{AirportSize, WaypointKind};

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];

/// Ring drawn around highlighted icons.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HaloStyle {
    pub radius_buffer_px: f64,
    pub stroke_width_px: f64,
    pub stroke_color: [f32; 4],
    pub outline_width_px: f64,
    pub outline_color: [f32; 4],
}

/// Label placement and text style for one waypoint kind.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelOptions {
    pub priority: f64,
    pub anchor: Vec2,
    pub offset: Vec2,
    pub style: LabelStyle,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IconOptions {
    pub priority: f64,
    pub size_px: f64,
}

/// Icon and label styling for every waypoint kind in one render role.
///
/// Icon priorities fall in `[base_icon_priority, base_icon_priority + 1)`
/// and label priorities likewise, so roles can be stacked by base priority.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleStyle {
    pub airport_icon: [IconOptions; 3],
    pub vor_icon: IconOptions,
    pub ndb_icon: IconOptions,
    pub int_icon: IconOptions,
    pub user_icon: IconOptions,
    pub fp_icon: IconOptions,
    pub airport_label: [LabelOptions; 3],
    pub vor_label: LabelOptions,
    pub ndb_label: LabelOptions,
    pub int_label: LabelOptions,
    pub user_label: LabelOptions,
    pub fp_label: LabelOptions,
    pub halo: Option<HaloStyle>,
}

fn airport_slot(size: AirportSize) -> usize {
    match size {
        AirportSize::Large => 0,
        AirportSize::Medium => 1,
        AirportSize::Small => 2,
    }
}

fn label(priority: f64, offset_y: f64, font_size_px: f64, color: [f32; 4]) -> LabelOptions {
    LabelOptions {
        priority,
        anchor: Vec2::new(0.5, 1.0),
        offset: Vec2::new(0.0, offset_y),
        style: LabelStyle {
            font_size_px,
            color,
            halo_color: BLACK,
            halo_width_px: 6.0,
            background: None,
        },
    }
}

fn airport_icons(base: f64, size_px: f64) -> [IconOptions; 3] {
    [
        IconOptions { priority: base + 0.8, size_px },
        IconOptions { priority: base + 0.79, size_px },
        IconOptions { priority: base + 0.78, size_px },
    ]
}

impl RoleStyle {
    pub fn icon(&self, kind: WaypointKind) -> IconOptions {
        match kind {
            WaypointKind::Airport(size) => self.airport_icon[airport_slot(size)],
            WaypointKind::Vor => self.vor_icon,
            WaypointKind::Ndb => self.ndb_icon,
            WaypointKind::Intersection => self.int_icon,
            WaypointKind::User => self.user_icon,
            WaypointKind::FlightPath => self.fp_icon,
        }
    }

    pub fn label(&self, kind: WaypointKind) -> &LabelOptions {
        match kind {
            WaypointKind::Airport(size) => &self.airport_label[airport_slot(size)],
            WaypointKind::Vor => &self.vor_label,
            WaypointKind::Ndb => &self.ndb_label,
            WaypointKind::Intersection => &self.int_label,
            WaypointKind::User => &self.user_label,
            WaypointKind::FlightPath => &self.fp_label,
        }
    }

    /// Styles for nearest-facility results.
    pub fn normal(base_icon: f64, base_label: f64, scale: f64) -> Self {
        let s = scale;
        Self {
            airport_icon: airport_icons(base_icon, 26.0 * s),
            vor_icon: IconOptions { priority: base_icon + 0.7, size_px: 32.0 * s },
            ndb_icon: IconOptions { priority: base_icon + 0.6, size_px: 32.0 * s },
            int_icon: IconOptions { priority: base_icon + 0.5, size_px: 32.0 * s },
            user_icon: IconOptions { priority: base_icon + 0.4, size_px: 32.0 * s },
            fp_icon: IconOptions { priority: base_icon + 0.1, size_px: 8.0 * s },
            airport_label: [
                label(base_label + 0.8, -12.0 * s, 20.0 * s, WHITE),
                label(base_label + 0.79, -12.0 * s, 16.0 * s, WHITE),
                label(base_label + 0.78, -12.0 * s, 16.0 * s, WHITE),
            ],
            vor_label: label(base_label + 0.7, -8.0 * s, 16.0 * s, WHITE),
            ndb_label: label(base_label + 0.6, -8.0 * s, 16.0 * s, WHITE),
            int_label: label(base_label + 0.5, -5.0 * s, 16.0 * s, WHITE),
            user_label: label(base_label + 0.4, -8.0 * s, 16.0 * s, WHITE),
            fp_label: label(base_label + 0.1, -5.0 * s, 16.0 * s, WHITE),
            halo: None,
        }
    }

    /// Styles for flight-plan waypoints; the active plan draws in magenta.
    pub fn flight_plan(active: bool, base_icon: f64, base_label: f64, scale: f64) -> Self {
        let s = scale;
        let color = if active { MAGENTA } else { WHITE };
        Self {
            airport_icon: airport_icons(base_icon, 26.0 * s),
            vor_icon: IconOptions { priority: base_icon + 0.7, size_px: 32.0 * s },
            ndb_icon: IconOptions { priority: base_icon + 0.6, size_px: 32.0 * s },
            int_icon: IconOptions { priority: base_icon + 0.5, size_px: 32.0 * s },
            user_icon: IconOptions { priority: base_icon + 0.4, size_px: 32.0 * s },
            fp_icon: IconOptions { priority: base_icon + 0.1, size_px: 8.0 * s },
            airport_label: [
                label(base_label + 0.8, -15.0 * s, 20.0 * s, color),
                label(base_label + 0.79, -15.0 * s, 16.0 * s, color),
                label(base_label + 0.78, -15.0 * s, 16.0 * s, color),
            ],
            vor_label: label(base_label + 0.7, -10.0 * s, 16.0 * s, color),
            ndb_label: label(base_label + 0.6, -10.0 * s, 16.0 * s, color),
            int_label: label(base_label + 0.5, -5.0 * s, 16.0 * s, color),
            user_label: label(base_label + 0.4, -10.0 * s, 16.0 * s, color),
            fp_label: label(base_label + 0.1, -5.0 * s, 16.0 * s, color),
            halo: None,
        }
    }

    /// Styles for the highlighted waypoint: larger icons, a halo ring and a
    /// backed label.
    pub fn highlight(base_icon: f64, base_label: f64, scale: f64) -> Self {
        let s = scale;
        let mut style = Self::normal(base_icon, base_label, scale);
        style.airport_icon = airport_icons(base_icon, 32.0 * s);
        for options in [
            &mut style.vor_icon,
            &mut style.ndb_icon,
            &mut style.int_icon,
            &mut style.user_icon,
        ] {
            options.size_px = 40.0 * s;
        }
        let background = LabelBackground {
            padding: Margins::uniform(1.0 * s),
            outline_width_px: 1.0 * s,
            color: BLACK,
        };
        for label in style
            .airport_label
            .iter_mut()
            .chain([
                &mut style.vor_label,
                &mut style.ndb_label,
                &mut style.int_label,
                &mut style.user_label,
                &mut style.fp_label,
            ])
        {
            label.offset.y -= 5.0 * s;
            label.style.background = Some(background.clone());
        }
        style.halo = Some(HaloStyle {
            radius_buffer_px: 10.0 * s,
            stroke_width_px: 2.0 * s,
            stroke_color: CYAN,
            outline_width_px: 0.0,
            outline_color: BLACK,
        });
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_stay_within_base_band() {
        let style = RoleStyle::flight_plan(true, 3.0, 10.0, 1.0);
        for kind in [
            WaypointKind::Airport(AirportSize::Large),
            WaypointKind::Airport(AirportSize::Small),
            WaypointKind::Vor,
            WaypointKind::Ndb,
            WaypointKind::Intersection,
            WaypointKind::User,
            WaypointKind::FlightPath,
        ] {
            let icon = style.icon(kind).priority;
            let label = style.label(kind).priority;
            assert!((3.0..4.0).contains(&icon), "{kind:?}");
            assert!((10.0..11.0).contains(&label), "{kind:?}");
        }
    }

    #[test]
    fn highlight_draws_larger_with_halo() {
        let normal = RoleStyle::normal(0.0, 0.0, 1.0);
        let highlight = RoleStyle::highlight(0.0, 0.0, 1.0);
        assert!(highlight.icon(WaypointKind::Vor).size_px > normal.icon(WaypointKind::Vor).size_px);
        assert!(highlight.halo.is_some());
        assert!(highlight.label(WaypointKind::Ndb).style.background.is_some());
    }
}
