use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::rc::Rc;

use foundation::bounds::{Bounds2, Margins};
use foundation::math::{GeoPoint, Projection, Vec2};
use tracing::trace;

/// Relayout once the resolution changes by more than this factor.
const RESOLUTION_UPDATE_THRESHOLD: f64 = 1.2;
/// Relayout once the rotation moves by at least this much.
const ROTATION_UPDATE_THRESHOLD: f64 = PI / 6.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelBackground {
    pub padding: Margins,
    pub outline_width_px: f64,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_size_px: f64,
    pub color: [f32; 4],
    pub halo_color: [f32; 4],
    pub halo_width_px: f64,
    pub background: Option<LabelBackground>,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size_px: 16.0,
            color: [1.0, 1.0, 1.0, 1.0],
            halo_color: [0.0, 0.0, 0.0, 1.0],
            halo_width_px: 6.0,
            background: None,
        }
    }
}

/// Text pinned to a geographic location.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub location: GeoPoint,
    /// Higher priorities win collisions.
    pub priority: f64,
    /// Fraction of the label's size placed on the anchor point; (0.5, 1)
    /// centers the label above it.
    pub anchor: Vec2,
    pub offset: Vec2,
    /// Never culled.
    pub always_show: bool,
    pub style: LabelStyle,
}

impl TextLabel {
    /// Screen position of the anchor point.
    pub fn position<P: Projection + ?Sized>(&self, projection: &P) -> Vec2 {
        projection.project(self.location) + self.offset
    }

    pub fn bounds<P: Projection + ?Sized>(&self, projection: &P) -> Bounds2 {
        let size = estimate_text_size(&self.text, &self.style);
        let pos = self.position(projection);
        let mut min = Vec2::new(pos.x - self.anchor.x * size.x, pos.y - self.anchor.y * size.y);
        let mut max = min + size;
        if let Some(bg) = &self.style.background {
            min.x -= bg.padding.left + bg.outline_width_px;
            max.x += bg.padding.right + bg.outline_width_px;
            min.y -= bg.padding.top + bg.outline_width_px;
            max.y += bg.padding.bottom + bg.outline_width_px;
        }
        Bounds2::new(min, max)
    }
}

fn estimate_text_size(text: &str, style: &LabelStyle) -> Vec2 {
    let count = text.chars().count() as f64;
    Vec2::new(style.font_size_px * 0.6 * count, style.font_size_px)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub u64);

/// Registry of map labels that hides labels colliding with higher-priority
/// ones.
///
/// Panning does not change which labels collide, so layout is only redone
/// when labels change, the scale changes noticeably or the map rotates.
#[derive(Debug)]
pub struct TextLabelManager {
    labels: BTreeMap<LabelId, Rc<TextLabel>>,
    next_id: u64,
    visible: Vec<LabelId>,
    culling_enabled: bool,
    needs_update: bool,
    last_resolution: f64,
    last_rotation: f64,
}

impl Default for TextLabelManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TextLabelManager {
    pub fn new(culling_enabled: bool) -> Self {
        Self {
            labels: BTreeMap::new(),
            next_id: 1,
            visible: Vec::new(),
            culling_enabled,
            needs_update: false,
            last_resolution: f64::NAN,
            last_rotation: 0.0,
        }
    }

    pub fn register(&mut self, label: Rc<TextLabel>) -> LabelId {
        let id = LabelId(self.next_id);
        self.next_id += 1;
        self.labels.insert(id, label);
        self.needs_update = true;
        id
    }

    pub fn deregister(&mut self, id: LabelId) {
        if self.labels.remove(&id).is_some() {
            self.needs_update = true;
        }
    }

    pub fn set_culling_enabled(&mut self, enabled: bool) {
        self.culling_enabled = enabled;
        self.needs_update = true;
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, id: LabelId) -> Option<&TextLabel> {
        self.labels.get(&id).map(Rc::as_ref)
    }

    pub fn is_visible(&self, id: LabelId) -> bool {
        self.visible.contains(&id)
    }

    /// Labels shown after the last layout, in acceptance order.
    pub fn visible_labels(&self) -> impl Iterator<Item = (LabelId, &TextLabel)> {
        self.visible
            .iter()
            .filter_map(|id| self.labels.get(id).map(|label| (*id, label.as_ref())))
    }

    fn layout_is_current<P: Projection + ?Sized>(&self, projection: &P) -> bool {
        if self.needs_update {
            return false;
        }
        let ratio = projection.projected_resolution() / self.last_resolution;
        if !(ratio < RESOLUTION_UPDATE_THRESHOLD && ratio > 1.0 / RESOLUTION_UPDATE_THRESHOLD) {
            return false;
        }
        let delta = (projection.rotation() - self.last_rotation).abs() % (2.0 * PI);
        delta.min(2.0 * PI - delta) < ROTATION_UPDATE_THRESHOLD
    }

    /// Recomputes label visibility if needed. Returns whether a layout ran.
    pub fn update<P: Projection + ?Sized>(&mut self, projection: &P) -> bool {
        if self.layout_is_current(projection) {
            return false;
        }

        self.visible.clear();
        if self.culling_enabled {
            let mut ordered: Vec<(LabelId, &TextLabel, Bounds2)> = self
                .labels
                .iter()
                .map(|(id, label)| (*id, label.as_ref(), label.bounds(projection)))
                .collect();
            ordered.sort_by(|a, b| {
                b.1.always_show.cmp(&a.1.always_show).then(
                    b.1.priority
                        .partial_cmp(&a.1.priority)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
            });

            let mut accepted: Vec<Bounds2> = Vec::with_capacity(ordered.len());
            for (id, label, bounds) in ordered {
                if !label.always_show && accepted.iter().any(|other| bounds.overlaps(other)) {
                    continue;
                }
                accepted.push(bounds);
                self.visible.push(id);
            }
        } else {
            self.visible.extend(self.labels.keys().copied());
        }

        trace!(
            "label layout: {} of {} visible",
            self.visible.len(),
            self.labels.len()
        );
        self.last_resolution = projection.projected_resolution();
        self.last_rotation = projection.rotation();
        self.needs_update = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::{MapProjection, ProjectionParams};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn projection() -> MapProjection {
        let mut p = MapProjection::new(600.0, 400.0);
        p.set(
            &ProjectionParams::new()
                .with_target(GeoPoint::new(0.0, 0.0))
                .with_range(0.01),
        );
        p
    }

    fn label(text: &str, location: GeoPoint, priority: f64) -> Rc<TextLabel> {
        Rc::new(TextLabel {
            text: text.into(),
            location,
            priority,
            anchor: Vec2::new(0.5, 1.0),
            offset: Vec2::ZERO,
            always_show: false,
            style: LabelStyle::default(),
        })
    }

    #[test]
    fn bounds_follow_anchor_and_background() {
        let p = projection();
        let mut l = (*label("KSEA", GeoPoint::new(0.0, 0.0), 1.0)).clone();
        let b = l.bounds(&p);
        assert_close(b.width(), 16.0 * 0.6 * 4.0, 1e-9);
        assert_close(b.max.y, 200.0, 1e-6);
        assert_close(b.center().x, 300.0, 1e-6);

        l.style.background = Some(LabelBackground {
            padding: Margins::uniform(2.0),
            outline_width_px: 1.0,
            color: [0.0, 0.0, 0.0, 1.0],
        });
        assert_close(l.bounds(&p).height(), 16.0 + 6.0, 1e-9);
    }

    #[test]
    fn higher_priority_wins_collisions() {
        let p = projection();
        let mut manager = TextLabelManager::default();
        let low = manager.register(label("LOW", GeoPoint::new(0.0, 0.0), 1.0));
        let high = manager.register(label("HIGH", GeoPoint::new(0.0, 0.0), 2.0));
        let far = manager.register(label("FAR", GeoPoint::new(0.2, 0.2), 0.5));

        assert!(manager.update(&p));
        assert!(manager.is_visible(high));
        assert!(!manager.is_visible(low));
        assert!(manager.is_visible(far));
        let order: Vec<_> = manager.visible_labels().map(|(id, _)| id).collect();
        assert_eq!(order, vec![high, far]);
    }

    #[test]
    fn always_show_is_never_culled() {
        let p = projection();
        let mut manager = TextLabelManager::default();
        let mut pinned = (*label("PIN", GeoPoint::new(0.0, 0.0), 0.0)).clone();
        pinned.always_show = true;
        let pinned = manager.register(Rc::new(pinned));
        let other = manager.register(label("OTHER", GeoPoint::new(0.0, 0.0), 10.0));
        manager.update(&p);
        assert!(manager.is_visible(pinned));
        assert!(!manager.is_visible(other));
    }

    #[test]
    fn culling_can_be_disabled() {
        let p = projection();
        let mut manager = TextLabelManager::new(false);
        manager.register(label("A", GeoPoint::new(0.0, 0.0), 1.0));
        manager.register(label("B", GeoPoint::new(0.0, 0.0), 1.0));
        manager.update(&p);
        assert_eq!(manager.visible_labels().count(), 2);
    }

    #[test]
    fn layout_skipped_for_small_changes() {
        let mut p = projection();
        let mut manager = TextLabelManager::default();
        let id = manager.register(label("A", GeoPoint::new(0.0, 0.0), 1.0));
        assert!(manager.update(&p));
        assert!(!manager.update(&p));

        p.set(&ProjectionParams::new().with_range(0.011).with_rotation(0.3));
        assert!(!manager.update(&p));

        p.set(&ProjectionParams::new().with_rotation(0.3 + PI / 6.0));
        assert!(manager.update(&p));

        p.set(&ProjectionParams::new().with_range(0.02));
        assert!(manager.update(&p));

        manager.deregister(id);
        assert!(manager.update(&p));
        assert!(manager.is_empty());
        assert_eq!(manager.visible_labels().count(), 0);
    }
}
