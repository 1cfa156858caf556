use foundation::bounds::{Bounds2, Margins};
use foundation::math::Vec2;

/// Fraction of the usable width/height kept between the pointer bounds and
/// the usable area's edges.
const POINTER_BOUNDS_INSET: f64 = 0.1;

/// Map pointer (cursor) state.
///
/// While active the pointer owns the camera target: dragging it past its
/// bounds scrolls the map instead of moving the cursor further.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerState {
    pub active: bool,
    pub position: Vec2,
    pub bounds: Bounds2,
}

impl PointerState {
    pub fn new(bounds: Bounds2) -> Self {
        Self {
            active: false,
            position: bounds.center(),
            bounds,
        }
    }
}

/// Region the pointer may occupy before the map scrolls.
///
/// The usable area is inset by a tenth of its size on each side; a side that
/// would cross the center collapses onto it.
pub fn pointer_bounds(projected_size: Vec2, dead_zone: Margins) -> Bounds2 {
    let usable = dead_zone.inner_bounds(projected_size);
    let center = usable.center();
    let inset = Vec2::new(
        usable.width() * POINTER_BOUNDS_INSET,
        usable.height() * POINTER_BOUNDS_INSET,
    );

    Bounds2::new(
        Vec2::new(
            center.x.min(usable.min.x + inset.x),
            center.y.min(usable.min.y + inset.y),
        ),
        Vec2::new(
            center.x.max(usable.max.x - inset.x),
            center.y.max(usable.max.y - inset.y),
        ),
    )
}
