use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use foundation::math::GeoPoint;

use crate::labels::TextLabel;
use crate::symbology::{HaloStyle, RoleStyle};
use crate::waypoint::{Waypoint, WaypointKind};

/// Icon drawn for a waypoint in one role.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointIcon {
    pub uid: String,
    pub location: GeoPoint,
    pub kind: WaypointKind,
    pub size_px: f64,
    /// Icons are drawn in ascending priority; later draws land on top.
    pub priority: f64,
    pub halo: Option<HaloStyle>,
}

/// Supplies role icons. Factories are shared between roles, so they take
/// `&self` and keep any cache behind interior mutability.
pub trait IconFactory {
    fn icon(&self, waypoint: &Waypoint) -> Rc<WaypointIcon>;

    /// Drops anything cached for `uid`. Called once the waypoint has left
    /// the renderer.
    fn forget(&self, _uid: &str) {}
}

pub trait LabelFactory {
    fn label(&self, waypoint: &Waypoint) -> Rc<TextLabel>;

    fn forget(&self, _uid: &str) {}
}

/// Icon factory for one role, cached by waypoint uid.
#[derive(Debug)]
pub struct StyledIconFactory {
    style: Rc<RoleStyle>,
    cache: RefCell<HashMap<String, Rc<WaypointIcon>>>,
}

impl StyledIconFactory {
    pub fn new(style: Rc<RoleStyle>) -> Self {
        Self {
            style,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl IconFactory for StyledIconFactory {
    fn icon(&self, waypoint: &Waypoint) -> Rc<WaypointIcon> {
        let style = &self.style;
        self.cache
            .borrow_mut()
            .entry(waypoint.uid.clone())
            .or_insert_with(|| {
                let options = style.icon(waypoint.kind);
                Rc::new(WaypointIcon {
                    uid: waypoint.uid.clone(),
                    location: waypoint.location,
                    kind: waypoint.kind,
                    size_px: options.size_px,
                    priority: options.priority,
                    halo: style.halo,
                })
            })
            .clone()
    }

    fn forget(&self, uid: &str) {
        self.cache.borrow_mut().remove(uid);
    }
}

/// Label factory for one role, cached by waypoint uid.
#[derive(Debug)]
pub struct StyledLabelFactory {
    style: Rc<RoleStyle>,
    always_show: bool,
    cache: RefCell<HashMap<String, Rc<TextLabel>>>,
}

impl StyledLabelFactory {
    pub fn new(style: Rc<RoleStyle>) -> Self {
        Self {
            style,
            always_show: false,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Labels from this factory are exempt from collision culling.
    pub fn always_show(mut self) -> Self {
        self.always_show = true;
        self
    }

    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl LabelFactory for StyledLabelFactory {
    fn label(&self, waypoint: &Waypoint) -> Rc<TextLabel> {
        let style = &self.style;
        let always_show = self.always_show;
        self.cache
            .borrow_mut()
            .entry(waypoint.uid.clone())
            .or_insert_with(|| {
                let options = style.label(waypoint.kind);
                Rc::new(TextLabel {
                    text: waypoint.ident.clone(),
                    location: waypoint.location,
                    priority: options.priority,
                    anchor: options.anchor,
                    offset: options.offset,
                    always_show,
                    style: options.style.clone(),
                })
            })
            .clone()
    }

    fn forget(&self, uid: &str) {
        self.cache.borrow_mut().remove(uid);
    }
}
