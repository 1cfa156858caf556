use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use foundation::math::{Projection, Vec2};
use tracing::trace;

use crate::icons::{IconFactory, LabelFactory, WaypointIcon};
use crate::labels::{LabelId, TextLabel, TextLabelManager};
use crate::role::RenderRole;
use crate::waypoint::Waypoint;

/// A drawing surface registered for one or more roles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanvasId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct IconDraw {
    pub role: RenderRole,
    pub position: Vec2,
    pub icon: Rc<WaypointIcon>,
}

/// Receives the renderer's draw calls.
pub trait CanvasSink {
    fn clear(&mut self, canvas: CanvasId);
    fn draw_icon(&mut self, canvas: CanvasId, draw: &IconDraw);
}

pub type VisibilityHandler = Rc<dyn Fn(&Waypoint) -> bool>;

struct RoleInfo {
    icon_factory: Option<Rc<dyn IconFactory>>,
    label_factory: Option<Rc<dyn LabelFactory>>,
    canvas: Option<CanvasId>,
    visibility: VisibilityHandler,
}

impl Default for RoleInfo {
    fn default() -> Self {
        Self {
            icon_factory: None,
            label_factory: None,
            canvas: None,
            visibility: Rc::new(|_: &Waypoint| true),
        }
    }
}

struct WaypointEntry {
    waypoint: Waypoint,
    roles: RenderRole,
    registrants: BTreeMap<RenderRole, BTreeSet<String>>,
    icon: Option<Rc<WaypointIcon>>,
    label: Option<(LabelId, Rc<TextLabel>)>,
    /// Empty until the entry has been shown in some role.
    last_shown_role: RenderRole,
}

impl WaypointEntry {
    fn new(waypoint: Waypoint) -> Self {
        Self {
            waypoint,
            roles: RenderRole::empty(),
            registrants: BTreeMap::new(),
            icon: None,
            label: None,
            last_shown_role: RenderRole::empty(),
        }
    }

    fn add_roles(&mut self, roles: RenderRole, source_id: &str) {
        for role in roles.singles() {
            self.registrants
                .entry(role)
                .or_default()
                .insert(source_id.to_string());
        }
        self.roles |= roles;
    }

    fn remove_roles(&mut self, roles: RenderRole, source_id: &str) {
        for role in roles.singles() {
            let Some(sources) = self.registrants.get_mut(&role) else {
                continue;
            };
            sources.remove(source_id);
            if sources.is_empty() {
                self.registrants.remove(&role);
                self.roles.remove(role);
            }
        }
    }

    fn destroy(self, labels: &mut TextLabelManager) {
        if let Some((id, _)) = self.label {
            labels.deregister(id);
        }
    }
}

/// Summary of one renderer update.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RenderStats {
    pub registered: usize,
    pub drawn: usize,
}

/// Registry of waypoints shared by every layer that wants a point drawn.
///
/// Each layer registers a waypoint under one or more roles with its own
/// source id. Registrations are reference counted per role, so a role stays
/// on a waypoint until every source that asked for it has let go. Each
/// update draws every waypoint at most once, in its highest-precedence
/// visible role.
#[derive(Default)]
pub struct WaypointRenderer {
    registered: BTreeMap<String, WaypointEntry>,
    to_clean_up: Vec<WaypointEntry>,
    roles: BTreeMap<RenderRole, RoleInfo>,
}

impl fmt::Debug for WaypointRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaypointRenderer")
            .field("registered", &self.registered.len())
            .field("to_clean_up", &self.to_clean_up.len())
            .finish()
    }
}

impl WaypointRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn role_infos(&mut self, roles: RenderRole) -> impl Iterator<Item = &mut RoleInfo> {
        for role in roles.singles() {
            self.roles.entry(role).or_default();
        }
        self.roles
            .iter_mut()
            .filter(move |(role, _)| roles.contains(**role))
            .map(|(_, info)| info)
    }

    pub fn set_icon_factory(&mut self, roles: RenderRole, factory: Rc<dyn IconFactory>) {
        for info in self.role_infos(roles) {
            info.icon_factory = Some(factory.clone());
        }
    }

    pub fn set_label_factory(&mut self, roles: RenderRole, factory: Rc<dyn LabelFactory>) {
        for info in self.role_infos(roles) {
            info.label_factory = Some(factory.clone());
        }
    }

    pub fn set_canvas(&mut self, roles: RenderRole, canvas: CanvasId) {
        for info in self.role_infos(roles) {
            info.canvas = Some(canvas);
        }
    }

    /// Decides per waypoint whether a role may be shown. Roles without a
    /// handler are always visible.
    pub fn set_visibility_handler(&mut self, roles: RenderRole, handler: VisibilityHandler) {
        for info in self.role_infos(roles) {
            info.visibility = handler.clone();
        }
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn is_registered(&self, waypoint: &Waypoint) -> bool {
        self.registered.contains_key(&waypoint.uid)
    }

    /// Whether `waypoint` currently holds every role in `roles`.
    pub fn is_registered_as(&self, waypoint: &Waypoint, roles: RenderRole) -> bool {
        self.registered
            .get(&waypoint.uid)
            .is_some_and(|entry| entry.roles.contains(roles))
    }

    pub fn roles(&self, waypoint: &Waypoint) -> RenderRole {
        self.registered
            .get(&waypoint.uid)
            .map_or(RenderRole::empty(), |entry| entry.roles)
    }

    /// Role the waypoint was drawn in at the last update, if any.
    pub fn shown_role(&self, waypoint: &Waypoint) -> Option<RenderRole> {
        self.registered
            .get(&waypoint.uid)
            .map(|entry| entry.last_shown_role)
            .filter(|role| !role.is_empty())
    }

    pub fn label_id(&self, waypoint: &Waypoint) -> Option<LabelId> {
        self.registered
            .get(&waypoint.uid)
            .and_then(|entry| entry.label.as_ref().map(|(id, _)| *id))
    }

    pub fn register(&mut self, waypoint: &Waypoint, roles: RenderRole, source_id: &str) {
        if roles.is_empty() || source_id.is_empty() {
            return;
        }
        self.registered
            .entry(waypoint.uid.clone())
            .or_insert_with(|| WaypointEntry::new(waypoint.clone()))
            .add_roles(roles, source_id);
    }

    pub fn deregister(&mut self, waypoint: &Waypoint, roles: RenderRole, source_id: &str) {
        if roles.is_empty() || source_id.is_empty() {
            return;
        }
        let Some(entry) = self.registered.get_mut(&waypoint.uid) else {
            return;
        };
        entry.remove_roles(roles, source_id);
        if entry.roles.is_empty()
            && let Some(entry) = self.registered.remove(&waypoint.uid)
        {
            self.to_clean_up.push(entry);
        }
    }

    /// Resolves every waypoint's role, refreshes icons and labels for those
    /// whose role changed, then draws icons in ascending priority.
    pub fn update<P: Projection + ?Sized>(
        &mut self,
        projection: &P,
        labels: &mut TextLabelManager,
        canvas: &mut dyn CanvasSink,
    ) -> RenderStats {
        for entry in std::mem::take(&mut self.to_clean_up) {
            if !self.registered.contains_key(&entry.waypoint.uid) {
                for info in self.roles.values() {
                    if let Some(factory) = &info.icon_factory {
                        factory.forget(&entry.waypoint.uid);
                    }
                    if let Some(factory) = &info.label_factory {
                        factory.forget(&entry.waypoint.uid);
                    }
                }
            }
            entry.destroy(labels);
        }

        let mut draws: Vec<(CanvasId, IconDraw)> = Vec::new();
        for entry in self.registered.values_mut() {
            let show_role = entry
                .roles
                .singles()
                .find(|role| {
                    self.roles
                        .get(role)
                        .is_none_or(|info| (info.visibility)(&entry.waypoint))
                })
                .unwrap_or(RenderRole::empty());

            if show_role != entry.last_shown_role {
                prepare_render(entry, show_role, self.roles.get(&show_role), labels);
            }

            let (Some(icon), Some(canvas_id)) = (
                entry.icon.as_ref(),
                self.roles.get(&show_role).and_then(|info| info.canvas),
            ) else {
                continue;
            };
            draws.push((
                canvas_id,
                IconDraw {
                    role: show_role,
                    position: projection.project(icon.location),
                    icon: icon.clone(),
                },
            ));
        }

        let canvases: BTreeSet<CanvasId> = self.roles.values().filter_map(|i| i.canvas).collect();
        for id in canvases {
            canvas.clear(id);
        }

        draws.sort_by(|a, b| {
            a.1.icon
                .priority
                .partial_cmp(&b.1.icon.priority)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (id, draw) in &draws {
            canvas.draw_icon(*id, draw);
        }

        trace!("waypoints: {} registered, {} drawn", self.registered.len(), draws.len());
        RenderStats {
            registered: self.registered.len(),
            drawn: draws.len(),
        }
    }
}

fn prepare_render(
    entry: &mut WaypointEntry,
    show_role: RenderRole,
    info: Option<&RoleInfo>,
    labels: &mut TextLabelManager,
) {
    entry.icon = info
        .and_then(|i| i.icon_factory.as_ref())
        .map(|f| f.icon(&entry.waypoint));

    let label = info
        .and_then(|i| i.label_factory.as_ref())
        .map(|f| f.label(&entry.waypoint));

    let unchanged = match (&entry.label, &label) {
        (Some((_, old)), Some(new)) => Rc::ptr_eq(old, new),
        _ => false,
    };
    if !unchanged {
        if let Some((id, _)) = entry.label.take() {
            labels.deregister(id);
        }
        entry.label = label.map(|label| (labels.register(label.clone()), label));
    }

    entry.last_shown_role = show_role;
}
