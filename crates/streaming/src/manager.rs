use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::SQRT_2;
use std::rc::Rc;

use foundation::bounds::Margins;
use foundation::math::{GeoPoint, Projection, ProjectionChange};
use layers::{RenderRole, VisibilityHandler, Waypoint, WaypointLayer, WaypointRenderer};
use runtime::{Counter, Metrics};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::facility::{Facility, FacilityType, Icao};
use crate::search::NearestSearch;
use crate::service::{Completion, FacilityService, SearchResults};
use crate::visibility::FacilityVisibility;

pub const WAYPOINTS_SOURCE_ID: &str = "waypoints-layer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilitySearchConfig {
    pub airport_max_items: usize,
    pub vor_max_items: usize,
    pub ndb_max_items: usize,
    pub intersection_max_items: usize,
    pub debounce_ms: f64,
    /// Search radius as a multiple of the viewport's half diagonal. Values
    /// above one leave room to pan before a new search is needed.
    pub overdraw_factor: f64,
    pub source_id: String,
}

impl Default for FacilitySearchConfig {
    fn default() -> Self {
        Self {
            airport_max_items: 500,
            vor_max_items: 250,
            ndb_max_items: 250,
            intersection_max_items: 500,
            debounce_ms: 500.0,
            overdraw_factor: SQRT_2,
            source_id: WAYPOINTS_SOURCE_ID.to_string(),
        }
    }
}

impl FacilitySearchConfig {
    pub fn max_items(&self, category: FacilityType) -> usize {
        match category {
            FacilityType::Airport => self.airport_max_items,
            FacilityType::Vor => self.vor_max_items,
            FacilityType::Ndb => self.ndb_max_items,
            FacilityType::Intersection => self.intersection_max_items,
        }
    }
}

/// Keeps the nearest airport, VOR, NDB and intersection searches in step
/// with the visible map area and mirrors their results into the waypoint
/// renderer under the normal role.
///
/// Searches cover more than the viewport so that small pans reuse the last
/// results. A viewport change that outgrows them schedules a debounced
/// refresh per visible category.
#[derive(Debug)]
pub struct FacilitySearchManager {
    config: FacilitySearchConfig,
    searches: BTreeMap<FacilityType, NearestSearch>,
    visibility: Rc<Cell<FacilityVisibility>>,
    dead_zone: Margins,
    /// Set when the dead zone changed since the last area sync.
    area_stale: bool,
    search_center: GeoPoint,
    /// Great-arc radians.
    search_radius: f64,
    search_margin: f64,
    /// Facilities in the latest results, loaded or not.
    to_show: BTreeSet<Icao>,
    shown: BTreeMap<Icao, Waypoint>,
    metrics: Metrics,
}

impl Default for FacilitySearchManager {
    fn default() -> Self {
        Self::new(FacilitySearchConfig::default())
    }
}

impl FacilitySearchManager {
    pub fn new(config: FacilitySearchConfig) -> Self {
        let searches = FacilityType::ALL
            .into_iter()
            .map(|category| (category, NearestSearch::new(category, config.max_items(category))))
            .collect();
        Self {
            config,
            searches,
            visibility: Rc::new(Cell::new(FacilityVisibility::empty())),
            dead_zone: Margins::ZERO,
            area_stale: false,
            search_center: GeoPoint::invalid(),
            search_radius: 0.0,
            search_margin: 0.0,
            to_show: BTreeSet::new(),
            shown: BTreeMap::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn config(&self) -> &FacilitySearchConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn visibility(&self) -> FacilityVisibility {
        self.visibility.get()
    }

    pub fn search(&self, category: FacilityType) -> Option<&NearestSearch> {
        self.searches.get(&category)
    }

    pub fn search_center(&self) -> GeoPoint {
        self.search_center
    }

    pub fn search_radius(&self) -> f64 {
        self.search_radius
    }

    pub fn search_margin(&self) -> f64 {
        self.search_margin
    }

    pub fn is_shown(&self, icao: &Icao) -> bool {
        self.shown.contains_key(icao)
    }

    pub fn shown_len(&self) -> usize {
        self.shown.len()
    }

    /// Visibility handler for the normal role. It reads the live flags, so
    /// later visibility changes apply without re-registering it.
    pub fn visibility_handler(&self) -> VisibilityHandler {
        let flags = self.visibility.clone();
        Rc::new(move |waypoint: &Waypoint| flags.get().shows(waypoint))
    }

    /// Installs this manager's visibility handler on the normal role.
    pub fn attach(&self, renderer: &mut WaypointRenderer) {
        renderer.set_visibility_handler(RenderRole::NORMAL, self.visibility_handler());
    }

    /// Updates which categories show. A category that becomes visible gets
    /// a refresh attempt against the current viewport.
    pub fn set_visibility(&mut self, visibility: FacilityVisibility) {
        let old = self.visibility.replace(visibility);
        if old == visibility {
            return;
        }
        debug!("facility visibility {old:?} -> {visibility:?}");
        for category in FacilityType::ALL {
            if !old.shows_category(category) && visibility.shows_category(category) {
                self.try_refresh(category);
            }
        }
    }

    /// Margins the search area excludes. The area is re-derived on the next
    /// call to [`Self::on_projection_changed`], even one with no change flags.
    pub fn set_dead_zone(&mut self, dead_zone: Margins) {
        if self.dead_zone != dead_zone {
            self.dead_zone = dead_zone;
            self.area_stale = true;
        }
    }

    /// Re-derives the search area from `projection` and refreshes every
    /// visible category that has moved out of it.
    pub fn on_projection_changed<P: Projection + ?Sized>(
        &mut self,
        change: ProjectionChange,
        projection: &P,
    ) {
        let resized = ProjectionChange::RANGE
            | ProjectionChange::PROJECTED_SIZE
            | ProjectionChange::TARGET_PROJECTED;
        if self.area_stale || change.intersects(resized) {
            self.sync_search_area(projection);
        } else if change.contains(ProjectionChange::CENTER) {
            self.search_center = self.viewport_center(projection);
        } else {
            return;
        }
        self.try_refresh_all();
    }

    fn viewport_center<P: Projection + ?Sized>(&self, projection: &P) -> GeoPoint {
        let inner = self.dead_zone.inner_bounds(projection.projected_size());
        projection.invert(inner.center())
    }

    fn sync_search_area<P: Projection + ?Sized>(&mut self, projection: &P) {
        let inner = self.dead_zone.inner_bounds(projection.projected_size());
        let half_diagonal = inner.width().max(0.0).hypot(inner.height().max(0.0)) / 2.0
            * projection.projected_resolution();
        self.search_radius = half_diagonal * self.config.overdraw_factor;
        self.search_margin = half_diagonal * (self.config.overdraw_factor - 1.0);
        self.search_center = self.viewport_center(projection);
        self.area_stale = false;
    }

    fn try_refresh_all(&mut self) {
        for category in FacilityType::ALL {
            self.try_refresh(category);
        }
    }

    fn try_refresh(&mut self, category: FacilityType) {
        if !self.visibility.get().shows_category(category)
            || !self.search_center.is_valid()
            || !(self.search_radius > 0.0)
        {
            return;
        }
        let Some(search) = self.searches.get_mut(&category) else {
            return;
        };
        if search.needs_refresh(self.search_center, self.search_radius, self.search_margin) {
            search.schedule_refresh(self.search_center, self.search_radius, self.config.debounce_ms);
            self.metrics.inc(Counter::SearchesScheduled);
        }
    }

    /// Runs due searches, then applies whatever the service has finished.
    pub fn update(
        &mut self,
        elapsed_ms: f64,
        service: &mut dyn FacilityService,
        renderer: &mut WaypointRenderer,
    ) {
        for search in self.searches.values_mut() {
            if let Some(request) = search.tick(elapsed_ms) {
                debug!(
                    "{} search: {:.1} km around ({:.4}, {:.4}), max {}",
                    request.category,
                    request.radius_m / 1000.0,
                    request.center.lat,
                    request.center.lon,
                    request.max_items
                );
                service.start_search(request);
                self.metrics.inc(Counter::SearchesIssued);
            }
        }

        for completion in service.poll() {
            match completion {
                Completion::Search { category, result } => match result {
                    Ok(results) => self.apply_results(results, service, renderer),
                    Err(err) => {
                        warn!("{err}");
                        self.metrics.inc(Counter::SearchFailures);
                        if let Some(search) = self.searches.get_mut(&category) {
                            search.forget();
                        }
                    }
                },
                Completion::Facility { icao, result } => match result {
                    Ok(facility) => self.on_facility_loaded(facility, renderer),
                    Err(err) => {
                        debug!("facility {icao} not loaded: {err}");
                        self.metrics.inc(Counter::LoadFailures);
                    }
                },
            }
        }
    }

    fn apply_results(
        &mut self,
        results: SearchResults,
        service: &mut dyn FacilityService,
        renderer: &mut WaypointRenderer,
    ) {
        for icao in results.added {
            if icao.is_empty() || !self.to_show.insert(icao.clone()) {
                continue;
            }
            if !self.shown.contains_key(&icao) {
                service.request_facility(&icao);
            }
        }
        for icao in results.removed {
            if icao.is_empty() {
                continue;
            }
            self.to_show.remove(&icao);
            if let Some(waypoint) = self.shown.remove(&icao) {
                renderer.deregister(&waypoint, RenderRole::NORMAL, &self.config.source_id);
            }
        }
    }

    fn on_facility_loaded(&mut self, facility: Facility, renderer: &mut WaypointRenderer) {
        if !self.to_show.contains(&facility.icao) {
            debug!("discarding stale load of {}", facility.icao);
            self.metrics.inc(Counter::StaleLoadsDiscarded);
            return;
        }
        if self.shown.contains_key(&facility.icao) {
            return;
        }
        let waypoint = facility.to_waypoint();
        renderer.register(&waypoint, RenderRole::NORMAL, &self.config.source_id);
        self.shown.insert(facility.icao, waypoint);
        self.metrics.inc(Counter::FacilitiesRegistered);
    }
}

impl WaypointLayer for FacilitySearchManager {
    fn source_id(&self) -> &str {
        &self.config.source_id
    }

    fn clear(&mut self, renderer: &mut WaypointRenderer) {
        self.to_show.clear();
        for waypoint in std::mem::take(&mut self.shown).into_values() {
            renderer.deregister(&waypoint, RenderRole::NORMAL, &self.config.source_id);
        }
        for search in self.searches.values_mut() {
            search.forget();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryFacilityService;
    use foundation::math::{MapProjection, ProjectionParams};
    use foundation::{METERS_PER_GA_RADIAN, METERS_PER_NMILE};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn nm(v: f64) -> f64 {
        v * METERS_PER_NMILE / METERS_PER_GA_RADIAN
    }

    const ORIGIN: GeoPoint = GeoPoint::new(47.0, -122.0);

    fn projection(target: GeoPoint, range_nm: f64) -> MapProjection {
        let mut p = MapProjection::new(400.0, 300.0);
        p.set(
            &ProjectionParams::new()
                .with_target(target)
                .with_range(nm(range_nm)),
        );
        p
    }

    fn sync(manager: &mut FacilitySearchManager, p: &MapProjection) {
        manager.on_projection_changed(ProjectionChange::all(), p);
    }

    fn service() -> InMemoryFacilityService {
        InMemoryFacilityService::new([
            Facility::new("V    SEA", "SEA", FacilityType::Vor, ORIGIN.offset(90.0, nm(2.0))),
            Facility::new("V    OLM", "OLM", FacilityType::Vor, ORIGIN.offset(270.0, nm(3.0))),
            Facility::new("N    NDB", "NDB", FacilityType::Ndb, ORIGIN.offset(0.0, nm(1.0))),
        ])
    }

    /// Ticks until nothing is in flight.
    fn settle(
        manager: &mut FacilitySearchManager,
        service: &mut InMemoryFacilityService,
        renderer: &mut WaypointRenderer,
    ) {
        manager.update(500.0, service, renderer);
        while service.pending() > 0 {
            manager.update(0.0, service, renderer);
        }
    }

    #[test]
    fn radius_covers_overdrawn_half_diagonal() {
        let mut manager = FacilitySearchManager::default();
        let p = projection(ORIGIN, 10.0);
        sync(&mut manager, &p);
        let half_diag = 250.0 * p.projected_resolution();
        assert_close(manager.search_radius(), half_diag * SQRT_2, 1e-12);
        assert_close(manager.search_margin(), half_diag * (SQRT_2 - 1.0), 1e-12);
        assert!(manager.search_center().equals(ORIGIN));
    }

    #[test]
    fn dead_zone_shrinks_and_shifts_search_area() {
        let mut manager = FacilitySearchManager::default();
        manager.set_dead_zone(Margins::new(0.0, 100.0, 0.0, 0.0));
        let p = projection(ORIGIN, 10.0);
        sync(&mut manager, &p);
        let half_diag = 200.0_f64.hypot(100.0) * p.projected_resolution();
        assert_close(manager.search_radius(), half_diag * SQRT_2, 1e-12);
        assert!(manager.search_center().lat < ORIGIN.lat);
    }

    #[test]
    fn symmetric_dead_zone_resyncs_without_projection_change() {
        let mut manager = FacilitySearchManager::default();
        let p = projection(ORIGIN, 10.0);
        sync(&mut manager, &p);
        let radius = manager.search_radius();

        // Left and right margins cancel out, so the camera reports nothing.
        manager.set_dead_zone(Margins::new(150.0, 0.0, 150.0, 0.0));
        manager.on_projection_changed(ProjectionChange::empty(), &p);
        let half_diag = 50.0_f64.hypot(150.0) * p.projected_resolution();
        assert_close(manager.search_radius(), half_diag * SQRT_2, 1e-12);
        assert!(manager.search_radius() < radius);
        assert!(manager.search_center().equals(ORIGIN));

        // Once synced, an empty change is a no-op again.
        manager.on_projection_changed(ProjectionChange::empty(), &projection(ORIGIN, 20.0));
        assert_close(manager.search_radius(), half_diag * SQRT_2, 1e-12);
    }

    #[test]
    fn hidden_categories_never_search() {
        let mut manager = FacilitySearchManager::default();
        sync(&mut manager, &projection(ORIGIN, 10.0));
        assert_eq!(manager.metrics().counter(Counter::SearchesScheduled), 0);
        for category in FacilityType::ALL {
            assert!(!manager.search(category).unwrap().is_refresh_pending());
        }
    }

    #[test]
    fn becoming_visible_schedules_search() {
        let mut manager = FacilitySearchManager::default();
        sync(&mut manager, &projection(ORIGIN, 10.0));
        manager.set_visibility(FacilityVisibility::VOR);
        assert!(manager.search(FacilityType::Vor).unwrap().is_refresh_pending());
        assert!(!manager.search(FacilityType::Ndb).unwrap().is_refresh_pending());
        assert_eq!(manager.metrics().counter(Counter::SearchesScheduled), 1);
    }

    #[test]
    fn results_register_after_load() {
        let mut manager = FacilitySearchManager::default();
        let mut service = service();
        let mut renderer = WaypointRenderer::new();
        manager.set_visibility(FacilityVisibility::VOR | FacilityVisibility::NDB);
        sync(&mut manager, &projection(ORIGIN, 10.0));

        manager.update(499.0, &mut service, &mut renderer);
        assert_eq!(manager.metrics().counter(Counter::SearchesIssued), 0);

        // Results arrive on the same poll; their loads resolve on the next.
        manager.update(1.0, &mut service, &mut renderer);
        assert_eq!(manager.metrics().counter(Counter::SearchesIssued), 2);
        assert!(renderer.is_empty());
        assert_eq!(service.pending(), 3);

        manager.update(16.0, &mut service, &mut renderer);
        assert_eq!(renderer.len(), 3);
        assert_eq!(manager.shown_len(), 3);
        let sea = Facility::new("V    SEA", "SEA", FacilityType::Vor, ORIGIN).to_waypoint();
        assert!(renderer.is_registered_as(&sea, RenderRole::NORMAL));
        assert_eq!(manager.metrics().counter(Counter::FacilitiesRegistered), 3);
    }

    #[test]
    fn small_pan_issues_no_query() {
        let mut manager = FacilitySearchManager::default();
        let mut service = service();
        let mut renderer = WaypointRenderer::new();
        manager.set_visibility(FacilityVisibility::VOR);
        sync(&mut manager, &projection(ORIGIN, 10.0));
        settle(&mut manager, &mut service, &mut renderer);

        let margin = manager.search_margin();
        let moved = projection(ORIGIN.offset(45.0, margin * 0.5), 10.0);
        manager.on_projection_changed(ProjectionChange::CENTER | ProjectionChange::TARGET, &moved);
        assert!(!manager.search(FacilityType::Vor).unwrap().is_refresh_pending());
        assert_eq!(manager.metrics().counter(Counter::SearchesScheduled), 1);
    }

    #[test]
    fn pan_bursts_coalesce_into_one_query() {
        let mut manager = FacilitySearchManager::default();
        let mut service = service();
        let mut renderer = WaypointRenderer::new();
        manager.set_visibility(FacilityVisibility::VOR);
        sync(&mut manager, &projection(ORIGIN, 10.0));
        settle(&mut manager, &mut service, &mut renderer);
        let issued = manager.metrics().counter(Counter::SearchesIssued);

        let margin = manager.search_margin();
        let first = ORIGIN.offset(90.0, margin * 1.5);
        manager.on_projection_changed(ProjectionChange::CENTER, &projection(first, 10.0));
        manager.update(300.0, &mut service, &mut renderer);
        let second = first.offset(90.0, margin * 1.5);
        manager.on_projection_changed(ProjectionChange::CENTER, &projection(second, 10.0));

        manager.update(300.0, &mut service, &mut renderer);
        assert_eq!(manager.metrics().counter(Counter::SearchesIssued), issued);
        manager.update(200.0, &mut service, &mut renderer);
        assert_eq!(manager.metrics().counter(Counter::SearchesIssued), issued + 1);
        assert!(
            manager
                .search(FacilityType::Vor)
                .unwrap()
                .last_center()
                .equals(manager.search_center())
        );
    }

    #[test]
    fn zoom_changes_always_refresh() {
        let mut manager = FacilitySearchManager::default();
        let mut service = service();
        let mut renderer = WaypointRenderer::new();
        manager.set_visibility(FacilityVisibility::VOR);
        sync(&mut manager, &projection(ORIGIN, 10.0));
        settle(&mut manager, &mut service, &mut renderer);

        let mut p = projection(ORIGIN, 10.0);
        let change = p.set(&ProjectionParams::new().with_range(nm(5.0)));
        manager.on_projection_changed(change, &p);
        assert!(manager.search(FacilityType::Vor).unwrap().is_refresh_pending());
    }

    #[test]
    fn removed_results_deregister_immediately() {
        let mut manager = FacilitySearchManager::default();
        let mut service = service();
        let mut renderer = WaypointRenderer::new();
        manager.set_visibility(FacilityVisibility::VOR);
        sync(&mut manager, &projection(ORIGIN, 10.0));
        settle(&mut manager, &mut service, &mut renderer);
        assert_eq!(renderer.len(), 2);

        // Zoom in far enough that only the nearer VOR is left.
        sync(&mut manager, &projection(ORIGIN.offset(90.0, nm(2.0)), 0.5));
        manager.update(500.0, &mut service, &mut renderer);
        manager.update(0.0, &mut service, &mut renderer);
        assert_eq!(manager.shown_len(), 1);
        assert!(manager.is_shown(&Icao::new("V    SEA")));
        assert!(!manager.is_shown(&Icao::new("V    OLM")));
        assert_eq!(renderer.len(), 1);
    }

    /// Service whose completions are scripted by the test.
    #[derive(Default)]
    struct ScriptedService {
        searches: Vec<crate::service::SearchRequest>,
        loads: Vec<Icao>,
        ready: Vec<Completion>,
    }

    impl FacilityService for ScriptedService {
        fn start_search(&mut self, request: crate::service::SearchRequest) {
            self.searches.push(request);
        }

        fn request_facility(&mut self, icao: &Icao) {
            self.loads.push(icao.clone());
        }

        fn poll(&mut self) -> Vec<Completion> {
            std::mem::take(&mut self.ready)
        }
    }

    fn vor(icao: &str) -> Facility {
        Facility::new(icao, icao.trim(), FacilityType::Vor, ORIGIN)
    }

    fn search_done(added: &[&str], removed: &[&str]) -> Completion {
        Completion::Search {
            category: FacilityType::Vor,
            result: Ok(SearchResults {
                added: added.iter().map(|s| Icao::new(*s)).collect(),
                removed: removed.iter().map(|s| Icao::new(*s)).collect(),
            }),
        }
    }

    fn loaded(icao: &str) -> Completion {
        Completion::Facility {
            icao: Icao::new(icao),
            result: Ok(vor(icao)),
        }
    }

    #[test]
    fn load_after_removal_is_discarded() {
        let mut manager = FacilitySearchManager::default();
        let mut service = ScriptedService::default();
        let mut renderer = WaypointRenderer::new();

        service.ready.push(search_done(&["V    ABC"], &[]));
        manager.update(0.0, &mut service, &mut renderer);
        assert_eq!(service.loads, vec![Icao::new("V    ABC")]);

        service.ready.push(search_done(&[], &["V    ABC"]));
        service.ready.push(loaded("V    ABC"));
        manager.update(0.0, &mut service, &mut renderer);

        assert!(renderer.is_empty());
        assert_eq!(manager.metrics().counter(Counter::StaleLoadsDiscarded), 1);
        assert_eq!(manager.metrics().counter(Counter::FacilitiesRegistered), 0);
    }

    #[test]
    fn empty_icaos_are_skipped() {
        let mut manager = FacilitySearchManager::default();
        let mut service = ScriptedService::default();
        let mut renderer = WaypointRenderer::new();
        service.ready.push(search_done(&["", "   "], &[""]));
        manager.update(0.0, &mut service, &mut renderer);
        assert!(service.loads.is_empty());
    }

    #[test]
    fn load_failure_leaves_point_unregistered() {
        let mut manager = FacilitySearchManager::default();
        let mut service = ScriptedService::default();
        let mut renderer = WaypointRenderer::new();
        service.ready.push(search_done(&["V    BAD"], &[]));
        manager.update(0.0, &mut service, &mut renderer);
        service.ready.push(Completion::Facility {
            icao: Icao::new("V    BAD"),
            result: Err(crate::error::FacilityError::UnknownFacility(Icao::new("V    BAD"))),
        });
        manager.update(0.0, &mut service, &mut renderer);
        assert!(renderer.is_empty());
        assert_eq!(manager.metrics().counter(Counter::LoadFailures), 1);
    }

    #[test]
    fn search_failure_retries_on_next_viewport_change() {
        let mut manager = FacilitySearchManager::default();
        let mut service = ScriptedService::default();
        let mut renderer = WaypointRenderer::new();
        manager.set_visibility(FacilityVisibility::VOR);
        let p = projection(ORIGIN, 10.0);
        sync(&mut manager, &p);
        manager.update(500.0, &mut service, &mut renderer);
        assert_eq!(service.searches.len(), 1);

        service.ready.push(Completion::Search {
            category: FacilityType::Vor,
            result: Err(crate::error::FacilityError::SearchFailed {
                category: FacilityType::Vor,
                reason: "offline".into(),
            }),
        });
        manager.update(0.0, &mut service, &mut renderer);
        assert_eq!(manager.metrics().counter(Counter::SearchFailures), 1);

        manager.on_projection_changed(ProjectionChange::CENTER, &p);
        manager.update(500.0, &mut service, &mut renderer);
        assert_eq!(service.searches.len(), 2);
    }

    #[test]
    fn visibility_handler_tracks_flags() {
        let mut manager = FacilitySearchManager::default();
        let handler = manager.visibility_handler();
        let waypoint = vor("V    ABC").to_waypoint();
        assert!(!handler(&waypoint));
        manager.set_visibility(FacilityVisibility::VOR);
        assert!(handler(&waypoint));
    }

    #[test]
    fn clear_withdraws_every_registration() {
        let mut manager = FacilitySearchManager::default();
        let mut service = ScriptedService::default();
        let mut renderer = WaypointRenderer::new();
        renderer.register(&vor("V    ABC").to_waypoint(), RenderRole::HIGHLIGHT, "other");
        service.ready.push(search_done(&["V    ABC", "V    DEF"], &[]));
        manager.update(0.0, &mut service, &mut renderer);
        service.ready.push(loaded("V    ABC"));
        service.ready.push(loaded("V    DEF"));
        manager.update(0.0, &mut service, &mut renderer);
        assert_eq!(manager.shown_len(), 2);

        manager.clear(&mut renderer);
        assert_eq!(manager.shown_len(), 0);
        assert_eq!(renderer.len(), 1);
        assert_eq!(
            renderer.roles(&vor("V    ABC").to_waypoint()),
            RenderRole::HIGHLIGHT
        );
        assert_eq!(manager.source_id(), WAYPOINTS_SOURCE_ID);
    }
}
