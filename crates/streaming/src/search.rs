use foundation::METERS_PER_GA_RADIAN;
use foundation::math::GeoPoint;
use runtime::DebounceTimer;
use tracing::trace;

use crate::facility::FacilityType;
use crate::service::SearchRequest;

/// Refresh bookkeeping for one category's nearest-facility session.
///
/// `last_center` and `last_radius` describe the most recently scheduled
/// search, so a burst of viewport changes inside the margin does not
/// reschedule.
#[derive(Debug, Clone)]
pub struct NearestSearch {
    category: FacilityType,
    max_items: usize,
    last_center: GeoPoint,
    /// Great-arc radians; zero until the first search is scheduled.
    last_radius: f64,
    timer: DebounceTimer,
}

impl NearestSearch {
    pub fn new(category: FacilityType, max_items: usize) -> Self {
        Self {
            category,
            max_items,
            last_center: GeoPoint::new(0.0, 0.0),
            last_radius: 0.0,
            timer: DebounceTimer::new(),
        }
    }

    pub fn category(&self) -> FacilityType {
        self.category
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn last_center(&self) -> GeoPoint {
        self.last_center
    }

    pub fn last_radius(&self) -> f64 {
        self.last_radius
    }

    pub fn is_refresh_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Whether a search at `center`/`radius` would differ enough from the
    /// last one to be worth running.
    pub fn needs_refresh(&self, center: GeoPoint, radius: f64, margin: f64) -> bool {
        self.last_radius != radius || self.last_center.distance(center) >= margin
    }

    /// Schedules a search, replacing any refresh still waiting.
    pub fn schedule_refresh(&mut self, center: GeoPoint, radius: f64, delay_ms: f64) {
        self.last_center = center;
        self.last_radius = radius;
        self.timer.schedule(delay_ms);
        trace!("{} search scheduled in {delay_ms} ms", self.category);
    }

    /// Makes the next viewport change schedule a search.
    pub fn forget(&mut self) {
        self.last_radius = 0.0;
    }

    /// Advances the debounce countdown and returns the request to issue once
    /// it expires.
    pub fn tick(&mut self, elapsed_ms: f64) -> Option<SearchRequest> {
        if !self.timer.tick(elapsed_ms) {
            return None;
        }
        Some(SearchRequest {
            category: self.category,
            center: self.last_center,
            radius_m: self.last_radius * METERS_PER_GA_RADIAN,
            max_items: self.max_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_search_always_needs_refresh() {
        let search = NearestSearch::new(FacilityType::Vor, 250);
        assert!(search.needs_refresh(GeoPoint::new(0.0, 0.0), 0.01, 0.005));
    }

    #[test]
    fn small_moves_at_same_radius_are_ignored() {
        let mut search = NearestSearch::new(FacilityType::Vor, 250);
        let center = GeoPoint::new(10.0, 10.0);
        search.schedule_refresh(center, 0.01, 500.0);
        assert!(!search.needs_refresh(center.offset(90.0, 0.001), 0.01, 0.004));
        assert!(search.needs_refresh(center.offset(90.0, 0.005), 0.01, 0.004));
        assert!(search.needs_refresh(center, 0.011, 0.004));
    }

    #[test]
    fn issues_request_after_debounce() {
        let mut search = NearestSearch::new(FacilityType::Ndb, 250);
        search.schedule_refresh(GeoPoint::new(1.0, 2.0), 0.5, 500.0);
        assert!(search.tick(499.0).is_none());
        let request = search.tick(1.0).unwrap();
        assert_eq!(request.category, FacilityType::Ndb);
        assert_eq!(request.max_items, 250);
        assert!((request.radius_m - 0.5 * METERS_PER_GA_RADIAN).abs() < 1e-6);
        assert!(!search.is_refresh_pending());
        assert!(search.tick(1000.0).is_none());
    }

    #[test]
    fn forgetting_forces_next_refresh() {
        let mut search = NearestSearch::new(FacilityType::Airport, 500);
        let center = GeoPoint::new(1.0, 1.0);
        search.schedule_refresh(center, 0.2, 0.0);
        search.tick(0.0);
        assert!(!search.needs_refresh(center, 0.2, 0.1));
        search.forget();
        assert!(search.needs_refresh(center, 0.2, 0.1));
    }
}
