use foundation::math::GeoPoint;

use crate::error::FacilityError;
use crate::facility::{Facility, FacilityType, Icao};

/// One nearest-facility query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub category: FacilityType,
    pub center: GeoPoint,
    pub radius_m: f64,
    pub max_items: usize,
}

/// Change in a category's result set since that category's previous search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub added: Vec<Icao>,
    pub removed: Vec<Icao>,
}

/// A finished request, handed back by [`FacilityService::poll`].
#[derive(Debug)]
pub enum Completion {
    Search {
        category: FacilityType,
        result: Result<SearchResults, FacilityError>,
    },
    Facility {
        icao: Icao,
        result: Result<Facility, FacilityError>,
    },
}

/// Asynchronous facility lookups.
///
/// Requests are fire-and-forget. Their outcomes surface later through
/// `poll`, on the same thread that issued them, so a consumer has to check
/// whether a result is still relevant when it arrives.
pub trait FacilityService {
    fn start_search(&mut self, request: SearchRequest);

    fn request_facility(&mut self, icao: &Icao);

    /// Drains every completion that is ready.
    fn poll(&mut self) -> Vec<Completion>;
}
