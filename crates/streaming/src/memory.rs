use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::io::Read;
use std::path::Path;

use foundation::METERS_PER_GA_RADIAN;
use tracing::{debug, info};

use crate::error::FacilityError;
use crate::facility::{Facility, FacilityType, Icao};
use crate::service::{Completion, FacilityService, SearchRequest, SearchResults};

/// Facility service over an in-memory database.
///
/// Every request resolves on the next [`FacilityService::poll`]. Each
/// category keeps its own search session, so search results are reported
/// relative to that category's previous search.
#[derive(Debug, Default)]
pub struct InMemoryFacilityService {
    facilities: BTreeMap<Icao, Facility>,
    sessions: BTreeMap<FacilityType, BTreeSet<Icao>>,
    pending: VecDeque<Completion>,
    failing: BTreeSet<FacilityType>,
}

impl InMemoryFacilityService {
    pub fn new(facilities: impl IntoIterator<Item = Facility>) -> Self {
        Self {
            facilities: facilities
                .into_iter()
                .map(|facility| (facility.icao.clone(), facility))
                .collect(),
            ..Self::default()
        }
    }

    /// Loads a JSON array of facility records.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FacilityError> {
        let facilities: Vec<Facility> = serde_json::from_reader(reader)?;
        Ok(Self::new(facilities))
    }

    pub fn from_json_str(json: &str) -> Result<Self, FacilityError> {
        let facilities: Vec<Facility> = serde_json::from_str(json)?;
        Ok(Self::new(facilities))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FacilityError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| FacilityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let service = Self::from_reader(std::io::BufReader::new(file))?;
        info!("loaded {} facilities from {}", service.len(), path.display());
        Ok(service)
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn insert(&mut self, facility: Facility) {
        self.facilities.insert(facility.icao.clone(), facility);
    }

    /// Makes searches in `category` fail until cleared.
    pub fn set_search_failing(&mut self, category: FacilityType, failing: bool) {
        if failing {
            self.failing.insert(category);
        } else {
            self.failing.remove(&category);
        }
    }

    /// Requests waiting for the next poll.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn nearest(&self, request: &SearchRequest) -> Vec<Icao> {
        let radius = request.radius_m / METERS_PER_GA_RADIAN;
        let mut hits: Vec<(f64, &Icao)> = self
            .facilities
            .values()
            .filter(|f| f.facility_type == request.category)
            .filter_map(|f| {
                let distance = request.center.distance(f.location);
                (distance <= radius).then_some((distance, &f.icao))
            })
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        hits.truncate(request.max_items);
        hits.into_iter().map(|(_, icao)| icao.clone()).collect()
    }

    fn search(&mut self, request: &SearchRequest) -> SearchResults {
        let found = self.nearest(request);
        let session = self.sessions.entry(request.category).or_default();
        let current: BTreeSet<Icao> = found.iter().cloned().collect();

        let added: Vec<Icao> = found
            .into_iter()
            .filter(|icao| !session.contains(icao))
            .collect();
        let removed: Vec<Icao> = session.difference(&current).cloned().collect();
        *session = current;

        SearchResults { added, removed }
    }
}

impl FacilityService for InMemoryFacilityService {
    fn start_search(&mut self, request: SearchRequest) {
        let category = request.category;
        let result = if self.failing.contains(&category) {
            Err(FacilityError::SearchFailed {
                category,
                reason: "session unavailable".into(),
            })
        } else {
            let results = self.search(&request);
            debug!(
                "{category} search: +{} -{}",
                results.added.len(),
                results.removed.len()
            );
            Ok(results)
        };
        self.pending.push_back(Completion::Search { category, result });
    }

    fn request_facility(&mut self, icao: &Icao) {
        let result = self
            .facilities
            .get(icao)
            .cloned()
            .ok_or_else(|| FacilityError::UnknownFacility(icao.clone()));
        self.pending.push_back(Completion::Facility {
            icao: icao.clone(),
            result,
        });
    }

    fn poll(&mut self) -> Vec<Completion> {
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::math::GeoPoint;
    use pretty_assertions::assert_eq;

    fn nm(v: f64) -> f64 {
        v * foundation::METERS_PER_NMILE
    }

    fn service() -> InMemoryFacilityService {
        let origin = GeoPoint::new(47.0, -122.0);
        let near = origin.offset(90.0, nm(5.0) / METERS_PER_GA_RADIAN);
        let mid = origin.offset(180.0, nm(20.0) / METERS_PER_GA_RADIAN);
        let far = origin.offset(0.0, nm(80.0) / METERS_PER_GA_RADIAN);
        InMemoryFacilityService::new([
            Facility::new("V    NEAR", "NEAR", FacilityType::Vor, near),
            Facility::new("V    MID", "MID", FacilityType::Vor, mid),
            Facility::new("V    FAR", "FAR", FacilityType::Vor, far),
            Facility::new("N    NDB", "NDB", FacilityType::Ndb, near),
        ])
    }

    fn request(radius_nm: f64, max_items: usize) -> SearchRequest {
        SearchRequest {
            category: FacilityType::Vor,
            center: GeoPoint::new(47.0, -122.0),
            radius_m: nm(radius_nm),
            max_items,
        }
    }

    fn search_results(completions: Vec<Completion>) -> SearchResults {
        match completions.into_iter().next() {
            Some(Completion::Search { result: Ok(r), .. }) => r,
            other => panic!("expected search results, got {other:?}"),
        }
    }

    fn ids(icaos: &[Icao]) -> Vec<&str> {
        icaos.iter().map(Icao::as_str).collect()
    }

    #[test]
    fn search_ranks_by_distance_within_radius() {
        let mut s = service();
        s.start_search(request(50.0, 10));
        assert_eq!(s.pending(), 1);
        let results = search_results(s.poll());
        assert_eq!(ids(&results.added), vec!["V    NEAR", "V    MID"]);
        assert!(results.removed.is_empty());
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn search_truncates_to_max_items() {
        let mut s = service();
        s.start_search(request(100.0, 1));
        let results = search_results(s.poll());
        assert_eq!(ids(&results.added), vec!["V    NEAR"]);
    }

    #[test]
    fn session_reports_differences() {
        let mut s = service();
        s.start_search(request(50.0, 10));
        s.poll();

        s.start_search(request(10.0, 10));
        let results = search_results(s.poll());
        assert!(results.added.is_empty());
        assert_eq!(ids(&results.removed), vec!["V    MID"]);

        s.start_search(request(100.0, 10));
        let results = search_results(s.poll());
        assert_eq!(ids(&results.added), vec!["V    MID", "V    FAR"]);
    }

    #[test]
    fn categories_keep_separate_sessions() {
        let mut s = service();
        s.start_search(request(50.0, 10));
        s.poll();
        s.start_search(SearchRequest {
            category: FacilityType::Ndb,
            ..request(50.0, 10)
        });
        let results = search_results(s.poll());
        assert_eq!(ids(&results.added), vec!["N    NDB"]);
    }

    #[test]
    fn unknown_facility_fails_on_poll() {
        let mut s = service();
        s.request_facility(&Icao::new("V    NEAR"));
        s.request_facility(&Icao::new("V    NONE"));
        let completions = s.poll();
        assert!(matches!(
            &completions[0],
            Completion::Facility { result: Ok(f), .. } if f.ident == "NEAR"
        ));
        assert!(matches!(
            &completions[1],
            Completion::Facility { result: Err(FacilityError::UnknownFacility(_)), .. }
        ));
    }

    #[test]
    fn failing_category_reports_error() {
        let mut s = service();
        s.set_search_failing(FacilityType::Vor, true);
        s.start_search(request(50.0, 10));
        assert!(matches!(
            s.poll().as_slice(),
            [Completion::Search { result: Err(FacilityError::SearchFailed { .. }), .. }]
        ));
    }

    #[test]
    fn loads_json_database() {
        let json = r#"[
            { "icao": "A      KSEA ", "ident": "KSEA", "type": "airport",
              "location": { "lat": 47.45, "lon": -122.31 }, "airport_size": "large" }
        ]"#;
        let s = InMemoryFacilityService::from_json_str(json).unwrap();
        assert_eq!(s.len(), 1);

        let err = InMemoryFacilityService::from_json_str("{").unwrap_err();
        assert!(matches!(err, FacilityError::MalformedDatabase(_)));
    }
}
