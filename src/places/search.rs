use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::PlacesError;
use crate::models::{Availability, Coordinates, Facility, FacilityType};

/// One ring of the widening nearby search.
#[derive(Debug, Clone, Copy)]
pub struct SearchStage {
    pub radius_meters: u32,
    pub keyword: &'static str,
}

/// Widening rings: tight radius with a broad keyword first, then wider
/// rings with narrower keywords until enough facilities accumulate.
pub const SEARCH_STAGES: &[SearchStage] = &[
    SearchStage {
        radius_meters: 1000,
        keyword: "hospital OR clinic OR urgent care",
    },
    SearchStage {
        radius_meters: 5000,
        keyword: "hospital OR clinic OR urgent care",
    },
    SearchStage {
        radius_meters: 10000,
        keyword: "hospital OR clinic",
    },
    SearchStage {
        radius_meters: 25000,
        keyword: "hospital",
    },
];

/// Stop widening once this many distinct facilities are collected.
pub const ENOUGH_RESULTS: usize = 10;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Nearby-search provider abstraction (allows mocking).
pub trait PlacesClient {
    fn nearby_search(
        &self,
        center: Coordinates,
        stage: SearchStage,
    ) -> Result<Vec<PlaceResult>, PlacesError>;
}

/// Raw place as returned by the provider, before facility mapping.
#[derive(Debug, Clone)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: Option<String>,
    pub vicinity: Option<String>,
    pub location: Option<Coordinates>,
    pub rating: Option<f64>,
    pub types: Vec<String>,
    pub open_now: Option<bool>,
}

/// Great-circle distance in miles, rounded to one decimal.
pub fn distance_miles(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos()
            * to.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let distance = EARTH_RADIUS_MILES * c;
    (distance * 10.0).round() / 10.0
}

/// Run the widening search around a center point.
///
/// Stages run in order; duplicates (same place id) are dropped and the loop
/// stops early once [`ENOUGH_RESULTS`] distinct places are collected. A stage
/// failure is logged and skipped; only a fully empty run is an error. The
/// returned facilities are sorted nearest first.
pub fn staged_search<C: PlacesClient>(
    client: &C,
    center: Coordinates,
) -> Result<Vec<Facility>, PlacesError> {
    let mut seen = HashSet::new();
    let mut places = Vec::new();
    let mut last_error = None;

    for stage in SEARCH_STAGES {
        match client.nearby_search(center, *stage) {
            Ok(results) => {
                debug!(
                    radius = stage.radius_meters,
                    results = results.len(),
                    "search stage finished"
                );
                for place in results {
                    if !place.place_id.is_empty() && seen.insert(place.place_id.clone()) {
                        places.push(place);
                    }
                }
                if places.len() >= ENOUGH_RESULTS {
                    break;
                }
            }
            Err(e) => {
                warn!(radius = stage.radius_meters, error = %e, "search stage failed");
                last_error = Some(e);
            }
        }
    }

    if places.is_empty() {
        return Err(last_error.unwrap_or(PlacesError::NoFacilitiesFound));
    }

    let mut facilities: Vec<Facility> = places
        .into_iter()
        .map(|place| facility_from_place(place, center))
        .collect();
    facilities.sort_by(|a, b| {
        a.distance_miles
            .partial_cmp(&b.distance_miles)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    info!(count = facilities.len(), "nearby facility search complete");
    Ok(facilities)
}

/// Map a raw place into a facility, computing its distance from the center.
pub fn facility_from_place(place: PlaceResult, center: Coordinates) -> Facility {
    let distance = place
        .location
        .map(|loc| distance_miles(center, loc))
        .unwrap_or(0.0);

    let availability = match place.open_now {
        Some(true) => Availability::Open,
        Some(false) => Availability::Closed,
        None => Availability::Unknown,
    };

    // Later matches win, so a place tagged both clinic and hospital
    // displays as a hospital.
    let mut facility_type = FacilityType::Hospital;
    let has = |t: &str| place.types.iter().any(|pt| pt == t);
    if has("clinic") || has("medical_clinic") {
        facility_type = FacilityType::Clinic;
    }
    if has("urgent_care_facility") {
        facility_type = FacilityType::UrgentCare;
    }
    if has("hospital") {
        facility_type = FacilityType::Hospital;
    }

    Facility {
        id: place.place_id,
        name: place.name.unwrap_or_else(|| "Unknown Hospital".to_string()),
        address: place
            .vicinity
            .unwrap_or_else(|| "Address not available".to_string()),
        facility_type,
        rating: place.rating,
        latitude: place.location.map(|l| l.latitude).unwrap_or(0.0),
        longitude: place.location.map(|l| l.longitude).unwrap_or(0.0),
        distance_miles: distance,
        availability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const CENTER: Coordinates = Coordinates {
        latitude: 40.7128,
        longitude: -74.0060,
    };

    fn place(id: &str, lat_offset: f64) -> PlaceResult {
        PlaceResult {
            place_id: id.into(),
            name: Some(format!("Facility {id}")),
            vicinity: Some("123 Main St".into()),
            location: Some(Coordinates {
                latitude: CENTER.latitude + lat_offset,
                longitude: CENTER.longitude,
            }),
            rating: Some(4.2),
            types: vec!["hospital".into()],
            open_now: Some(true),
        }
    }

    /// Returns one canned response per stage, recording the stages seen.
    struct StagedMock {
        responses: RefCell<Vec<Result<Vec<PlaceResult>, PlacesError>>>,
        stages_seen: RefCell<Vec<u32>>,
    }

    impl StagedMock {
        fn new(responses: Vec<Result<Vec<PlaceResult>, PlacesError>>) -> Self {
            let mut responses = responses;
            responses.reverse();
            Self {
                responses: RefCell::new(responses),
                stages_seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl PlacesClient for StagedMock {
        fn nearby_search(
            &self,
            _center: Coordinates,
            stage: SearchStage,
        ) -> Result<Vec<PlaceResult>, PlacesError> {
            self.stages_seen.borrow_mut().push(stage.radius_meters);
            self.responses.borrow_mut().pop().unwrap_or(Ok(vec![]))
        }
    }

    #[test]
    fn haversine_distance_is_plausible() {
        // New York to Philadelphia, roughly 80 miles
        let philly = Coordinates {
            latitude: 39.9526,
            longitude: -75.1652,
        };
        let d = distance_miles(CENTER, philly);
        assert!(d > 75.0 && d < 85.0, "unexpected distance {d}");
    }

    #[test]
    fn distance_is_rounded_to_one_decimal() {
        let d = distance_miles(CENTER, place("a", 0.013).location.unwrap());
        assert_eq!(d, (d * 10.0).round() / 10.0);
    }

    #[test]
    fn stages_widen_until_enough_results() {
        let first: Vec<PlaceResult> = (0..4).map(|i| place(&format!("a{i}"), 0.001)).collect();
        let second: Vec<PlaceResult> = (0..7).map(|i| place(&format!("b{i}"), 0.002)).collect();
        let mock = StagedMock::new(vec![Ok(first), Ok(second), Ok(vec![]), Ok(vec![])]);

        let facilities = staged_search(&mock, CENTER).unwrap();
        assert_eq!(facilities.len(), 11);
        // third and fourth stages never run
        assert_eq!(*mock.stages_seen.borrow(), vec![1000, 5000]);
    }

    #[test]
    fn duplicate_place_ids_are_dropped() {
        let mock = StagedMock::new(vec![
            Ok(vec![place("dup", 0.001), place("other", 0.002)]),
            Ok(vec![place("dup", 0.001)]),
            Ok(vec![]),
            Ok(vec![]),
        ]);
        let facilities = staged_search(&mock, CENTER).unwrap();
        assert_eq!(facilities.len(), 2);
    }

    #[test]
    fn results_are_sorted_nearest_first() {
        let mock = StagedMock::new(vec![
            Ok(vec![place("far", 0.1), place("near", 0.001), place("mid", 0.01)]),
            Ok(vec![]),
            Ok(vec![]),
            Ok(vec![]),
        ]);
        let facilities = staged_search(&mock, CENTER).unwrap();
        let ids: Vec<&str> = facilities.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
    }

    #[test]
    fn failed_stage_is_skipped() {
        let mock = StagedMock::new(vec![
            Err(PlacesError::Rejected("OVER_QUERY_LIMIT".into())),
            Ok(vec![place("a", 0.001)]),
            Ok(vec![]),
            Ok(vec![]),
        ]);
        let facilities = staged_search(&mock, CENTER).unwrap();
        assert_eq!(facilities.len(), 1);
    }

    #[test]
    fn all_stages_empty_is_no_facilities() {
        let mock = StagedMock::new(vec![Ok(vec![]), Ok(vec![]), Ok(vec![]), Ok(vec![])]);
        assert!(matches!(
            staged_search(&mock, CENTER),
            Err(PlacesError::NoFacilitiesFound)
        ));
    }

    #[test]
    fn all_stages_failing_reports_last_error() {
        let failing =
            || Err(PlacesError::Rejected("REQUEST_DENIED".into()));
        let mock = StagedMock::new(vec![failing(), failing(), failing(), failing()]);
        assert!(matches!(
            staged_search(&mock, CENTER),
            Err(PlacesError::Rejected(_))
        ));
    }

    #[test]
    fn facility_type_prefers_hospital_tag() {
        let mut p = place("x", 0.0);
        p.types = vec!["clinic".into(), "hospital".into()];
        assert_eq!(
            facility_from_place(p, CENTER).facility_type,
            FacilityType::Hospital
        );

        let mut q = place("y", 0.0);
        q.types = vec!["urgent_care_facility".into()];
        assert_eq!(
            facility_from_place(q, CENTER).facility_type,
            FacilityType::UrgentCare
        );
    }

    #[test]
    fn missing_place_fields_get_placeholders() {
        let raw = PlaceResult {
            place_id: "bare".into(),
            name: None,
            vicinity: None,
            location: None,
            rating: None,
            types: vec![],
            open_now: None,
        };
        let facility = facility_from_place(raw, CENTER);
        assert_eq!(facility.name, "Unknown Hospital");
        assert_eq!(facility.address, "Address not available");
        assert_eq!(facility.facility_type, FacilityType::Hospital);
        assert_eq!(facility.availability, Availability::Unknown);
        assert_eq!(facility.distance_miles, 0.0);
    }
}
