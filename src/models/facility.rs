use serde::{Deserialize, Serialize};

use super::enums::{Availability, FacilityType};

/// A geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A healthcare facility returned by the staged nearby search,
/// distance already computed from the search center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub address: String,
    pub facility_type: FacilityType,
    pub rating: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_miles: f64,
    pub availability: Availability,
}
