use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Address – where a restaurant is
// ---------------------------------------------------------------------------

/// Street address as it appears in the inspection data.
///
/// The NYC export splits the address over `BUILDING`, `STREET`, `BORO` and
/// `ZIPCODE`; other exports carry a single free-text column, kept in `line`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Address {
    pub building: String,
    pub street: String,
    pub borough: String,
    pub zipcode: String,
    /// Free-text address used when the structured parts are absent.
    pub line: String,
}

impl Address {
    /// Single-line form, as sent to the geocoder:
    /// `"{building} {street}, {borough} {zipcode}"`.
    pub fn full(&self) -> String {
        let street = join_non_empty(&[&self.building, &self.street]);
        let locality = join_non_empty(&[&self.borough, &self.zipcode]);

        let first = if street.is_empty() {
            self.line.as_str()
        } else {
            street.as_str()
        };

        match (first.is_empty(), locality.is_empty()) {
            (true, _) => locality,
            (false, true) => first.to_string(),
            (false, false) => format!("{first}, {locality}"),
        }
    }
}

fn join_non_empty(parts: &[&String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full())
    }
}

// ---------------------------------------------------------------------------
// InspectionRecord – one row of the source table
// ---------------------------------------------------------------------------

/// One inspection event of one restaurant. Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionRecord {
    /// Restaurant id from the city export (`CAMIS`), when present.
    pub camis: Option<String>,
    pub name: String,
    pub address: Address,
    pub cuisine: String,
    /// Inspection score, lower is cleaner. `None` when the cell was empty.
    pub score: Option<f64>,
    /// Letter grade (`A`, `B`, `C`, ...) when one was issued.
    pub grade: Option<String>,
    pub inspection_date: Option<NaiveDate>,
}

impl InspectionRecord {
    /// Identity used for deduplication: name plus rendered address.
    pub fn restaurant_key(&self) -> RestaurantKey {
        RestaurantKey {
            name: self.name.clone(),
            address: self.address.full(),
        }
    }
}

/// Restaurant identity within one query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RestaurantKey {
    pub name: String,
    pub address: String,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// All inspection records in file order, plus the cuisine index used to
/// populate the selector.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<InspectionRecord>,
    /// Sorted distinct cuisine values.
    pub cuisines: BTreeSet<String>,
}

impl Dataset {
    pub fn from_records(records: Vec<InspectionRecord>) -> Self {
        let cuisines = records.iter().map(|r| r.cuisine.clone()).collect();
        Dataset { records, cuisines }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_cuisine(&self, cuisine: &str) -> bool {
        self.cuisines.contains(cuisine)
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// A restaurant with its best (lowest) score for one cuisine query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantRanking {
    pub camis: Option<String>,
    pub name: String,
    pub address: String,
    pub cuisine: String,
    pub score: f64,
    /// Grade issued at the best-scoring inspection.
    pub grade: Option<String>,
    /// Date of the best-scoring inspection.
    pub inspection_date: Option<NaiveDate>,
}

/// A ranking plus its coordinates. `lat`/`lon` are null when the lookup
/// failed, and the map leaves that restaurant out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodedResult {
    #[serde(flatten)]
    pub ranking: RestaurantRanking,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl GeocodedResult {
    /// `(lat, lon)` when the lookup succeeded.
    pub fn location(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}
