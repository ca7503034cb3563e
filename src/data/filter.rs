use std::collections::{BTreeSet, HashMap};

use super::model::{Dataset, InspectionRecord, RestaurantKey, RestaurantRanking};

pub const DEFAULT_TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Query: which restaurants are candidates
// ---------------------------------------------------------------------------

/// A "top N cleanest restaurants of cuisine X" request.
#[derive(Debug, Clone)]
pub struct RankQuery<'a> {
    /// Matched exactly against the record's cuisine.
    pub cuisine: &'a str,
    pub limit: usize,
    /// Letter grades a row must carry to count. Empty means no restriction.
    pub grades: &'a BTreeSet<String>,
}

impl<'a> RankQuery<'a> {
    fn admits(&self, record: &InspectionRecord) -> bool {
        if record.cuisine != self.cuisine || record.score.is_none() {
            return false;
        }
        if self.grades.is_empty() {
            return true;
        }
        record
            .grade
            .as_ref()
            .is_some_and(|g| self.grades.contains(g))
    }
}

/// Return the `query.limit` restaurants with the lowest score for the
/// cuisine, best first.
///
/// * Rows are grouped by restaurant (name + address); each restaurant keeps
///   its lowest score, so it appears at most once.
/// * Ties keep the order in which restaurants first appear in the file,
///   even when a restaurant's best score comes from a later row.
/// * No matching rows gives an empty list.
pub fn top_n(dataset: &Dataset, query: &RankQuery<'_>) -> Vec<RestaurantRanking> {
    let mut slots: HashMap<RestaurantKey, usize> = HashMap::new();
    let mut best: Vec<RestaurantRanking> = Vec::new();

    for record in dataset.records.iter().filter(|r| query.admits(r)) {
        let Some(score) = record.score else {
            continue;
        };

        match slots.get(&record.restaurant_key()) {
            Some(&slot) => {
                // Strictly lower only: the earliest best inspection is kept.
                if score < best[slot].score {
                    best[slot] = ranking_from(record, score);
                }
            }
            None => {
                slots.insert(record.restaurant_key(), best.len());
                best.push(ranking_from(record, score));
            }
        }
    }

    // `sort_by` is stable, which gives the first-appearance tie-break.
    best.sort_by(|a, b| a.score.total_cmp(&b.score));
    best.truncate(query.limit);
    best
}

fn ranking_from(record: &InspectionRecord, score: f64) -> RestaurantRanking {
    RestaurantRanking {
        camis: record.camis.clone(),
        name: record.name.clone(),
        address: record.address.full(),
        cuisine: record.cuisine.clone(),
        score,
        grade: record.grade.clone(),
        inspection_date: record.inspection_date,
    }
}
