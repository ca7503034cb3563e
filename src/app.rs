use log::debug;
use serde::Serialize;

use crate::data::filter::{RankQuery, top_n};
use crate::data::model::GeocodedResult;
use crate::geocode::enrich;
use crate::state::AppState;
use crate::ui::map::{MapSettings, Marker, markers};

// ---------------------------------------------------------------------------
// Selector state → page content
// ---------------------------------------------------------------------------

/// Everything the dashboard shows for one cuisine selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub selected: String,
    pub selection_message: String,
    pub title: String,
    pub cuisines: Vec<String>,
    pub results: Vec<GeocodedResult>,
    pub markers: Vec<Marker>,
    pub map: MapSettings,
}

/// Run the pipeline for one selector value: filter → rank → geocode.
///
/// `None` or a blank value selects the configured default cuisine. An
/// unknown cuisine is not an error; it yields an empty table and map.
pub async fn handle_selection(state: &AppState, cuisine: Option<&str>) -> DashboardView {
    let selected = cuisine
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(state.settings.default_cuisine.as_str())
        .to_string();

    let results = top_restaurants(state, &selected, state.settings.top_n).await;

    DashboardView {
        selection_message: format!("You have selected \"{selected}\" restaurants"),
        title: format!(
            "Top {} cleanest {selected} restaurants",
            state.settings.top_n
        ),
        cuisines: state.cuisines(),
        markers: markers(&results),
        map: MapSettings::new(state.settings.mapbox_token.as_deref()),
        results,
        selected,
    }
}

/// The `limit` most hygienic restaurants of `cuisine`, with coordinates
/// where the geocoder found them.
pub async fn top_restaurants(state: &AppState, cuisine: &str, limit: usize) -> Vec<GeocodedResult> {
    if !state.dataset.has_cuisine(cuisine) {
        debug!("no {cuisine:?} restaurants in the dataset");
        return Vec::new();
    }

    let query = RankQuery {
        cuisine,
        limit,
        grades: &state.settings.grades,
    };
    let rankings = top_n(&state.dataset, &query);
    debug!("{} ranked {cuisine} restaurants", rankings.len());

    enrich(state.geocoder.as_ref(), rankings).await
}
