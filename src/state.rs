use std::collections::BTreeSet;
use std::sync::Arc;

use minijinja::Environment;

use crate::config::Config;
use crate::data::model::Dataset;
use crate::geocode::{DisabledGeocoder, Geocoder, GoogleGeocoder};
use crate::ui::page;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Dashboard behaviour that does not come from the dataset.
#[derive(Debug, Clone)]
pub struct Settings {
    pub default_cuisine: String,
    pub top_n: usize,
    /// Empty means every grade (and no grade) is ranked.
    pub grades: BTreeSet<String>,
    pub mapbox_token: Option<String>,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Settings {
            default_cuisine: config.default_cuisine.clone(),
            top_n: config.top_n,
            grades: config.grade_filter(),
            mapbox_token: config.mapbox_token.clone(),
        }
    }
}

/// Everything a request needs, built once before the server binds.
///
/// Nothing in here is mutated after construction, so requests share it
/// without locking.
pub struct AppState {
    pub dataset: Dataset,
    pub geocoder: Box<dyn Geocoder>,
    pub settings: Settings,
    pub templates: Environment<'static>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        dataset: Dataset,
        geocoder: Box<dyn Geocoder>,
        settings: Settings,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self {
            dataset,
            geocoder,
            settings,
            templates: page::templates()?,
        })
    }

    /// Build the state for a loaded dataset, picking the geocoder from the
    /// configured credentials.
    pub fn from_config(config: &Config, dataset: Dataset) -> Result<Self, minijinja::Error> {
        let geocoder: Box<dyn Geocoder> = match &config.geocode_api_key {
            Some(key) => Box::new(GoogleGeocoder::new(
                reqwest::Client::new(),
                config.geocode_endpoint.clone(),
                key.clone(),
            )),
            None => Box::new(DisabledGeocoder),
        };
        Self::new(dataset, geocoder, Settings::from(config))
    }

    /// Sorted cuisine values for the selector.
    pub fn cuisines(&self) -> Vec<String> {
        self.dataset.cuisines.iter().cloned().collect()
    }
}
