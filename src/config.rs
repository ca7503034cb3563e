use std::collections::BTreeSet;
use std::net::SocketAddr;

use clap::Parser;
use clap::builder::TypedValueParser;
use log::{info, warn};

use crate::data::filter::DEFAULT_TOP_N;
use crate::geocode::GOOGLE_GEOCODE_URL;

/// Largest result count the JSON API accepts.
pub const MAX_TOP_N: usize = 100;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Inspection dataset: a .csv/.json/.parquet path or an http(s) URL
    #[arg(long, env = "CLEAN_EATS_DATASET", default_value = "data/inspections.csv")]
    pub dataset: String,

    /// Address the dashboard listens on
    #[arg(long, env = "CLEAN_EATS_BIND", default_value = "127.0.0.1:8050")]
    pub bind: SocketAddr,

    /// Google Geocoding API key; without one the map shows no markers
    #[arg(long, env = "GEOCODE_API_KEY", hide_env_values = true)]
    pub geocode_api_key: Option<String>,

    #[arg(long, env = "GEOCODE_ENDPOINT", default_value = GOOGLE_GEOCODE_URL)]
    pub geocode_endpoint: String,

    /// Mapbox token for map tiles; OpenStreetMap tiles are used without one
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    pub mapbox_token: Option<String>,

    /// Cuisine selected when the page is first opened
    #[arg(long, env = "CLEAN_EATS_DEFAULT_CUISINE", default_value = "Thai")]
    pub default_cuisine: String,

    /// How many restaurants to list
    #[arg(
        long,
        env = "CLEAN_EATS_TOP_N",
        default_value_t = DEFAULT_TOP_N,
        value_parser = clap::value_parser!(u16).range(1..=MAX_TOP_N as i64).map(usize::from)
    )]
    pub top_n: usize,

    /// Only rank inspections with one of these letter grades, e.g. `A,B`
    #[arg(long, env = "CLEAN_EATS_GRADES", value_delimiter = ',')]
    pub grades: Vec<String>,
}

impl Config {
    /// Grades normalised to the upper-case form the loader stores.
    pub fn grade_filter(&self) -> BTreeSet<String> {
        self.grades
            .iter()
            .map(|g| g.trim().to_ascii_uppercase())
            .filter(|g| !g.is_empty())
            .collect()
    }

    pub fn log_summary(&self) {
        info!("Dataset: {}", self.dataset);
        info!("Top {} restaurants, default cuisine {:?}", self.top_n, self.default_cuisine);

        let grades = self.grade_filter();
        if grades.is_empty() {
            info!("No grade restriction");
        } else {
            info!("Ranking only grades {grades:?}");
        }

        if self.geocode_api_key.is_none() {
            warn!("GEOCODE_API_KEY not set, map markers are disabled");
        }
        if self.mapbox_token.is_none() {
            info!("MAPBOX_ACCESS_TOKEN not set, using OpenStreetMap tiles");
        }
    }
}
