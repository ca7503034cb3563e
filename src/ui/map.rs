use serde::Serialize;

use crate::color::ScoreScale;
use crate::data::model::GeocodedResult;

// ---------------------------------------------------------------------------
// Restaurant map
// ---------------------------------------------------------------------------

/// Centre of New York City, where the map opens.
pub const NYC_CENTER: (f64, f64) = (40.7128, -73.9);
pub const DEFAULT_ZOOM: u8 = 10;

const OSM_TILES: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";
const MAPBOX_ATTRIBUTION: &str = "&copy; Mapbox &copy; OpenStreetMap contributors";

/// Tile source and initial viewport for the Leaflet map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSettings {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: &'static str,
    pub tile_size: u16,
    pub zoom_offset: i8,
}

impl MapSettings {
    /// Mapbox "light" style when a token is configured, OpenStreetMap
    /// otherwise.
    pub fn new(mapbox_token: Option<&str>) -> Self {
        let (tile_url, attribution, tile_size, zoom_offset) = match mapbox_token {
            Some(token) => (
                format!(
                    "https://api.mapbox.com/styles/v1/mapbox/light-v11/tiles/{{z}}/{{x}}/{{y}}?access_token={token}"
                ),
                MAPBOX_ATTRIBUTION,
                512,
                -1,
            ),
            None => (OSM_TILES.to_string(), OSM_ATTRIBUTION, 256, 0),
        };

        MapSettings {
            center_lat: NYC_CENTER.0,
            center_lon: NYC_CENTER.1,
            zoom: DEFAULT_ZOOM,
            tile_url,
            attribution,
            tile_size,
            zoom_offset,
        }
    }
}

/// One star on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub score: f64,
    pub color: String,
}

/// Markers for every result that has coordinates, coloured by score.
pub fn markers(results: &[GeocodedResult]) -> Vec<Marker> {
    let scale = ScoreScale::new(results);

    results
        .iter()
        .filter_map(|r| {
            let (lat, lon) = r.location()?;
            Some(Marker {
                name: r.ranking.name.clone(),
                address: r.ranking.address.clone(),
                lat,
                lon,
                score: r.ranking.score,
                color: scale.color_for(r.ranking.score),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::scale_color;
    use crate::data::model::RestaurantRanking;

    fn result(name: &str, score: f64, location: Option<(f64, f64)>) -> GeocodedResult {
        GeocodedResult {
            ranking: RestaurantRanking {
                camis: None,
                name: name.into(),
                address: format!("{name} st"),
                cuisine: "Thai".into(),
                score,
                grade: None,
                inspection_date: None,
            },
            lat: location.map(|l| l.0),
            lon: location.map(|l| l.1),
        }
    }

    #[test]
    fn unlocated_results_get_no_marker() {
        let results = vec![
            result("Clean", 2.0, Some((40.7, -73.9))),
            result("Lost", 5.0, None),
            result("Grubby", 10.0, Some((40.8, -73.95))),
        ];
        let markers = markers(&results);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].name, "Clean");
        assert_eq!(markers[0].color, scale_color(0.0));
        assert_eq!(markers[1].name, "Grubby");
        assert_eq!(markers[1].color, scale_color(1.0));
    }

    #[test]
    fn tile_source_follows_token() {
        let osm = MapSettings::new(None);
        assert!(osm.tile_url.contains("openstreetmap"));
        assert_eq!((osm.center_lat, osm.center_lon, osm.zoom), (40.7128, -73.9, 10));

        let mapbox = MapSettings::new(Some("pk.test"));
        assert!(mapbox.tile_url.ends_with("/{z}/{x}/{y}?access_token=pk.test"));
        assert_eq!(mapbox.tile_size, 512);
    }
}
