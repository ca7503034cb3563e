use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::GeocodedResult;

// ---------------------------------------------------------------------------
// Score → marker colour
// ---------------------------------------------------------------------------

const CLEAN_HUE: f32 = 120.0;
const DIRTY_HUE: f32 = 0.0;

/// Hex colour (`#rrggbb`) on a green → red scale, `t` in `0.0..=1.0`.
pub fn scale_color(t: f32) -> String {
    let t = t.clamp(0.0, 1.0);
    let hue = CLEAN_HUE + (DIRTY_HUE - CLEAN_HUE) * t;
    let hsl = Hsl::new(hue, 0.75, 0.45);
    let rgb: Srgb = hsl.into_color();
    format!(
        "#{:02x}{:02x}{:02x}",
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

/// Maps the scores of one result set onto [`scale_color`]: the cleanest
/// restaurant is green, the worst one red.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreScale {
    min: f64,
    max: f64,
}

impl ScoreScale {
    pub fn new(results: &[GeocodedResult]) -> Self {
        let (min, max) = results
            .iter()
            .map(|r| r.ranking.score)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s), hi.max(s))
            });
        ScoreScale { min, max }
    }

    /// Look up the colour for a given score.
    pub fn color_for(&self, score: f64) -> String {
        let range = self.max - self.min;
        if !range.is_finite() || range.abs() < f64::EPSILON {
            return scale_color(0.0);
        }
        scale_color(((score - self.min) / range) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::RestaurantRanking;

    fn result(score: f64) -> GeocodedResult {
        GeocodedResult {
            ranking: RestaurantRanking {
                camis: None,
                name: format!("R{score}"),
                address: String::new(),
                cuisine: "Thai".into(),
                score,
                grade: None,
                inspection_date: None,
            },
            lat: None,
            lon: None,
        }
    }

    #[test]
    fn ends_of_the_scale() {
        let green = scale_color(0.0);
        let red = scale_color(1.0);
        assert_eq!(green.len(), 7);
        assert!(green.starts_with('#'));
        // Green channel dominates at the clean end, red at the dirty end.
        assert!(green[3..5] > green[1..3]);
        assert!(red[1..3] > red[3..5]);
        assert_eq!(scale_color(-3.0), green);
        assert_eq!(scale_color(9.0), red);
    }

    #[test]
    fn scale_spans_result_scores() {
        let scale = ScoreScale::new(&[result(2.0), result(5.0), result(12.0)]);
        assert_eq!(scale.color_for(2.0), scale_color(0.0));
        assert_eq!(scale.color_for(12.0), scale_color(1.0));
        assert_eq!(scale.color_for(7.0), scale_color(0.5));
    }

    #[test]
    fn flat_or_empty_scale_is_green() {
        assert_eq!(ScoreScale::new(&[result(4.0)]).color_for(4.0), scale_color(0.0));
        assert_eq!(ScoreScale::new(&[]).color_for(4.0), scale_color(0.0));
    }
}
