use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{QuakeMapError, Result};

/// An RGB color whose channels are allowed to leave the 0..=255 range.
///
/// Marker fill colors are computed arithmetically from the magnitude and are
/// not clamped unless asked to be, so the channels are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Rgb {
    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }

    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0, 255),
            g: self.g.clamp(0, 255),
            b: self.b.clamp(0, 255),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

// Leaflet takes CSS color strings, so serialize as one.
impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Threshold table mapping a value to a discrete color.
///
/// Stops are checked in ascending order and the first stop whose bound is
/// greater than the value wins; anything that matches no stop (including NaN)
/// gets the catch-all color.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<(f64, Rgb)>,
    catch_all: Rgb,
}

impl ColorScale {
    pub fn new(stops: Vec<(f64, Rgb)>, catch_all: Rgb) -> Result<Self> {
        if let Some((bound, _)) = stops.iter().find(|(bound, _)| !bound.is_finite()) {
            return Err(QuakeMapError::InvalidColorScale(format!(
                "threshold {} is not finite",
                bound
            )));
        }
        if let Some(pair) = stops.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
            return Err(QuakeMapError::InvalidColorScale(format!(
                "thresholds must be strictly increasing ({} then {})",
                pair[0].0, pair[1].0
            )));
        }
        Ok(Self { stops, catch_all })
    }

    /// The magnitude table used by the legend.
    pub fn magnitude() -> Result<Self> {
        Self::new(
            vec![
                (3.0, Rgb::new(255, 195, 195)),
                (4.0, Rgb::new(255, 165, 165)),
                (5.0, Rgb::new(255, 135, 135)),
                (6.0, Rgb::new(255, 105, 105)),
                (7.0, Rgb::new(255, 75, 75)),
                (8.0, Rgb::new(255, 45, 45)),
                (9.0, Rgb::new(255, 15, 15)),
            ],
            Rgb::new(255, 0, 0),
        )
    }

    pub fn color_for(&self, value: f64) -> Rgb {
        self.stops
            .iter()
            .find(|(bound, _)| value < *bound)
            .map(|(_, color)| *color)
            .unwrap_or(self.catch_all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_fall_into_the_upper_bucket() {
        let scale = ColorScale::magnitude().unwrap();
        assert_eq!(scale.color_for(2.99).to_string(), "rgb(255,195,195)");
        assert_eq!(scale.color_for(3.0).to_string(), "rgb(255,165,165)");
        assert_eq!(scale.color_for(8.999).to_string(), "rgb(255,15,15)");
        assert_eq!(scale.color_for(9.0).to_string(), "rgb(255,0,0)");
    }

    #[test]
    fn every_value_maps_to_a_table_color() {
        let scale = ColorScale::magnitude().unwrap();
        let palette: Vec<Rgb> = [195, 165, 135, 105, 75, 45, 15, 0]
            .iter()
            .map(|&gb| Rgb::new(255, gb, gb))
            .collect();

        for value in [-10.0, -0.5, 0.0, 1.0, 4.5, 6.0, 12.0, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(palette.contains(&scale.color_for(value)), "value {value}");
        }
        assert_eq!(scale.color_for(f64::NEG_INFINITY), Rgb::new(255, 195, 195));
    }

    #[test]
    fn nan_gets_the_catch_all() {
        assert_eq!(ColorScale::magnitude().unwrap().color_for(f64::NAN), Rgb::new(255, 0, 0));
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let err = ColorScale::new(
            vec![(3.0, Rgb::new(1, 1, 1)), (3.0, Rgb::new(2, 2, 2))],
            Rgb::new(0, 0, 0),
        )
        .unwrap_err();
        assert!(matches!(err, QuakeMapError::InvalidColorScale(_)));

        assert!(ColorScale::new(vec![(f64::NAN, Rgb::new(1, 1, 1))], Rgb::new(0, 0, 0)).is_err());
        assert!(ColorScale::new(vec![], Rgb::new(0, 0, 0)).is_ok());
    }

    #[test]
    fn custom_scale_is_first_match_wins() {
        let scale = ColorScale::new(
            vec![(0.0, Rgb::new(0, 0, 255)), (10.0, Rgb::new(0, 255, 0))],
            Rgb::new(255, 0, 0),
        )
        .unwrap();
        assert_eq!(scale.color_for(-1.0), Rgb::new(0, 0, 255));
        assert_eq!(scale.color_for(0.0), Rgb::new(0, 255, 0));
        assert_eq!(scale.color_for(10.0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn serializes_as_css_string() {
        let json = serde_json::to_string(&Rgb::new(255, -3, 300)).unwrap();
        assert_eq!(json, "\"rgb(255,-3,300)\"");
        assert_eq!(Rgb::new(255, -3, 300).clamped(), Rgb::new(255, 0, 255));
    }
}
