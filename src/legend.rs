use serde::Serialize;

use crate::color_scale::{ColorScale, Rgb};
use crate::constants::{LEGEND_BUCKETS, LEGEND_POSITION};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub lower: u8,
    /// `None` for the open-ended last bucket
    pub upper: Option<u8>,
    pub color: Rgb,
    pub label: String,
}

/// Static magnitude key shown in the map corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
    pub position: String,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// Builds one entry per bucket; each swatch shows the color one unit
    /// above the bucket's lower bound.
    pub fn from_buckets(buckets: &[u8], scale: &ColorScale) -> Self {
        let entries = buckets
            .iter()
            .enumerate()
            .map(|(i, &lower)| {
                let upper = buckets.get(i + 1).copied();
                let label = match upper {
                    Some(upper) => format!("{}\u{2013}{}", lower, upper),
                    None => format!("{}+", lower),
                };
                LegendEntry {
                    lower,
                    upper,
                    color: scale.color_for(f64::from(lower) + 1.0),
                    label,
                }
            })
            .collect();

        Self {
            title: "Magnitude".to_string(),
            position: LEGEND_POSITION.to_string(),
            entries,
        }
    }

    pub fn magnitude(scale: &ColorScale) -> Self {
        Self::from_buckets(LEGEND_BUCKETS, scale)
    }

    /// HTML injected into the legend control when it is added to the map.
    pub fn to_html(&self) -> String {
        let rows: Vec<String> = self
            .entries
            .iter()
            .map(|entry| {
                let range = match entry.upper {
                    Some(upper) => format!("{}&ndash;{}", entry.lower, upper),
                    None => format!("{}+", entry.lower),
                };
                format!(
                    "<i style=\"background:{}\">&nbsp;&nbsp;&nbsp;&nbsp;</i> {}",
                    entry.color, range
                )
            })
            .collect();

        format!("{}<br><hr>{}", self.title, rows.join("<br>"))
    }
}
