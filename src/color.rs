use std::collections::BTreeMap;

use eframe::egui::Color32;
use hobo_viewer::data::model::ColumnLabel;
use palette::{Hsl, IntoColor, Srgb};

/// One plotted series: file position in the viewer plus column label.
pub type SeriesKey = (usize, ColumnLabel);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours.
///
/// Hues step by the golden angle so that adding a series keeps the colours of
/// the ones before it.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    const GOLDEN_ANGLE: f32 = 137.507_77;
    (0..n)
        .map(|i| {
            let hue = (i as f32 * GOLDEN_ANGLE) % 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: series → Color32
// ---------------------------------------------------------------------------

/// Assigns each (file, column) series its own colour.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<SeriesKey, Color32>,
}

impl ColorMap {
    pub fn new(keys: impl IntoIterator<Item = SeriesKey>) -> Self {
        let keys: Vec<SeriesKey> = keys.into_iter().collect();
        let palette = generate_palette(keys.len());
        let mapping = keys.into_iter().zip(palette).collect();
        ColorMap { mapping }
    }

    pub fn color_for(&self, file: usize, label: &ColumnLabel) -> Color32 {
        self.mapping
            .get(&(file, label.clone()))
            .copied()
            .unwrap_or(Color32::GRAY)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colours = generate_palette(8);
        assert_eq!(colours.len(), 8);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn palette_prefix_is_stable() {
        assert_eq!(generate_palette(3)[..], generate_palette(6)[..3]);
    }

    #[test]
    fn unknown_series_is_grey() {
        let label = ColumnLabel::new("Temp", Some("°F"), Some("1"));
        let map = ColorMap::new([(0, label.clone())]);
        assert_eq!(map.len(), 1);
        assert_ne!(map.color_for(0, &label), Color32::GRAY);
        assert_eq!(map.color_for(1, &label), Color32::GRAY);
    }
}
