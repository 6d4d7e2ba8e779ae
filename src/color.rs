use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::TypeKey;

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

/// Fixed colour per personality type, shared by every chart.
pub fn type_color(key: TypeKey) -> Color32 {
    let hue = (key.index() as f32 / TypeKey::COUNT as f32) * 360.0;
    hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
}

// ---------------------------------------------------------------------------
// Sequential scale for the heatmap
// ---------------------------------------------------------------------------

/// Maps values in `[min, max]` onto a light → dark blue ramp.
#[derive(Debug, Clone, Copy)]
pub struct HeatScale {
    min: f64,
    max: f64,
}

impl HeatScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Build the scale spanning all values of the iterator.
    pub fn spanning(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            // No values.
            return Self::new(0.0, 1.0);
        }
        Self::new(min, max)
    }

    /// Position of `value` in the range, clamped to `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 0.0;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let t = self.normalize(value);
        let lightness = 0.95 - t * 0.65;
        hsl_to_color32(Hsl::new(215.0, 0.70, lightness))
    }

    /// Black on light cells, white on dark ones.
    pub fn text_color_for(&self, value: f64) -> Color32 {
        if self.normalize(value) > 0.55 {
            Color32::WHITE
        } else {
            Color32::BLACK
        }
    }
}
