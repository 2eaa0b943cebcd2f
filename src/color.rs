use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::Condition;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.45, 0.6);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

fn from_hex(hex: &str) -> Option<Color32> {
    let rgb = Srgb::<u8>::from_str(hex).ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

/// Muted colour per known condition.
fn known_condition_hex(condition: &Condition) -> Option<&'static str> {
    match condition {
        Condition::Nuevo => Some("#607D8B"),
        Condition::CasiNuevo => Some("#4DB6AC"),
        Condition::Excelente => Some("#81C784"),
        Condition::Bueno => Some("#FFB74D"),
        Condition::Justo => Some("#FF8A65"),
        Condition::Rescatado => Some("#E57373"),
        Condition::Other(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Color mapping: condition → Color32
// ---------------------------------------------------------------------------

/// Maps the conditions of a dataset to colours: fixed colours for the six
/// known labels, evenly spaced hues for untranslated ones.
#[derive(Debug, Clone)]
pub struct ConditionPalette {
    mapping: BTreeMap<Condition, Color32>,
    default_color: Color32,
}

impl ConditionPalette {
    pub fn new(conditions: &BTreeSet<Condition>) -> Self {
        let others: Vec<&Condition> = conditions.iter().filter(|c| !c.is_known()).collect();
        let extra = generate_palette(others.len());

        let mut mapping: BTreeMap<Condition, Color32> = Condition::KNOWN
            .iter()
            .filter_map(|c| {
                let color = known_condition_hex(c).and_then(from_hex)?;
                Some((c.clone(), color))
            })
            .collect();
        mapping.extend(others.into_iter().cloned().zip(extra));

        ConditionPalette {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a condition.
    pub fn color_for(&self, condition: &Condition) -> Color32 {
        self.mapping
            .get(condition)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (label → colour) in canonical order.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(c, color)| (c.to_string(), *color))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Sequential scale for continuous values
// ---------------------------------------------------------------------------

/// Light-to-dark teal stops.
const TEAL: [(u8, u8, u8); 7] = [
    (209, 238, 234),
    (168, 219, 217),
    (133, 196, 201),
    (104, 171, 184),
    (79, 144, 166),
    (59, 115, 143),
    (42, 86, 116),
];

/// Colour for `value` on a teal scale spanning `[min, max]`.
pub fn teal_scale(value: f64, min: f64, max: f64) -> Color32 {
    let span = max - min;
    let t = if span.abs() < f64::EPSILON {
        1.0
    } else {
        ((value - min) / span).clamp(0.0, 1.0) as f32
    };

    let scaled = t * (TEAL.len() - 1) as f32;
    let lo = (scaled.floor() as usize).min(TEAL.len() - 2);
    let frac = scaled - lo as f32;

    let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = stop(TEAL[lo]).mix(stop(TEAL[lo + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_conditions_use_fixed_colours() {
        let conditions: BTreeSet<Condition> = [Condition::Excelente].into_iter().collect();
        let palette = ConditionPalette::new(&conditions);
        assert_eq!(
            palette.color_for(&Condition::Excelente),
            Color32::from_rgb(0x81, 0xC7, 0x84)
        );
        assert_eq!(
            palette.color_for(&Condition::Rescatado),
            Color32::from_rgb(0xE5, 0x73, 0x73)
        );
    }

    #[test]
    fn unmapped_conditions_get_their_own_colour() {
        let conditions: BTreeSet<Condition> = [
            Condition::Bueno,
            Condition::Other("unknown".into()),
            Condition::Other("parts".into()),
        ]
        .into_iter()
        .collect();
        let palette = ConditionPalette::new(&conditions);
        let unknown = palette.color_for(&Condition::Other("unknown".into()));
        let parts = palette.color_for(&Condition::Other("parts".into()));
        assert_ne!(unknown, parts);
        assert_ne!(unknown, Color32::GRAY);
        assert_eq!(palette.color_for(&Condition::Other("missing".into())), Color32::GRAY);

        let labels: Vec<String> = palette.legend_entries().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels.len(), 8);
        assert_eq!(labels[0], "nuevo");
        assert_eq!(labels[6], "parts");
    }

    #[test]
    fn teal_scale_hits_the_end_stops() {
        assert_eq!(teal_scale(0.0, 0.0, 10.0), Color32::from_rgb(209, 238, 234));
        assert_eq!(teal_scale(10.0, 0.0, 10.0), Color32::from_rgb(42, 86, 116));
        assert_eq!(teal_scale(5.0, 5.0, 5.0), Color32::from_rgb(42, 86, 116));
    }

    #[test]
    fn palette_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(5).len(), 5);
    }
}
