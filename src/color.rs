use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::aggregate::GroupBy;
use crate::data::model::{GroupKey, PassengerTable};

/// Bar colour for survivors in outcome-split charts.
pub const SURVIVED: Color32 = Color32::from_rgb(76, 175, 120);
/// Bar colour for non-survivors in outcome-split charts.
pub const DIED: Color32 = Color32::from_rgb(214, 96, 77);

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

/// Sequential blue ramp for a survival percentage in `[0, 100]`:
/// pale for low rates, deep for high ones.
pub fn heat_color(rate: f64) -> Color32 {
    let t = (rate / 100.0).clamp(0.0, 1.0) as f32;
    hsl_to_color32(210.0, 0.65, 0.92 - 0.57 * t)
}

// ---------------------------------------------------------------------------
// Color mapping: group key → Color32
// ---------------------------------------------------------------------------

/// Maps the keys of one categorical field to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<GroupKey, Color32>,
}

impl ColorMap {
    /// Build a colour map from the field's full set of keys.
    pub fn new(keys: impl IntoIterator<Item = GroupKey>) -> Self {
        let keys: Vec<GroupKey> = keys.into_iter().collect();
        let palette = generate_palette(keys.len());
        ColorMap {
            mapping: keys.into_iter().zip(palette).collect(),
        }
    }

    /// Look up the colour for a given key.
    pub fn color_for(&self, key: &GroupKey) -> Color32 {
        self.mapping.get(key).copied().unwrap_or(Color32::GRAY)
    }
}

/// One [`ColorMap`] per grouping field, built from the whole table so a
/// category keeps its colour while filters change.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    sex: ColorMap,
    class: ColorMap,
    family: ColorMap,
    port: ColorMap,
}

impl CategoryColors {
    pub fn for_table(table: &PassengerTable) -> Self {
        let family_sizes: BTreeSet<u32> = table.passengers.iter().map(|p| p.family_size).collect();
        CategoryColors {
            sex: ColorMap::new(table.sexes.iter().cloned().map(GroupKey::Text)),
            class: ColorMap::new(table.classes.iter().map(|&c| GroupKey::Integer(c as i64))),
            family: ColorMap::new(family_sizes.into_iter().map(|f| GroupKey::Integer(f as i64))),
            port: ColorMap::new(table.ports.iter().cloned().map(GroupKey::Text)),
        }
    }

    pub fn get(&self, by: GroupBy) -> &ColorMap {
        match by {
            GroupBy::Sex => &self.sex,
            GroupBy::Class => &self.class,
            GroupBy::FamilySize => &self.family,
            GroupBy::Port => &self.port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(3);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn unknown_key_falls_back_to_gray() {
        let map = ColorMap::new([GroupKey::Integer(1), GroupKey::Integer(2)]);
        assert_ne!(map.color_for(&GroupKey::Integer(1)), Color32::GRAY);
        assert_eq!(map.color_for(&GroupKey::Integer(9)), Color32::GRAY);
    }

    #[test]
    fn family_colors_cover_observed_sizes_only() {
        use crate::data::model::Passenger;

        let table = PassengerTable::from_passengers(vec![
            Passenger::new("A", 3, "male", None, 0, 0, None, None, false),
            Passenger::new("B", 3, "male", None, 1, 1, None, None, false),
            Passenger::new("C", 3, "male", None, u32::MAX, 0, None, None, false),
        ]);
        let colors = CategoryColors::for_table(&table);
        let family = colors.get(GroupBy::FamilySize);

        assert_eq!(family.mapping.len(), 3);
        assert_ne!(family.color_for(&GroupKey::Integer(u32::MAX as i64)), Color32::GRAY);
        assert_eq!(family.color_for(&GroupKey::Integer(1)), Color32::GRAY);
    }

    #[test]
    fn heat_ramp_darkens_with_rate() {
        let low = heat_color(0.0);
        let high = heat_color(100.0);
        assert!(high.r() < low.r());
        assert_eq!(heat_color(150.0), high);
    }
}
