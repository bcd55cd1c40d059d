use eframe::egui::Color32;

use crate::error::{Error, Result};

pub const CATEGORY10: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

/// Category10 followed by its lighter companions.
pub const CATEGORY20: [Color32; 20] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
    Color32::from_rgb(0xae, 0xc7, 0xe8),
    Color32::from_rgb(0xff, 0xbb, 0x78),
    Color32::from_rgb(0x98, 0xdf, 0x8a),
    Color32::from_rgb(0xff, 0x98, 0x96),
    Color32::from_rgb(0xc5, 0xb0, 0xd5),
    Color32::from_rgb(0xc4, 0x9c, 0x94),
    Color32::from_rgb(0xf7, 0xb6, 0xd2),
    Color32::from_rgb(0xc7, 0xc7, 0xc7),
    Color32::from_rgb(0xdb, 0xdb, 0x8d),
    Color32::from_rgb(0x9e, 0xda, 0xe5),
];

const RED_YELLOW_BLUE: [Color32; 11] = [
    Color32::from_rgb(0xa5, 0x00, 0x26),
    Color32::from_rgb(0xd7, 0x30, 0x27),
    Color32::from_rgb(0xf4, 0x6d, 0x43),
    Color32::from_rgb(0xfd, 0xae, 0x61),
    Color32::from_rgb(0xfe, 0xe0, 0x90),
    Color32::from_rgb(0xff, 0xff, 0xbf),
    Color32::from_rgb(0xe0, 0xf3, 0xf8),
    Color32::from_rgb(0xab, 0xd9, 0xe9),
    Color32::from_rgb(0x74, 0xad, 0xd1),
    Color32::from_rgb(0x45, 0x75, 0xb4),
    Color32::from_rgb(0x31, 0x36, 0x95),
];

const GREENS: [Color32; 9] = [
    Color32::from_rgb(0xf7, 0xfc, 0xf5),
    Color32::from_rgb(0xe5, 0xf5, 0xe0),
    Color32::from_rgb(0xc7, 0xe9, 0xc0),
    Color32::from_rgb(0xa1, 0xd9, 0x9b),
    Color32::from_rgb(0x74, 0xc4, 0x76),
    Color32::from_rgb(0x41, 0xab, 0x5d),
    Color32::from_rgb(0x23, 0x8b, 0x45),
    Color32::from_rgb(0x00, 0x6d, 0x2c),
    Color32::from_rgb(0x00, 0x44, 0x1b),
];

pub fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)).round() as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)).round() as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)).round() as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)).round() as u8,
    )
}

/// Piecewise-linear color ramp over `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    stops: Vec<Color32>,
}

impl Gradient {
    pub fn new(stops: Vec<Color32>) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::InvalidConfig {
                option: "colorPalette",
                reason: "a gradient needs at least one stop".to_owned(),
            });
        }
        Ok(Self { stops })
    }

    pub fn red_yellow_blue() -> Self {
        Self {
            stops: RED_YELLOW_BLUE.to_vec(),
        }
    }

    pub fn greens() -> Self {
        Self {
            stops: GREENS.to_vec(),
        }
    }

    pub fn sample(&self, t: f64) -> Color32 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
        let last = self.stops.len() - 1;
        if last == 0 {
            return self.stops[0];
        }

        let position = t * last as f64;
        let index = (position.floor() as usize).min(last - 1);
        let fraction = (position - index as f64) as f32;
        blend_color(self.stops[index], self.stops[index + 1], fraction)
    }

    /// `count` evenly spaced colors from the ramp, light to dark for the
    /// sequential ramps. A single color is taken from the middle.
    pub fn scheme(&self, count: usize) -> Vec<Color32> {
        match count {
            0 => Vec::new(),
            1 => vec![self.sample(0.5)],
            _ => (0..count)
                .map(|index| self.sample(index as f64 / (count - 1) as f64))
                .collect(),
        }
    }
}

/// Parses `#rrggbb` / `#rrggbbaa` palette entries from configuration.
pub fn parse_palette(entries: &[String]) -> Result<Vec<Color32>> {
    entries
        .iter()
        .map(|entry| {
            Color32::from_hex(entry.trim()).map_err(|error| Error::InvalidConfig {
                option: "colorPalette",
                reason: format!("`{entry}` is not a hex color ({error:?})"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints_are_first_and_last_stops() {
        let ramp = Gradient::greens();
        assert_eq!(ramp.sample(0.0), GREENS[0]);
        assert_eq!(ramp.sample(1.0), GREENS[8]);
        assert_eq!(ramp.sample(-3.0), GREENS[0]);
        assert_eq!(ramp.sample(f64::NAN), ramp.sample(0.5));
    }

    #[test]
    fn scheme_is_light_to_dark() {
        let colors = Gradient::greens().scheme(7);
        assert_eq!(colors.len(), 7);
        let lightness: Vec<u32> = colors
            .iter()
            .map(|c| c.r() as u32 + c.g() as u32 + c.b() as u32)
            .collect();
        assert!(lightness.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn palette_entries_parse_from_hex() {
        let parsed = parse_palette(&["#1f77b4".to_owned(), "#ff7f0e".to_owned()]).unwrap();
        assert_eq!(parsed, vec![CATEGORY10[0], CATEGORY10[1]]);
        assert!(parse_palette(&["teal".to_owned()]).is_err());
    }

    #[test]
    fn blend_midpoint() {
        let mid = blend_color(Color32::BLACK, Color32::WHITE, 0.5);
        assert_eq!(mid, Color32::from_rgb(128, 128, 128));
    }
}
