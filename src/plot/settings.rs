//! Shared figure styling: sizes, fonts and colors.

use plotters::style::RGBColor;

/// Conversion factor from centimetres to inches.
pub const CM_TO_INCHES: f64 = 0.393_700_79;

/// Raster resolution of the rendered figures.
pub const DPI: f64 = 150.0;

/// Convert a centimetre length to backend pixels.
pub fn cm(length: f64) -> u32 {
    (length * CM_TO_INCHES * DPI).round() as u32
}

/// 9 x 6 cm, the footprint of a single-column figure.
pub fn small_figure() -> (u32, u32) {
    (cm(9.0), cm(6.0))
}

/// 11 x 11 cm.
pub fn medium_figure() -> (u32, u32) {
    (cm(11.0), cm(11.0))
}

/// 18 x 22 cm, the footprint of a full-page figure.
pub fn large_figure() -> (u32, u32) {
    (cm(18.0), cm(22.0))
}

/// Categorical palette shared by all figures (the seaborn "deep" colors).
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
    RGBColor(218, 139, 195),
    RGBColor(140, 140, 140),
    RGBColor(204, 185, 116),
    RGBColor(100, 181, 205),
];

/// Color of series `index`, cycling through the palette.
pub fn palette(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Raster color of excitatory populations (navy).
pub const EXCITATORY: RGBColor = RGBColor(0, 0, 128);
/// Raster color of inhibitory populations (firebrick).
pub const INHIBITORY: RGBColor = RGBColor(178, 34, 34);

/// Font sizes for one rendering context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotContext {
    pub label_size: u32,
    pub title_size: u32,
}

impl PlotContext {
    /// Compact fonts for print figures.
    pub fn paper() -> Self {
        PlotContext {
            label_size: 14,
            title_size: 16,
        }
    }

    /// Larger fonts for slides.
    pub fn presentation() -> Self {
        PlotContext {
            label_size: 22,
            title_size: 26,
        }
    }

    /// Pick a context from a presentation flag.
    pub fn new(presentation: bool) -> Self {
        if presentation {
            Self::presentation()
        } else {
            Self::paper()
        }
    }
}

impl Default for PlotContext {
    fn default() -> Self {
        Self::paper()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cm_conversion() {
        // 1 inch is 2.54 cm, so 2.54 cm maps to DPI pixels
        assert_eq!(cm(2.54), DPI as u32);
        assert!(large_figure().0 > medium_figure().0);
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette(0), palette(PALETTE.len()));
    }
}
