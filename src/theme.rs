//! Color themes for the scatter plot.

use egui::Color32;

use crate::bands::SeverityBand;

/// Which built-in theme to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
}

impl ThemeChoice {
    pub fn theme(&self) -> ScatterTheme {
        match self {
            ThemeChoice::Dark => ScatterTheme::dark(),
            ThemeChoice::Light => ScatterTheme::light(),
        }
    }
}

/// Resolved colors for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterTheme {
    pub background: Color32,
    pub plot_background: Color32,
    pub grid: Color32,
    pub axis_text: Color32,
    pub warning: Color32,
    pub high: Color32,
    pub normal: Color32,
    pub low: Color32,
    pub selection_fill: Color32,
    pub selection_border: Color32,
    pub hover_ring: Color32,
    pub status_text: Color32,
    pub error_text: Color32,
}

impl ScatterTheme {
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(24, 26, 30),
            plot_background: Color32::from_rgb(30, 33, 38),
            grid: Color32::from_rgb(58, 62, 70),
            axis_text: Color32::from_rgb(170, 175, 185),
            warning: Color32::from_rgb(231, 76, 60),
            high: Color32::from_rgb(255, 160, 54),
            normal: Color32::from_rgb(77, 144, 254),
            low: Color32::from_rgb(92, 184, 92),
            selection_fill: Color32::from_rgb(77, 144, 254),
            selection_border: Color32::from_rgb(140, 180, 255),
            hover_ring: Color32::from_rgb(240, 240, 240),
            status_text: Color32::from_rgb(150, 155, 165),
            error_text: Color32::from_rgb(235, 110, 100),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(250, 250, 250),
            plot_background: Color32::WHITE,
            grid: Color32::from_rgb(220, 222, 226),
            axis_text: Color32::from_rgb(95, 100, 110),
            warning: Color32::from_rgb(205, 52, 38),
            high: Color32::from_rgb(235, 130, 20),
            normal: Color32::from_rgb(50, 110, 220),
            low: Color32::from_rgb(60, 150, 60),
            selection_fill: Color32::from_rgb(50, 110, 220),
            selection_border: Color32::from_rgb(40, 90, 190),
            hover_ring: Color32::from_rgb(40, 40, 40),
            status_text: Color32::from_rgb(120, 125, 135),
            error_text: Color32::from_rgb(190, 55, 45),
        }
    }

    /// Marker color for a severity band.
    pub fn band_color(&self, band: SeverityBand) -> Color32 {
        match band {
            SeverityBand::Warning => self.warning,
            SeverityBand::High => self.high,
            SeverityBand::Normal => self.normal,
            SeverityBand::Low => self.low,
        }
    }
}
