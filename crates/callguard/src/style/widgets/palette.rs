//! Color palette.
//!
//! Soft indigo accents on a near-white background, with green and red
//! reserved for screening on/off and destructive actions.

use iced::Color;

/// Complete color palette for the application.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    // Primary brand colors
    pub primary: Color,
    pub primary_light: Color,
    pub primary_dark: Color,

    // Surface colors
    pub surface: Color,
    pub surface_sunken: Color,
    pub background: Color,

    // Text colors
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub text_on_primary: Color,

    // Accent colors
    pub accent_green: Color,
    pub accent_red: Color,
    pub accent_amber: Color,

    // Tinted panels (summary, transcript, notices)
    pub tint_amber: Color,
    pub tint_green: Color,
    pub tint_red: Color,
    pub tint_indigo: Color,

    // State colors
    pub selected: Color,
    pub hover: Color,

    // Border colors
    pub border_subtle: Color,
    pub border_medium: Color,

    // Shadow and overlay
    pub shadow: Color,
    pub shadow_medium: Color,
    pub overlay: Color,
}

impl Palette {
    /// Creates the light palette.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            primary: Color::from_rgb(0.35, 0.40, 0.85), // #5a67d8
            primary_light: Color::from_rgb(0.50, 0.55, 0.92),
            primary_dark: Color::from_rgb(0.30, 0.32, 0.75),

            surface: Color::WHITE,
            surface_sunken: Color::from_rgb(0.97, 0.975, 0.99),
            background: Color::from_rgb(0.98, 0.98, 0.98), // #fafafa

            text_primary: Color::from_rgb(0.18, 0.22, 0.28), // #2d3748
            text_secondary: Color::from_rgb(0.44, 0.50, 0.59), // #718096
            text_muted: Color::from_rgb(0.63, 0.68, 0.75),   // #a0aec0
            text_on_primary: Color::WHITE,

            accent_green: Color::from_rgb(0.28, 0.73, 0.47), // #48bb78
            accent_red: Color::from_rgb(0.90, 0.24, 0.24),   // #e53e3e
            accent_amber: Color::from_rgb(0.45, 0.26, 0.06), // #744210

            tint_amber: Color::from_rgb(1.0, 0.98, 0.92),
            tint_green: Color::from_rgb(0.90, 1.0, 0.98),
            tint_red: Color::from_rgb(1.0, 0.96, 0.96),
            tint_indigo: Color::from_rgb(0.92, 0.96, 1.0),

            selected: Color::from_rgb(0.92, 0.93, 0.99),
            hover: Color::from_rgb(0.96, 0.97, 0.99),

            border_subtle: Color::from_rgb(0.91, 0.92, 0.94),
            border_medium: Color::from_rgb(0.80, 0.84, 0.88), // #cbd5e0

            shadow: Color::from_rgba(0.0, 0.0, 0.0, 0.06),
            shadow_medium: Color::from_rgba(0.0, 0.0, 0.0, 0.10),
            overlay: Color::from_rgba(0.0, 0.0, 0.0, 0.5),
        }
    }
}

/// The active palette.
#[must_use]
pub const fn current() -> Palette {
    Palette::light()
}
