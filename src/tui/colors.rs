//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

/// High priority accent
pub const PRIORITY_RED: Color = Color::Rgb(245, 0, 62);
/// Medium priority accent
pub const PRIORITY_AMBER: Color = Color::Rgb(243, 198, 0);
/// Low priority accent
pub const PRIORITY_GREEN: Color = Color::Rgb(0, 168, 55);
/// Delete confirmation background
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Status bar and header background
pub const SLATE: Color = Color::Rgb(40, 48, 64);

pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::High => PRIORITY_RED,
        Priority::Medium => PRIORITY_AMBER,
        Priority::Low => PRIORITY_GREEN,
    }
}
