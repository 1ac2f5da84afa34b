//! Console output icons and styled text helpers.

use console::{style, StyledObject};

use crate::models::AnnotationMode;

/// Success checkmark icon (green ✓).
pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

/// Warning icon (yellow !).
pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

/// Dim arrow for secondary info.
pub fn dim_arrow() -> StyledObject<&'static str> {
    style("→").dim()
}

/// Bullet point.
pub fn bullet() -> StyledObject<&'static str> {
    style("•").dim()
}

/// Badge marking synthetic output. Empty in live mode.
pub fn mode_badge(mode: AnnotationMode) -> String {
    if mode.is_mock() {
        style("(mock)").yellow().bold().to_string()
    } else {
        String::new()
    }
}
