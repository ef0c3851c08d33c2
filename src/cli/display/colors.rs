//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub error: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            error: TableColor::Red,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Get color for a readiness result; `None` means the query failed
    pub fn readiness_color(&self, up: Option<bool>) -> TableColor {
        match up {
            Some(true) => self.success,
            Some(false) => self.warning,
            None => self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme() {
        let theme = ColorTheme::default();
        assert_eq!(theme.success, TableColor::Green);
        assert_eq!(theme.warning, TableColor::Yellow);
        assert_eq!(theme.error, TableColor::Red);
    }

    #[test]
    fn test_readiness_color() {
        let theme = ColorTheme::default();
        assert_eq!(theme.readiness_color(Some(true)), TableColor::Green);
        assert_eq!(theme.readiness_color(Some(false)), TableColor::Yellow);
        assert_eq!(theme.readiness_color(None), TableColor::Red);
    }
}
