//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Cluster reports nodes
    pub const SUCCESS: &'static str = "✓";

    /// Cluster reachable but has no nodes
    pub const WARNING: &'static str = "⚠";

    /// Readiness query failed
    pub const ERROR: &'static str = "✗";

    /// Icon for a readiness result; `None` means the query failed
    pub fn readiness_icon(up: Option<bool>) -> &'static str {
        match up {
            Some(true) => Self::SUCCESS,
            Some(false) => Self::WARNING,
            None => Self::ERROR,
        }
    }

    pub fn readiness_text(up: Option<bool>) -> &'static str {
        match up {
            Some(true) => "Up",
            Some(false) => "Down",
            None => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_icon() {
        assert_eq!(StatusIcon::readiness_icon(Some(true)), StatusIcon::SUCCESS);
        assert_eq!(StatusIcon::readiness_icon(Some(false)), StatusIcon::WARNING);
        assert_eq!(StatusIcon::readiness_icon(None), StatusIcon::ERROR);
    }

    #[test]
    fn test_readiness_text() {
        assert_eq!(StatusIcon::readiness_text(Some(true)), "Up");
        assert_eq!(StatusIcon::readiness_text(Some(false)), "Down");
        assert_eq!(StatusIcon::readiness_text(None), "Unknown");
    }
}
