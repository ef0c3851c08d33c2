//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use chrono::{DateTime, Local};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Readiness snapshot of one deployer
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub deployer: String,
    pub cluster: String,
    /// Kubeconfig path, or why it could not be resolved
    pub kubeconfig: Result<String, String>,
    /// Readiness, or the error the query returned
    pub up: Result<bool, String>,
    pub checked_at: DateTime<Local>,
}

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    pub fn render_status(&self, report: &StatusReport) -> String {
        let up = report.up.as_ref().ok().copied();

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("DEPLOYER").set_alignment(CellAlignment::Left),
                Cell::new("CLUSTER").set_alignment(CellAlignment::Left),
                Cell::new("KUBECONFIG").set_alignment(CellAlignment::Left),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
            ]);

        let kubeconfig = match &report.kubeconfig {
            Ok(path) => Cell::new(path),
            Err(_) => Cell::new("-").fg(self.theme.muted),
        };

        table.add_row(vec![
            Cell::new(&report.deployer).fg(self.theme.info),
            Cell::new(&report.cluster),
            kubeconfig,
            Cell::new(format!(
                "{} {}",
                StatusIcon::readiness_icon(up),
                StatusIcon::readiness_text(up)
            ))
            .fg(self.theme.readiness_color(up)),
        ]);

        let mut output = String::new();
        output.push_str(&table.to_string());
        output.push('\n');
        if let Err(e) = &report.kubeconfig {
            output.push_str(&format!("{} kubeconfig: {}\n", StatusIcon::ERROR.red(), e));
        }
        if let Err(e) = &report.up {
            output.push_str(&format!("{} readiness: {}\n", StatusIcon::ERROR.red(), e));
        }
        output.push_str(&format!(
            "{}\n",
            format!("Checked at {}", report.checked_at.format("%Y-%m-%d %H:%M:%S"))
                .bright_black()
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(up: Result<bool, String>) -> StatusReport {
        StatusReport {
            deployer: "kind".to_string(),
            cluster: "kind-kubetest2".to_string(),
            kubeconfig: Ok("/home/ci/.kube/config".to_string()),
            up,
            checked_at: Local::now(),
        }
    }

    #[test]
    fn test_render_up_cluster() {
        let output = TableRenderer::new().render_status(&report(Ok(true)));
        assert!(output.contains("kind-kubetest2"));
        assert!(output.contains("/home/ci/.kube/config"));
        assert!(output.contains("Up"));
        assert!(output.contains("Checked at"));
    }

    #[test]
    fn test_render_failed_query_lists_error() {
        let output = TableRenderer::new()
            .render_status(&report(Err("connection refused".to_string())));
        assert!(output.contains("Unknown"));
        assert!(output.contains("connection refused"));
    }

    #[test]
    fn test_render_missing_kubeconfig() {
        let mut status = report(Ok(false));
        status.kubeconfig = Err("workload cluster not found".to_string());
        let output = TableRenderer::new().render_status(&status);
        assert!(output.contains("Down"));
        assert!(output.contains("workload cluster not found"));
    }
}
