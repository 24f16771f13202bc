//! Plain-text rendering for command output

use crate::history::RevisionRow;
use crate::models::{ClusterContext, Component, Release, readable_date};

const COLUMN_GAP: &str = "  ";
const EMPTY_CELL: &str = "-";

/// Left-aligned columns sized to their widest cell; no trailing whitespace
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_line = |cells: &[&str]| {
        let mut line = String::new();
        for (cell, width) in cells.iter().zip(&widths) {
            line.push_str(&format!("{:<width$}{}", cell, COLUMN_GAP, width = *width));
        }
        line.trim_end().to_string()
    };

    let mut lines = vec![render_line(headers)];
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(render_line(cells.as_slice()));
    }
    lines.join("\n")
}

/// `name-version` of the release's chart
pub fn chart_label(release: &Release) -> String {
    let metadata = &release.chart.metadata;
    match (metadata.name.is_empty(), metadata.version.is_empty()) {
        (true, _) => EMPTY_CELL.to_string(),
        (false, true) => metadata.name.clone(),
        (false, false) => format!("{}-{}", metadata.name, metadata.version),
    }
}

/// Release listing; `dev_ops_mode` adds the application version column
pub fn release_table(releases: &[Release], dev_ops_mode: bool) -> String {
    let mut headers = vec!["NAME", "NAMESPACE", "REVISION", "STATUS", "CHART"];
    if dev_ops_mode {
        headers.push("APP VERSION");
    }
    headers.push("UPDATED");

    let rows: Vec<Vec<String>> = releases
        .iter()
        .map(|release| {
            let mut row = vec![
                release.name.clone(),
                release.namespace.clone(),
                release.version.to_string(),
                release.info.status.to_string(),
                chart_label(release),
            ];
            if dev_ops_mode {
                row.push(
                    release
                        .chart
                        .metadata
                        .app_version
                        .clone()
                        .unwrap_or_else(|| EMPTY_CELL.to_string()),
                );
            }
            row.push(readable_date(&release.info.last_deployed));
            row
        })
        .collect();

    render_table(&headers, &rows)
}

/// Revision history rows, newest first as given
pub fn revision_table(rows: &[RevisionRow]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.version.to_string(),
                row.status.to_string(),
                row.last_deployed.clone(),
                row.action_label().to_string(),
            ]
        })
        .collect();

    render_table(&["REVISION", "STATUS", "DEPLOYED", "ACTION"], &rows)
}

pub fn component_table(components: &[Component]) -> String {
    let rows: Vec<Vec<String>> = components
        .iter()
        .map(|c| {
            vec![
                c.kind.clone(),
                c.name.clone(),
                if c.namespace.is_empty() {
                    EMPTY_CELL.to_string()
                } else {
                    c.namespace.clone()
                },
                c.relation_count().to_string(),
            ]
        })
        .collect();

    render_table(&["KIND", "NAME", "NAMESPACE", "RELATIONS"], &rows)
}

/// Cluster contexts; `*` marks `current`, or the kubeconfig selection when unset
pub fn context_table(contexts: &[ClusterContext], current: Option<&str>) -> String {
    let rows: Vec<Vec<String>> = contexts
        .iter()
        .map(|ctx| {
            let is_current = match current {
                Some(name) => ctx.name == name,
                None => ctx.selected,
            };
            vec![
                if is_current { "*" } else { "" }.to_string(),
                ctx.name.clone(),
                ctx.cluster.clone(),
                ctx.server.clone(),
            ]
        })
        .collect();

    render_table(&["CURRENT", "NAME", "CLUSTER", "SERVER"], &rows)
}

/// `Key: value` summary of one release
pub fn release_detail(release: &Release) -> String {
    let mut fields = vec![
        ("Name", release.name.clone()),
        ("Namespace", release.namespace.clone()),
        ("Revision", release.version.to_string()),
        ("Status", release.info.status.to_string()),
        ("Chart", chart_label(release)),
    ];
    if let Some(app_version) = &release.chart.metadata.app_version {
        fields.push(("App Version", app_version.clone()));
    }
    fields.push(("Last Deployed", readable_date(&release.info.last_deployed)));
    if !release.info.description.is_empty() {
        fields.push(("Description", release.info.description.clone()));
    }

    let key_width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
    fields
        .into_iter()
        .map(|(key, value)| format!("{:<key_width$} {}", format!("{key}:"), value))
        .collect::<Vec<_>>()
        .join("\n")
}
