use std::fs;

use camino::Utf8Path;

use crate::artifact::DistanceArtifact;
use crate::error::EbdError;
use crate::ordination::{Ordination, principal_coordinates};

const PANEL_WIDTH: f64 = 360.0;
const PANEL_HEIGHT: f64 = 320.0;
const MARGIN: f64 = 44.0;

pub fn plot(artifacts: &[DistanceArtifact], output: &Utf8Path) -> Result<Vec<String>, EbdError> {
    if artifacts.is_empty() {
        return Err(EbdError::Ordination(
            "no distance matrices to plot".to_string(),
        ));
    }

    let reference_ids = &artifacts[0].ids;
    for artifact in &artifacts[1..] {
        if artifact.ids != *reference_ids {
            return Err(EbdError::SampleOrderMismatch);
        }
    }

    let mut labels = Vec::with_capacity(artifacts.len());
    let mut panels = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let matrix = artifact.matrix()?;
        let ordination = principal_coordinates(&matrix)?;
        let label = artifact.provenance.label();
        panels.push(render_panel(&label, &ordination));
        labels.push(label);
    }

    let html = render_document(&panels);
    fs::write(output, html)
        .map_err(|err| EbdError::Filesystem(format!("write plot {}: {err}", output)))?;
    tracing::info!(path = %output, panels = labels.len(), "wrote ordination plot");
    Ok(labels)
}

fn render_panel(label: &str, ordination: &Ordination) -> String {
    let (x_range, y_range) = axis_ranges(ordination);
    let plot_w = PANEL_WIDTH - 2.0 * MARGIN;
    let plot_h = PANEL_HEIGHT - 2.0 * MARGIN;

    let mut points = String::new();
    for (id, point) in ordination.ids.iter().zip(&ordination.coords) {
        let px = MARGIN + (point[0] - x_range.0) / (x_range.1 - x_range.0) * plot_w;
        let py = MARGIN + (1.0 - (point[1] - y_range.0) / (y_range.1 - y_range.0)) * plot_h;
        points.push_str(&format!(
            "      <circle cx=\"{px:.2}\" cy=\"{py:.2}\" r=\"4\"><title>{}</title></circle>\n",
            escape(id)
        ));
    }

    let x_label = format!("PCo1 ({:.1}%)", ordination.proportions[0] * 100.0);
    let y_label = format!("PCo2 ({:.1}%)", ordination.proportions[1] * 100.0);
    let x_label_y = PANEL_HEIGHT - 12.0;
    let y_label_y = PANEL_HEIGHT / 2.0;

    format!(
        "  <figure class=\"panel\">\n    <figcaption>{}</figcaption>\n    <svg viewBox=\"0 0 {PANEL_WIDTH} {PANEL_HEIGHT}\" width=\"{PANEL_WIDTH}\" height=\"{PANEL_HEIGHT}\">\n      <rect class=\"frame\" x=\"{MARGIN}\" y=\"{MARGIN}\" width=\"{plot_w}\" height=\"{plot_h}\"/>\n{points}      <text class=\"axis\" x=\"{}\" y=\"{x_label_y}\" text-anchor=\"middle\">{x_label}</text>\n      <text class=\"axis\" x=\"14\" y=\"{y_label_y}\" text-anchor=\"middle\" transform=\"rotate(-90 14 {y_label_y})\">{y_label}</text>\n    </svg>\n  </figure>\n",
        escape(label),
        PANEL_WIDTH / 2.0,
    )
}

fn render_document(panels: &[String]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Beta diversity ordination</title>\n<style>\nbody { font-family: sans-serif; margin: 1.5em; }\n.panels { display: flex; flex-wrap: wrap; gap: 1em; }\n.panel { margin: 0; }\n.panel figcaption { text-align: center; font-weight: bold; margin-bottom: 0.3em; }\n.panel svg .frame { fill: none; stroke: #888; }\n.panel svg circle { fill: #2a6fdb; opacity: 0.75; }\n.panel svg circle:hover { opacity: 1; }\n.panel svg .axis { font-size: 11px; fill: #444; }\n</style>\n</head>\n<body>\n<h1>Beta diversity ordination</h1>\n<div class=\"panels\">\n",
    );
    for panel in panels {
        html.push_str(panel);
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn axis_ranges(ordination: &Ordination) -> ((f64, f64), (f64, f64)) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for point in &ordination.coords {
        x_min = x_min.min(point[0]);
        x_max = x_max.max(point[0]);
        y_min = y_min.min(point[1]);
        y_max = y_max.max(point[1]);
    }
    (pad_range(x_min, x_max), pad_range(y_min, y_max))
}

fn pad_range(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span <= f64::EPSILON {
        return (min - 0.5, max + 0.5);
    }
    (min - span * 0.1, max + span * 0.1)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
