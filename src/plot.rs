//! Hand-rolled SVG chart writers. No plotting crate appears in the
//! dependency stack this crate draws from, so charts fall back to the same
//! bare-SVG rendering the source this spec was distilled from used when no
//! plotting library was present; faithful reproduction of axes is not
//! required, only a readable bar/line rendering per metric.

use std::path::Path;

use crate::error::Result;
use crate::report::{GeneralizationRecord, PolicyRecord};

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 420.0;
const MARGIN: f64 = 50.0;

fn bar_chart(labels: &[String], values: &[f64], title: &str) -> String {
    let max_v = values.iter().cloned().fold(f64::MIN, f64::max).max(1.0);
    let n = values.len().max(1) as f64;
    let bar_w = (WIDTH - 2.0 * MARGIN) / n * 0.7;
    let gap = (WIDTH - 2.0 * MARGIN) / n * 0.3;

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\">\n"
    ));
    out.push_str(&format!(
        "<text x=\"{}\" y=\"25\" text-anchor=\"middle\" font-size=\"16\">{title}</text>\n",
        WIDTH / 2.0
    ));
    out.push_str(&format!(
        "<line x1=\"{MARGIN}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\"/>\n",
        HEIGHT - MARGIN,
        WIDTH - MARGIN,
        HEIGHT - MARGIN
    ));
    out.push_str(&format!(
        "<line x1=\"{MARGIN}\" y1=\"{MARGIN}\" x2=\"{MARGIN}\" y2=\"{}\" stroke=\"black\"/>\n",
        HEIGHT - MARGIN
    ));

    let mut x = MARGIN + gap / 2.0;
    for (label, value) in labels.iter().zip(values.iter()) {
        let bh = if max_v == 0.0 { 0.0 } else { (value / max_v) * (HEIGHT - 2.0 * MARGIN) };
        let y = HEIGHT - MARGIN - bh;
        out.push_str(&format!(
            "<rect x=\"{x}\" y=\"{y}\" width=\"{bar_w}\" height=\"{bh}\" fill=\"#4682B4\"/>\n"
        ));
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\">{label}</text>\n",
            x + bar_w / 2.0,
            HEIGHT - MARGIN + 16.0
        ));
        out.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"9\">{value:.1}</text>\n",
            x + bar_w / 2.0,
            (y - 4.0).max(14.0)
        ));
        x += bar_w + gap;
    }
    out.push_str("</svg>\n");
    out
}

fn line_chart(labels: &[String], values: &[f64], title: &str) -> String {
    let max_v = values.iter().cloned().fold(f64::MIN, f64::max);
    let min_v = values.iter().cloned().fold(f64::MAX, f64::min);
    let span = (max_v - min_v).max(1e-9);
    let step = (WIDTH - 2.0 * MARGIN) / (values.len().max(2) - 1) as f64;
    let y_of = |v: f64| HEIGHT - MARGIN - ((v - min_v) / span) * (HEIGHT - 2.0 * MARGIN);

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\">\n"
    ));
    out.push_str(&format!(
        "<text x=\"{}\" y=\"25\" text-anchor=\"middle\" font-size=\"16\">{title}</text>\n",
        WIDTH / 2.0
    ));
    out.push_str(&format!(
        "<line x1=\"{MARGIN}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\"/>\n",
        HEIGHT - MARGIN,
        WIDTH - MARGIN,
        HEIGHT - MARGIN
    ));
    out.push_str(&format!(
        "<line x1=\"{MARGIN}\" y1=\"{MARGIN}\" x2=\"{MARGIN}\" y2=\"{}\" stroke=\"black\"/>\n",
        HEIGHT - MARGIN
    ));

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (MARGIN + i as f64 * step, y_of(v)))
        .collect();
    if !points.is_empty() {
        let poly = points
            .iter()
            .map(|(x, y)| format!("{x},{y}"))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!(
            "<polyline points=\"{poly}\" fill=\"none\" stroke=\"#d2691e\" stroke-width=\"2\"/>\n"
        ));
    }
    for ((x, y), (label, value)) in points.iter().zip(labels.iter().zip(values.iter())) {
        out.push_str(&format!("<circle cx=\"{x}\" cy=\"{y}\" r=\"4\" fill=\"#d2691e\"/>\n"));
        out.push_str(&format!(
            "<text x=\"{x}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\">{label}</text>\n",
            HEIGHT - MARGIN + 16.0
        ));
        out.push_str(&format!(
            "<text x=\"{x}\" y=\"{}\" text-anchor=\"middle\" font-size=\"9\">{value:.1}</text>\n",
            (y - 6.0).max(14.0)
        ));
    }
    out.push_str("</svg>\n");
    out
}

/// One bar chart per metric (`policy_<metric>.svg`).
pub fn policy_metric_charts(results: &[PolicyRecord], out_dir: &Path) -> Result<()> {
    let names: Vec<String> = results.iter().map(|r| r.policy.clone()).collect();
    let metrics: [(&str, fn(&PolicyRecord) -> f64); 5] = [
        ("makespan", |r| r.makespan),
        ("total_tardiness", |r| r.total_tardiness),
        ("total_energy", |r| r.total_energy),
        ("avg_wip", |r| r.avg_wip),
        ("objective", |r| r.objective),
    ];
    for (metric, get) in metrics {
        let values: Vec<f64> = results.iter().map(get).collect();
        let svg = bar_chart(&names, &values, &format!("Policy Comparison: {metric}"));
        std::fs::write(out_dir.join(format!("policy_{metric}.svg")), svg)?;
    }
    Ok(())
}

/// `ablation_objective.svg`.
pub fn ablation_chart(ablation: &[PolicyRecord], out_dir: &Path) -> Result<()> {
    let labels: Vec<String> = ablation.iter().map(|r| r.policy.clone()).collect();
    let values: Vec<f64> = ablation.iter().map(|r| r.objective).collect();
    let svg = bar_chart(&labels, &values, "Ablation: objective");
    std::fs::write(out_dir.join("ablation_objective.svg"), svg)?;
    Ok(())
}

/// `generalization_gap.svg`.
pub fn generalization_chart(record: &GeneralizationRecord, out_dir: &Path) -> Result<()> {
    let labels = vec![
        "in_distribution".to_string(),
        "cross_scale".to_string(),
        "ood_breakdown".to_string(),
    ];
    let values = vec![
        record.in_distribution.objective,
        record.cross_scale.objective,
        record.ood_breakdown.objective,
    ];
    let svg = line_chart(&labels, &values, "Generalization Gap (objective)");
    std::fs::write(out_dir.join("generalization_gap.svg"), svg)?;
    Ok(())
}
