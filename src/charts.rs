// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

//! Trend charts for the subject statement against the industry average:
//! revenue line, gross profit bars, and per-metric trend lines, rendered as
//! SVG into the output directory.

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::benchmark::benchmark_value;
use crate::pipeline::AnalysisRun;
use crate::statement::Statement;

const COLOR_BLUE: RGBColor = RGBColor(59, 130, 246);
const COLOR_EMERALD: RGBColor = RGBColor(16, 185, 129);
const COLOR_ROSE: RGBColor = RGBColor(244, 63, 94);

/// Generate the standard chart set for a run. Charts whose inputs are
/// unavailable are skipped with a notice, never an error.
pub fn generate_all_charts(run: &AnalysisRun, output_dir: &str) -> Result<Vec<String>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let revenue_benchmark = mean_peer_line_item(&run.peers, "Total Income");
    match line_item_trend_chart(
        &run.subject,
        "Total Income",
        "Revenue Trend",
        revenue_benchmark,
        &format!("{}/revenue_trend.svg", output_dir),
    ) {
        Ok(path) => written.push(path),
        Err(e) => eprintln!("⚠️  Skipping revenue chart: {}", e),
    }

    let gp_benchmark = mean_peer_line_item(&run.peers, "Gross Profit");
    match bar_chart(
        &run.subject,
        "Gross Profit",
        "Gross Profit by Period",
        gp_benchmark,
        &format!("{}/gross_profit.svg", output_dir),
    ) {
        Ok(path) => written.push(path),
        Err(e) => eprintln!("⚠️  Skipping gross profit chart: {}", e),
    }

    match metric_trend_chart(run, "Gross Margin", &format!("{}/gross_margin.svg", output_dir)) {
        Ok(path) => written.push(path),
        Err(e) => eprintln!("⚠️  Skipping gross margin chart: {}", e),
    }

    Ok(written)
}

// The benchmark aggregator works on derived metrics; the raw line-item
// average for the revenue/profit charts comes straight from the peer
// statements instead. Mean over every available (peer, period) value.
fn mean_peer_line_item(peers: &[Statement], item: &str) -> Option<f64> {
    let values: Vec<f64> = peers
        .iter()
        .filter_map(|peer| peer.series(item))
        .flat_map(|series| series.iter().copied().flatten())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Line chart of one line item across periods, with an optional horizontal
/// industry-average line.
pub fn line_item_trend_chart(
    stmt: &Statement,
    item: &str,
    title: &str,
    benchmark: Option<f64>,
    output_path: &str,
) -> Result<String> {
    let points = available_points(stmt, item)
        .with_context(|| format!("No data for line item '{}'", item))?;

    let periods = stmt.periods().to_vec();
    let (y_min, y_max) = value_range(&points, benchmark);
    let x_max = (periods.len().saturating_sub(1)).max(1) as f64;

    let root = SVGBackend::new(output_path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 32).into_font().color(&BLACK))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Period")
        .y_desc(item)
        .x_labels(periods.len().min(12))
        .x_label_formatter(&|x| period_label(&periods, *x))
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(i, v)| (i as f64, v)),
            COLOR_BLUE.stroke_width(3),
        ))?
        .label(item)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COLOR_BLUE));

    chart.draw_series(
        points
            .iter()
            .map(|&(i, v)| Circle::new((i as f64, v), 4, COLOR_BLUE.filled())),
    )?;

    if let Some(bench) = benchmark {
        chart
            .draw_series(DashedLineSeries::new(
                [(0.0, bench), (x_max, bench)],
                8,
                4,
                COLOR_ROSE.stroke_width(2),
            ))?
            .label("Industry Average")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COLOR_ROSE));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    println!("✅ Chart written to {}", output_path);

    Ok(output_path.to_string())
}

/// Bar chart of one line item across periods, with an optional horizontal
/// industry-average line.
pub fn bar_chart(
    stmt: &Statement,
    item: &str,
    title: &str,
    benchmark: Option<f64>,
    output_path: &str,
) -> Result<String> {
    let points = available_points(stmt, item)
        .with_context(|| format!("No data for line item '{}'", item))?;

    let periods = stmt.periods().to_vec();
    let (y_min, y_max) = value_range(&points, benchmark);
    let y_floor = y_min.min(0.0);
    let x_max = periods.len() as f64;

    let root = SVGBackend::new(output_path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 32).into_font().color(&BLACK))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..x_max, y_floor..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Period")
        .y_desc(item)
        .x_labels(periods.len().min(12))
        .x_label_formatter(&|x| period_label(&periods, *x))
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    chart.draw_series(points.iter().map(|&(i, v)| {
        Rectangle::new(
            [(i as f64 - 0.35, 0.0), (i as f64 + 0.35, v)],
            COLOR_EMERALD.filled(),
        )
    }))?;

    if let Some(bench) = benchmark {
        chart.draw_series(DashedLineSeries::new(
            [(-0.5, bench), (x_max, bench)],
            8,
            4,
            COLOR_ROSE.stroke_width(2),
        ))?;
    }

    root.present()?;
    println!("✅ Chart written to {}", output_path);

    Ok(output_path.to_string())
}

/// Trend line of one derived metric vs its industry-average benchmark.
pub fn metric_trend_chart(run: &AnalysisRun, metric: &str, output_path: &str) -> Result<String> {
    let series = run
        .subject_metrics
        .get(metric)
        .with_context(|| format!("Unknown metric '{}'", metric))?;

    let points: Vec<(usize, f64)> = series
        .values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    if points.is_empty() {
        anyhow::bail!("Metric '{}' is unavailable at every period", metric);
    }

    let benchmark = benchmark_value(&run.benchmarks, metric).and_then(|b| b.value);
    let periods = run.subject_metrics.periods.clone();
    let (y_min, y_max) = value_range(&points, benchmark);
    let x_max = (periods.len().saturating_sub(1)).max(1) as f64;

    let root = SVGBackend::new(output_path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} vs Industry Average", metric),
            ("sans-serif", 32).into_font().color(&BLACK),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Period")
        .y_desc(metric)
        .x_labels(periods.len().min(12))
        .x_label_formatter(&|x| period_label(&periods, *x))
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            points.iter().map(|&(i, v)| (i as f64, v)),
            COLOR_BLUE.stroke_width(3),
        ))?
        .label(metric)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COLOR_BLUE));

    if let Some(bench) = benchmark {
        chart
            .draw_series(DashedLineSeries::new(
                [(0.0, bench), (x_max, bench)],
                8,
                4,
                COLOR_ROSE.stroke_width(2),
            ))?
            .label("Industry Average")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COLOR_ROSE));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    println!("✅ Chart written to {}", output_path);

    Ok(output_path.to_string())
}

fn available_points(stmt: &Statement, item: &str) -> Option<Vec<(usize, f64)>> {
    let series = stmt.series(item)?;
    let points: Vec<(usize, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    if points.is_empty() {
        None
    } else {
        Some(points)
    }
}

fn value_range(points: &[(usize, f64)], benchmark: Option<f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &(_, v) in points {
        min = min.min(v);
        max = max.max(v);
    }
    if let Some(b) = benchmark {
        min = min.min(b);
        max = max.max(b);
    }
    // Pad so the series never hugs the frame; handle flat series.
    let pad = ((max - min).abs() * 0.1).max(1.0);
    (min - pad, max + pad)
}

fn period_label(periods: &[String], x: f64) -> String {
    let idx = x.round() as usize;
    if (x - idx as f64).abs() > 0.01 {
        return String::new();
    }
    periods.get(idx).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Statement;
    use tempfile::TempDir;

    fn stmt(csv: &str) -> Statement {
        Statement::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_revenue_trend_chart_writes_svg() {
        let dir = TempDir::new().unwrap();
        let s = stmt("Name,Q1,Q2,Q3\nTotal Income,100,120,150\n");
        let path = dir.path().join("trend.svg");

        let written = line_item_trend_chart(
            &s,
            "Total Income",
            "Revenue Trend",
            Some(110.0),
            path.to_str().unwrap(),
        )
        .unwrap();

        let svg = std::fs::read_to_string(written).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_bar_chart_writes_svg() {
        let dir = TempDir::new().unwrap();
        let s = stmt("Name,Q1,Q2\nGross Profit,40,50\n");
        let path = dir.path().join("bars.svg");

        bar_chart(&s, "Gross Profit", "Gross Profit", None, path.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_missing_line_item_is_an_error_not_a_panic() {
        let dir = TempDir::new().unwrap();
        let s = stmt("Name,Q1\nSomething Else,5\n");
        let path = dir.path().join("trend.svg");

        let result =
            line_item_trend_chart(&s, "Total Income", "Revenue", None, path.to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_mean_peer_line_item_skips_unavailable() {
        let peers = vec![
            stmt("Name,Q1,Q2\nTotal Income,100,\n"),
            stmt("Name,Q1\nTotal Income,200\n"),
            stmt("Name,Q1\nSomething Else,5\n"),
        ];
        assert_eq!(mean_peer_line_item(&peers, "Total Income"), Some(150.0));
        assert_eq!(mean_peer_line_item(&peers, "Net Profit"), None);
    }

    #[test]
    fn test_value_range_pads_flat_series() {
        let (min, max) = value_range(&[(0, 100.0), (1, 100.0)], None);
        assert!(min < 100.0);
        assert!(max > 100.0);
    }
}
