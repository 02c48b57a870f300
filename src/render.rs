use std::path::Path;

use plotters::prelude::*;

use crate::error::{Error, Result};
use crate::results::{Campaign, write_atomic};

/// Width of a whole group of bars on the category axis, in category units.
const GROUP_WIDTH: f64 = 0.8;
const CHART_SIZE: (u32, u32) = (1024, 640);

fn render_err(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}

/// Horizontal span of bar `index` out of `count` in the group centred on `category`.
pub fn bar_span(category: usize, index: usize, count: usize) -> (f64, f64) {
    let width = GROUP_WIDTH / count as f64;
    let left = category as f64 - GROUP_WIDTH / 2.0 + index as f64 * width;
    (left, left + width)
}

/// Draw `campaign` as a grouped bar chart (one group per size, one bar per
/// algorithm) and write it to `path` as SVG.
///
/// The campaign is validated before anything is drawn, and the chart is
/// drawn in memory. `path` is only written once drawing has succeeded, and
/// then atomically.
pub fn render(campaign: &Campaign, title: &str, path: &Path) -> Result<()> {
    campaign.validate()?;
    let svg = draw_svg(campaign, title)?;
    write_atomic(path, svg.as_bytes()).map_err(render_err)?;
    tracing::info!(
        path = %path.display(),
        sizes = campaign.size_labels().len(),
        algorithms = campaign.runs.len(),
        "chart rendered"
    );
    Ok(())
}

/// Draw an already validated campaign into an SVG document.
fn draw_svg(campaign: &Campaign, title: &str) -> Result<String> {
    let sizes = campaign.size_labels();
    let categories = sizes.len();
    let algorithms = campaign.runs.len();
    let max_time = campaign
        .runs
        .iter()
        .flat_map(|r| r.perf_metrics.iter())
        .map(|m| m.execution_time_in_seconds)
        .fold(0.0_f64, f64::max);
    let y_max = if max_time > 0.0 { max_time * 1.15 } else { 1.0 };

    let mut svg = String::new();
    // The surface borrows `svg` and is released at the end of this block on
    // every path.
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(72)
            .build_cartesian_2d(-0.5_f64..(categories as f64 - 0.5), 0.0_f64..y_max)
            .map_err(render_err)?;

        let label_at = |x: &f64| {
            let nearest = x.round();
            if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
                return String::new();
            }
            sizes.get(nearest as usize).map(|s| s.to_string()).unwrap_or_default()
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(categories)
            .x_label_formatter(&label_at)
            .x_desc("Size (MB)")
            .y_desc("Execution Time (seconds)")
            .draw()
            .map_err(render_err)?;

        for (index, run) in campaign.runs.iter().enumerate() {
            let color = Palette99::pick(index).to_rgba();
            chart
                .draw_series(run.perf_metrics.iter().enumerate().map(|(category, m)| {
                    let (left, right) = bar_span(category, index, algorithms);
                    Rectangle::new(
                        [(left, 0.0), (right, m.execution_time_in_seconds)],
                        color.filled(),
                    )
                }))
                .map_err(render_err)?
                .label(run.algorithm.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.85))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}
