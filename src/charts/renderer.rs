//! Static Chart Renderer
//! Writes the dashboard charts to PNG files with plotters.
//!
//! One file per chart, named after the chart id:
//! 1. `aqi_vs_prevalence.png`
//! 2. `income_vs_prevalence.png` (with OLS trendline)
//! 3. `carbon_per_capita.png` (bars sorted descending, rotated labels)
//! 4. `pm25_vs_prevalence.png` (with OLS trendline)

use crate::charts::model::{
    BarChartModel, ChartView, DashboardCharts, Rgb, ScatterChart, BAR_COLOR, TREND_COLOR,
};
use crate::config::ExportConfig;
use plotters::coord::Shift;
use plotters::prelude::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create export directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to draw {chart}: {message}")]
    Draw {
        chart: &'static str,
        message: String,
    },
}

type DrawResult =
    Result<(), DrawingAreaErrorKind<<BitMapBackend<'static> as DrawingBackend>::ErrorType>>;

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Pad a data range so markers at the edges stay inside the plot.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    let pad = if hi > lo { (hi - lo) * 0.08 } else { 1.0 };
    (lo - pad, hi + pad)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render all four charts into `dir`, creating it if needed. Returns the
    /// written paths in page order.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn export_png(
        charts: &DashboardCharts,
        dir: &Path,
        export: &ExportConfig,
    ) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let size = (export.width, export.height);
        let views = charts.all();
        let paths = views
            .as_slice()
            .par_iter()
            .map(|view| {
                let path = Self::file_path(dir, view.id());
                Self::render_png(*view, &path, size)?;
                Ok(path)
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        info!(files = paths.len(), "Exported chart images");
        Ok(paths)
    }

    pub fn file_path(dir: &Path, chart_id: &str) -> PathBuf {
        dir.join(format!("{chart_id}.png"))
    }

    /// Render one chart to a PNG file.
    pub fn render_png(
        view: ChartView<'_>,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        let drawn = match view {
            ChartView::Scatter(chart) => Self::draw_scatter(&root, chart),
            ChartView::Bar(chart) => Self::draw_bars(&root, chart),
        };

        drawn
            .and_then(|()| root.present())
            .map_err(|e| RenderError::Draw {
                chart: view.id(),
                message: e.to_string(),
            })
    }

    fn draw_scatter(
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        chart: &ScatterChart,
    ) -> DrawResult {
        root.fill(&WHITE)?;

        let (x0, x1) = padded(chart.x_range().unwrap_or((0.0, 1.0)));
        let (y0, y1) = padded(chart.y_range().unwrap_or((0.0, 1.0)));

        let mut cc = ChartBuilder::on(root)
            .caption(chart.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        cc.configure_mesh()
            .x_desc(chart.x_label)
            .y_desc(chart.y_label)
            .draw()?;

        cc.draw_series(chart.points.iter().map(|p| {
            Circle::new((p.x, p.y), p.radius.round() as i32, rgb(p.color).filled())
        }))?;

        if let (Some(fit), Some(segment)) = (chart.trend, chart.trend_segment()) {
            cc.draw_series(LineSeries::new(segment, rgb(TREND_COLOR).stroke_width(2)))?
                .label(fit.to_string())
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], rgb(TREND_COLOR))
                });

            cc.configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        Ok(())
    }

    fn draw_bars(
        root: &DrawingArea<BitMapBackend<'_>, Shift>,
        chart: &BarChartModel,
    ) -> DrawResult {
        root.fill(&WHITE)?;

        let n = chart.bars.len().max(1);
        let y_max = (chart.max_value() * 1.1).max(1.0);
        let names: Vec<&str> = chart.bars.iter().map(|(s, _)| s.as_str()).collect();

        let mut cc = ChartBuilder::on(root)
            .caption(chart.title, ("sans-serif", 26))
            .margin(20)
            .x_label_area_size(140)
            .y_label_area_size(70)
            .build_cartesian_2d((0..n).into_segmented(), 0.0..y_max)?;

        cc.configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_style(
                ("sans-serif", 13)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_label_formatter(&|v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    names.get(*i).map(|s| s.to_string()).unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .y_desc(chart.y_label)
            .draw()?;

        cc.draw_series(
            Histogram::vertical(&cc)
                .style(rgb(BAR_COLOR).filled())
                .margin(3)
                .data(chart.drawn_bars()),
        )?;

        Ok(())
    }
}
