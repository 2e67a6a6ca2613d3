//! Chart Models
//! Backend-independent description of the four dashboard charts, built once
//! from the merged table and drawn by both the interactive plotter and the
//! static PNG renderer.

use crate::data::{Metric, StateTable};
use crate::stats::LinearFit;

/// Plain RGB triple shared by the egui and plotters backends.
pub type Rgb = (u8, u8, u8);

/// Categorical palette for per-state coloring.
pub const PALETTE: [Rgb; 10] = [
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (255, 87, 34),   // Deep Orange
    (121, 85, 72),   // Brown
    (96, 125, 139),  // Blue Grey
];

/// Bar fill for the carbon chart.
pub const BAR_COLOR: Rgb = (99, 110, 250);

/// Trendline color.
pub const TREND_COLOR: Rgb = (40, 40, 40);

const VIRIDIS: [Rgb; 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

const INFERNO: [Rgb; 5] = [
    (0, 0, 4),
    (87, 16, 110),
    (188, 55, 84),
    (249, 142, 9),
    (252, 255, 164),
];

/// How scatter markers are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    /// One palette color per state, with a legend entry per state.
    ByState,
    /// Continuous ramp over the x value.
    Viridis,
    Inferno,
}

impl ColorScale {
    /// Color at `t` in `[0, 1]` for the continuous ramps.
    pub fn ramp(self, t: f64) -> Rgb {
        let stops = match self {
            ColorScale::Viridis => &VIRIDIS,
            ColorScale::Inferno => &INFERNO,
            ColorScale::ByState => return PALETTE[0],
        };
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let pos = t * (stops.len() - 1) as f64;
        let lower = pos.floor() as usize;
        let upper = (lower + 1).min(stops.len() - 1);
        let frac = pos - lower as f64;

        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
        let (a, b) = (stops[lower], stops[upper]);
        (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub state: String,
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
    /// Marker radius in pixels.
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub id: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub color_scale: ColorScale,
    pub points: Vec<ScatterPoint>,
    pub trend: Option<LinearFit>,
}

impl ScatterChart {
    pub fn x_range(&self) -> Option<(f64, f64)> {
        min_max(self.points.iter().map(|p| p.x))
    }

    pub fn y_range(&self) -> Option<(f64, f64)> {
        let trend = self.trend_segment();
        min_max(
            self.points
                .iter()
                .map(|p| p.y)
                .chain(trend.iter().flat_map(|seg| seg.iter().map(|(_, y)| *y))),
        )
    }

    /// Endpoints of the fitted line across the x range of the data.
    pub fn trend_segment(&self) -> Option<[(f64, f64); 2]> {
        let fit = self.trend?;
        let (x0, x1) = self.x_range()?;
        Some([(x0, fit.predict(x0)), (x1, fit.predict(x1))])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartModel {
    pub id: &'static str,
    pub title: &'static str,
    pub y_label: &'static str,
    /// (state, value), sorted by value descending. States without a value
    /// keep their slot on the axis and come last.
    pub bars: Vec<(String, Option<f64>)>,
}

impl BarChartModel {
    pub fn max_value(&self) -> f64 {
        self.bars.iter().filter_map(|(_, v)| *v).fold(0.0, f64::max)
    }

    /// Bars with a value, paired with their slot index.
    pub fn drawn_bars(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.bars
            .iter()
            .enumerate()
            .filter_map(|(i, (_, v))| v.map(|v| (i, v)))
    }
}

/// Borrowed view over any dashboard chart.
#[derive(Debug, Clone, Copy)]
pub enum ChartView<'a> {
    Scatter(&'a ScatterChart),
    Bar(&'a BarChartModel),
}

impl ChartView<'_> {
    pub fn id(&self) -> &'static str {
        match self {
            ChartView::Scatter(c) => c.id,
            ChartView::Bar(c) => c.id,
        }
    }
}

/// The four charts of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardCharts {
    pub aqi: ScatterChart,
    pub income: ScatterChart,
    pub carbon: BarChartModel,
    pub pm25: ScatterChart,
}

impl DashboardCharts {
    pub fn from_table(table: &StateTable) -> Self {
        Self {
            aqi: scatter(
                table,
                "aqi_vs_prevalence",
                "Asthma Prevalence vs. Avg Days with AQI",
                Metric::AvgDaysWithAqi,
                ColorScale::ByState,
                false,
            ),
            income: scatter(
                table,
                "income_vs_prevalence",
                "Asthma Prevalence vs. Avg Household Income",
                Metric::AvgIncome,
                ColorScale::Viridis,
                true,
            ),
            carbon: carbon_bars(table),
            pm25: scatter(
                table,
                "pm25_vs_prevalence",
                "Asthma Prevalence vs. Days with PM\u{2082}.\u{2085} Exposure",
                Metric::AvgDaysPm25,
                ColorScale::Inferno,
                true,
            ),
        }
    }

    /// Charts in page order.
    pub fn all(&self) -> [ChartView<'_>; 4] {
        [
            ChartView::Scatter(&self.aqi),
            ChartView::Scatter(&self.income),
            ChartView::Bar(&self.carbon),
            ChartView::Scatter(&self.pm25),
        ]
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn scatter(
    table: &StateTable,
    id: &'static str,
    title: &'static str,
    x_metric: Metric,
    color_scale: ColorScale,
    with_trend: bool,
) -> ScatterChart {
    let y_metric = Metric::AsthmaPrev;
    let pairs: Vec<(&str, f64, f64)> = table
        .records()
        .iter()
        .map(|r| (r.state.as_str(), x_metric.value(r), y_metric.value(r)))
        .filter(|(_, x, y)| x.is_finite() && y.is_finite())
        .collect();

    let (x_min, x_max) = min_max(pairs.iter().map(|(_, x, _)| *x)).unwrap_or((0.0, 1.0));
    let span = if x_max > x_min { x_max - x_min } else { 1.0 };

    let points = pairs
        .iter()
        .enumerate()
        .map(|(i, (state, x, y))| {
            let t = (x - x_min) / span;
            let (color, radius) = match color_scale {
                // Marker size follows x.
                ColorScale::ByState => (PALETTE[i % PALETTE.len()], 3.0 + 7.0 * t as f32),
                ramp => (ramp.ramp(t), 5.0),
            };
            ScatterPoint {
                state: state.to_string(),
                x: *x,
                y: *y,
                color,
                radius,
            }
        })
        .collect();

    let trend = if with_trend {
        let xs: Vec<f64> = pairs.iter().map(|(_, x, _)| *x).collect();
        let ys: Vec<f64> = pairs.iter().map(|(_, _, y)| *y).collect();
        LinearFit::ols(&xs, &ys)
    } else {
        None
    };

    ScatterChart {
        id,
        title,
        x_label: x_metric.label(),
        y_label: y_metric.label(),
        color_scale,
        points,
        trend,
    }
}

fn carbon_bars(table: &StateTable) -> BarChartModel {
    let mut bars: Vec<(String, Option<f64>)> = table
        .records()
        .iter()
        .map(|r| {
            let value = r.carbon_per_capita_2021;
            (r.state.clone(), value.is_finite().then_some(value))
        })
        .collect();
    // Stable sort: ties and missing values keep table order.
    bars.sort_by(|a, b| match (a.1, b.1) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    BarChartModel {
        id: "carbon_per_capita",
        title: "Per-Capita CO\u{2082} Emissions by State (2021)",
        y_label: Metric::CarbonPerCapita2021.label(),
        bars,
    }
}
