//! Charts module - chart models, interactive plotting and PNG export

mod model;
mod plotter;
mod renderer;

pub use model::{
    BarChartModel, ChartView, ColorScale, DashboardCharts, Rgb, ScatterChart, ScatterPoint,
};
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};
