//! PNG charts drawn with `plotters`.
//!
//! Axis ranges are taken from the data unless fixed by the caller. Every
//! chart carries a title and axis descriptions.

use std::fmt::Display;
use std::fs;
use std::ops::Range;
use std::path::Path;

use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::prelude::*;

use crate::error::{Result, VesicleError};

const SIZE: (u32, u32) = (640, 480);
const FONT: &str = "sans-serif";

/// Line and marker color, `#2A6EA6`.
pub const LINE_COLOR: RGBColor = RGBColor(0x2A, 0x6E, 0xA6);

/// Light to dark green, sampled from matplotlib's `Greens`.
const GREENS: [RGBColor; 9] = [
    RGBColor(0xF7, 0xFC, 0xF5),
    RGBColor(0xE5, 0xF5, 0xE0),
    RGBColor(0xC7, 0xE9, 0xC0),
    RGBColor(0xA1, 0xD9, 0x9B),
    RGBColor(0x74, 0xC4, 0x76),
    RGBColor(0x41, 0xAB, 0x5D),
    RGBColor(0x23, 0x8B, 0x45),
    RGBColor(0x00, 0x6D, 0x2C),
    RGBColor(0x00, 0x44, 0x1B),
];

/// Vertical scale of a line chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    /// Values plotted as is.
    Linear,
    /// Logarithmic axis; non-positive values are dropped.
    Log,
}

/// Title and axis descriptions of a chart.
#[derive(Debug, Clone, Copy)]
pub struct Labels<'a> {
    /// Caption above the plot area.
    pub title: &'a str,
    /// Horizontal axis description.
    pub x: &'a str,
    /// Vertical axis description.
    pub y: &'a str,
}

fn plot_error(path: &Path, e: impl Display) -> VesicleError {
    VesicleError::Plot(format!("{}: {e}", path.display()))
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| VesicleError::io(parent, e))?;
    }
    Ok(())
}

/// Data range padded so that constant series still span the frame.
fn range(values: impl Iterator<Item = f64>) -> Option<Range<f64>> {
    let (lo, hi) = bounds(values)?;
    if hi - lo < 1e-12 {
        let pad = lo.abs().max(1.0) * 0.5;
        return Some(lo - pad..hi + pad);
    }
    Some(lo..hi)
}

/// Positive data range for a log axis, widened to a decade either side
/// when the series is flat.
fn log_range(values: impl Iterator<Item = f64>) -> Option<Range<f64>> {
    let (lo, hi) = bounds(values)?;
    if hi / lo < 1.0 + 1e-9 {
        return Some(lo / 10.0..hi * 10.0);
    }
    Some(lo..hi)
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
}

fn line_chart<Y>(
    path: &Path,
    points: &[(f64, f64)],
    x_range: Range<f64>,
    y_range: Y,
    labels: Labels<'_>,
) -> Result<()>
where
    Y: AsRangedCoord<Value = f64>,
    Y::CoordDescType: ValueFormatter<f64>,
{
    create_parent(path)?;
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(path, e))?;

    {
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(labels.title, (FONT, 22))
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| plot_error(path, e))?;

        chart
            .configure_mesh()
            .x_desc(labels.x)
            .y_desc(labels.y)
            .draw()
            .map_err(|e| plot_error(path, e))?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), &LINE_COLOR))
            .map_err(|e| plot_error(path, e))?;
    }

    root.present().map_err(|e| plot_error(path, e))
}

/// Line chart of a scalar series against epoch.
pub fn plot_series(
    path: &Path,
    series: &[(usize, f64)],
    scale: Scale,
    labels: Labels<'_>,
) -> Result<()> {
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|&(epoch, value)| (epoch as f64, value))
        .filter(|&(_, v)| v.is_finite() && (scale == Scale::Linear || v > 0.0))
        .collect();

    let x = range(points.iter().map(|p| p.0));
    let values = points.iter().map(|p| p.1);
    let y = match scale {
        Scale::Linear => range(values),
        Scale::Log => log_range(values),
    };
    let (Some(x), Some(y)) = (x, y) else {
        return Err(plot_error(path, "no plottable values"));
    };

    match scale {
        Scale::Linear => line_chart(path, &points, x, y, labels),
        Scale::Log => line_chart(path, &points, x, y.log_scale(), labels),
    }
}

/// φ along one grid line, on a fixed vertical range around `[-1, 1]`.
///
/// `position` names the line among its parallels, e.g. `middle`.
pub fn plot_phase_profile(
    path: &Path,
    coords: &[f32],
    values: &[f32],
    axis: &str,
    position: &str,
) -> Result<()> {
    if coords.len() != values.len() || coords.is_empty() {
        return Err(plot_error(
            path,
            format!("{} coordinates for {} values", coords.len(), values.len()),
        ));
    }
    let points: Vec<(f64, f64)> = coords
        .iter()
        .zip(values)
        .map(|(&x, &v)| (x as f64, v as f64))
        .collect();
    let x = range(points.iter().map(|p| p.0)).unwrap_or(-1.0f64..1.0);

    let title = format!("phase field along {axis} ({position})");
    let labels = Labels {
        title: &title,
        x: axis,
        y: "phi",
    };
    line_chart(path, &points, x, -1.1f64..1.1, labels)
}

/// Projection of sample points onto the `x`–`y` plane.
pub fn plot_points(path: &Path, points: &[[f32; 3]], bounds: (f32, f32), title: &str) -> Result<()> {
    create_parent(path)?;
    let span = bounds.0 as f64..bounds.1 as f64;
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(path, e))?;

    {
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(title, (FONT, 22))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(span.clone(), span)
            .map_err(|e| plot_error(path, e))?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc("x")
            .y_desc("y")
            .draw()
            .map_err(|e| plot_error(path, e))?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p[0] as f64, p[1] as f64), 1, LINE_COLOR.filled())),
            )
            .map_err(|e| plot_error(path, e))?;
    }

    root.present().map_err(|e| plot_error(path, e))
}

/// Greens for φ in `[-1, 1]`.
fn greens(phi: f32) -> RGBColor {
    DerivedColorMap::new(&GREENS).get_color(((phi + 1.0) * 0.5).clamp(0.0, 1.0))
}

/// Square field slice on the grid `coords × coords` with a color bar.
///
/// `values` is row-major with rows along the vertical axis; row 0 is drawn
/// at the bottom.
pub fn color_map(path: &Path, coords: &[f32], values: &[f32], labels: Labels<'_>) -> Result<()> {
    let n = coords.len();
    if n == 0 || values.len() != n * n {
        return Err(plot_error(
            path,
            format!("{} values for a {n}x{n} map", values.len()),
        ));
    }
    create_parent(path)?;

    let half = if n > 1 {
        (coords[1] - coords[0]).abs() as f64 * 0.5
    } else {
        0.5
    };
    let span = coords[0] as f64 - half..coords[n - 1] as f64 + half;

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(path, e))?;
    let (main, bar) = root.split_horizontally(SIZE.0 - 100);

    {
        let mut chart = ChartBuilder::on(&main)
            .margin(10)
            .caption(labels.title, (FONT, 22))
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(span.clone(), span)
            .map_err(|e| plot_error(path, e))?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(labels.x)
            .y_desc(labels.y)
            .draw()
            .map_err(|e| plot_error(path, e))?;

        chart
            .draw_series(values.iter().enumerate().map(|(index, &phi)| {
                let (x, y) = (coords[index % n] as f64, coords[index / n] as f64);
                Rectangle::new(
                    [(x - half, y - half), (x + half, y + half)],
                    greens(phi).filled(),
                )
            }))
            .map_err(|e| plot_error(path, e))?;
    }

    {
        let mut scale = ChartBuilder::on(&bar)
            .margin_top(40)
            .margin_bottom(50)
            .margin_right(10)
            .y_label_area_size(50)
            .build_cartesian_2d(0.0f64..1.0, -1.0f64..1.0)
            .map_err(|e| plot_error(path, e))?;

        scale
            .configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_desc("phi")
            .draw()
            .map_err(|e| plot_error(path, e))?;

        let steps = 64;
        scale
            .draw_series((0..steps).map(|i| {
                let lo = -1.0 + 2.0 * i as f64 / steps as f64;
                let hi = lo + 2.0 / steps as f64;
                let phi = (lo + hi) as f32 * 0.5;
                Rectangle::new([(0.0, lo), (1.0, hi)], greens(phi).filled())
            }))
            .map_err(|e| plot_error(path, e))?;
    }

    root.present().map_err(|e| plot_error(path, e))
}
