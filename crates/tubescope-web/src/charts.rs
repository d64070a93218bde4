//! SVG chart geometry.
//!
//! Handlers turn series into plain coordinates here; the templates only draw
//! what they are given.

use serde::Serialize;

use crate::format::thousands;

const PAD_LEFT: f64 = 80.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_TOP: f64 = 20.0;
const PAD_BOTTOM: f64 = 40.0;
const Y_TICKS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Tick {
    pub pos: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub label: String,
    pub value: String,
}

/// Line chart with a y axis padded 5% below the minimum and above the maximum.
#[derive(Debug, Clone, Serialize)]
pub struct LineChart {
    pub title: String,
    pub color: String,
    pub width: f64,
    pub height: f64,
    pub plot_left: f64,
    pub plot_right: f64,
    pub plot_top: f64,
    pub plot_bottom: f64,
    /// `x,y x,y ...` for an SVG polyline.
    pub polyline: String,
    pub points: Vec<Point>,
    pub y_ticks: Vec<Tick>,
}

impl LineChart {
    /// `series` is (x label, value) in drawing order, left to right.
    pub fn new(title: &str, color: &str, series: &[(String, i64)], width: f64, height: f64) -> Self {
        let plot_left = PAD_LEFT;
        let plot_right = width - PAD_RIGHT;
        let plot_top = PAD_TOP;
        let plot_bottom = height - PAD_BOTTOM;

        let (lo, hi) = y_range(series.iter().map(|(_, v)| *v as f64));
        let scale_y = |v: f64| plot_bottom - (v - lo) / (hi - lo) * (plot_bottom - plot_top);

        let n = series.len();
        let step = if n > 1 { (plot_right - plot_left) / (n - 1) as f64 } else { 0.0 };
        let points: Vec<Point> = series
            .iter()
            .enumerate()
            .map(|(i, (label, value))| Point {
                x: if n > 1 { plot_left + step * i as f64 } else { (plot_left + plot_right) / 2.0 },
                y: scale_y(*value as f64),
                label: label.clone(),
                value: thousands(*value),
            })
            .collect();

        let polyline = points
            .iter()
            .map(|p| format!("{:.1},{:.1}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ");

        let y_ticks = (0..=Y_TICKS)
            .map(|i| {
                let v = lo + (hi - lo) * i as f64 / Y_TICKS as f64;
                Tick { pos: scale_y(v), label: thousands(v.round() as i64) }
            })
            .collect();

        Self {
            title: title.to_string(),
            color: color.to_string(),
            width,
            height,
            plot_left,
            plot_right,
            plot_top,
            plot_bottom,
            polyline,
            points,
            y_ticks,
        }
    }
}

fn y_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let (lo, hi) = (min * 0.95, max * 1.05);
    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo.min(hi), lo.max(hi))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub value: String,
}

/// Vertical bar chart with a zero baseline.
#[derive(Debug, Clone, Serialize)]
pub struct BarChart {
    pub width: f64,
    pub height: f64,
    pub baseline: f64,
    pub bars: Vec<Bar>,
    pub y_ticks: Vec<Tick>,
}

impl BarChart {
    pub fn new(series: &[(String, i64)], width: f64, height: f64) -> Self {
        let plot_left = PAD_LEFT;
        let plot_right = width - PAD_RIGHT;
        let plot_top = PAD_TOP;
        let baseline = height - PAD_BOTTOM;

        let max = series.iter().map(|(_, v)| *v).max().unwrap_or(0).max(1) as f64;
        let slot = if series.is_empty() { 0.0 } else { (plot_right - plot_left) / series.len() as f64 };
        let bar_width = slot * 0.6;

        let bars = series
            .iter()
            .enumerate()
            .map(|(i, (label, value))| {
                let h = (*value).max(0) as f64 / max * (baseline - plot_top);
                Bar {
                    x: plot_left + slot * i as f64 + (slot - bar_width) / 2.0,
                    y: baseline - h,
                    width: bar_width,
                    height: h,
                    label: label.clone(),
                    value: thousands(*value),
                }
            })
            .collect();

        let y_ticks = (0..=Y_TICKS)
            .map(|i| {
                let v = max * i as f64 / Y_TICKS as f64;
                Tick {
                    pos: baseline - v / max * (baseline - plot_top),
                    label: thousands(v.round() as i64),
                }
            })
            .collect();

        Self { width, height, baseline, bars, y_ticks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[i64]) -> Vec<(String, i64)> {
        values.iter().enumerate().map(|(i, v)| (format!("d{}", i), *v)).collect()
    }

    #[test]
    fn test_line_spans_plot_width() {
        let chart = LineChart::new("Subscribers", "#4bc0c0", &series(&[100, 200, 300]), 600.0, 300.0);
        assert_eq!(chart.points.len(), 3);
        assert_eq!(chart.points[0].x, chart.plot_left);
        assert_eq!(chart.points[2].x, chart.plot_right);
        // higher values sit higher on screen
        assert!(chart.points[2].y < chart.points[0].y);
        assert_eq!(chart.polyline.split(' ').count(), 3);
    }

    #[test]
    fn test_line_padding_keeps_points_inside() {
        let chart = LineChart::new("Views", "#35a2eb", &series(&[1000, 1000, 2000]), 600.0, 300.0);
        for p in &chart.points {
            assert!(p.y > chart.plot_top && p.y < chart.plot_bottom);
        }
    }

    #[test]
    fn test_flat_and_single_series() {
        let flat = LineChart::new("x", "#000", &series(&[0, 0]), 400.0, 200.0);
        assert!(flat.points.iter().all(|p| p.y.is_finite()));

        let single = LineChart::new("x", "#000", &series(&[42]), 400.0, 200.0);
        assert_eq!(single.points[0].x, (single.plot_left + single.plot_right) / 2.0);
        assert_eq!(single.points[0].value, "42");
    }

    #[test]
    fn test_empty_line() {
        let chart = LineChart::new("x", "#000", &[], 400.0, 200.0);
        assert!(chart.polyline.is_empty());
        assert_eq!(chart.y_ticks.len(), Y_TICKS + 1);
    }

    #[test]
    fn test_bars_scale_to_max() {
        let chart = BarChart::new(&series(&[10, 20, 0]), 500.0, 300.0);
        assert_eq!(chart.bars.len(), 3);
        let tallest = chart.bars[1].height;
        assert!((chart.bars[0].height * 2.0 - tallest).abs() < 1e-9);
        assert_eq!(chart.bars[2].height, 0.0);
        assert_eq!(chart.bars[1].y, chart.baseline - tallest);
        assert_eq!(chart.y_ticks.last().unwrap().label, "20");
    }
}
