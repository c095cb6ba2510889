//! Vector drawing helpers: metric gauges and the pitch-contour chart.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{Color, Line, Mm, PdfLayerReference, Point, Polygon, Rgb};

use crate::metrics::PitchSample;

const GAUGE_HEIGHT_MM: f64 = 4.0;

pub fn color(r: f64, g: f64, b: f64) -> Color {
    Color::Rgb(Rgb::new(r as f32, g as f32, b as f32, None))
}

pub fn stroke_line(layer: &PdfLayerReference, x1: f64, y1: f64, x2: f64, y2: f64) {
    let line = Line {
        points: vec![
            (Point::new(Mm(x1 as f32), Mm(y1 as f32)), false),
            (Point::new(Mm(x2 as f32), Mm(y2 as f32)), false),
        ],
        is_closed: false,
    };
    layer.add_line(line);
}

fn fill_rect(layer: &PdfLayerReference, x: f64, y: f64, width: f64, height: f64) {
    let corners = vec![
        (Point::new(Mm(x as f32), Mm(y as f32)), false),
        (Point::new(Mm((x + width) as f32), Mm(y as f32)), false),
        (
            Point::new(Mm((x + width) as f32), Mm((y + height) as f32)),
            false,
        ),
        (Point::new(Mm(x as f32), Mm((y + height) as f32)), false),
    ];
    layer.add_polygon(Polygon {
        rings: vec![corners],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

/// Horizontal gauge with the measured value filled against a full-scale
/// span, plus a tick at the clinical limit. `exceeded` flips the fill from
/// green to red.
pub fn draw_gauge(
    layer: &PdfLayerReference,
    x: f64,
    y: f64,
    width: f64,
    fill_fraction: f64,
    limit_fraction: f64,
    exceeded: bool,
) {
    // Track background
    layer.set_fill_color(color(0.88, 0.88, 0.88));
    fill_rect(layer, x, y, width, GAUGE_HEIGHT_MM);

    // Measured value
    let fill = fill_fraction.clamp(0.0, 1.0) * width;
    if exceeded {
        layer.set_fill_color(color(0.86, 0.27, 0.22));
    } else {
        layer.set_fill_color(color(0.26, 0.66, 0.37));
    }
    fill_rect(layer, x, y, fill, GAUGE_HEIGHT_MM);

    // Limit tick
    let tick_x = x + limit_fraction.clamp(0.0, 1.0) * width;
    layer.set_outline_color(color(0.2, 0.2, 0.2));
    layer.set_outline_thickness(0.6);
    stroke_line(layer, tick_x, y - 1.0, tick_x, y + GAUGE_HEIGHT_MM + 1.0);
}

/// Line chart of the pitch track inside the given box. Unvoiced gaps break
/// the polyline. Returns false (drawing nothing) when no voiced samples
/// exist.
pub fn draw_pitch_chart(
    layer: &PdfLayerReference,
    samples: &[PitchSample],
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> bool {
    let voiced: Vec<(f64, f64)> = samples
        .iter()
        .filter_map(|s| s.frequency_hz.map(|f| (s.time_seconds, f)))
        .collect();
    let Some(bounds) = chart_bounds(&voiced, samples) else {
        return false;
    };

    // Frame
    layer.set_outline_color(color(0.4, 0.4, 0.4));
    layer.set_outline_thickness(0.5);
    stroke_line(layer, x, y, x, y + height);
    stroke_line(layer, x, y, x + width, y);

    // Contour, one polyline per voiced run
    layer.set_outline_color(color(0.18, 0.53, 0.76));
    layer.set_outline_thickness(0.9);
    let mut run: Vec<(Point, bool)> = Vec::new();
    for sample in samples {
        match sample.frequency_hz {
            Some(f) => {
                let px = x + bounds.x_fraction(sample.time_seconds) * width;
                let py = y + bounds.y_fraction(f) * height;
                run.push((Point::new(Mm(px as f32), Mm(py as f32)), false));
            }
            None => flush_run(layer, &mut run),
        }
    }
    flush_run(layer, &mut run);
    true
}

fn flush_run(layer: &PdfLayerReference, run: &mut Vec<(Point, bool)>) {
    if run.len() >= 2 {
        layer.add_line(Line {
            points: std::mem::take(run),
            is_closed: false,
        });
    } else {
        run.clear();
    }
}

/// Axis ranges for the chart, padded so the contour does not hug the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub t_min: f64,
    pub t_max: f64,
    pub f_min: f64,
    pub f_max: f64,
}

impl ChartBounds {
    fn x_fraction(&self, t: f64) -> f64 {
        ((t - self.t_min) / (self.t_max - self.t_min)).clamp(0.0, 1.0)
    }

    fn y_fraction(&self, f: f64) -> f64 {
        ((f - self.f_min) / (self.f_max - self.f_min)).clamp(0.0, 1.0)
    }
}

pub fn chart_bounds(voiced: &[(f64, f64)], all: &[PitchSample]) -> Option<ChartBounds> {
    if voiced.is_empty() || all.is_empty() {
        return None;
    }
    let t_min = all.first()?.time_seconds;
    let t_max = all.last()?.time_seconds.max(t_min + 1e-6);
    let f_low = voiced.iter().map(|&(_, f)| f).fold(f64::INFINITY, f64::min);
    let f_high = voiced
        .iter()
        .map(|&(_, f)| f)
        .fold(f64::NEG_INFINITY, f64::max);
    let pad = ((f_high - f_low) * 0.1).max(5.0);
    Some(ChartBounds {
        t_min,
        t_max,
        f_min: (f_low - pad).max(0.0),
        f_max: f_high + pad,
    })
}
