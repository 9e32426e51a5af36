//! Dual-axis trend chart rendered to SVG or PNG.
//!
//! Weight sits on the left axis as a solid blue line with circle markers;
//! impedance sits on the right axis as a dashed purple line with square
//! markers. The SVG carries its own legend. The PNG carries no text at all:
//! the bitmap backend rasterizes glyphs through system fonts, so captions and
//! legend are drawn by whatever embeds the image.

use std::io::Cursor;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use printpdf::image_crate::{DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use super::{ReportError, ReportResult};
use crate::trend::Series;

const WEIGHT_COLOR: RGBColor = RGBColor(0x29, 0x80, 0xB9);
const IMPEDANCE_COLOR: RGBColor = RGBColor(0x8E, 0x44, 0xAD);
const GRID_COLOR: RGBColor = RGBColor(0xDC, 0xDC, 0xDC);
const MARKER_SIZE: i32 = 4;
const DASH_LENGTH: i32 = 8;
const DASH_GAP: i32 = 5;
const GRID_LINES: u32 = 4;

/// Chart canvas size in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
        }
    }
}

/// Text drawn on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLabels {
    pub title: String,
    pub weight: String,
    pub impedance: String,
}

/// Render the series as an SVG document.
pub fn render_chart(
    series: &Series,
    labels: &ChartLabels,
    options: &ChartOptions,
) -> ReportResult<String> {
    check_canvas(series, options)?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        draw_chart(&root, series, Some(labels))?;
    }

    Ok(svg)
}

/// Render the series as a PNG image without captions, tick labels or legend.
pub fn render_chart_png(series: &Series, options: &ChartOptions) -> ReportResult<Vec<u8>> {
    check_canvas(series, options)?;

    let (width, height) = (options.width, options.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_chart(&root, series, None)?;
    }

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| ReportError::Chart("bitmap buffer does not match canvas".to_string()))?;
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(chart_error)?;

    Ok(png)
}

/// Padded (weight, impedance) axis ranges used for a series.
pub fn axis_ranges(series: &Series) -> ((f64, f64), (f64, f64)) {
    let weight = padded(series.weight_range(), 1.0);
    let (lo, hi) = series.impedance_range();
    let impedance = padded((f64::from(lo), f64::from(hi)), 10.0);
    (weight, impedance)
}

fn check_canvas(series: &Series, options: &ChartOptions) -> ReportResult<()> {
    if series.is_empty() {
        return Err(ReportError::NoData(series.condition.tag().to_string()));
    }
    if options.width == 0 || options.height == 0 {
        return Err(ReportError::Chart(format!(
            "invalid canvas size {}x{}",
            options.width, options.height
        )));
    }
    Ok(())
}

/// Draw both series onto `root`. Without `labels` no text reaches the backend.
fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &Series,
    labels: Option<&ChartLabels>,
) -> ReportResult<()> {
    let points = series.len() as i32;
    let ((weight_lo, weight_hi), (impedance_lo, impedance_hi)) = axis_ranges(series);

    let weight_points: Vec<(i32, f64)> = series
        .weights
        .iter()
        .enumerate()
        .map(|(i, w)| (i as i32, *w))
        .collect();
    let impedance_points: Vec<(i32, f64)> = series
        .impedances
        .iter()
        .enumerate()
        .map(|(i, z)| (i as i32, f64::from(*z)))
        .collect();

    root.fill(&WHITE).map_err(chart_error)?;

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if let Some(labels) = labels {
        builder
            .caption(labels.title.as_str(), ("sans-serif", 20))
            .x_label_area_size(40)
            .y_label_area_size(60)
            .right_y_label_area_size(60);
    }
    // One empty slot on each side keeps the first and last markers off the axes
    let mut chart = builder
        .build_cartesian_2d(-1..points, weight_lo..weight_hi)
        .map_err(chart_error)?
        .set_secondary_coord(-1..points, impedance_lo..impedance_hi);

    match labels {
        Some(labels) => {
            let x_labels: Vec<String> = series
                .timestamps
                .iter()
                .map(|ts| ts.format("%d/%m %H:%M").to_string())
                .collect();

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(x_labels.len().min(10) + 2)
                .x_label_formatter(&|x: &i32| {
                    usize::try_from(*x)
                        .ok()
                        .and_then(|i| x_labels.get(i))
                        .cloned()
                        .unwrap_or_default()
                })
                .y_desc(labels.weight.as_str())
                .axis_desc_style(("sans-serif", 14).into_font().color(&WEIGHT_COLOR))
                .draw()
                .map_err(chart_error)?;

            chart
                .configure_secondary_axes()
                .y_desc(labels.impedance.as_str())
                .axis_desc_style(("sans-serif", 14).into_font().color(&IMPEDANCE_COLOR))
                .draw()
                .map_err(chart_error)?;
        }
        None => {
            for step in 0..=GRID_LINES {
                let y = weight_lo + (weight_hi - weight_lo) * f64::from(step) / f64::from(GRID_LINES);
                chart
                    .draw_series(LineSeries::new(vec![(-1, y), (points, y)], &GRID_COLOR))
                    .map_err(chart_error)?;
            }
        }
    }

    let weight_line = chart
        .draw_series(LineSeries::new(
            weight_points.clone(),
            WEIGHT_COLOR.stroke_width(2),
        ))
        .map_err(chart_error)?;
    if let Some(labels) = labels {
        weight_line.label(labels.weight.as_str()).legend(|(x, y)| {
            EmptyElement::at((x + 10, y)) + Circle::new((0, 0), MARKER_SIZE, WEIGHT_COLOR.filled())
        });
    }
    chart
        .draw_series(
            weight_points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), MARKER_SIZE, WEIGHT_COLOR.filled())),
        )
        .map_err(chart_error)?;

    let impedance_line = chart
        .draw_secondary_series(DashedLineSeries::new(
            impedance_points.clone(),
            DASH_LENGTH,
            DASH_GAP,
            IMPEDANCE_COLOR.stroke_width(2),
        ))
        .map_err(chart_error)?;
    if let Some(labels) = labels {
        impedance_line.label(labels.impedance.as_str()).legend(|(x, y)| {
            EmptyElement::at((x + 10, y))
                + Rectangle::new(
                    [(-MARKER_SIZE, -MARKER_SIZE), (MARKER_SIZE, MARKER_SIZE)],
                    IMPEDANCE_COLOR.filled(),
                )
        });
    }
    chart
        .draw_secondary_series(impedance_points.iter().map(|&(x, y)| {
            EmptyElement::at((x, y))
                + Rectangle::new(
                    [(-MARKER_SIZE, -MARKER_SIZE), (MARKER_SIZE, MARKER_SIZE)],
                    IMPEDANCE_COLOR.filled(),
                )
        }))
        .map_err(chart_error)?;

    if labels.is_some() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperMiddle)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_error)?;
    }

    root.present().map_err(chart_error)?;
    Ok(())
}

/// Widen a (min, max) range so flat series still get a visible band.
fn padded((lo, hi): (f64, f64), minimum_span: f64) -> (f64, f64) {
    let span = hi - lo;
    if span < minimum_span {
        let mid = (lo + hi) / 2.0;
        (mid - minimum_span, mid + minimum_span)
    } else {
        (lo - span * 0.1, hi + span * 0.1)
    }
}

fn chart_error<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Chart(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Condition;
    use chrono::{TimeZone, Utc};

    fn series(points: &[(f64, u32)]) -> Series {
        Series {
            condition: Condition::Cardiac,
            timestamps: (0..points.len())
                .map(|i| Utc.with_ymd_and_hms(2024, 1, 10 + i as u32, 8, 30, 0).unwrap())
                .collect(),
            weights: points.iter().map(|(w, _)| *w).collect(),
            impedances: points.iter().map(|(_, z)| *z).collect(),
        }
    }

    fn labels() -> ChartLabels {
        ChartLabels {
            title: "Heart failure".into(),
            weight: "Weight (kg)".into(),
            impedance: "BIA (Ohm Ω)".into(),
        }
    }

    #[test]
    fn test_chart_has_legend_for_both_series() {
        let svg = render_chart(
            &series(&[(70.0, 520), (71.0, 510), (70.0, 515)]),
            &labels(),
            &ChartOptions::default(),
        )
        .unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Weight (kg)"));
        assert!(svg.contains("BIA (Ohm Ω)"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_single_point_renders() {
        let result = render_chart(&series(&[(70.0, 520)]), &labels(), &ChartOptions::default());
        assert!(result.is_ok());
    }

    #[test]
    fn test_render_is_deterministic() {
        let data = series(&[(70.0, 520), (71.0, 510)]);
        let first = render_chart(&data, &labels(), &ChartOptions::default()).unwrap();
        let second = render_chart(&data, &labels(), &ChartOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_series_rejected() {
        let result = render_chart(&series(&[]), &labels(), &ChartOptions::default());
        assert!(matches!(result, Err(ReportError::NoData(_))));
    }

    #[test]
    fn test_zero_canvas_rejected() {
        let options = ChartOptions {
            width: 0,
            height: 400,
        };
        let result = render_chart(&series(&[(70.0, 520)]), &labels(), &options);
        assert!(matches!(result, Err(ReportError::Chart(_))));
    }

    /// Stroked `<polyline>`/`<line>` elements drawn in `color`.
    fn strokes_in(svg: &str, color: &str) -> usize {
        svg.split('<')
            .filter(|tag| tag.starts_with("polyline") || tag.starts_with("line "))
            .filter(|tag| {
                tag.split('>')
                    .next()
                    .is_some_and(|attrs| attrs.to_ascii_lowercase().contains(color))
            })
            .count()
    }

    #[test]
    fn test_impedance_line_is_dashed() {
        let svg = render_chart(
            &series(&[(70.0, 520), (71.0, 480), (70.0, 515)]),
            &labels(),
            &ChartOptions::default(),
        )
        .unwrap();

        assert_eq!(strokes_in(&svg, "#2980b9"), 1);
        assert!(strokes_in(&svg, "#8e44ad") > 2);
    }

    #[test]
    fn test_png_render() {
        let data = series(&[(70.0, 520), (71.0, 510), (70.0, 515)]);
        let first = render_chart_png(&data, &ChartOptions::default()).unwrap();
        let second = render_chart_png(&data, &ChartOptions::default()).unwrap();

        assert!(first.starts_with(&[0x89, b'P', b'N', b'G']));
        assert_eq!(first, second);

        let zero = ChartOptions {
            width: 400,
            height: 0,
        };
        assert!(matches!(
            render_chart_png(&data, &zero),
            Err(ReportError::Chart(_))
        ));
    }

    #[test]
    fn test_padded_flat_range() {
        assert_eq!(padded((70.0, 70.0), 1.0), (69.0, 71.0));
        let (lo, hi) = padded((60.0, 80.0), 1.0);
        assert!(lo < 60.0 && hi > 80.0);
    }
}
