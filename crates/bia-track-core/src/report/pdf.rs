//! PDF rendering of a composed report.
//!
//! The chart is embedded as a raster; every caption is drawn by the PDF in
//! the built-in Helvetica faces. Those faces only cover WinAnsi, so strings
//! are folded with [`latin_text`] before they are drawn.

use std::io::BufWriter;

use printpdf::image_crate::load_from_memory;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rgb,
};

use super::{axis_ranges, render_chart_png, ChartOptions, ReportDocument, ReportError, ReportResult};
use crate::trend::Series;

// A4 portrait, millimetres
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const TOP: f32 = PAGE_HEIGHT - 20.0;
const CHART_MAX_WIDTH: f32 = 180.0;
const CHART_MAX_HEIGHT: f32 = 120.0;
const ROW_HEIGHT: f32 = 5.0;
const MM_PER_INCH: f32 = 25.4;

const COLOR_TITLE: (u8, u8, u8) = (0x2C, 0x3E, 0x50);
const COLOR_BLACK: (u8, u8, u8) = (0, 0, 0);
const COLOR_GRAY: (u8, u8, u8) = (128, 128, 128);
const COLOR_RISK: (u8, u8, u8) = (0xC0, 0x39, 0x2B);
const COLOR_WEIGHT: (u8, u8, u8) = (0x29, 0x80, 0xB9);
const COLOR_IMPEDANCE: (u8, u8, u8) = (0x8E, 0x44, 0xAD);

/// Render `document` with a chart of `series` as PDF bytes.
pub(super) fn render_pdf(
    document: &ReportDocument,
    series: &Series,
    options: &ChartOptions,
) -> ReportResult<Vec<u8>> {
    let png = render_chart_png(series, options)?;
    let chart = load_from_memory(&png).map_err(pdf_error)?;

    let (doc, page, layer) = PdfDocument::new(
        latin_text(&document.title),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Report",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = TOP;

    add_text(&layer, &font_bold, &document.title, MARGIN, y, 18.0, COLOR_TITLE);
    y -= 10.0;
    for (caption, value) in [
        (&document.captions.patient, &document.patient_name),
        (&document.captions.contact, &document.contact),
        (&document.captions.condition, &document.condition_label),
    ] {
        add_text(&layer, &font_bold, caption, MARGIN, y, 11.0, COLOR_BLACK);
        add_text(&layer, &font, value, MARGIN + 30.0, y, 11.0, COLOR_BLACK);
        y -= 6.0;
    }
    y -= 2.0;
    add_line(&layer, (MARGIN, y), (PAGE_WIDTH - MARGIN, y), COLOR_GRAY, 0.5);
    y -= 6.0;

    add_text(&layer, &font_bold, &document.condition_label, MARGIN, y, 12.0, COLOR_TITLE);
    y -= 3.0;

    // Scale the raster to the widest box that still fits the height cap
    let dpi = (options.width as f32 * MM_PER_INCH / CHART_MAX_WIDTH)
        .max(options.height as f32 * MM_PER_INCH / CHART_MAX_HEIGHT);
    let chart_height = options.height as f32 * MM_PER_INCH / dpi;
    Image::from_dynamic_image(&chart).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(MARGIN)),
            translate_y: Some(Mm(y - chart_height)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    y -= chart_height + 6.0;

    let ((weight_lo, weight_hi), (impedance_lo, impedance_hi)) = axis_ranges(series);
    add_legend_entry(
        &layer,
        &font,
        &format!("{}: {:.1} - {:.1}", document.captions.weight, weight_lo, weight_hi),
        MARGIN,
        y,
        COLOR_WEIGHT,
        false,
    );
    add_legend_entry(
        &layer,
        &font,
        &format!(
            "{}: {:.0} - {:.0}",
            document.captions.impedance, impedance_lo, impedance_hi
        ),
        MARGIN + 90.0,
        y,
        COLOR_IMPEDANCE,
        true,
    );
    y -= ROW_HEIGHT;
    if let (Some(first), Some(last)) = (series.timestamps.first(), series.timestamps.last()) {
        let span = format!(
            "{}: {} - {}",
            document.captions.date,
            first.format("%Y-%m-%d %H:%M"),
            last.format("%Y-%m-%d %H:%M")
        );
        add_text(&layer, &font, &span, MARGIN, y, 9.0, COLOR_GRAY);
    }
    y -= 10.0;

    add_text(&layer, &font_bold, &document.captions.history, MARGIN, y, 12.0, COLOR_BLACK);
    y -= 7.0;
    for row in &document.history {
        if y < MARGIN {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "History");
            layer = doc.get_page(page).get_layer(page_layer);
            y = TOP;
        }
        let color = if row.status.is_at_risk() {
            COLOR_RISK
        } else {
            COLOR_BLACK
        };
        add_text(&layer, &font, &row.text_line(), MARGIN, y, 9.0, color);
        y -= ROW_HEIGHT;
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).map_err(pdf_error)?;
    writer.into_inner().map_err(pdf_error)
}

/// Fold text into the WinAnsi range the built-in fonts can show.
///
/// Turkish letters lose their marks, `Ω` becomes `Ohm`, anything else outside
/// Latin-1 becomes `?`.
fn latin_text(text: &str) -> String {
    let text = text.replace("Ohm Ω", "Ohm");
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => out.push(c),
            'Ω' => out.push_str("Ohm"),
            'İ' => out.push('I'),
            'ı' => out.push('i'),
            'Ş' => out.push('S'),
            'ş' => out.push('s'),
            'Ğ' => out.push('G'),
            'ğ' => out.push('g'),
            _ => out.push('?'),
        }
    }
    out
}

fn rgb(color: (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(color.0) / 255.0,
        f32::from(color.1) / 255.0,
        f32::from(color.2) / 255.0,
        None,
    ))
}

fn add_text(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: f32,
    y: f32,
    size: f32,
    color: (u8, u8, u8),
) {
    layer.set_fill_color(rgb(color));
    layer.use_text(latin_text(text), size, Mm(x), Mm(y), font);
}

fn add_line(
    layer: &PdfLayerReference,
    from: (f32, f32),
    to: (f32, f32),
    color: (u8, u8, u8),
    width: f32,
) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(width);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(from.0), Mm(from.1)), false),
            (Point::new(Mm(to.0), Mm(to.1)), false),
        ],
        is_closed: false,
    });
}

/// A short line sample in the series colour followed by its caption.
fn add_legend_entry(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    x: f32,
    y: f32,
    color: (u8, u8, u8),
    dashed: bool,
) {
    let mid = y + 1.2;
    if dashed {
        add_line(layer, (x, mid), (x + 3.0, mid), color, 1.5);
        add_line(layer, (x + 4.5, mid), (x + 7.5, mid), color, 1.5);
        add_line(layer, (x + 9.0, mid), (x + 10.0, mid), color, 1.5);
    } else {
        add_line(layer, (x, mid), (x + 10.0, mid), color, 1.5);
    }
    add_text(layer, font, text, x + 12.0, y, 9.0, color);
}

fn pdf_error<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Pdf(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_text_folds_unsupported_letters() {
        assert_eq!(latin_text("RİSK: ÖDEM!"), "RISK: ÖDEM!");
        assert_eq!(latin_text("Kalp yetmezliği"), "Kalp yetmezligi");
        assert_eq!(latin_text("BIA (Ohm Ω)"), "BIA (Ohm)");
        assert_eq!(latin_text("BIA: 515 Ω"), "BIA: 515 Ohm");
        assert_eq!(latin_text("Gewicht (kg) Größe"), "Gewicht (kg) Größe");
        assert_eq!(latin_text("体重"), "??");
    }
}
