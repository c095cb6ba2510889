//! PDF report rendering from a metrics record.
//!
//! The report is a linear stream of sections drawn top to bottom on A4
//! pages; `PageCursor` owns the page-break arithmetic. Sections for metrics
//! that were not computed are skipped, never errors.

pub mod charts;
pub mod layout;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use tracing::debug;

use crate::health::{HNR_FLOOR_DB, JITTER_LIMIT_PERCENT, SHIMMER_LIMIT_PERCENT};
use crate::metrics::MetricsRecord;
use crate::report::charts::{color, draw_gauge, draw_pitch_chart, stroke_line};
use crate::report::layout::{PageCursor, MARGIN_MM, PAGE_WIDTH_MM};

const TITLE: &str = "Vocal Analysis Report";
const BODY_X: f64 = MARGIN_MM + 5.0;
const CONTENT_WIDTH: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const GAUGE_WIDTH: f64 = 80.0;

struct ReportFonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl ReportFonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let load = |font: BuiltinFont| {
            doc.add_builtin_font(font)
                .map_err(|e| anyhow!("failed to register builtin font: {e}"))
        };
        Ok(Self {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
            italic: load(BuiltinFont::HelveticaOblique)?,
        })
    }
}

/// Read a metrics JSON file and render the PDF next to it (or at `output`).
/// Unreadable or unparseable input is fatal.
pub fn render_report_file(metrics_path: &Path, output: &Path) -> Result<()> {
    let data = std::fs::read_to_string(metrics_path)
        .with_context(|| format!("Failed to read metrics file: {}", metrics_path.display()))?;
    let record: MetricsRecord = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse metrics JSON: {}", metrics_path.display()))?;
    render_report(&record, output)
}

/// Render a metrics record into an A4 PDF at `output`.
pub fn render_report(record: &MetricsRecord, output: &Path) -> Result<()> {
    let (doc, page, layer) = PdfDocument::new(
        TITLE,
        Mm(PAGE_WIDTH_MM as f32),
        Mm(layout::PAGE_HEIGHT_MM as f32),
        "Layer 1",
    );
    let fonts = ReportFonts::load(&doc)?;
    let mut cursor = PageCursor::new(&doc, doc.get_page(page).get_layer(layer));

    draw_header(&mut cursor, &fonts);
    match &record.error {
        Some(reason) => draw_failure_notice(&mut cursor, &fonts, reason),
        None => {
            draw_overview(&mut cursor, &fonts, record);
            draw_stability(&mut cursor, &fonts, record);
            draw_resonance(&mut cursor, &fonts, record);
            draw_contour_chart(&mut cursor, &fonts, record);
            draw_summary(&mut cursor, &fonts, record);
        }
    }
    draw_closing_notes(&mut cursor, &fonts);
    debug!(pages = cursor.pages(), "report laid out");

    let file = File::create(output)
        .with_context(|| format!("Failed to create output file: {}", output.display()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| anyhow!("failed to write PDF: {e}"))?;
    Ok(())
}

fn draw_header(cursor: &mut PageCursor, fonts: &ReportFonts) {
    let layer = cursor.layer();
    layer.set_fill_color(color(0.18, 0.53, 0.76));
    layer.use_text(
        TITLE,
        20.0,
        Mm((MARGIN_MM + 32.0) as f32),
        Mm(cursor.y() as f32),
        &fonts.bold,
    );
    cursor.advance(6.0);
    let layer = cursor.layer();
    layer.set_outline_color(color(0.18, 0.53, 0.76));
    layer.set_outline_thickness(1.2);
    stroke_line(
        layer,
        MARGIN_MM,
        cursor.y(),
        PAGE_WIDTH_MM - MARGIN_MM,
        cursor.y(),
    );
    cursor.advance(14.0);
}

fn draw_failure_notice(cursor: &mut PageCursor, fonts: &ReportFonts, reason: &str) {
    section_title(cursor, fonts, "Analysis Failed");
    body_line(
        cursor,
        fonts,
        "The recording could not be analyzed:".to_string(),
    );
    let layer = cursor.layer();
    layer.set_fill_color(color(0.86, 0.27, 0.22));
    layer.use_text(
        reason,
        12.0,
        Mm(BODY_X as f32),
        Mm(cursor.y() as f32),
        &fonts.italic,
    );
    cursor.advance(8.0);
    body_line(
        cursor,
        fonts,
        "Please record again in a quiet environment, holding a steady tone.".to_string(),
    );
    cursor.advance(4.0);
}

fn draw_overview(cursor: &mut PageCursor, fonts: &ReportFonts, record: &MetricsRecord) {
    section_title(cursor, fonts, "Overview");
    body_line(cursor, fonts, format!("Exercise: {}", record.exercise));
    body_line(
        cursor,
        fonts,
        format!("Duration: {:.2} s", record.duration_seconds),
    );
    body_line(
        cursor,
        fonts,
        format!(
            "Mean pitch: {} ({})",
            fmt_hz(record.pitch_hz_mean),
            record.pitch_note.as_deref().unwrap_or("N/A")
        ),
    );
    if record.pitch_hz_min.is_some() || record.pitch_hz_max.is_some() {
        body_line(
            cursor,
            fonts,
            format!(
                "Pitch span: {} - {}",
                fmt_hz(record.pitch_hz_min),
                fmt_hz(record.pitch_hz_max)
            ),
        );
    }
    if let Some(semitones) = record.range_semitones {
        body_line(
            cursor,
            fonts,
            format!("Sung range: {semitones:.1} semitones"),
        );
    }
    body_line(
        cursor,
        fonts,
        format!(
            "Vocal range: {}",
            record.vocal_range.as_deref().unwrap_or("Unclassified")
        ),
    );
    if let Some(db) = record.intensity_db {
        body_line(cursor, fonts, format!("Mean intensity: {db:.1} dB"));
    }
    cursor.advance(4.0);
}

fn draw_stability(cursor: &mut PageCursor, fonts: &ReportFonts, record: &MetricsRecord) {
    if record.jitter_percent.is_none()
        && record.shimmer_percent.is_none()
        && record.hnr_db.is_none()
    {
        return;
    }
    section_title(cursor, fonts, "Voice Stability");
    if let Some(jitter) = record.jitter_percent {
        gauge_row(
            cursor,
            fonts,
            &format!("Jitter: {jitter:.2} %"),
            jitter / (2.0 * JITTER_LIMIT_PERCENT),
            0.5,
            jitter > JITTER_LIMIT_PERCENT,
        );
    }
    if let Some(shimmer) = record.shimmer_percent {
        gauge_row(
            cursor,
            fonts,
            &format!("Shimmer: {shimmer:.2} %"),
            shimmer / (2.0 * SHIMMER_LIMIT_PERCENT),
            0.5,
            shimmer > SHIMMER_LIMIT_PERCENT,
        );
    }
    if let Some(hnr) = record.hnr_db {
        // 30 dB full scale puts the clinical floor at 40% of the track.
        gauge_row(
            cursor,
            fonts,
            &format!("HNR: {hnr:.1} dB"),
            hnr / 30.0,
            HNR_FLOOR_DB / 30.0,
            hnr < HNR_FLOOR_DB,
        );
    }
    cursor.advance(4.0);
}

fn draw_resonance(cursor: &mut PageCursor, fonts: &ReportFonts, record: &MetricsRecord) {
    if record.formant1_hz.is_none() && record.formant2_hz.is_none() && record.vibrato.is_none() {
        return;
    }
    section_title(cursor, fonts, "Resonance & Vibrato");
    if record.formant1_hz.is_some() || record.formant2_hz.is_some() {
        body_line(
            cursor,
            fonts,
            format!("Formant 1 (F1): {}", fmt_hz(record.formant1_hz)),
        );
        body_line(
            cursor,
            fonts,
            format!("Formant 2 (F2): {}", fmt_hz(record.formant2_hz)),
        );
    }
    if let Some(vibrato) = &record.vibrato {
        if vibrato.is_present {
            body_line(
                cursor,
                fonts,
                format!(
                    "Vibrato: present, {:.1} Hz, extent {:.2} semitones",
                    vibrato.rate_hz, vibrato.extent_semitones
                ),
            );
        } else {
            body_line(cursor, fonts, "Vibrato: not detected".to_string());
        }
    }
    cursor.advance(4.0);
}

fn draw_contour_chart(cursor: &mut PageCursor, fonts: &ReportFonts, record: &MetricsRecord) {
    let Some(track) = &record.pitch_track else {
        return;
    };
    const CHART_HEIGHT: f64 = 50.0;
    cursor.ensure_space(CHART_HEIGHT + 20.0);
    section_title(cursor, fonts, "Pitch Contour");
    cursor.advance(CHART_HEIGHT);
    let drawn = draw_pitch_chart(
        cursor.layer(),
        track,
        BODY_X,
        cursor.y(),
        CONTENT_WIDTH - 10.0,
        CHART_HEIGHT,
    );
    if drawn {
        cursor.advance(6.0);
        let layer = cursor.layer();
        layer.set_fill_color(color(0.3, 0.3, 0.3));
        layer.use_text(
            format!(
                "{} - {} over {:.2} s",
                fmt_hz(record.pitch_hz_min),
                fmt_hz(record.pitch_hz_max),
                record.duration_seconds
            ),
            9.0,
            Mm(BODY_X as f32),
            Mm(cursor.y() as f32),
            &fonts.regular,
        );
        cursor.advance(8.0);
    } else {
        body_line(cursor, fonts, "No voiced frames to chart.".to_string());
    }
}

fn draw_summary(cursor: &mut PageCursor, fonts: &ReportFonts, record: &MetricsRecord) {
    let Some(health) = &record.health else {
        if record.warnings.is_empty() {
            return;
        }
        section_title(cursor, fonts, "Notes");
        for warning in &record.warnings {
            body_line(cursor, fonts, format!("- {warning}"));
        }
        cursor.advance(4.0);
        return;
    };

    section_title(cursor, fonts, "Voice Health");
    let healthy = health == "Normal";
    let layer = cursor.layer();
    if healthy {
        layer.set_fill_color(color(0.26, 0.66, 0.37));
    } else {
        layer.set_fill_color(color(0.86, 0.27, 0.22));
    }
    layer.use_text(
        health.as_str(),
        13.0,
        Mm(BODY_X as f32),
        Mm(cursor.y() as f32),
        &fonts.bold,
    );
    cursor.advance(8.0);

    if healthy {
        body_line(
            cursor,
            fonts,
            "Stability metrics are within the recommended limits.".to_string(),
        );
    } else {
        body_line(
            cursor,
            fonts,
            "Some stability metrics are outside the recommended limits;".to_string(),
        );
        body_line(
            cursor,
            fonts,
            "consider gentle warm-ups and avoid vocal strain.".to_string(),
        );
    }
    for warning in &record.warnings {
        body_line(cursor, fonts, format!("- {warning}"));
    }
    cursor.advance(4.0);
}

fn draw_closing_notes(cursor: &mut PageCursor, fonts: &ReportFonts) {
    cursor.ensure_space(24.0);
    let lines = [
        "This report is generated automatically from the submitted recording.",
        "Use it as a companion to your singing practice.",
        "Keep training and discover the full potential of your voice!",
    ];
    for line in lines {
        cursor.ensure_space(6.0);
        let layer = cursor.layer();
        layer.set_fill_color(color(0.0, 0.0, 0.0));
        layer.use_text(
            line,
            10.0,
            Mm(MARGIN_MM as f32),
            Mm(cursor.y() as f32),
            &fonts.italic,
        );
        cursor.advance(5.5);
    }
}

fn section_title(cursor: &mut PageCursor, fonts: &ReportFonts, title: &str) {
    cursor.ensure_space(20.0);
    let layer = cursor.layer();
    layer.set_fill_color(color(0.12, 0.38, 0.55));
    layer.use_text(
        title,
        14.0,
        Mm(MARGIN_MM as f32),
        Mm(cursor.y() as f32),
        &fonts.bold,
    );
    cursor.advance(8.0);
}

fn body_line(cursor: &mut PageCursor, fonts: &ReportFonts, text: String) {
    cursor.ensure_space(6.0);
    let layer = cursor.layer();
    layer.set_fill_color(color(0.0, 0.0, 0.0));
    layer.use_text(
        text,
        11.0,
        Mm(BODY_X as f32),
        Mm(cursor.y() as f32),
        &fonts.regular,
    );
    cursor.advance(6.0);
}

fn gauge_row(
    cursor: &mut PageCursor,
    fonts: &ReportFonts,
    label: &str,
    fill_fraction: f64,
    limit_fraction: f64,
    exceeded: bool,
) {
    cursor.ensure_space(10.0);
    let layer = cursor.layer();
    layer.set_fill_color(color(0.0, 0.0, 0.0));
    layer.use_text(
        label,
        11.0,
        Mm(BODY_X as f32),
        Mm(cursor.y() as f32),
        &fonts.regular,
    );
    draw_gauge(
        cursor.layer(),
        BODY_X + GAUGE_WIDTH,
        cursor.y() - 1.0,
        GAUGE_WIDTH,
        fill_fraction,
        limit_fraction,
        exceeded,
    );
    cursor.advance(9.0);
}

fn fmt_hz(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1} Hz"),
        None => "N/A".to_string(),
    }
}
