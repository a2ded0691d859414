//! One-page PDF report layout for a single dataset.
//!
//! The layout depends only on the dataset and the generation timestamp, so
//! the handler captures the timestamp once and threads it through.

use chrono::{DateTime, Utc};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb,
};
use thiserror::Error;

use crate::entity::dataset;

/// Rendered in place of a mean whose source column held no numeric values.
pub const METRIC_PLACEHOLDER: &str = "N/A";

const PAGE_WIDTH_MM: f32 = 215.9; // US Letter
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 25.0;
const TABLE_ROW_HEIGHT_MM: f32 = 10.0;
const TABLE_COL_WIDTH_MM: f32 = 76.2; // 3 inches, two columns

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// Render the summary report for one dataset as PDF bytes.
pub fn render_dataset_report(
    dataset: &dataset::Model,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(
        "Chemical Equipment Analysis Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let oblique = doc.add_builtin_font(BuiltinFont::HelveticaOblique)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut cursor = PAGE_HEIGHT_MM - 35.0;

    layer.use_text(
        "Chemical Equipment Analysis Report",
        18.0,
        Mm(MARGIN_MM),
        Mm(cursor),
        &bold,
    );
    cursor -= 14.0;

    for info in [
        format!("Dataset: {}", dataset.name),
        format!(
            "Upload Date: {}",
            dataset.uploaded_at.format("%Y-%m-%d %H:%M")
        ),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M")),
    ] {
        layer.use_text(info, 11.0, Mm(MARGIN_MM), Mm(cursor), &regular);
        cursor -= 6.0;
    }
    cursor -= 8.0;

    layer.use_text("Summary Statistics", 14.0, Mm(MARGIN_MM), Mm(cursor), &bold);
    cursor -= 10.0;

    let table_rows = [
        ("Metric".to_string(), "Value".to_string()),
        (
            "Total Equipment".to_string(),
            dataset.total_count.to_string(),
        ),
        (
            "Average Flowrate".to_string(),
            format_metric(dataset.avg_flowrate),
        ),
        (
            "Average Pressure".to_string(),
            format_metric(dataset.avg_pressure),
        ),
        (
            "Average Temperature".to_string(),
            format_metric(dataset.avg_temperature),
        ),
    ];
    let table_bottom = draw_metric_table(&layer, &table_rows, cursor, &regular, &bold);

    layer.use_text(
        "Generated by Chemical Equipment Parameter Visualizer",
        10.0,
        Mm(MARGIN_MM),
        Mm(table_bottom - 15.0),
        &oblique,
    );

    Ok(doc.save_to_bytes()?)
}

/// Format a mean to 2 decimal places, or the placeholder when absent.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => METRIC_PLACEHOLDER.to_string(),
    }
}

/// Draw a bordered two-column table whose top edge sits at `top`.
/// Returns the y coordinate of the table's bottom edge.
fn draw_metric_table(
    layer: &PdfLayerReference,
    rows: &[(String, String)],
    top: f32,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) -> f32 {
    let left = MARGIN_MM;
    let right = MARGIN_MM + 2.0 * TABLE_COL_WIDTH_MM;
    let bottom = top - rows.len() as f32 * TABLE_ROW_HEIGHT_MM;

    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(0.5);

    for i in 0..=rows.len() {
        let y = top - i as f32 * TABLE_ROW_HEIGHT_MM;
        draw_segment(layer, left, y, right, y);
    }
    for x in [left, left + TABLE_COL_WIDTH_MM, right] {
        draw_segment(layer, x, bottom, x, top);
    }

    for (i, (metric, value)) in rows.iter().enumerate() {
        // Header row in bold, body rows regular.
        let font = if i == 0 { bold } else { regular };
        let y = top - (i + 1) as f32 * TABLE_ROW_HEIGHT_MM + 3.5;
        layer.use_text(metric.clone(), 11.0, Mm(left + 3.0), Mm(y), font);
        layer.use_text(
            value.clone(),
            11.0,
            Mm(left + TABLE_COL_WIDTH_MM + 3.0),
            Mm(y),
            font,
        );
    }

    bottom
}

fn draw_segment(layer: &PdfLayerReference, x1: f32, y1: f32, x2: f32, y2: f32) {
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y1)), false),
            (Point::new(Mm(x2), Mm(y2)), false),
        ],
        is_closed: false,
    });
}
