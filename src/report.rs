//! Doctor visit summary: report assembly from a [`CareSummary`] and PDF export.
//!
//! The report is plain data first so it can be previewed or serialized; the
//! PDF is rendered from it with `printpdf` built-in fonts.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use printpdf::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::intelligence::CareSummary;

pub const REPORT_TITLE: &str = "CarePilot \u{2014} Doctor Visit Summary";
/// Only the first actions are printed; the summary keeps the full list.
pub const ACTION_DISPLAY_LIMIT: usize = 8;

const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M";
const WRAP_CHARS: usize = 95;

// ─── Types ────────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Cannot write report: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSection {
    pub heading: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisitReport {
    pub title: String,
    pub recipient_name: String,
    pub generated: String,
    pub sections: Vec<ReportSection>,
}

// ─── Assembly ─────────────────────────────────────────────────────────────────

pub fn build_report(
    recipient_name: &str,
    summary: &CareSummary,
    generated_at: NaiveDateTime,
) -> VisitReport {
    let flags = if summary.flags.is_empty() {
        vec!["None".to_string()]
    } else {
        summary
            .flags
            .iter()
            .map(|f| format!("{}: {} \u{2014} {}", f.level.as_str(), f.title, f.detail))
            .collect()
    };

    VisitReport {
        title: REPORT_TITLE.to_string(),
        recipient_name: recipient_name.to_string(),
        generated: generated_at.format(GENERATED_FORMAT).to_string(),
        sections: vec![
            ReportSection {
                heading: "Summary".into(),
                items: summary.lines.clone(),
            },
            ReportSection {
                heading: "Recommended Next Actions".into(),
                items: summary
                    .actions
                    .iter()
                    .take(ACTION_DISPLAY_LIMIT)
                    .cloned()
                    .collect(),
            },
            ReportSection {
                heading: "Detected Risk Flags".into(),
                items: flags,
            },
        ],
    }
}

/// Default export file name for a recipient.
pub fn report_filename(recipient_id: &Uuid) -> String {
    format!("doctor_summary_{recipient_id}.pdf")
}

// ─── PDF generation ───────────────────────────────────────────────────────────

const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const TOP: Mm = Mm(258.0);
const BOTTOM: Mm = Mm(28.0);

/// Writes lines top to bottom, starting a new page when the bottom margin
/// is reached.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: Mm,
    pages: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page1, layer1) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;

        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: TOP,
            pages: 1,
        })
    }

    fn text(&mut self, text: &str, size: f32, x: Mm, bold: bool, advance: Mm) {
        if self.y < BOTTOM {
            self.new_page();
        }
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(text, size, x, self.y, font);
        self.y -= advance;
    }

    fn gap(&mut self, amount: Mm) {
        self.y -= amount;
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) =
            self.doc
                .add_page(PAGE_WIDTH, PAGE_HEIGHT, format!("Layer {}", self.pages));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ReportError::Pdf(format!("buffer error: {e}")))
    }
}

/// Renders the report to PDF bytes.
pub fn generate_report_pdf(report: &VisitReport) -> Result<Vec<u8>, ReportError> {
    let mut page = PageWriter::new(&report.title)?;

    page.text(&report.title, 16.0, Mm(18.0), true, Mm(10.0));
    page.text(
        &format!("Care Recipient: {}", report.recipient_name),
        12.0,
        Mm(18.0),
        false,
        Mm(7.0),
    );
    page.text(
        &format!("Generated: {}", report.generated),
        12.0,
        Mm(18.0),
        false,
        Mm(10.0),
    );

    for section in &report.sections {
        page.text(&section.heading, 12.0, Mm(18.0), true, Mm(6.5));
        for item in &section.items {
            for (i, line) in wrap_text(item, WRAP_CHARS).iter().enumerate() {
                let text = if i == 0 {
                    format!("- {line}")
                } else {
                    format!("  {line}")
                };
                page.text(&text, 11.0, Mm(21.0), false, Mm(5.0));
            }
        }
        page.gap(Mm(3.5));
    }

    let pages = page.pages;
    let bytes = page.finish()?;
    tracing::debug!(pages, bytes = bytes.len(), "Visit report rendered");
    Ok(bytes)
}

/// Saves PDF bytes under `dir`, creating it if needed.
pub fn export_report_to_file(
    pdf_bytes: &[u8],
    dir: &Path,
    filename: &str,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, pdf_bytes)?;
    tracing::info!(path = %path.display(), "Visit report exported");
    Ok(path)
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

// ─── Tests ────────────────────────────────────────────────────────────────────
