//! PDF rendering of the screening report via `printpdf`.
//!
//! Uses the builtin Helvetica fonts, which only cover Latin-1; other
//! characters are replaced with '?'. Rendering is CPU-bound and must run
//! inside `tokio::task::spawn_blocking`.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};

use crate::errors::AppError;
use crate::models::session::Gender;
use crate::report::summary::ReportData;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MM: f32 = 20.0;
const INDENT_MM: f32 = 25.0;
const TOP_MM: f32 = 280.0;
const BOTTOM_MM: f32 = 24.0;
const BODY_SIZE: f32 = 10.0;
const BODY_LINE_MM: f32 = 5.0;
const WRAP_CHARS: usize = 90;
const FOOTER_SIZE: f32 = 7.5;
const FOOTER_TOP_MM: f32 = 15.0;
const FOOTER_LINE_MM: f32 = 3.5;
const FOOTER_WRAP_CHARS: usize = 120;

pub const DISCLAIMER: &str = "This document is the result of a self-screening and is not a medical \
    diagnosis. If you are struggling, please talk to a doctor or mental health professional.";

/// Renders the report to PDF bytes.
pub fn create_report_pdf(data: &ReportData) -> Result<Vec<u8>, AppError> {
    render(data).map(|(bytes, _)| bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageStats {
    pages: usize,
    footers: usize,
}

fn render(data: &ReportData) -> Result<(Vec<u8>, PageStats), AppError> {
    let title = "Depression Self-Screening Report";
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Pdf(format!("font error: {e}")))?;

    let mut writer = PageWriter {
        layer: doc.get_page(page).get_layer(layer),
        doc: &doc,
        regular,
        bold,
        y: TOP_MM,
        stats: PageStats {
            pages: 1,
            footers: 0,
        },
    };
    writer.footer();

    writer.heading(title, 16.0);
    writer.line(&format!("Date: {}", data.date.format("%Y-%m-%d")));
    writer.gap(4.0);

    writer.heading("Personal information", 12.0);
    writer.line(&format!("Name: {}", data.name));
    writer.line(&format!(
        "Gender: {}",
        match data.gender {
            Some(Gender::Male) => "Male",
            Some(Gender::Female) => "Female",
            None => "-",
        }
    ));
    writer.line(&format!(
        "Age: {}",
        data.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string())
    ));
    writer.gap(4.0);

    writer.heading("Screening scores", 12.0);
    writer.line(&format!("Screening questions: {} points", data.question_score));
    writer.line(&format!("Narrative answer: {} points", data.narrative_points));
    writer.bold_line(&format!(
        "Total: {} points - {}",
        data.total_score,
        data.severity.title()
    ));
    writer.paragraph(data.severity.guidance());
    writer.gap(4.0);

    if !data.main_symptoms.is_empty() {
        writer.heading("Main symptoms", 12.0);
        writer.paragraph(&data.main_symptoms);
        writer.gap(4.0);
    }
    if !data.past_history.is_empty() {
        writer.heading("Past history", 12.0);
        writer.paragraph(&data.past_history);
        writer.gap(4.0);
    }

    writer.heading("Summary", 12.0);
    writer.paragraph(&data.narrative.summary);
    writer.gap(4.0);

    if !data.narrative.key_findings.is_empty() {
        writer.heading("Key findings", 12.0);
        for finding in &data.narrative.key_findings {
            writer.bullet(finding);
        }
        writer.gap(4.0);
    }
    if !data.narrative.recommendations.is_empty() {
        writer.heading("Recommendations", 12.0);
        for recommendation in &data.narrative.recommendations {
            writer.bullet(recommendation);
        }
        writer.gap(4.0);
    }

    let stats = writer.stats;
    drop(writer);

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| AppError::Pdf(format!("save error: {e}")))?;
    let bytes = buf
        .into_inner()
        .map_err(|e| AppError::Pdf(format!("buffer error: {e}")))?;
    Ok((bytes, stats))
}

/// Writes lines top-down, starting a new page when the bottom margin is reached.
/// Every page carries the disclaimer footer below the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    stats: PageStats,
}

impl PageWriter<'_> {
    fn ensure_space(&mut self, height: f32) {
        if self.y - height < BOTTOM_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = TOP_MM;
            self.stats.pages += 1;
            self.footer();
        }
    }

    fn footer(&mut self) {
        let mut y = FOOTER_TOP_MM;
        for line in wrap_text(DISCLAIMER, FOOTER_WRAP_CHARS) {
            self.layer
                .use_text(line, FOOTER_SIZE, Mm(LEFT_MM), Mm(y), &self.regular);
            y -= FOOTER_LINE_MM;
        }
        self.stats.footers += 1;
    }

    fn heading(&mut self, text: &str, size: f32) {
        let height = size * 0.6;
        self.ensure_space(height);
        self.layer
            .use_text(pdf_safe(text), size, Mm(LEFT_MM), Mm(self.y), &self.bold);
        self.y -= height;
    }

    fn line(&mut self, text: &str) {
        self.ensure_space(BODY_LINE_MM);
        self.layer.use_text(
            pdf_safe(text),
            BODY_SIZE,
            Mm(INDENT_MM),
            Mm(self.y),
            &self.regular,
        );
        self.y -= BODY_LINE_MM;
    }

    fn bold_line(&mut self, text: &str) {
        self.ensure_space(BODY_LINE_MM);
        self.layer
            .use_text(pdf_safe(text), BODY_SIZE, Mm(INDENT_MM), Mm(self.y), &self.bold);
        self.y -= BODY_LINE_MM;
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, WRAP_CHARS) {
            self.line(&line);
        }
    }

    fn bullet(&mut self, text: &str) {
        for (i, line) in wrap_text(text, WRAP_CHARS - 4).into_iter().enumerate() {
            let prefix = if i == 0 { "-  " } else { "   " };
            self.line(&format!("{prefix}{line}"));
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Greedy word wrap by character count. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0usize;

        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(width) {
                let piece: String = piece.iter().collect();
                let len = piece.chars().count();
                if current_len > 0 && current_len + 1 + len > width {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(&piece);
                current_len += len;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

/// Maps text onto what the builtin fonts can show.
pub fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' => ' ',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            c if c.is_control() => ' ',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}
