// Glucose table document: title band + column header on every page, page footer

use crate::config::ReportConfig;
use crate::models::NormalizedReading;
use crate::pdf::{Align, FontStyle, PageDecorator, PageSize, PdfDocument};
use crate::version;

/// Placeholder in the footer replaced by the total page count on finish.
pub const PAGE_COUNT_ALIAS: &str = "{nb}";

const TITLE_Y: f64 = 0.2;
const TITLE_HEIGHT: f64 = 0.4;
const TITLE_GAP: f64 = 0.5;
const TITLE_FONT_PT: f64 = 15.0;

const ROW_INDENT: f64 = 1.35;
const COLUMN_WIDTH: f64 = 1.7;
const ROW_HEIGHT: f64 = 0.3;
const BODY_FONT_PT: f64 = 12.0;

const FOOTER_Y: f64 = -0.5;
const FOOTER_HEIGHT: f64 = 0.4;
const FOOTER_FONT_PT: f64 = 8.0;

/// Title and column headings; passed in when a renderer is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLayout {
    pub title: String,
    pub columns: [String; 3],
}

impl ReportLayout {
    pub fn new(title: impl Into<String>, columns: [&str; 3]) -> Self {
        Self {
            title: title.into(),
            columns: columns.map(str::to_string),
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(
            config.title.clone(),
            ["Date", "Time", config.value_header.as_str()],
        )
    }
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

impl PageDecorator for ReportLayout {
    fn page_start(&self, doc: &mut PdfDocument) {
        doc.set_y(TITLE_Y);
        doc.set_font(FontStyle::Bold, TITLE_FONT_PT);
        doc.cell(0.0, TITLE_HEIGHT, &self.title, false, Align::Center, false);
        doc.ln(TITLE_GAP);
        // column headings stay in the title font
        let [date, time, value] = &self.columns;
        table_row(doc, [date.as_str(), time.as_str(), value.as_str()]);
    }

    fn page_end(&self, doc: &mut PdfDocument) {
        doc.set_y(FOOTER_Y);
        doc.set_font(FontStyle::Italic, FOOTER_FONT_PT);
        let label = format!("Page {} / {}", doc.page_no(), PAGE_COUNT_ALIAS);
        doc.cell(0.0, FOOTER_HEIGHT, &label, false, Align::Center, false);
    }
}

fn table_row(doc: &mut PdfDocument, cells: [&str; 3]) {
    doc.cell(ROW_INDENT, 0.0, "", false, Align::Left, false);
    for text in cells {
        doc.cell(COLUMN_WIDTH, ROW_HEIGHT, text, true, Align::Center, false);
    }
    doc.ln(ROW_HEIGHT);
}

/// One document per call. Nothing is shared between renders.
pub struct ReportRenderer {
    layout: ReportLayout,
    doc: PdfDocument,
}

impl ReportRenderer {
    pub fn new(layout: ReportLayout) -> Self {
        let mut doc = PdfDocument::new(PageSize::LETTER);
        doc.set_title(&layout.title);
        doc.set_producer(&version::producer());
        doc.alias_page_count(PAGE_COUNT_ALIAS);
        doc.set_font(FontStyle::Regular, BODY_FONT_PT);
        Self { layout, doc }
    }

    /// Rows in input order, breaking pages at the bottom margin.
    pub fn render(mut self, readings: &[NormalizedReading]) -> Vec<u8> {
        self.doc.add_page(&self.layout);
        for reading in readings {
            if self.doc.would_overflow(ROW_HEIGHT) {
                self.doc.add_page(&self.layout);
            }
            table_row(&mut self.doc, [reading.date(), reading.time(), reading.value()]);
        }
        self.doc.finish(&self.layout)
    }
}

/// Convenience for a single render with a fresh renderer.
pub fn render(layout: &ReportLayout, readings: &[NormalizedReading]) -> Vec<u8> {
    ReportRenderer::new(layout.clone()).render(readings)
}
