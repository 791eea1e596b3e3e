//! PDF adapter: Implementation of `ReportWriter` using lopdf.
//!
//! Lays the report out on A4 pages with 1.5 cm margins. Text uses the
//! standard Helvetica fonts with WinAnsi encoding; characters outside that
//! code page are transliterated. The gauge is embedded as an RGB image.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::domain::{RasterImage, ReportDocument, ReportFigure, GAUGE_TITLE};
use crate::ports::{ReportRenderError, ReportWriter};

/// A4 in points.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;

/// 1.5 cm.
const MARGIN: f32 = 42.52;

/// Space reserved at the bottom of every page for the disclaimer footer.
const FOOTER_HEIGHT: f32 = 34.0;

const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const ROW_HEIGHT: f32 = 18.0;
const VALUE_COLUMN: f32 = 0.68;
const GAUGE_WIDTH: f32 = 300.0;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";
const GAUGE_IMAGE: &str = "Im1";

const BLACK: (u8, u8, u8) = (17, 24, 39);
const MUTED: (u8, u8, u8) = (107, 114, 128);
const HEADER_BLUE: (u8, u8, u8) = (30, 64, 175);
const TABLE_HEADER_BG: (u8, u8, u8) = (224, 242, 254);
const TABLE_BORDER: (u8, u8, u8) = (203, 213, 225);
const WARNING: (u8, u8, u8) = (220, 38, 38);

fn pdf_err(e: impl std::fmt::Display) -> ReportRenderError {
    ReportRenderError::Pdf(e.to_string())
}

fn real(v: f32) -> Object {
    Object::from(v)
}

fn rgb_operands(color: (u8, u8, u8)) -> Vec<Object> {
    [color.0, color.1, color.2]
        .iter()
        .map(|c| real(f32::from(*c) / 255.0))
        .collect()
}

/// Encode text for a WinAnsi Type1 font.
fn win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c as u8),
            '•' => out.push(0x95),
            '–' => out.push(0x96),
            '—' => out.push(0x97),
            '→' => out.extend_from_slice(b"->"),
            '₂' => out.push(b'2'),
            '\u{A0}'..='\u{FF}' => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

/// Rough Helvetica advance width; good enough for wrapping prose.
fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

fn wrap(text: &str, size: f32, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && approx_text_width(&candidate, size) > width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Page-by-page content builder with a top-down cursor.
struct PageLayout {
    pages: Vec<Vec<Operation>>,
    y: f32,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        // `pages` always holds at least one page.
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Start a new page if `height` does not fit above the footer.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN + FOOTER_HEIGHT {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn skip(&mut self, height: f32) {
        self.y -= height;
    }

    fn text_at(&mut self, x: f32, y: f32, text: &str, font: &str, size: f32, color: (u8, u8, u8)) {
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("rg", rgb_operands(color)));
        ops.push(Operation::new("Tf", vec![font.into(), real(size)]));
        ops.push(Operation::new("Td", vec![real(x), real(y)]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Hexadecimal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Write one line at the cursor and move below it.
    fn line(&mut self, text: &str, font: &str, size: f32, color: (u8, u8, u8)) {
        let leading = size * 1.4;
        self.reserve(leading);
        self.y -= leading;
        let y = self.y + size * 0.3;
        self.text_at(MARGIN, y, text, font, size, color);
    }

    fn paragraph(&mut self, text: &str, font: &str, size: f32, color: (u8, u8, u8)) {
        for line in wrap(text, size, CONTENT_WIDTH) {
            self.line(&line, font, size, color);
        }
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Option<(u8, u8, u8)>, stroke: (u8, u8, u8)) {
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("w", vec![real(0.6)]));
        ops.push(Operation::new("RG", rgb_operands(stroke)));
        if let Some(fill) = fill {
            ops.push(Operation::new("rg", rgb_operands(fill)));
        }
        ops.push(Operation::new("re", vec![real(x), real(y), real(w), real(h)]));
        ops.push(Operation::new(if fill.is_some() { "B" } else { "S" }, vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    fn table_row(&mut self, left: &str, right: &str, header: bool) {
        self.reserve(ROW_HEIGHT);
        self.y -= ROW_HEIGHT;
        let y = self.y;
        let split = CONTENT_WIDTH * VALUE_COLUMN;
        let fill = header.then_some(TABLE_HEADER_BG);
        self.rect(MARGIN, y, split, ROW_HEIGHT, fill, TABLE_BORDER);
        self.rect(MARGIN + split, y, CONTENT_WIDTH - split, ROW_HEIGHT, fill, TABLE_BORDER);

        let font = if header { FONT_BOLD } else { FONT_REGULAR };
        self.text_at(MARGIN + 6.0, y + 5.5, left, font, 10.0, BLACK);
        self.text_at(MARGIN + split + 6.0, y + 5.5, right, font, 10.0, BLACK);
    }

    fn image(&mut self, image: &RasterImage) {
        let height = GAUGE_WIDTH * image.height as f32 / image.width.max(1) as f32;
        self.reserve(height + 6.0);
        self.y -= height + 6.0;
        let x = MARGIN + (CONTENT_WIDTH - GAUGE_WIDTH) / 2.0;
        let y = self.y;
        let ops = self.ops();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![real(GAUGE_WIDTH), real(0.0), real(0.0), real(height), real(x), real(y)],
        ));
        ops.push(Operation::new("Do", vec![GAUGE_IMAGE.into()]));
        ops.push(Operation::new("Q", vec![]));
    }

    /// Disclaimer and page number on every page.
    fn finish(mut self, disclaimer: &str) -> Vec<Vec<Operation>> {
        let total = self.pages.len();
        let pages = std::mem::take(&mut self.pages);
        let mut out = Vec::with_capacity(total);
        for (i, ops) in pages.into_iter().enumerate() {
            self.pages = vec![ops];
            let rule_y = MARGIN + FOOTER_HEIGHT - 8.0;
            self.rect(MARGIN, rule_y, CONTENT_WIDTH, 0.0, None, TABLE_BORDER);
            let mut y = rule_y - 10.0;
            for line in wrap(disclaimer, 8.0, CONTENT_WIDTH * 0.8) {
                self.text_at(MARGIN, y, &line, FONT_REGULAR, 8.0, MUTED);
                y -= 10.0;
            }
            let page_label = format!("Page {} of {}", i + 1, total);
            let x = PAGE_WIDTH - MARGIN - approx_text_width(&page_label, 8.0);
            self.text_at(x, rule_y - 10.0, &page_label, FONT_REGULAR, 8.0, MUTED);
            out.extend(std::mem::take(&mut self.pages));
        }
        out
    }
}

fn layout(document: &ReportDocument) -> (Vec<Vec<Operation>>, Option<&RasterImage>) {
    let mut page = PageLayout::new();

    page.line(document.title, FONT_BOLD, 24.0, HEADER_BLUE);
    page.line(document.subtitle, FONT_BOLD, 14.0, BLACK);
    page.line(&document.generated_label(), FONT_REGULAR, 10.0, MUTED);
    page.line(&document.assessed_label(), FONT_REGULAR, 10.0, MUTED);
    page.skip(12.0);

    page.line("Patient Risk Factors", FONT_BOLD, 13.0, BLACK);
    page.skip(4.0);
    page.table_row("Factor", "Value", true);
    for row in &document.rows {
        page.table_row(row.label, &row.value, false);
    }
    page.skip(16.0);

    page.line("Risk Assessment", FONT_BOLD, 13.0, BLACK);
    page.line(document.level.label(), FONT_BOLD, 20.0, document.level.color());
    page.line(&document.probability_label(), FONT_BOLD, 12.0, BLACK);
    page.skip(6.0);
    page.line("Clinical Recommendation:", FONT_BOLD, 11.0, BLACK);
    page.paragraph(document.advice, FONT_REGULAR, 11.0, BLACK);
    page.skip(10.0);

    let image = match &document.figure {
        ReportFigure::Gauge(image) => {
            page.line(
                &format!("{GAUGE_TITLE}: {}", document.probability),
                FONT_BOLD,
                11.0,
                BLACK,
            );
            page.image(image);
            Some(image)
        }
        ReportFigure::Unavailable { warning } => {
            page.paragraph(warning, FONT_BOLD, 10.0, WARNING);
            None
        }
    };

    (page.finish(document.disclaimer), image)
}

/// Writes reports as PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReportWriter;

impl PdfReportWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ReportWriter for PdfReportWriter {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn write(&self, document: &ReportDocument) -> Result<Vec<u8>, ReportRenderError> {
        let (pages, image) = layout(document);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut resources = dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => regular_id,
                FONT_BOLD => bold_id,
            },
        };
        if let Some(image) = image {
            if !image.is_consistent() {
                return Err(pdf_err(format!(
                    "gauge buffer holds {} bytes, expected {}x{}x3",
                    image.pixels.len(),
                    image.width,
                    image.height
                )));
            }
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(image.width),
                    "Height" => i64::from(image.height),
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                },
                image.pixels.clone(),
            ));
            resources.set(
                "XObject",
                dictionary! {
                    GAUGE_IMAGE => image_id,
                },
            );
        }
        let resources_id = doc.add_object(resources);

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations };
            let encoded = content.encode().map_err(pdf_err)?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id: ObjectId = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![real(0.0), real(0.0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
            }),
        );

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(format!("{} - {}", document.title, document.subtitle)),
            "Producer" => Object::string_literal("aerolung"),
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(pdf_err)?;

        tracing::debug!("Wrote PDF report ({} pages, {} bytes)", count, bytes.len());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        classify, render_gauge, PatientField, PatientInput, Probability, ReportFigure, RiskResult,
    };
    use chrono::{Local, TimeZone};

    fn document(figure: ReportFigure) -> ReportDocument {
        let p = Probability::new(0.83).unwrap();
        let verdict = classify(p);
        let result = RiskResult {
            probability: p,
            verdict,
            chart: render_gauge(p, verdict.level),
            input: PatientInput::default(),
            assessed_at: Local.with_ymd_and_hms(2026, 10, 17, 14, 30, 5).unwrap(),
        };
        ReportDocument::from_result(
            &result,
            figure,
            Local.with_ymd_and_hms(2026, 10, 17, 14, 31, 0).unwrap(),
        )
    }

    /// Text of every page, whitespace collapsed so wrapped lines compare whole.
    fn extracted_text(bytes: &[u8]) -> String {
        let parsed = Document::load_mem(bytes).expect("should parse back");
        let pages: Vec<u32> = parsed.get_pages().keys().copied().collect();
        parsed
            .extract_text(&pages)
            .expect("should extract")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_written_report_carries_assessment() {
        let image = RasterImage::filled(80, 50, (255, 255, 255));
        let doc = document(ReportFigure::Gauge(image));
        let text = extracted_text(&PdfReportWriter::new().write(&doc).expect("should render"));

        for field in PatientField::ALL {
            let label = String::from_utf8(win_ansi(field.label())).unwrap();
            assert!(text.contains(&label), "missing row {label:?}");
        }
        assert!(text.contains("Resting SpO2 (%)"));
        assert!(text.contains("High Risk"));
        assert!(text.contains("Probability: 83.0%"));
        assert!(text.contains("Urgent: Schedule chest CT and oncology referral immediately."));
        assert!(text.contains("This AI tool is for screening purposes only"));
        assert!(text.contains("Not a substitute for professional medical diagnosis"));
        assert!(text.contains("Page 1 of 1"));
    }

    #[test]
    fn test_written_report_shows_gauge_warning() {
        let doc = document(ReportFigure::Unavailable {
            warning: "Warning: risk gauge image could not be rendered (no display).".into(),
        });
        let text = extracted_text(&PdfReportWriter::new().write(&doc).expect("should render"));

        assert!(text.contains("Warning: risk gauge image could not be rendered (no display)."));
        assert!(!text.contains(GAUGE_TITLE));
        assert!(text.contains("High Risk"));
    }

    #[test]
    fn test_write_pdf_with_gauge() {
        let image = RasterImage::filled(80, 50, (255, 255, 255));
        let bytes = PdfReportWriter::new()
            .write(&document(ReportFigure::Gauge(image)))
            .expect("should render");
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let parsed = Document::load_mem(&bytes).expect("should parse back");
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn test_write_pdf_with_warning_instead_of_gauge() {
        let doc = document(ReportFigure::Unavailable {
            warning: "Warning: risk gauge image could not be rendered".into(),
        });
        let bytes = PdfReportWriter::new().write(&doc).expect("should render");
        let parsed = Document::load_mem(&bytes).expect("should parse back");
        assert!(!parsed.get_pages().is_empty());
    }

    #[test]
    fn test_inconsistent_image_is_rejected() {
        let mut image = RasterImage::filled(80, 50, (0, 0, 0));
        image.pixels.truncate(10);
        let err = PdfReportWriter::new()
            .write(&document(ReportFigure::Gauge(image)))
            .expect_err("bad buffer");
        assert!(matches!(err, ReportRenderError::Pdf(_)));
    }

    #[test]
    fn test_layout_paginates_long_content() {
        let mut doc = document(ReportFigure::Unavailable {
            warning: "w".into(),
        });
        for _ in 0..60 {
            doc.rows.push(doc.rows[0].clone());
        }
        let (pages, _) = layout(&doc);
        assert!(pages.len() > 1);
    }

    #[test]
    fn test_win_ansi_transliteration() {
        assert_eq!(win_ansi("SpO₂"), b"SpO2".to_vec());
        assert_eq!(win_ansi("1 → 10"), b"1 -> 10".to_vec());
        assert_eq!(win_ansi("a • b"), vec![b'a', b' ', 0x95, b' ', b'b']);
        assert_eq!(win_ansi("漢"), b"?".to_vec());
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap(
            "Urgent: Schedule chest CT and oncology referral immediately.",
            11.0,
            120.0,
        );
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| approx_text_width(l, 11.0) <= 120.0 || !l.contains(' ')));
    }
}
