use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::sanitize;

/// Points per millimetre
pub const MM: f32 = 72.0 / 25.4;

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 10.0 * MM;
const BOTTOM_MARGIN: f32 = 20.0 * MM;

// Helvetica advance widths (1/1000 em) for ASCII 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

impl FontStyle {
    fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Italic => "F3",
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
        }
    }

    const ALL: [FontStyle; 3] = [FontStyle::Regular, FontStyle::Bold, FontStyle::Italic];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const BLUE: Color = Color(0, 0, 255);
}

/// Metadata written to the document's Info dictionary
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub created: DateTime<Local>,
}

#[derive(Default)]
struct Page {
    operations: Vec<Operation>,
    links: Vec<Link>,
}

struct Link {
    rect: [f32; 4],
    uri: String,
}

/// Top-down flowing layout over A4 pages, in the manner of a simple report
/// writer: set a font, emit cells, and let content break onto new pages.
pub struct PdfWriter {
    pages: Vec<Page>,
    style: FontStyle,
    size: f32,
    color: Color,
    y: f32,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            style: FontStyle::Regular,
            size: 12.0,
            color: Color::BLACK,
            y: MARGIN,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn set_font(&mut self, style: FontStyle, size: f32) {
        self.style = style;
        self.size = size;
    }

    pub fn set_text_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Moves the cursor down by `height` points
    pub fn ln(&mut self, height: f32) {
        self.y += height;
    }

    /// Writes one line of text, flattening any line breaks
    pub fn cell(&mut self, height: f32, text: &str, align: Align) {
        let line = sanitize::single_line(text);
        self.write_line(height, &line, align, None);
    }

    /// Writes a block of text wrapped to the printable width. Every wrapped
    /// line carries the link when one is given.
    pub fn multi_cell(&mut self, height: f32, text: &str, align: Align, link: Option<&str>) {
        let lines = wrap(text, self.printable_width(), self.style, self.size);
        for line in &lines {
            self.write_line(height, line, align, link);
        }
    }

    fn printable_width(&self) -> f32 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y + height > PAGE_HEIGHT - BOTTOM_MARGIN {
            self.pages.push(Page::default());
            self.y = MARGIN;
        }
    }

    fn write_line(&mut self, height: f32, line: &str, align: Align, link: Option<&str>) {
        self.ensure_room(height);

        let width = text_width(line, self.style, self.size);
        let x = match align {
            Align::Left => MARGIN,
            Align::Center => MARGIN + ((self.printable_width() - width) / 2.0).max(0.0),
        };
        let top = self.y;
        let baseline = top + 0.5 * height + 0.3 * self.size;

        if !line.is_empty() {
            let Color(r, g, b) = self.color;
            let operations = vec![
                Operation::new(
                    "rg",
                    vec![
                        Object::Real(f32::from(r) / 255.0),
                        Object::Real(f32::from(g) / 255.0),
                        Object::Real(f32::from(b) / 255.0),
                    ],
                ),
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tf",
                    vec![self.style.resource_name().into(), Object::Real(self.size)],
                ),
                Operation::new(
                    "Td",
                    vec![Object::Real(x), Object::Real(PAGE_HEIGHT - baseline)],
                ),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(sanitize::to_latin1_bytes(line))],
                ),
                Operation::new("ET", vec![]),
            ];

            let page = self.current_page();
            page.operations.extend(operations);

            if let Some(uri) = link {
                page.links.push(Link {
                    rect: [x, PAGE_HEIGHT - (top + height), x + width, PAGE_HEIGHT - top],
                    uri: uri.to_string(),
                });
            }
        }

        self.y += height;
    }

    fn current_page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Serializes all pages into a PDF byte buffer
    pub fn finish(self, info: &DocumentInfo) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = lopdf::Dictionary::new();
        for style in FontStyle::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => style.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(style.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let content = Content {
                operations: page.operations,
            };
            let encoded = content.encode().context("Failed to encode page content")?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

            let annotations: Vec<Object> = page
                .links
                .into_iter()
                .map(|link| add_link(&mut doc, link).into())
                .collect();

            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            if !annotations.is_empty() {
                page_dict.set("Annots", annotations);
            }
            kids.push(doc.add_object(page_dict).into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(sanitize::to_latin1_bytes(&info.title)),
            "Producer" => Object::string_literal("daily-news"),
            "CreationDate" => Object::string_literal(
                info.created.format("D:%Y%m%d%H%M%S").to_string(),
            ),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .context("Failed to serialize PDF document")?;
        Ok(buffer)
    }
}

fn add_link(doc: &mut Document, link: Link) -> ObjectId {
    let [x1, y1, x2, y2] = link.rect;
    doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![
            Object::Real(x1),
            Object::Real(y1),
            Object::Real(x2),
            Object::Real(y2),
        ],
        "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
        "A" => dictionary! {
            "S" => "URI",
            "URI" => Object::string_literal(sanitize::to_latin1_bytes(&link.uri)),
        },
    })
}

fn char_width(c: char, style: FontStyle) -> f32 {
    let code = c as u32;
    let units = if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[(code - 32) as usize]
    } else if code < 32 {
        0
    } else {
        556
    };
    // Bold glyphs run slightly wider; overestimating keeps lines inside the margin
    match style {
        FontStyle::Bold => f32::from(units) * 1.08,
        FontStyle::Regular | FontStyle::Italic => f32::from(units),
    }
}

pub fn text_width(text: &str, style: FontStyle, size: f32) -> f32 {
    text.chars().map(|c| char_width(c, style)).sum::<f32>() * size / 1000.0
}

/// Greedy word wrap. Explicit line breaks start new lines and words wider
/// than the line are split.
pub fn wrap(text: &str, max_width: f32, style: FontStyle, size: f32) -> Vec<String> {
    let cleaned = sanitize::latin1_lossy(text).replace("\r\n", "\n");
    let mut lines = Vec::new();

    for paragraph in cleaned.split('\n') {
        let paragraph: String = paragraph
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let mut line = String::new();

        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };

            if text_width(&candidate, style, size) <= max_width {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }

            if text_width(word, style, size) <= max_width {
                line = word.to_string();
            } else {
                for c in word.chars() {
                    line.push(c);
                    if text_width(&line, style, size) > max_width {
                        line.pop();
                        lines.push(std::mem::take(&mut line));
                        line.push(c);
                    }
                }
            }
        }

        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: "Test".to_string(),
            created: Local::now(),
        }
    }

    #[test]
    fn test_width_of_known_glyphs() {
        // "Hi" = H(722) + i(222) at 10pt
        let width = text_width("Hi", FontStyle::Regular, 10.0);
        assert!((width - 9.44).abs() < 0.001);
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let lines = wrap("Short line", 500.0, FontStyle::Regular, 12.0);
        assert_eq!(lines, vec!["Short line"]);
    }

    #[test]
    fn test_wrap_keeps_every_word_in_order() {
        let text = "word ".repeat(200);
        let lines = wrap(&text, 200.0, FontStyle::Regular, 12.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, FontStyle::Regular, 12.0) <= 200.0);
        }
        assert_eq!(lines.join(" ").split(' ').count(), 200);
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let url = format!("https://example.com/{}", "a".repeat(300));
        let lines = wrap(&url, 100.0, FontStyle::Regular, 11.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), url);
    }

    #[test]
    fn test_wrap_honours_line_breaks() {
        let lines = wrap("first\n\nthird", 500.0, FontStyle::Regular, 12.0);
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[test]
    fn test_empty_text_wraps_to_single_empty_line() {
        assert_eq!(wrap("", 500.0, FontStyle::Regular, 12.0), vec![String::new()]);
    }

    #[test]
    fn test_long_content_flows_onto_new_pages() {
        let mut writer = PdfWriter::new();
        writer.set_font(FontStyle::Regular, 12.0);
        for i in 0..200 {
            writer.cell(20.0, &format!("Line {}", i), Align::Left);
        }
        let pages = writer.page_count();
        assert!(pages > 1);

        let bytes = writer.finish(&info()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), pages);
    }

    #[test]
    fn test_finish_produces_parseable_pdf() {
        let mut writer = PdfWriter::new();
        writer.set_font(FontStyle::Bold, 16.0);
        writer.cell(28.0, "Heading", Align::Center);
        let bytes = writer.finish(&info()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
