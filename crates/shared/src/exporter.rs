use anyhow::Result;
use chrono::{DateTime, Local};

use crate::models::{Article, ExportRequest};
use crate::pdf::{Align, Color, DocumentInfo, FontStyle, PdfWriter, MM};

pub struct PdfExporter;

impl PdfExporter {
    /// Renders the summary and articles as a PDF stamped with the current time
    pub fn export(topic: &str, narrative: &str, articles: &[Article]) -> Result<Vec<u8>> {
        Self::export_at(topic, narrative, articles, Local::now())
    }

    pub fn export_request(request: &ExportRequest) -> Result<Vec<u8>> {
        Self::export(&request.topic, &request.narrative, &request.articles)
    }

    pub fn export_at(
        topic: &str,
        narrative: &str,
        articles: &[Article],
        generated: DateTime<Local>,
    ) -> Result<Vec<u8>> {
        let title = format!("Daily News Summary: {}", capitalize(topic));
        let mut pdf = PdfWriter::new();

        pdf.set_font(FontStyle::Bold, 16.0);
        pdf.multi_cell(10.0 * MM, &title, Align::Center, None);
        pdf.ln(10.0 * MM);

        pdf.set_font(FontStyle::Italic, 10.0);
        pdf.cell(
            10.0 * MM,
            &format!("Generated on: {}", generated.format("%Y-%m-%d %H:%M:%S")),
            Align::Center,
        );
        pdf.ln(15.0 * MM);

        pdf.set_font(FontStyle::Bold, 14.0);
        pdf.cell(10.0 * MM, "Summary", Align::Left);
        pdf.set_font(FontStyle::Regular, 12.0);
        pdf.multi_cell(8.0 * MM, narrative, Align::Left, None);
        pdf.ln(10.0 * MM);

        pdf.set_font(FontStyle::Bold, 14.0);
        pdf.cell(10.0 * MM, "Articles", Align::Left);

        for (index, article) in articles.iter().enumerate() {
            pdf.set_font(FontStyle::Bold, 12.0);
            pdf.multi_cell(
                10.0 * MM,
                &format!("{}. {}", index + 1, article.title),
                Align::Left,
                None,
            );

            pdf.set_font(FontStyle::Regular, 11.0);
            pdf.multi_cell(7.0 * MM, &article.summary, Align::Left, None);

            pdf.set_text_color(Color::BLUE);
            pdf.multi_cell(
                7.0 * MM,
                &format!("Read more: {}", article.url),
                Align::Left,
                Some(&article.url),
            );
            pdf.set_text_color(Color::BLACK);
            pdf.ln(5.0 * MM);
        }

        tracing::debug!(
            "Rendered {} article(s) across {} page(s)",
            articles.len(),
            pdf.page_count()
        );

        pdf.finish(&DocumentInfo {
            title,
            created: generated,
        })
    }
}

/// First letter upper-cased, the rest lower-cased
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
