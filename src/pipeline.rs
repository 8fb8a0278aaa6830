//! Pipeline – ties together font provisioning, shaping and rendering into a
//! single export call.

use crate::config::default_candidates;
use crate::csv_export::csv_utf8_records;
use crate::document::PdfDocumentHandle;
use crate::provision::{FontProvisioner, FontSource};
use crate::render::{render_report, TableLayout};
use crate::report::Report;
use crate::session::setup_with;

/// Page orientation for the generated PDF.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageOrientation {
    /// Portrait mode: height > width (default).
    #[default]
    Portrait,
    /// Landscape mode: width > height, useful for wide ledgers.
    Landscape,
}

/// Configuration for one export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Document title embedded in the PDF metadata (default: report title).
    pub title: Option<String>,
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Page margin in points (default: 40).
    pub page_margin: f32,
    /// Page orientation; swaps effective width/height when `Landscape`.
    pub orientation: PageOrientation,
    /// Body font size in points (default: 10).
    pub font_size: f32,
    /// Table row height in points (default: 20).
    pub row_height: f32,
    /// Ordered font candidates.
    pub candidates: Vec<FontSource>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: None,
            page_width: 595.28,
            page_height: 841.89,
            page_margin: 40.0,
            orientation: PageOrientation::Portrait,
            font_size: 10.0,
            row_height: 20.0,
            candidates: default_candidates(),
        }
    }
}

impl ExportConfig {
    /// Effective page width after applying orientation.
    pub fn effective_width(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_width,
            PageOrientation::Landscape => self.page_height,
        }
    }

    /// Effective page height after applying orientation.
    pub fn effective_height(&self) -> f32 {
        match self.orientation {
            PageOrientation::Portrait => self.page_height,
            PageOrientation::Landscape => self.page_width,
        }
    }

    /// Create an A4 landscape config.
    pub fn a4_landscape() -> Self {
        Self {
            orientation: PageOrientation::Landscape,
            ..Self::default()
        }
    }

    pub fn table_layout(&self) -> TableLayout {
        TableLayout {
            page_width_pt: self.effective_width(),
            page_height_pt: self.effective_height(),
            margin: self.page_margin,
            font_size: self.font_size,
            title_size: self.font_size * 1.6,
            row_height: self.row_height,
        }
    }
}

/// Result of [`export_pdf`].
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub bytes: Vec<u8>,
    pub font_family: String,
    /// False when Arabic text was set in the builtin fallback font.
    pub used_custom_font: bool,
    pub pages: usize,
}

/// Full pipeline: report → PDF bytes. Never fails; a missing Arabic font
/// only degrades glyph shapes.
pub async fn export_pdf(
    report: &Report,
    config: &ExportConfig,
    provisioner: &FontProvisioner,
) -> ExportOutcome {
    let title = config.title.as_deref().unwrap_or(&report.title);
    let mut doc = PdfDocumentHandle::new(title);

    let session = setup_with(provisioner, &mut doc, &config.candidates).await;
    if !session.used_custom_font() {
        log::warn!(
            "Exporting '{}' without an Arabic font; Arabic text will not join correctly",
            report.title
        );
    }

    let (bytes, pages) = render_report(report, &session, doc, &config.table_layout());
    ExportOutcome {
        bytes,
        font_family: session.font_family().to_string(),
        used_custom_font: session.used_custom_font(),
        pages,
    }
}

/// Report → UTF-8 CSV with BOM.
pub fn export_csv(report: &Report) -> Result<Vec<u8>, String> {
    csv_utf8_records(report.csv_rows()).map_err(|e| format!("CSV export failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_swaps_dimensions() {
        let c = ExportConfig::a4_landscape();
        assert!(c.effective_width() > c.effective_height());
        let layout = c.table_layout();
        assert_eq!(layout.page_width_pt, 841.89);
    }

    #[test]
    fn csv_export_has_bom() {
        let report = Report::from_json(r#"{"title":"t","columns":["a"],"rows":[]}"#).unwrap();
        let bytes = export_csv(&report).unwrap();
        assert_eq!(bytes, b"\xEF\xBB\xBFa\n");
    }

    #[tokio::test]
    async fn pipeline_degraded_still_produces_pdf() {
        let report = Report::from_json(r#"{"title":"ملخص","columns":["البند"],"rows":[]}"#).unwrap();
        let config = ExportConfig {
            candidates: vec![FontSource::new("/missing/font.ttf", "m.ttf", "Missing")],
            ..ExportConfig::default()
        };
        let out = export_pdf(&report, &config, &FontProvisioner::default()).await;
        assert!(!out.used_custom_font);
        assert_eq!(out.pages, 1);
        assert_eq!(&out.bytes[0..5], b"%PDF-");
    }
}
