//! The document a session provisions fonts into.
//!
//! [`DocumentHandle`] is the renderer-facing seam: font registration, active
//! font selection and the whole-document direction flag.
//! [`PdfDocumentHandle`] implements it over a `printpdf` document.

use std::collections::HashMap;

use printpdf::font::ParsedFont;
use printpdf::*;

use crate::bidi::is_directional_control;
use crate::error::FontError;
use crate::fonts::FontMetrics;
use crate::provision::{FontEncoding, DEFAULT_FONT_FAMILY};

/// Code point every usable candidate must map (ARABIC LETTER BEH).
const ARABIC_PROBE: char = '\u{0628}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
}

/// Font table and direction flag of a target document.
pub trait DocumentHandle {
    /// Byte encoding `register_font_bytes` expects.
    fn font_encoding(&self) -> FontEncoding {
        FontEncoding::Raw
    }

    /// Register a complete font under `name`, bound to `family`. Called only
    /// with fully fetched and decoded bytes.
    fn register_font_bytes(&mut self, name: &str, family: &str, bytes: &[u8])
        -> Result<(), FontError>;

    /// Make `family` the font for subsequent text.
    fn set_active_font(&mut self, family: &str, style: FontStyle);

    /// Enable or disable the renderer's own whole-document RTL handling.
    fn set_whole_document_direction(&mut self, rtl: bool);
}

struct RegisteredFont {
    name: String,
    id: FontId,
    metrics: FontMetrics,
}

enum ActiveFont {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

/// A `printpdf` document plus the font state of one export.
pub struct PdfDocumentHandle {
    doc: PdfDocument,
    fonts: HashMap<String, RegisteredFont>,
    active: ActiveFont,
    active_family: String,
    metrics: FontMetrics,
    rtl: bool,
}

impl PdfDocumentHandle {
    pub fn new(title: &str) -> Self {
        Self {
            doc: PdfDocument::new(title),
            fonts: HashMap::new(),
            active: ActiveFont::Builtin(BuiltinFont::Helvetica),
            active_family: DEFAULT_FONT_FAMILY.to_string(),
            metrics: FontMetrics::builtin(),
            rtl: false,
        }
    }

    /// Family of the active font.
    pub fn active_family(&self) -> &str {
        &self.active_family
    }

    /// Registration name under which `family` was embedded, if any.
    pub fn registration_name(&self, family: &str) -> Option<&str> {
        self.fonts.get(family).map(|f| f.name.as_str())
    }

    pub fn is_whole_document_rtl(&self) -> bool {
        self.rtl
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Text width in pt with the active font.
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        self.metrics.measure_text_width(text, font_size)
    }

    /// Ops writing `text` with its baseline at (`x`, `y`) in PDF coordinates.
    /// Directional controls are dropped: the text is already in visual order.
    pub fn text_ops(&self, text: &str, x: f32, y: f32, font_size: f32, color: [f32; 3]) -> Vec<Op> {
        let visible: String = text.chars().filter(|c| !is_directional_control(*c)).collect();
        let mut ops = vec![
            Op::StartTextSection,
            Op::SetTextCursor {
                pos: Point { x: Pt(x), y: Pt(y) },
            },
            Op::SetFillColor {
                col: Color::Rgb(Rgb {
                    r: color[0],
                    g: color[1],
                    b: color[2],
                    icc_profile: None,
                }),
            },
        ];
        match &self.active {
            ActiveFont::Embedded(id) => {
                ops.push(Op::SetFontSize {
                    size: Pt(font_size),
                    font: id.clone(),
                });
                ops.push(Op::WriteText {
                    items: vec![TextItem::Text(visible)],
                    font: id.clone(),
                });
            }
            ActiveFont::Builtin(font) => {
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(font_size),
                    font: *font,
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(to_builtin_text(&visible))],
                    font: *font,
                });
            }
        }
        ops.push(Op::EndTextSection);
        ops
    }

    /// Attach `pages` and serialise the document.
    pub fn finish(mut self, pages: Vec<PdfPage>) -> Vec<u8> {
        self.doc.with_pages(pages);
        self.doc.save(&PdfSaveOptions::default(), &mut Vec::new())
    }
}

impl DocumentHandle for PdfDocumentHandle {
    fn register_font_bytes(
        &mut self,
        name: &str,
        family: &str,
        bytes: &[u8],
    ) -> Result<(), FontError> {
        let metrics = FontMetrics::from_bytes(bytes).map_err(|e| FontError::register(family, e))?;
        if !metrics.has_glyph(ARABIC_PROBE) {
            return Err(FontError::register(family, "font has no Arabic glyphs"));
        }

        let mut warnings = Vec::new();
        let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings)
            .ok_or_else(|| FontError::register(family, "printpdf could not parse the font"))?;
        let id = self.doc.add_font(&parsed);

        log::debug!("Registered font '{name}' as family '{family}'");
        self.fonts.insert(
            family.to_string(),
            RegisteredFont {
                name: name.to_string(),
                id,
                metrics,
            },
        );
        Ok(())
    }

    fn set_active_font(&mut self, family: &str, style: FontStyle) {
        match self.fonts.get(family) {
            Some(font) => {
                self.active = ActiveFont::Embedded(font.id.clone());
                self.metrics = font.metrics.clone();
            }
            None => {
                if family != DEFAULT_FONT_FAMILY {
                    log::debug!("Font family '{family}' not registered; using builtin Helvetica");
                }
                self.active = ActiveFont::Builtin(match style {
                    FontStyle::Normal => BuiltinFont::Helvetica,
                    FontStyle::Bold => BuiltinFont::HelveticaBold,
                });
                self.metrics = FontMetrics::builtin();
            }
        }
        self.active_family = family.to_string();
    }

    fn set_whole_document_direction(&mut self, rtl: bool) {
        self.rtl = rtl;
    }
}

/// Reduce `s` to text the builtin base-14 fonts can show. Common typographic
/// punctuation maps to its ASCII look-alike; anything else outside ASCII,
/// Arabic included, becomes `?`.
fn to_builtin_text(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{00A0}' => ' ',
            c if c.is_ascii() => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_family_falls_back_to_builtin() {
        let mut doc = PdfDocumentHandle::new("t");
        doc.set_active_font("Amiri", FontStyle::Normal);
        assert_eq!(doc.active_family(), "Amiri");
        assert!(doc.metrics().is_builtin());
        assert!(doc.registration_name("Amiri").is_none());
    }

    #[test]
    fn garbage_bytes_rejected() {
        let mut doc = PdfDocumentHandle::new("t");
        let err = doc
            .register_font_bytes("x.ttf", "X", b"\x00\x01\x00\x00garbage")
            .unwrap_err();
        assert!(matches!(err, FontError::Register { .. }));
    }

    #[test]
    fn arabic_face_registers_and_writes_embedded_text() {
        let mut doc = PdfDocumentHandle::new("t");
        doc.register_font_bytes(
            "DejaVuSans.ttf",
            "DejaVu Sans",
            include_bytes!("../tests/fixtures/DejaVuSans.ttf"),
        )
        .unwrap();
        assert_eq!(doc.registration_name("DejaVu Sans"), Some("DejaVuSans.ttf"));

        doc.set_active_font("DejaVu Sans", FontStyle::Normal);
        assert_eq!(doc.active_family(), "DejaVu Sans");
        assert!(!doc.metrics().is_builtin());

        let ops = doc.text_ops("\u{2067}\u{FE96}\u{FEF4}\u{FE91}\u{2069}", 10.0, 10.0, 9.0, [0.0; 3]);
        assert!(!ops
            .iter()
            .any(|op| matches!(op, Op::WriteTextBuiltinFont { .. })));
        let written = ops.iter().find_map(|op| match op {
            Op::WriteText { items, .. } => Some(items),
            _ => None,
        });
        let items = written.expect("embedded text op");
        assert!(matches!(&items[0], TextItem::Text(t) if t == "\u{FE96}\u{FEF4}\u{FE91}"));
        assert!(doc.measure("\u{FE96}", 9.0) > 0.0);
    }

    #[test]
    fn direction_flag_tracked() {
        let mut doc = PdfDocumentHandle::new("t");
        doc.set_whole_document_direction(true);
        assert!(doc.is_whole_document_rtl());
        doc.set_whole_document_direction(false);
        assert!(!doc.is_whole_document_rtl());
    }

    #[test]
    fn builtin_text_ops_drop_isolates() {
        let doc = PdfDocumentHandle::new("t");
        let ops = doc.text_ops("\u{2066}1,234.50\u{2069}", 10.0, 10.0, 9.0, [0.0, 0.0, 0.0]);
        let written = ops.iter().find_map(|op| match op {
            Op::WriteTextBuiltinFont { items, .. } => Some(items),
            _ => None,
        });
        let items = written.expect("text op");
        assert!(matches!(&items[0], TextItem::Text(t) if t == "1,234.50"));
    }

    #[test]
    fn builtin_text_is_plain_ascii() {
        assert_eq!(to_builtin_text("a\u{FE8F}"), "a?");
        assert_eq!(to_builtin_text("Caf\u{e9} \u{2013} \u{201C}x\u{201D}"), "Caf? - \"x\"");
        assert!(to_builtin_text("\u{e9}\u{20AC}\u{FF}").is_ascii());
    }

    #[test]
    fn empty_document_saves() {
        let doc = PdfDocumentHandle::new("t");
        let bytes = doc.finish(vec![PdfPage::new(Mm(210.0), Mm(297.0), Vec::new())]);
        assert_eq!(&bytes[0..5], b"%PDF-");
    }
}
