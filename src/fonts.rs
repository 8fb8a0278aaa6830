//! Font metrics and text measurement using `ttf-parser`.
//!
//! Shaped cells are right-aligned inside table columns, so the renderer needs
//! advance widths for presentation-form glyphs. When only a builtin font is
//! active we fall back to an average-width heuristic.

use std::collections::HashMap;
use std::sync::Arc;

use crate::bidi::is_isolate_control;

/// Metrics of one face. Advances are read from the cmap once at parse time
/// and shared between clones.
#[derive(Clone)]
pub struct FontMetrics {
    builtin: bool,
    advances: Arc<HashMap<char, u16>>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
}

impl FontMetrics {
    /// Parse metrics from TTF/OTF bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let face =
            ttf_parser::Face::parse(bytes, 0).map_err(|e| format!("Failed to parse font: {e}"))?;

        let mut advances = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|s| s.is_unicode()) {
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else {
                        return;
                    };
                    if let Some(gid) = subtable.glyph_index(cp).filter(|g| g.0 != 0) {
                        advances
                            .entry(ch)
                            .or_insert_with(|| face.glyph_hor_advance(gid).unwrap_or(0));
                    }
                });
            }
        }

        Ok(Self {
            builtin: false,
            advances: Arc::new(advances),
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
        })
    }

    /// Helvetica-like metrics for the builtin fallback.
    pub fn builtin() -> Self {
        Self {
            builtin: true,
            advances: Arc::default(),
            units_per_em: 1000.0,
            ascender: 750.0,
            descender: -250.0,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Width of `text` at `font_size` (pt). Isolate controls are zero-width.
    pub fn measure_text_width(&self, text: &str, font_size: f32) -> f32 {
        let visible = text.chars().filter(|c| !is_isolate_control(*c));

        if self.builtin {
            // Heuristic: average char width ≈ 0.5 × font_size.
            return visible.count() as f32 * font_size * 0.5;
        }

        let scale = font_size / self.units_per_em;
        visible
            .map(|ch| match self.advances.get(&ch) {
                Some(&advance) => advance as f32 * scale,
                None => font_size * 0.5,
            })
            .sum()
    }

    /// Ascender in pt at `font_size`.
    pub fn ascender_pt(&self, font_size: f32) -> f32 {
        self.ascender * font_size / self.units_per_em
    }

    /// Does the face map `c` to a glyph? Always false for builtin metrics.
    pub fn has_glyph(&self, c: char) -> bool {
        self.advances.contains_key(&c)
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        let m = FontMetrics::builtin();
        // 5 chars × 16 × 0.5 = 40
        assert!((m.measure_text_width("Hello", 16.0) - 40.0).abs() < 0.1);
    }

    #[test]
    fn isolates_have_no_width() {
        let m = FontMetrics::builtin();
        let plain = m.measure_text_width("100.00", 10.0);
        let isolated = m.measure_text_width("\u{2066}100.00\u{2069}", 10.0);
        assert_eq!(plain, isolated);
    }

    #[test]
    fn garbage_is_not_a_font() {
        assert!(FontMetrics::from_bytes(b"not a font").is_err());
        assert!(!FontMetrics::builtin().has_glyph('a'));
        assert!((FontMetrics::builtin().ascender_pt(10.0) - 7.5).abs() < 1e-4);
    }

    #[test]
    fn arabic_face_advances() {
        let m = FontMetrics::from_bytes(include_bytes!("../tests/fixtures/DejaVuSans.ttf")).unwrap();
        assert!(!m.is_builtin());
        assert!(m.has_glyph('\u{0628}'));
        assert!(m.has_glyph('\u{FEFB}'));
        assert!(!m.has_glyph('\u{E000}'));

        let width = m.measure_text_width("\u{FE96}\u{FEF4}\u{FE91}", 12.0);
        assert!(width > 0.0);
        let isolated = m.measure_text_width("\u{2067}\u{FE96}\u{FEF4}\u{FE91}\u{2069}", 12.0);
        assert_eq!(width, isolated);
        // Measurement scales linearly with the font size.
        assert!((m.measure_text_width("abc", 20.0) - 2.0 * m.measure_text_width("abc", 10.0)).abs() < 1e-3);
    }
}
