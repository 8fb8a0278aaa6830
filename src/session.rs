//! Per-export shaping session.
//!
//! [`setup`] provisions a font into the document once, then hands back a
//! [`ShapingSession`] that report code passes around explicitly. The session
//! is plain data: one per export, never shared, fixed font identity.

use crate::document::DocumentHandle;
use crate::numeric::{self, EGP_LABEL};
use crate::provision::{FontProvisioner, FontSource, ResolvedFont};
use crate::shaping::Shaper;

#[derive(Debug, Clone)]
pub struct ShapingSession {
    font_family: String,
    used_custom_font: bool,
    shaper: Shaper,
}

impl ShapingSession {
    pub fn new(resolved: ResolvedFont) -> Self {
        Self::with_shaper(resolved, Shaper::default())
    }

    pub fn with_shaper(resolved: ResolvedFont, shaper: Shaper) -> Self {
        Self {
            font_family: resolved.font_family,
            used_custom_font: resolved.used_custom_font,
            shaper,
        }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// False when the builtin default font is in use (degraded mode).
    pub fn used_custom_font(&self) -> bool {
        self.used_custom_font
    }

    pub fn shape(&self, text: &str) -> String {
        self.shaper.shape(text)
    }

    pub fn fmt_number(&self, value: f64, fraction_digits: usize) -> String {
        numeric::fmt_number_ltr(value, fraction_digits)
    }

    pub fn fmt_percent(&self, value: f64, fraction_digits: usize) -> String {
        numeric::fmt_percent_ltr(value, fraction_digits)
    }

    /// Amount plus the Egyptian pound label, the label shaped by this session.
    pub fn fmt_currency(&self, value: f64, fraction_digits: usize) -> String {
        let mut out = numeric::fmt_number_ltr(value, fraction_digits);
        out.push(' ');
        out.push_str(&self.shape(EGP_LABEL));
        out
    }
}

/// Provision a font into `doc` with the default fetcher and open a session.
pub async fn setup<D>(doc: &mut D, candidates: &[FontSource]) -> ShapingSession
where
    D: DocumentHandle + ?Sized,
{
    setup_with(&FontProvisioner::default(), doc, candidates).await
}

/// [`setup`] with a caller-supplied provisioner (custom fetcher or shared cache).
pub async fn setup_with<D>(
    provisioner: &FontProvisioner,
    doc: &mut D,
    candidates: &[FontSource],
) -> ShapingSession
where
    D: DocumentHandle + ?Sized,
{
    ShapingSession::new(provisioner.resolve(candidates, doc).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidi::{is_isolated_run, isolates_balanced, strip_isolates, LRI, PDI, RLI};
    use crate::document::PdfDocumentHandle;

    fn degraded() -> ShapingSession {
        ShapingSession::new(ResolvedFont::fallback())
    }

    #[test]
    fn session_exposes_resolution() {
        let s = ShapingSession::new(ResolvedFont {
            font_family: "Amiri".into(),
            used_custom_font: true,
        });
        assert_eq!(s.font_family(), "Amiri");
        assert!(s.used_custom_font());
    }

    #[test]
    fn currency_label_is_shaped_sibling() {
        let s = degraded().fmt_currency(100.0, 2);
        let (number, label) = s.split_once(' ').unwrap();
        assert_eq!(number, format!("{LRI}100.00{PDI}"));
        assert!(label.starts_with(RLI) && label.ends_with(PDI));
        assert!(is_isolated_run(label));
        assert!(isolates_balanced(&s));
        // Visual order: meem, dot, jeem, each isolated.
        assert_eq!(strip_isolates(label), "\u{FEE1}.\u{FE9D}");
    }

    #[test]
    fn number_helpers_match_free_functions() {
        let s = degraded();
        assert_eq!(s.fmt_number(1234.5, 2), numeric::fmt_number_ltr(1234.5, 2));
        assert_eq!(s.fmt_percent(7.25, 1), numeric::fmt_percent_ltr(7.25, 1));
    }

    #[tokio::test]
    async fn setup_with_unreachable_candidates_degrades() {
        let mut doc = PdfDocumentHandle::new("t");
        doc.set_whole_document_direction(true);
        let candidates = vec![FontSource::new("/no/such/font.ttf", "x.ttf", "X")];

        let session = setup(&mut doc, &candidates).await;

        assert!(!session.used_custom_font());
        assert_eq!(session.font_family(), crate::provision::DEFAULT_FONT_FAMILY);
        assert!(!doc.is_whole_document_rtl());
        assert_eq!(session.shape("Total"), "Total");
    }
}
