//! # rtl-forge – Arabic text and mixed-direction numbers for PDF reports
//!
//! PDF renderers such as `printpdf` neither shape Arabic nor run the
//! Unicode bidi algorithm. This crate prepares every run before it reaches
//! the renderer:
//!
//! 1. **Provision** – register the first usable Arabic font from an ordered
//!    candidate list ([`provision`]), into a [`document::DocumentHandle`]
//! 2. **Shape** – presentation forms, visual order, RTL isolate ([`shaping`])
//! 3. **Format** – numbers, percentages and currency as LTR islands
//!    ([`numeric`], [`bidi`])
//! 4. **Render** – a right-to-left report table ([`render`], [`pipeline`])
//!
//! Report code calls [`setup`] once per export and passes the returned
//! [`ShapingSession`] around explicitly. CSV exports go through
//! [`csv_utf8_blob`] / [`csv_export::csv_utf8_records`].

pub mod bidi;
pub mod config;
pub mod csv_export;
pub mod document;
pub mod error;
pub mod fonts;
pub mod numeric;
pub mod pipeline;
pub mod provision;
pub mod render;
pub mod report;
pub mod session;
pub mod shaping;

// Re-exports for convenience
pub use bidi::contains_dir_isolate;
pub use csv_export::csv_utf8_blob;
pub use numeric::{fmt_currency_mix_egp, fmt_number_ltr, fmt_percent_ltr};
pub use pipeline::{export_csv, export_pdf, ExportConfig, PageOrientation};
pub use provision::{FontProvisioner, FontSource, ResolvedFont};
pub use session::{setup, setup_with, ShapingSession};
pub use shaping::shape;
