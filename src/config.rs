//! Font candidate configuration.
//!
//! A candidate list is either the built-in default (bundled assets first,
//! then the same families from the network) or a JSON file:
//!
//! ```json
//! { "candidates": [
//!     { "location": "assets/fonts/Amiri-Regular.ttf",
//!       "registration_name": "Amiri-Regular.ttf",
//!       "family": "Amiri" }
//! ] }
//! ```
//!
//! A bare JSON array of candidates is accepted as well.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::provision::FontSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSourceList {
    pub candidates: Vec<FontSource>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CandidateFile {
    List(FontSourceList),
    Bare(Vec<FontSource>),
}

impl FontSourceList {
    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON (object with `candidates` or a bare array).
    pub fn from_json(json: &str) -> Result<Self, String> {
        match serde_json::from_str(json).map_err(|e| e.to_string())? {
            CandidateFile::List(list) => Ok(list),
            CandidateFile::Bare(candidates) => Ok(Self { candidates }),
        }
    }
}

impl Default for FontSourceList {
    fn default() -> Self {
        Self {
            candidates: default_candidates(),
        }
    }
}

/// Bundled local fonts first so provisioned assets win, then remote copies.
pub fn default_candidates() -> Vec<FontSource> {
    vec![
        FontSource::new("assets/fonts/Amiri-Regular.ttf", "Amiri-Regular.ttf", "Amiri"),
        FontSource::new(
            "assets/fonts/NotoNaskhArabic-Regular.ttf",
            "NotoNaskhArabic-Regular.ttf",
            "NotoNaskhArabic",
        ),
        FontSource::new(
            "https://github.com/google/fonts/raw/main/ofl/amiri/Amiri-Regular.ttf",
            "Amiri-Regular.ttf",
            "Amiri",
        ),
        FontSource::new(
            "https://github.com/notofonts/notofonts.github.io/raw/main/fonts/NotoNaskhArabic/hinted/ttf/NotoNaskhArabic-Regular.ttf",
            "NotoNaskhArabic-Regular.ttf",
            "NotoNaskhArabic",
        ),
    ]
}

/// Read a candidate list from a JSON file.
pub fn load_candidates(path: &Path) -> Result<Vec<FontSource>, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Error reading '{}': {e}", path.display()))?;
    FontSourceList::from_json(&json).map(|list| list.candidates)
}
