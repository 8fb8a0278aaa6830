//! Font provisioning – fetch, decode and register the first usable
//! Arabic-capable font from an ordered candidate list.
//!
//! Candidates are tried strictly in order, one at a time. Fetch, decode and
//! registration failures are logged and skipped; if nothing works the
//! document keeps the builtin default font (degraded mode). Resolution never
//! fails.
//!
//! Bytes are only handed to the document after a complete fetch and decode,
//! so dropping the `resolve` future mid-fetch never leaves a partially
//! registered font behind.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::document::{DocumentHandle, FontStyle};
use crate::error::FontError;

/// Family used when no candidate can be provisioned.
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";

/// One entry of the ordered candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSource {
    /// Local path, `http(s)://` URL or `data:` URI.
    pub location: String,
    /// Name the bytes are registered (and cached) under.
    #[serde(alias = "cache_key")]
    pub registration_name: String,
    /// Family name text is set in.
    pub family: String,
}

impl FontSource {
    pub fn new(
        location: impl Into<String>,
        registration_name: impl Into<String>,
        family: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            registration_name: registration_name.into(),
            family: family.into(),
        }
    }

    pub fn parsed_location(&self) -> FontLocation {
        FontLocation::parse(&self.location)
    }
}

/// Where a candidate's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontLocation {
    Local(PathBuf),
    Remote(String),
    DataUri(String),
}

impl FontLocation {
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            FontLocation::Remote(trimmed.to_string())
        } else if trimmed.starts_with("data:") {
            FontLocation::DataUri(trimmed.to_string())
        } else {
            FontLocation::Local(PathBuf::from(trimmed))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FontLocation::Local(p) => p.display().to_string(),
            FontLocation::Remote(url) => url.clone(),
            FontLocation::DataUri(uri) => {
                let head = uri.split(',').next().unwrap_or("data:");
                format!("{head},…")
            }
        }
    }
}

/// Byte encoding a document expects for font registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontEncoding {
    /// Raw sfnt bytes (printpdf).
    #[default]
    Raw,
    /// Standard base64 text, for virtual-file-system style embedders.
    Base64,
}

/// Capability to turn a [`FontLocation`] into raw bytes.
#[async_trait]
pub trait ByteFetcher: Send + Sync {
    async fn fetch(&self, location: &FontLocation) -> Result<Vec<u8>, FontError>;
}

/// Reads local files with tokio and remote URLs with reqwest.
pub struct StdFetcher {
    client: reqwest::Client,
}

impl StdFetcher {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for StdFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ByteFetcher for StdFetcher {
    async fn fetch(&self, location: &FontLocation) -> Result<Vec<u8>, FontError> {
        match location {
            FontLocation::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| FontError::fetch(location.describe(), e)),
            FontLocation::Remote(url) => {
                let fail = |e: reqwest::Error| FontError::fetch(url.as_str(), e);
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(fail)?
                    .error_for_status()
                    .map_err(fail)?;
                let bytes = response.bytes().await.map_err(fail)?;
                Ok(bytes.to_vec())
            }
            FontLocation::DataUri(uri) => {
                parse_data_uri(uri).map_err(|e| FontError::fetch(location.describe(), e))
            }
        }
    }
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
fn parse_data_uri(src: &str) -> Result<Vec<u8>, String> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URI".to_string())?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| "Invalid data URI: missing `,` separator between header and data".to_string())?;
    if !header.contains(";base64") {
        return Err("Only base64-encoded data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(data.trim())
        .map_err(|e| format!("Base64 decode error: {e}"))
}

/// Does `bytes` start with a TrueType, OpenType or collection signature?
pub fn has_sfnt_signature(bytes: &[u8]) -> bool {
    match bytes.get(..4) {
        Some(sig) => {
            sig == [0x00u8, 0x01, 0x00, 0x00] || sig == b"OTTO" || sig == b"true" || sig == b"ttcf"
        }
        None => false,
    }
}

/// Turn fetched bytes into raw font bytes. Payloads that are base64 text
/// (`.b64` assets) are decoded first.
pub fn decode_font_bytes(family: &str, raw: Vec<u8>) -> Result<Vec<u8>, FontError> {
    if has_sfnt_signature(&raw) {
        return Ok(raw);
    }
    let text: Vec<u8> = raw.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
    let decoded = BASE64_STD
        .decode(&text)
        .map_err(|_| FontError::decode(family, "not a font file and not base64"))?;
    if has_sfnt_signature(&decoded) {
        Ok(decoded)
    } else {
        Err(FontError::decode(family, "base64 payload is not a font file"))
    }
}

/// Re-encode decoded font bytes the way the target document wants them.
pub fn encode_for_target(bytes: &[u8], encoding: FontEncoding) -> Vec<u8> {
    match encoding {
        FontEncoding::Raw => bytes.to_vec(),
        FontEncoding::Base64 => BASE64_STD.encode(bytes).into_bytes(),
    }
}

/// Outcome of [`FontProvisioner::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    pub font_family: String,
    pub used_custom_font: bool,
}

impl ResolvedFont {
    pub fn fallback() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            used_custom_font: false,
        }
    }
}

/// Decoded font bytes shared between exports, keyed by registration name.
/// Only an optimisation: a miss just means the candidate is fetched again.
#[derive(Clone, Default)]
pub struct FontCache {
    inner: Arc<RwLock<HashMap<String, Arc<[u8]>>>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        self.inner.read().get(key).cloned()
    }

    pub fn insert(&self, key: &str, bytes: Arc<[u8]>) {
        self.inner.write().insert(key.to_string(), bytes);
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Resolves candidate lists against documents.
pub struct FontProvisioner {
    fetcher: Box<dyn ByteFetcher>,
    cache: Option<FontCache>,
}

impl FontProvisioner {
    pub fn new(fetcher: impl ByteFetcher + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            cache: None,
        }
    }

    /// Share decoded bytes with every provisioner holding the same cache.
    pub fn with_cache(mut self, cache: FontCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register the first working candidate and make it the active font.
    ///
    /// Always disables the document's whole-document RTL mode first: runs
    /// arrive already shaped and isolated, and a second reordering pass by
    /// the renderer would scramble them.
    pub async fn resolve<D>(&self, candidates: &[FontSource], doc: &mut D) -> ResolvedFont
    where
        D: DocumentHandle + ?Sized,
    {
        doc.set_whole_document_direction(false);

        for (index, candidate) in candidates.iter().enumerate() {
            log::debug!(
                "Trying font candidate {} of {}: '{}' from {}",
                index + 1,
                candidates.len(),
                candidate.family,
                candidate.parsed_location().describe()
            );
            match self.install(candidate, doc).await {
                Ok(()) => {
                    doc.set_active_font(&candidate.family, FontStyle::Normal);
                    log::info!("Using font '{}'", candidate.family);
                    return ResolvedFont {
                        font_family: candidate.family.clone(),
                        used_custom_font: true,
                    };
                }
                Err(e) => log::warn!("Skipping font candidate '{}' — {e}", candidate.family),
            }
        }

        log::warn!(
            "No font candidate could be loaded; falling back to {DEFAULT_FONT_FAMILY}. \
             Arabic text will render without proper joining."
        );
        doc.set_active_font(DEFAULT_FONT_FAMILY, FontStyle::Normal);
        ResolvedFont::fallback()
    }

    async fn install<D>(&self, candidate: &FontSource, doc: &mut D) -> Result<(), FontError>
    where
        D: DocumentHandle + ?Sized,
    {
        let bytes = self.load(candidate).await?;
        let encoded = encode_for_target(&bytes, doc.font_encoding());
        doc.register_font_bytes(&candidate.registration_name, &candidate.family, &encoded)?;
        if let Some(cache) = &self.cache {
            cache.insert(&candidate.registration_name, bytes);
        }
        Ok(())
    }

    async fn load(&self, candidate: &FontSource) -> Result<Arc<[u8]>, FontError> {
        if let Some(hit) = self
            .cache
            .as_ref()
            .and_then(|c| c.get(&candidate.registration_name))
        {
            log::debug!("Font '{}' served from cache", candidate.registration_name);
            return Ok(hit);
        }
        let raw = self.fetcher.fetch(&candidate.parsed_location()).await?;
        Ok(decode_font_bytes(&candidate.family, raw)?.into())
    }
}

impl Default for FontProvisioner {
    fn default() -> Self {
        Self::new(StdFetcher::new())
    }
}
