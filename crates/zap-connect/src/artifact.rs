//! Pairing artifacts: decoding and terminal rendering.
//!
//! The broker usually hands out a `data:` URI holding a PNG of the QR code.
//! Some deployments return the raw pairing payload instead, which is then
//! encoded into a QR code locally.

use base64::Engine;
use qrcode::{Color, QrCode};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
    #[error("QR encoding failed: {0}")]
    QrEncoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingArtifact {
    /// Encoded image from a `data:` URI.
    Image { mime: String, bytes: Vec<u8> },
    /// Raw pairing payload to be encoded as a QR code.
    Payload(String),
}

impl PairingArtifact {
    pub fn parse(raw: &str) -> Result<Self, ArtifactError> {
        let raw = raw.trim();
        let Some(rest) = raw.strip_prefix("data:") else {
            return Ok(PairingArtifact::Payload(raw.to_string()));
        };

        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| ArtifactError::MalformedDataUri("missing ',' separator".into()))?;

        let (mime, is_base64) = match header.strip_suffix(";base64") {
            Some(mime) => (mime, true),
            None => (header, false),
        };
        // Parameters such as `;charset=` are not needed to save the image.
        let mime = mime.split(';').next().unwrap_or_default();
        let mime = if mime.is_empty() { "text/plain" } else { mime };

        let bytes = if is_base64 {
            base64::engine::general_purpose::STANDARD
                .decode(data.trim())
                .map_err(|e| ArtifactError::InvalidBase64(e.to_string()))?
        } else {
            urlencoding::decode_binary(data.as_bytes()).into_owned()
        };

        if mime.starts_with("text/") {
            return Ok(PairingArtifact::Payload(
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        Ok(PairingArtifact::Image {
            mime: mime.to_string(),
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, PairingArtifact::Image { .. })
    }
}

/// File extension for a saved image artifact.
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

/// Format seconds as `m:ss`.
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Render a QR code as a string of Unicode half-block characters.
/// Each character represents two rows of modules (upper/lower).
pub fn render_qr_unicode(data: &str) -> Result<String, ArtifactError> {
    let code =
        QrCode::new(data.as_bytes()).map_err(|e| ArtifactError::QrEncoding(e.to_string()))?;
    let modules = code.to_colors();
    let width = code.width();

    let mut result = String::new();

    // ▀ = top dark, ▄ = bottom dark, █ = both, ' ' = neither
    let mut y = 0;
    while y < width {
        result.push_str("  ");
        for x in 0..width {
            let top = modules[y * width + x];
            let bottom = if y + 1 < width {
                modules[(y + 1) * width + x]
            } else {
                Color::Light
            };

            let ch = match (top, bottom) {
                (Color::Dark, Color::Dark) => '█',
                (Color::Dark, Color::Light) => '▀',
                (Color::Light, Color::Dark) => '▄',
                (Color::Light, Color::Light) => ' ',
            };
            result.push(ch);
        }
        result.push('\n');
        y += 2;
    }

    Ok(result)
}
