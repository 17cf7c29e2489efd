//! Terminal rendering of a pairing session.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use zap_common::{InstanceId, PlatformError, ZapError};
use zap_connect::artifact::extension_for;
use zap_connect::{
    format_countdown, render_qr_unicode, PairingArtifact, SessionSnapshot, SessionStatus,
};

/// Turns snapshots into terminal output. The QR code is drawn once per
/// attempt; countdown updates rewrite a single line.
pub(super) struct PairingView {
    cache_dir: PathBuf,
    shown_attempt: Option<u32>,
}

impl PairingView {
    pub(super) fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            shown_attempt: None,
        }
    }

    pub(super) fn render(
        &mut self,
        snapshot: &SessionSnapshot,
        out: &mut impl Write,
    ) -> Result<(), ZapError> {
        match snapshot.status {
            SessionStatus::Loading => {
                writeln!(out, "Requesting pairing code for {}...", snapshot.instance_id)?;
            }
            SessionStatus::QrReady | SessionStatus::Connecting => {
                if self.shown_attempt != Some(snapshot.attempt) {
                    self.shown_attempt = Some(snapshot.attempt);
                    if let Some(raw) = snapshot.artifact.as_deref() {
                        self.show_artifact(&snapshot.instance_id, raw, out)?;
                    }
                }
                let label = if snapshot.status == SessionStatus::Connecting {
                    "Connecting"
                } else {
                    "Expires in"
                };
                write!(out, "\r  {label} {}   ", format_countdown(snapshot.countdown))?;
            }
            SessionStatus::Connected => writeln!(out, "\n  \x1b[32mConnected.\x1b[0m")?,
            SessionStatus::Error => {
                writeln!(out, "\n  \x1b[31mPairing code expired or unavailable.\x1b[0m")?
            }
        }
        out.flush()?;
        Ok(())
    }

    fn show_artifact(
        &self,
        instance: &InstanceId,
        raw: &str,
        out: &mut impl Write,
    ) -> Result<(), ZapError> {
        let artifact = PairingArtifact::parse(raw).map_err(|e| ZapError::Pairing(e.to_string()))?;
        match artifact {
            PairingArtifact::Payload(payload) => {
                let qr =
                    render_qr_unicode(&payload).map_err(|e| ZapError::Pairing(e.to_string()))?;
                writeln!(
                    out,
                    "\n\x1b[36m  Scan this QR code with WhatsApp:\x1b[0m\n\n{qr}"
                )?;
            }
            PairingArtifact::Image { mime, bytes } => {
                let path = self.save_image(instance, &mime, &bytes)?;
                writeln!(
                    out,
                    "\n\x1b[36m  QR code saved to {}\x1b[0m\n\x1b[90m  Open it and scan with WhatsApp.\x1b[0m\n",
                    path.display()
                )?;
            }
        }
        Ok(())
    }

    /// Write an image artifact to `<cache_dir>/pairing-<instance>.<ext>`.
    pub(super) fn save_image(
        &self,
        instance: &InstanceId,
        mime: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, ZapError> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_dir.join(format!(
            "pairing-{}.{}",
            file_safe(instance.as_str()),
            extension_for(mime)
        ));
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), "pairing image saved");
        Ok(path)
    }
}

/// `<cache_dir>/zap`, where pairing images are written.
pub(super) fn default_cache_dir() -> Result<PathBuf, ZapError> {
    dirs::cache_dir()
        .map(|d| d.join("zap"))
        .ok_or_else(|| PlatformError::PathError("could not determine cache directory".into()).into())
}

fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
