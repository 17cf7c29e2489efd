//! Session status, snapshots, and transition results.

use serde::Serialize;
use zap_common::InstanceId;

/// Where a pairing attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    /// Waiting for the broker to hand out a pairing artifact.
    Loading,
    /// Artifact shown; countdown and status polling are running.
    QrReady,
    /// The broker reported the scan is being processed. Timers keep running.
    Connecting,
    /// Terminal success.
    Connected,
    /// Terminal failure. Only a retry leaves this state.
    Error,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Connected | SessionStatus::Error)
    }

    /// `true` while the countdown and polling timers should run.
    pub fn awaiting_scan(&self) -> bool {
        matches!(self, SessionStatus::QrReady | SessionStatus::Connecting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Loading => "loading",
            SessionStatus::QrReady => "qr-ready",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
            SessionStatus::Error => "error",
        }
    }
}

/// Why an attempt ended in `error`. Logged, never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The pairing request itself failed.
    Transport(String),
    /// The broker answered without an artifact.
    MissingArtifact,
    /// The countdown ran out.
    Expired,
    /// Status polling hit its ceiling.
    CeilingReached,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Transport(e) => write!(f, "pairing request failed: {e}"),
            FailureReason::MissingArtifact => write!(f, "broker returned no pairing artifact"),
            FailureReason::Expired => write!(f, "pairing artifact expired"),
            FailureReason::CeilingReached => write!(f, "status polling ceiling reached"),
        }
    }
}

/// Read-only copy of a session for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub instance_id: InstanceId,
    pub status: SessionStatus,
    pub artifact: Option<String>,
    pub countdown: u32,
    pub attempt: u32,
}

/// Effect of feeding one signal into a `PairingSession`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The signal does not apply in the current state and was dropped.
    Ignored,
    /// State changed; the session is still live.
    Updated,
    /// The session reached `connected`.
    Connected,
    /// The session reached `error`.
    Failed(FailureReason),
}

impl Transition {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Transition::Connected | Transition::Failed(_))
    }

    pub fn changed(&self) -> bool {
        !matches!(self, Transition::Ignored)
    }
}
