//! The pairing state machine.
//!
//! `loading → qr-ready ⇄ connecting → connected`, with `error` reachable
//! from every live state. Terminal states only accept `begin_attempt`.
//! The first terminal transition wins; every later signal is `Ignored`.

use tracing::debug;
use zap_common::InstanceId;

use crate::broker::{BrokerError, PairingResponse, RemoteStatus};

use super::types::{FailureReason, SessionSnapshot, SessionStatus, Transition};

#[derive(Debug, Clone)]
pub struct PairingSession {
    instance_id: InstanceId,
    status: SessionStatus,
    artifact: Option<String>,
    countdown: u32,
    initial_countdown: u32,
    attempt: u32,
    failure: Option<FailureReason>,
}

impl PairingSession {
    pub fn new(instance_id: InstanceId, initial_countdown: u32) -> Self {
        Self {
            instance_id,
            status: SessionStatus::Loading,
            artifact: None,
            countdown: initial_countdown,
            initial_countdown,
            attempt: 0,
            failure: None,
        }
    }

    /// Start a fresh attempt: back to `loading`, full countdown, no artifact.
    pub fn begin_attempt(&mut self) {
        self.status = SessionStatus::Loading;
        self.artifact = None;
        self.failure = None;
        self.countdown = self.initial_countdown;
        self.attempt += 1;
        debug!(instance = %self.instance_id, attempt = self.attempt, "pairing attempt started");
    }

    /// Apply the outcome of the pairing request.
    pub fn apply_pairing(&mut self, result: Result<PairingResponse, BrokerError>) -> Transition {
        if self.status != SessionStatus::Loading {
            return Transition::Ignored;
        }

        match result {
            Ok(response) => match response.artifact() {
                Some(artifact) => {
                    self.artifact = Some(artifact.to_string());
                    self.status = SessionStatus::QrReady;
                    Transition::Updated
                }
                None => self.fail(FailureReason::MissingArtifact),
            },
            Err(e) => self.fail(FailureReason::Transport(e.to_string())),
        }
    }

    /// One second elapsed on the countdown.
    pub fn tick(&mut self) -> Transition {
        if !self.status.awaiting_scan() {
            return Transition::Ignored;
        }

        if self.countdown <= 1 {
            self.countdown = 0;
            return self.fail(FailureReason::Expired);
        }

        self.countdown -= 1;
        Transition::Updated
    }

    /// Apply a status reported by the broker.
    pub fn apply_status(&mut self, status: &RemoteStatus) -> Transition {
        if !self.status.awaiting_scan() {
            return Transition::Ignored;
        }

        match status {
            RemoteStatus::Connected => {
                self.status = SessionStatus::Connected;
                Transition::Connected
            }
            RemoteStatus::Connecting if self.status == SessionStatus::QrReady => {
                self.status = SessionStatus::Connecting;
                Transition::Updated
            }
            RemoteStatus::Other(_) if self.status == SessionStatus::Connecting => {
                self.status = SessionStatus::QrReady;
                Transition::Updated
            }
            _ => Transition::Ignored,
        }
    }

    /// The polling ceiling elapsed.
    pub fn ceiling_reached(&mut self) -> Transition {
        if !self.status.awaiting_scan() {
            return Transition::Ignored;
        }
        self.fail(FailureReason::CeilingReached)
    }

    fn fail(&mut self, reason: FailureReason) -> Transition {
        self.status = SessionStatus::Error;
        self.failure = Some(reason.clone());
        Transition::Failed(reason)
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn artifact(&self) -> Option<&str> {
        self.artifact.as_deref()
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        self.failure.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            instance_id: self.instance_id.clone(),
            status: self.status,
            artifact: self.artifact.clone(),
            countdown: self.countdown,
            attempt: self.attempt,
        }
    }
}
