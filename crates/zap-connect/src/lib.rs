//! WhatsApp instance pairing for zap.
//!
//! Provides:
//! - A `SessionBroker` abstraction over the remote webhook endpoints, with a
//!   reqwest-backed `WebhookBroker`
//! - The pairing state machine (`PairingSession`)
//! - A `ConnectionPoller` that requests a pairing artifact and polls for the
//!   connected status with a countdown and a polling ceiling
//! - Pairing artifact decoding and terminal QR rendering
//! - An `InstanceDirectory` that remembers the last selected instance

pub mod artifact;
pub mod broker;
pub mod instances;
pub mod poller;
pub mod session;

pub use artifact::{format_countdown, render_qr_unicode, ArtifactError, PairingArtifact};
pub use broker::{
    BrokerError, Instance, InstanceStatus, PairingResponse, RemoteStatus, SessionBroker,
    StatusResponse, WebhookBroker,
};
pub use instances::{
    DirectoryError, FileSelectionStore, InstanceDirectory, MemorySelectionStore, SelectionStore,
};
pub use poller::{ConnectionPoller, PollerError, PollerEvent, PollerHandle, PollerSettings};
pub use session::{FailureReason, PairingSession, SessionSnapshot, SessionStatus, Transition};
