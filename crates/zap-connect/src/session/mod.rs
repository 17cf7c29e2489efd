//! Pairing session state.

mod state;
mod types;


pub use state::PairingSession;
pub use types::{FailureReason, SessionSnapshot, SessionStatus, Transition};
