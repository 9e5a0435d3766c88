//! # Session Core
//! 
//! Session lifecycle: domain types, store and transport ports, the verifier
//! pipeline and the per-request session manager.

pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;
pub mod transport;
pub mod verification;

// Re-export domain entities
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ExpiryPolicy, RotationPolicy, SessionConfig};
pub use domain::*;
pub use error::SessionError;
pub use repositories::{SessionStore, StoreError};
pub use services::{SessionHandle, SessionManager, SessionOutcome};
pub use transport::{SessionTransport, TransportError};
pub use verification::{SessionVerifier, Verdict, VerificationFailure, VerifierPipeline};
