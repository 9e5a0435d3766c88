//! Session verification: ordered, pure predicates run after resolution

pub mod builtin;
pub mod pipeline;

pub use builtin::{ClientIpBinding, FnVerifier, NotExpired, UserAgentBinding, CLIENT_IP_KEY, USER_AGENT_KEY};
pub use pipeline::{SessionVerifier, Verdict, VerificationFailure, VerifierPipeline};
