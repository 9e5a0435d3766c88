//! Fail-fast verifier pipeline

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::builtin::{ClientIpBinding, NotExpired, UserAgentBinding, CLIENT_IP_KEY, USER_AGENT_KEY};
use crate::domain::{SessionRecord, VerifyContext};
use crate::error::SessionError;

/// Outcome of one predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    pub fn fail(reason: impl Into<String>) -> Self {
        Verdict::Fail(reason.into())
    }
}

/// A pure check on a resolved session.
///
/// Verifiers see the record and the request read-only; they cannot mutate
/// session state.
pub trait SessionVerifier: Send + Sync {
    fn name(&self) -> &str;
    fn verify(&self, record: &SessionRecord, ctx: &VerifyContext<'_>) -> Verdict;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Session rejected by {verifier}: {reason}")]
pub struct VerificationFailure {
    pub verifier: String,
    pub reason: String,
}

/// Ordered verifiers; the expiry check always runs first.
#[derive(Clone)]
pub struct VerifierPipeline {
    verifiers: Vec<Arc<dyn SessionVerifier>>,
}

impl fmt::Debug for VerifierPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.verifiers.iter().map(|v| v.name()))
            .finish()
    }
}

impl Default for VerifierPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl VerifierPipeline {
    pub fn new() -> Self {
        Self {
            verifiers: vec![Arc::new(NotExpired)],
        }
    }

    /// Append a verifier after the ones already registered.
    pub fn with(mut self, verifier: impl SessionVerifier + 'static) -> Self {
        self.verifiers.push(Arc::new(verifier));
        self
    }

    pub fn with_arc(mut self, verifier: Arc<dyn SessionVerifier>) -> Self {
        self.verifiers.push(verifier);
        self
    }

    /// Build from configured names: `user_agent`, `client_ip`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, SessionError> {
        names.iter().try_fold(Self::new(), |pipeline, name| {
            match name.as_ref().trim().to_lowercase().as_str() {
                "user_agent" => Ok(pipeline.with(UserAgentBinding::new(USER_AGENT_KEY))),
                "client_ip" => Ok(pipeline.with(ClientIpBinding::new(CLIENT_IP_KEY))),
                other => Err(SessionError::InvalidConfig(format!("unknown verifier: {}", other))),
            }
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.verifiers.iter().map(|v| v.name()).collect()
    }

    /// Run every verifier in order, stopping at the first failure.
    pub fn run(&self, record: &SessionRecord, ctx: &VerifyContext<'_>) -> Result<(), VerificationFailure> {
        for verifier in &self.verifiers {
            if let Verdict::Fail(reason) = verifier.verify(record, ctx) {
                return Err(VerificationFailure {
                    verifier: verifier.name().to_string(),
                    reason,
                });
            }
        }
        Ok(())
    }
}
