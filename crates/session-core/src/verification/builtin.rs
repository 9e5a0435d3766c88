//! Built-in verifiers

use crate::domain::{SessionRecord, VerifyContext};

use super::pipeline::{SessionVerifier, Verdict};

/// Data key holding the user agent a session is bound to.
pub const USER_AGENT_KEY: &str = "_bound_user_agent";
/// Data key holding the client IP a session is bound to.
pub const CLIENT_IP_KEY: &str = "_bound_client_ip";

/// Rejects dead records even if a store handed one back.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotExpired;

impl SessionVerifier for NotExpired {
    fn name(&self) -> &str {
        "not_expired"
    }

    fn verify(&self, record: &SessionRecord, ctx: &VerifyContext<'_>) -> Verdict {
        if record.is_expired(ctx.now) {
            Verdict::fail(format!("expired at {}", record.expires_at.to_rfc3339()))
        } else {
            Verdict::Pass
        }
    }
}

/// Compare a value bound in the session data with what the request presents.
/// Sessions without a bound value pass.
fn check_binding(record: &SessionRecord, key: &str, presented: Option<&str>, what: &str) -> Verdict {
    let Some(bound) = record.data.get(key) else {
        return Verdict::Pass;
    };
    match (bound.as_str(), presented) {
        (Some(bound), Some(presented)) if bound == presented => Verdict::Pass,
        (Some(_), Some(_)) => Verdict::fail(format!("{} changed", what)),
        (Some(_), None) => Verdict::fail(format!("{} missing", what)),
        (None, _) => Verdict::fail(format!("bound {} is not a string", what)),
    }
}

/// Session must keep presenting the same `User-Agent`.
#[derive(Debug, Clone)]
pub struct UserAgentBinding {
    key: String,
}

impl UserAgentBinding {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl SessionVerifier for UserAgentBinding {
    fn name(&self) -> &str {
        "user_agent"
    }

    fn verify(&self, record: &SessionRecord, ctx: &VerifyContext<'_>) -> Verdict {
        check_binding(record, &self.key, ctx.request.user_agent(), "user agent")
    }
}

/// Session must keep coming from the same client IP.
#[derive(Debug, Clone)]
pub struct ClientIpBinding {
    key: String,
}

impl ClientIpBinding {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl SessionVerifier for ClientIpBinding {
    fn name(&self) -> &str {
        "client_ip"
    }

    fn verify(&self, record: &SessionRecord, ctx: &VerifyContext<'_>) -> Verdict {
        let presented = ctx.request.client_ip().map(|ip| ip.to_string());
        check_binding(record, &self.key, presented.as_deref(), "client ip")
    }
}

/// Application predicate from a closure.
pub struct FnVerifier<F> {
    name: String,
    check: F,
}

impl<F> FnVerifier<F>
where
    F: Fn(&SessionRecord, &VerifyContext<'_>) -> Verdict + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self { name: name.into(), check }
    }
}

impl<F> SessionVerifier for FnVerifier<F>
where
    F: Fn(&SessionRecord, &VerifyContext<'_>) -> Verdict + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn verify(&self, record: &SessionRecord, ctx: &VerifyContext<'_>) -> Verdict {
        (self.check)(record, ctx)
    }
}
