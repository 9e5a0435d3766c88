//! Read-only request view handed to verifiers

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use http::{header::USER_AGENT, HeaderMap};

/// What the session layer knows about the inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HeaderMap,
    client_ip: Option<IpAddr>,
}

impl RequestContext {
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers, client_ip: None }
    }

    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn client_ip(&self) -> Option<IpAddr> {
        self.client_ip
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT).and_then(|v| v.to_str().ok())
    }
}

/// Request context plus the instant the session is being resolved at.
#[derive(Debug, Clone, Copy)]
pub struct VerifyContext<'a> {
    pub request: &'a RequestContext,
    pub now: DateTime<Utc>,
}

impl<'a> VerifyContext<'a> {
    pub fn new(request: &'a RequestContext, now: DateTime<Utc>) -> Self {
        Self { request, now }
    }
}
