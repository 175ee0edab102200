//! HTTP bearer challenge (RFC 6750) for requests denied by scope requirements.
//!
//! The header is returned in `WWW-Authenticate`:
//!
//! ```text
//! Bearer realm="<request url>", authorization_uri="<authority>", audience="<audience>", scope="<s1> <s2>"
//! ```
//!
//! Attributes whose source is empty are left out; the order never changes.

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::scope_state::RequestScopeState;

/// Authentication error reported by the token validator (bad, expired, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationFailure {
    pub error: String,
    pub description: String,
}

impl AuthenticationFailure {
    pub fn invalid_token(description: impl Into<String>) -> Self {
        Self {
            error: "invalid_token".to_string(),
            description: description.into(),
        }
    }
}

/// Static challenge settings of the authentication scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeOptions {
    pub scheme: String,
    pub authority: String,
    pub audience: String,
}

impl Default for ChallengeOptions {
    fn default() -> Self {
        Self {
            scheme: "Bearer".to_string(),
            authority: String::new(),
            audience: String::new(),
        }
    }
}

/// Read-only view handed to the challenge builder once authorization is over.
#[derive(Debug, Clone, Copy)]
pub struct ChallengeContext<'a> {
    pub authentication_failure: Option<&'a AuthenticationFailure>,
    pub options: &'a ChallengeOptions,
    pub request_url: &'a str,
    pub scope_state: &'a RequestScopeState,
}

impl ChallengeContext<'_> {
    pub fn is_authentication_failure(&self) -> bool {
        self.authentication_failure.is_some()
    }
}

/// Response sink the builder writes into.
pub trait ChallengeResponse {
    /// Returns `false` (and keeps the old value) when the header already exists.
    fn try_add_header(&mut self, name: header::HeaderName, value: HeaderValue) -> bool;
    fn set_status(&mut self, status: StatusCode);
    /// No default challenge and no body after this.
    fn handle_response(&mut self);
}

/// Response under construction while the challenge hook runs.
#[derive(Debug)]
pub struct PendingResponse {
    status: StatusCode,
    headers: HeaderMap,
    handled: bool,
}

impl Default for PendingResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            handled: false,
        }
    }
}

impl PendingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[cfg(test)]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }
}

impl ChallengeResponse for PendingResponse {
    fn try_add_header(&mut self, name: header::HeaderName, value: HeaderValue) -> bool {
        if self.headers.contains_key(&name) {
            return false;
        }
        self.headers.insert(name, value);
        true
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn handle_response(&mut self) {
        self.handled = true;
    }
}

impl IntoResponse for PendingResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, Body::empty()).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderOutcome {
    /// Authentication failed upstream; nothing was touched.
    Abstained,
    Challenged {
        value: String,
        /// `false` when a `WWW-Authenticate` header was already present.
        header_written: bool,
    },
}

pub trait ChallengeBuilder: Send + Sync + std::fmt::Debug {
    fn build(
        &self,
        ctx: &ChallengeContext<'_>,
        default_scope: Option<&str>,
        response: &mut dyn ChallengeResponse,
    ) -> HeaderOutcome;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BearerChallengeBuilder;

impl ChallengeBuilder for BearerChallengeBuilder {
    fn build(
        &self,
        ctx: &ChallengeContext<'_>,
        default_scope: Option<&str>,
        response: &mut dyn ChallengeResponse,
    ) -> HeaderOutcome {
        // Token errors keep the validator's own error / error_description challenge.
        if ctx.is_authentication_failure() {
            return HeaderOutcome::Abstained;
        }

        let scope = resolve_scope(ctx.scope_state, default_scope);
        let value = header_value(ctx, scope);

        let header_written = match HeaderValue::from_str(&value) {
            Ok(header_value) => response.try_add_header(header::WWW_AUTHENTICATE, header_value),
            Err(err) => {
                tracing::warn!(error = %err, "could not construct WWW-Authenticate header");
                false
            }
        };

        response.set_status(StatusCode::UNAUTHORIZED);
        response.handle_response();

        HeaderOutcome::Challenged {
            value,
            header_written,
        }
    }
}

/// Accumulated misses first, then the configured default, otherwise no scope.
pub fn resolve_scope<'a>(state: &'a RequestScopeState, default_scope: Option<&'a str>) -> Option<&'a str> {
    state
        .value()
        .filter(|s| !s.is_empty())
        .or(default_scope)
        .filter(|s| !s.is_empty())
}

pub fn header_value(ctx: &ChallengeContext<'_>, scope: Option<&str>) -> String {
    let mut parts = Vec::with_capacity(4);

    if !ctx.request_url.is_empty() {
        parts.push(format!("realm=\"{}\"", ctx.request_url));
    }
    if !ctx.options.authority.is_empty() {
        parts.push(format!("authorization_uri=\"{}\"", ctx.options.authority));
    }
    if !ctx.options.audience.is_empty() {
        parts.push(format!("audience=\"{}\"", ctx.options.audience));
    }
    if let Some(scope) = scope.filter(|s| !s.is_empty()) {
        parts.push(format!("scope=\"{}\"", scope));
    }

    // With no attributes this is "<scheme> " including the trailing space.
    format!("{} {}", ctx.options.scheme, parts.join(", "))
}
