//! Challenge hook run when a request is denied.
//!
//! Owns the optional default scope of the authentication scheme and hands
//! each challenge to a [`ChallengeBuilder`].

use std::sync::Arc;

use super::challenge::{
    BearerChallengeBuilder, ChallengeBuilder, ChallengeContext, ChallengeResponse, HeaderOutcome,
};
use super::error::{AuthzError, non_blank};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DefaultScope {
    #[default]
    NoDefault,
    Scope(String),
}

impl DefaultScope {
    /// An explicitly supplied default must not be blank.
    pub fn explicit(scope: impl Into<String>) -> Result<Self, AuthzError> {
        Ok(Self::Scope(non_blank("default_scope", scope.into())?))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::NoDefault => None,
            Self::Scope(scope) => Some(scope),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChallengeEvents {
    default_scope: DefaultScope,
    builder: Arc<dyn ChallengeBuilder>,
}

impl Default for ChallengeEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeEvents {
    /// Relies only on the scopes missed during the request.
    pub fn new() -> Self {
        Self {
            default_scope: DefaultScope::NoDefault,
            builder: Arc::new(BearerChallengeBuilder),
        }
    }

    pub fn with_default_scope(scope: impl Into<String>) -> Result<Self, AuthzError> {
        Ok(Self {
            default_scope: DefaultScope::explicit(scope)?,
            ..Self::new()
        })
    }

    pub fn with_builder(mut self, builder: Arc<dyn ChallengeBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn default_scope(&self) -> &DefaultScope {
        &self.default_scope
    }

    pub fn on_challenge(
        &self,
        ctx: &ChallengeContext<'_>,
        response: &mut dyn ChallengeResponse,
    ) -> HeaderOutcome {
        tracing::debug!(
            missed = ?ctx.scope_state.value(),
            default_scope = ?self.default_scope.as_deref(),
            "building bearer challenge header"
        );

        self.builder
            .build(ctx, self.default_scope.as_deref(), response)
    }
}
