//! Named authorization policies and the driver that evaluates them for a request.

use std::collections::HashMap;
use std::sync::Arc;

use super::claims::ClaimSet;
use super::error::AuthzError;
use super::requirement::{Evaluator, Outcome, ScopeRequirement};
use super::scope_state::RequestScopeState;

#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    name: String,
    requirements: Vec<Arc<dyn Evaluator>>,
}

impl AuthorizationPolicy {
    pub fn builder(name: impl Into<String>) -> PolicyBuilder {
        PolicyBuilder {
            name: name.into(),
            requirements: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requirements(&self) -> &[Arc<dyn Evaluator>] {
        &self.requirements
    }
}

pub struct PolicyBuilder {
    name: String,
    requirements: Vec<Arc<dyn Evaluator>>,
}

impl PolicyBuilder {
    /// Adds a [`ScopeRequirement`]. A miss is recorded for the bearer challenge.
    pub fn require_scope(self, scope: impl Into<String>) -> Result<Self, AuthzError> {
        let requirement = ScopeRequirement::new(scope)?;
        Ok(self.add_requirement(Arc::new(requirement)))
    }

    pub fn add_requirement(mut self, requirement: Arc<dyn Evaluator>) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn build(self) -> Result<AuthorizationPolicy, AuthzError> {
        if self.requirements.is_empty() {
            return Err(AuthzError::EmptyPolicy(self.name));
        }
        Ok(AuthorizationPolicy {
            name: self.name,
            requirements: self.requirements,
        })
    }
}

/// Process-wide registry, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, Arc<AuthorizationPolicy>>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `policy` under its own name, replacing any previous one.
    pub fn add_policy(&mut self, policy: AuthorizationPolicy) -> &mut Self {
        self.policies
            .insert(policy.name().to_string(), Arc::new(policy));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<AuthorizationPolicy>> {
        self.policies.get(name).cloned()
    }

    /// Look up every name, in order. Fails on the first unknown one.
    pub fn resolve(&self, names: &[&str]) -> Result<Vec<Arc<AuthorizationPolicy>>, AuthzError> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| AuthzError::UnknownPolicy((*name).to_string()))
            })
            .collect()
    }
}

/// Per-request authorization context.
///
/// `claims` is `None` when there is no principal at all. The anonymous caller
/// is `Some(ClaimSet::anonymous())`.
#[derive(Debug, Default)]
pub struct AuthorizationContext {
    pub claims: Option<ClaimSet>,
    pub scope_state: RequestScopeState,
}

impl AuthorizationContext {
    pub fn new(claims: Option<ClaimSet>) -> Self {
        Self {
            claims,
            scope_state: RequestScopeState::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    Allowed,
    Denied { unmet: Vec<String> },
}

impl AuthorizationResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Evaluate every requirement of every policy, in order.
///
/// Evaluation continues after a requirement is not succeeded so that all
/// missing scopes end up in `ctx.scope_state`.
pub fn authorize(policies: &[Arc<AuthorizationPolicy>], ctx: &mut AuthorizationContext) -> AuthorizationResult {
    let AuthorizationContext {
        claims,
        scope_state,
    } = ctx;

    let mut unmet = Vec::new();
    for requirement in policies.iter().flat_map(|p| p.requirements()) {
        if requirement.evaluate(claims.as_ref(), scope_state) == Outcome::NotSucceeded {
            unmet.push(requirement.label().to_string());
        }
    }

    if unmet.is_empty() {
        AuthorizationResult::Allowed
    } else {
        AuthorizationResult::Denied { unmet }
    }
}
