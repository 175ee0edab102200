//! Scope requirement: one instance per required scope, shared read-only by all requests.

use std::fmt;

use super::claims::ClaimSet;
use super::error::{AuthzError, non_blank};
use super::scope_state::RequestScopeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    /// Not a failure by itself; the policy driver reports the denial.
    NotSucceeded,
}

/// A declarative check run by [`authorize`](super::policy::authorize).
///
/// Implementations must not fail at request time. Anything a challenge needs
/// to know about a miss goes into `state`.
pub trait Evaluator: Send + Sync + fmt::Debug {
    fn evaluate(&self, claims: Option<&ClaimSet>, state: &mut RequestScopeState) -> Outcome;

    /// Short name used in logs.
    fn label(&self) -> &str;
}

/// Requires a `scope` claim equal to `scope` (ASCII case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRequirement {
    scope: String,
}

impl ScopeRequirement {
    pub fn new(scope: impl Into<String>) -> Result<Self, AuthzError> {
        let scope = non_blank("scope", scope.into())?;
        Ok(Self { scope })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl Evaluator for ScopeRequirement {
    fn evaluate(&self, claims: Option<&ClaimSet>, state: &mut RequestScopeState) -> Outcome {
        // No principal at all: nothing to compare against, nothing to register.
        let Some(claims) = claims else {
            return Outcome::NotSucceeded;
        };

        // ASCII folding only: scope tokens are ASCII (RFC 6749 §3.3).
        if claims
            .scopes()
            .any(|granted| granted.eq_ignore_ascii_case(&self.scope))
        {
            return Outcome::Succeeded;
        }

        tracing::debug!(scope = %self.scope, "scope requirement not met");
        state.register(&self.scope);
        Outcome::NotSucceeded
    }

    fn label(&self) -> &str {
        &self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::authz::claims::Claim;

    fn claims(pairs: &[(&str, &str)]) -> ClaimSet {
        pairs.iter().map(|(k, v)| Claim::new(*k, *v)).collect()
    }

    #[test]
    fn rejects_blank_scope() {
        assert_eq!(
            ScopeRequirement::new(""),
            Err(AuthzError::InvalidArgument("scope"))
        );
        assert_eq!(
            ScopeRequirement::new(" \t "),
            Err(AuthzError::InvalidArgument("scope"))
        );
    }

    #[test]
    fn single_miss_is_registered() {
        let req = ScopeRequirement::new("read-cars").unwrap();
        let mut state = RequestScopeState::new();

        let outcome = req.evaluate(Some(&claims(&[("scope", "read-trucks")])), &mut state);

        assert_eq!(outcome, Outcome::NotSucceeded);
        assert_eq!(state.value(), Some("read-cars"));
    }

    #[test]
    fn misses_from_several_requirements_accumulate() {
        let cars = ScopeRequirement::new("read-cars").unwrap();
        let trucks = ScopeRequirement::new("read-trucks").unwrap();
        let caller = claims(&[("client_id", "console")]);
        let mut state = RequestScopeState::new();

        cars.evaluate(Some(&caller), &mut state);
        trucks.evaluate(Some(&caller), &mut state);

        assert_eq!(state.value(), Some("read-cars read-trucks"));
    }

    #[test]
    fn same_scope_missed_twice_appears_twice() {
        let req = ScopeRequirement::new("read-cars").unwrap();
        let caller = ClaimSet::anonymous();
        let mut state = RequestScopeState::new();

        req.evaluate(Some(&caller), &mut state);
        req.evaluate(Some(&caller), &mut state);

        assert_eq!(state.value(), Some("read-cars read-cars"));
    }

    #[test]
    fn satisfied_requirement_leaves_state_absent() {
        let req = ScopeRequirement::new("read-cars").unwrap();
        let mut state = RequestScopeState::new();

        let outcome = req.evaluate(Some(&claims(&[("scope", "read-cars")])), &mut state);

        assert_eq!(outcome, Outcome::Succeeded);
        assert_eq!(state.value(), None);
    }

    #[test]
    fn comparison_ignores_case_of_type_and_value() {
        let req = ScopeRequirement::new("Read-Cars").unwrap();
        let mut state = RequestScopeState::new();

        let outcome = req.evaluate(Some(&claims(&[("Scope", "READ-CARS")])), &mut state);

        assert_eq!(outcome, Outcome::Succeeded);
        assert_eq!(state.value(), None);
    }

    #[test]
    fn non_ascii_letters_are_compared_exactly() {
        let req = ScopeRequirement::new("lire-données").unwrap();
        let mut state = RequestScopeState::new();

        let outcome = req.evaluate(Some(&claims(&[("scope", "LIRE-DONNÉES")])), &mut state);

        assert_eq!(outcome, Outcome::NotSucceeded);
        assert_eq!(state.value(), Some("lire-données"));
    }

    #[test]
    fn missing_principal_registers_nothing() {
        let req = ScopeRequirement::new("read-cars").unwrap();
        let mut state = RequestScopeState::new();

        assert_eq!(req.evaluate(None, &mut state), Outcome::NotSucceeded);
        assert_eq!(state.value(), None);
    }
}
