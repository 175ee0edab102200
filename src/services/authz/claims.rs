//! Validated claims of the caller.
//!
//! The token validator produces a `ClaimSet`; the authorization core only reads it.

pub const SCOPE_CLAIM: &str = "scope";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub kind: String,
    pub value: String,
}

impl Claim {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Ordered claim list. An empty set is the anonymous principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    claims: Vec<Claim>,
}

impl ClaimSet {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn push(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Values of every `scope` claim (claim type compared case-insensitively).
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.claims
            .iter()
            .filter(|c| c.kind.eq_ignore_ascii_case(SCOPE_CLAIM))
            .map(|c| c.value.as_str())
    }

    pub fn first(&self, kind: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.kind.eq_ignore_ascii_case(kind))
            .map(|c| c.value.as_str())
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        Self {
            claims: iter.into_iter().collect(),
        }
    }
}
