/// Scopes that failed to match while authorizing a single request.
///
/// Owned by the request's `AuthorizationContext`; every requirement evaluated
/// for the request appends to the same value, and the challenge builder reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestScopeState {
    missing: Option<String>,
}

impl RequestScopeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `scope`, space-separated, after whatever earlier evaluations registered.
    /// Duplicates are kept.
    pub fn register(&mut self, scope: &str) {
        match &mut self.missing {
            Some(value) => {
                value.push(' ');
                value.push_str(scope);
            }
            None => self.missing = Some(scope.to_string()),
        }
    }

    /// `None` until the first miss.
    pub fn value(&self) -> Option<&str> {
        self.missing.as_deref()
    }
}
