use axum::http::{HeaderMap, header};

use crate::services::authz::{AuthenticationFailure, ClaimSet};

/// Token validator seam. The middleware only sees claims or a failure.
pub trait TokenValidator: Send + Sync + std::fmt::Debug {
    fn validate(&self, token: &str) -> Result<ClaimSet, AuthenticationFailure>;
}

/// Result of the authentication step for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    /// No bearer token in the request.
    NoResult,
    Success(ClaimSet),
    Failure(AuthenticationFailure),
}

impl Authentication {
    /// Claims the authorization step runs against. Anything but a success is anonymous.
    pub fn principal(&self) -> ClaimSet {
        match self {
            Self::Success(claims) => claims.clone(),
            Self::NoResult | Self::Failure(_) => ClaimSet::anonymous(),
        }
    }

    pub fn failure(&self) -> Option<&AuthenticationFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// `Authorization: Bearer <token>` (scheme matched case-insensitively).
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub fn authenticate(validator: &dyn TokenValidator, headers: &HeaderMap) -> Authentication {
    let Some(token) = bearer_token(headers) else {
        return Authentication::NoResult;
    };

    match validator.validate(token) {
        Ok(claims) => Authentication::Success(claims),
        Err(failure) => {
            tracing::warn!(
                error = %failure.error,
                description = %failure.description,
                "access token verification failed"
            );
            Authentication::Failure(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    use crate::services::authz::Claim;

    #[derive(Debug)]
    struct Echo;

    impl TokenValidator for Echo {
        fn validate(&self, token: &str) -> Result<ClaimSet, AuthenticationFailure> {
            match token {
                "good" => Ok([Claim::new("scope", "read-cars")].into_iter().collect()),
                _ => Err(AuthenticationFailure::invalid_token("The token is invalid")),
            }
        }
    }

    fn headers(authorization: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(authorization));
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn missing_token_is_no_result() {
        let authn = authenticate(&Echo, &HeaderMap::new());
        assert_eq!(authn, Authentication::NoResult);
        assert!(authn.failure().is_none());
        assert!(authn.principal().is_empty());
    }

    #[test]
    fn invalid_token_is_failure_with_anonymous_principal() {
        let authn = authenticate(&Echo, &headers("Bearer nope"));
        assert_eq!(
            authn.failure(),
            Some(&AuthenticationFailure::invalid_token("The token is invalid"))
        );
        assert!(authn.principal().is_empty());
    }

    #[test]
    fn valid_token_yields_claims() {
        let authn = authenticate(&Echo, &headers("Bearer good"));
        assert_eq!(authn.principal().scopes().collect::<Vec<_>>(), ["read-cars"]);
    }
}
