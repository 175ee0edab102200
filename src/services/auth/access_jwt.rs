use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;
use std::{error::Error as StdError, fmt};

use crate::services::auth::validator::TokenValidator;
use crate::services::authz::{AuthenticationFailure, Claim, ClaimSet};

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    Jwt(jsonwebtoken::errors::Error),
    InvalidKey(jsonwebtoken::errors::Error),
    MissingOrInvalidAud,
    EmptyClaim(&'static str),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::InvalidKey(e) => write!(f, "invalid ed25519 public key pem: {}", e),
            Self::MissingOrInvalidAud => write!(f, "missing or invalid 'aud' claim"),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) | Self::InvalidKey(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

impl From<AccessJwtError> for AuthenticationFailure {
    fn from(e: AccessJwtError) -> Self {
        let description = match &e {
            AccessJwtError::Jwt(err) => match err.kind() {
                ErrorKind::ExpiredSignature => "The token expired",
                ErrorKind::ImmatureSignature => "The token is not valid yet",
                ErrorKind::InvalidSignature => "The signature is invalid",
                ErrorKind::InvalidAudience => "The audience is invalid",
                ErrorKind::InvalidIssuer => "The issuer is invalid",
                _ => "The token is invalid",
            },
            AccessJwtError::MissingOrInvalidAud => "The audience is invalid",
            AccessJwtError::EmptyClaim(_) | AccessJwtError::InvalidKey(_) => {
                "The token is invalid"
            }
        };
        AuthenticationFailure::invalid_token(description)
    }
}

fn aud_is_present_and_valid(aud: &serde_json::Value) -> bool {
    match aud {
        serde_json::Value::String(s) => !s.trim().is_empty(),
        serde_json::Value::Array(arr) => arr.iter().any(|v| match v {
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => false,
        }),
        // Missing claim ends up as Null due to #[serde(default)]
        _ => false,
    }
}

/// `scope` is a space-delimited string (RFC 8693) or an array of scope tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScopeClaim {
    Delimited(String),
    List(Vec<String>),
}

impl ScopeClaim {
    fn tokens(&self) -> Vec<&str> {
        match self {
            Self::Delimited(s) => s.split_whitespace().collect(),
            Self::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

/// Access token (JWT) claims.
///
/// Client-credentials tokens carry `client_id` and usually no `sub`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    #[serde(default)]
    pub aud: serde_json::Value,
    pub exp: u64,

    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub scope: Option<ScopeClaim>,
}

impl AccessTokenClaims {
    /// One claim per scope token, plus the identity claims that are present.
    pub fn into_claim_set(self) -> ClaimSet {
        let mut claims = ClaimSet::anonymous();
        claims.push(Claim::new("iss", self.iss));
        if let Some(sub) = self.sub {
            claims.push(Claim::new("sub", sub));
        }
        if let Some(client_id) = self.client_id {
            claims.push(Claim::new("client_id", client_id));
        }
        if let Some(scope) = &self.scope {
            for token in scope.tokens() {
                claims.push(Claim::new("scope", token));
            }
        }
        claims
    }
}

/// EdDSA (Ed25519) access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        access_public_key_pem: &str,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, AccessJwtError> {
        let decoding_key = DecodingKey::from_ed_pem(access_public_key_pem.as_bytes())
            .map_err(AccessJwtError::InvalidKey)?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.validate_nbf = true;
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    // Verify and decode a JWT access token.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify + strict claim validation.
    ///
    /// `jsonwebtoken::Validation` already checks signature, `exp`, `nbf`, `iss`
    /// and `aud`. This additionally rejects empty `iss` / `aud` values.
    pub fn verify_strict(&self, token: &str) -> Result<AccessTokenClaims, AccessJwtError> {
        let claims = self.verify(token)?;

        if claims.iss.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("iss"));
        }
        if claims.exp == 0 {
            return Err(AccessJwtError::EmptyClaim("exp"));
        }
        if !aud_is_present_and_valid(&claims.aud) {
            return Err(AccessJwtError::MissingOrInvalidAud);
        }

        Ok(claims)
    }
}

impl TokenValidator for AuthService {
    fn validate(&self, token: &str) -> Result<ClaimSet, AuthenticationFailure> {
        self.verify_strict(token)
            .map(AccessTokenClaims::into_claim_set)
            .map_err(AuthenticationFailure::from)
    }
}
