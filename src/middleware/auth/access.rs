//! access token 検証 → scope 認可 → 拒否時は bearer challenge を返す
//!
//! Flow per request:
//! - `Authorization: Bearer <jwt>` を TokenValidator で検証 (token なしは匿名として扱う)
//! - route に付けた policy の requirement をすべて評価し、不足 scope を蓄積する
//! - 許可: AuthCtx を extensions に入れて handler へ
//! - 拒否: ChallengeEvents → WWW-Authenticate + 401。token エラー時は validator 側の
//!   `error` / `error_description` を返す default challenge にフォールバックする

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::authenticate;
use crate::services::authz::{
    AuthenticationFailure, AuthorizationContext, AuthorizationPolicy, AuthorizationResult,
    AuthzError, ChallengeContext, PendingResponse, authorize,
};
use crate::state::AppState;

/// Per-route middleware state: the app state plus the policies the route requires.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    state: AppState,
    policies: Arc<[Arc<AuthorizationPolicy>]>,
}

/// Protect every route of `router` with the named policies.
///
/// Unknown names fail here, at startup.
///
/// 例：
/// ```ignore
/// let cars = Router::new().route("/cars", get(list_cars));
/// let cars = middleware::auth::require(cars, &state, &["read-cars"])?;
/// ```
pub fn require(
    router: Router<AppState>,
    state: &AppState,
    policy_names: &[&str],
) -> Result<Router<AppState>, AuthzError> {
    let policies = state.policies.resolve(policy_names)?;
    let guard = RouteGuard {
        state: state.clone(),
        policies: policies.into(),
    };

    // route_layer: 404/405 はそのまま (認可を掛けるのはマッチした route だけ)
    Ok(router.route_layer(middleware::from_fn_with_state(guard, access_middleware)))
}

async fn access_middleware(
    State(guard): State<RouteGuard>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let state = &guard.state;

    let authn = authenticate(state.validator.as_ref(), req.headers());
    let mut authz = AuthorizationContext::new(Some(authn.principal()));

    match authorize(&guard.policies, &mut authz) {
        AuthorizationResult::Allowed => {
            let claims = authz.claims.unwrap_or_default();
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(AuthCtx::from_claims(&claims));
            next.run(req).await
        }
        AuthorizationResult::Denied { unmet } => {
            tracing::info!(
                path = %original_uri.path(),
                unmet = ?unmet,
                authentication_failed = authn.failure().is_some(),
                "access denied"
            );

            let request_url = request_url(
                state.public_base_url.as_deref(),
                req.headers(),
                &original_uri,
            );
            let ctx = ChallengeContext {
                authentication_failure: authn.failure(),
                options: &state.challenge_options,
                request_url: &request_url,
                scope_state: &authz.scope_state,
            };

            let mut pending = PendingResponse::new();
            state.challenge.on_challenge(&ctx, &mut pending);

            if pending.is_handled() {
                return pending.into_response();
            }

            default_challenge(&state.challenge_options.scheme, authn.failure())
        }
    }
}

/// Challenge used when the hook does not handle the response: 401 with
/// `<scheme> error="..", error_description=".."` (or only the scheme name).
fn default_challenge(scheme: &str, failure: Option<&AuthenticationFailure>) -> Response {
    let mut parts = Vec::new();
    if let Some(failure) = failure {
        if !failure.error.is_empty() {
            parts.push(format!("error=\"{}\"", failure.error));
        }
        if !failure.description.is_empty() {
            parts.push(format!("error_description=\"{}\"", failure.description));
        }
    }

    let value = if parts.is_empty() {
        scheme.to_string()
    } else {
        format!("{} {}", scheme, parts.join(", "))
    };

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&value) {
        Ok(v) => {
            headers.insert(header::WWW_AUTHENTICATE, v);
        }
        Err(err) => tracing::warn!(error = %err, "could not construct WWW-Authenticate header"),
    }

    (StatusCode::UNAUTHORIZED, headers).into_response()
}

/// Canonical absolute URL of the request, used as the challenge realm.
///
/// Base: `PUBLIC_BASE_URL` if configured, else `http://<Host>`. Empty when neither is known.
fn request_url(public_base_url: Option<&str>, headers: &HeaderMap, uri: &Uri) -> String {
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    let base = match public_base_url {
        Some(base) => base.trim_end_matches('/').to_string(),
        None => {
            let host = uri.authority().map(|a| a.as_str()).or_else(|| {
                headers
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok())
            });
            match host {
                Some(host) => format!("{}://{}", uri.scheme_str().unwrap_or("http"), host),
                None => return String::new(),
            }
        }
    };

    Url::parse(&format!("{base}{path}"))
        .map(String::from)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn request_url_prefers_public_base_url() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:3000"));

        assert_eq!(
            request_url(Some("https://api.example.com/"), &headers, &uri("/api/v1/cars?page=2")),
            "https://api.example.com/api/v1/cars?page=2"
        );
    }

    #[test]
    fn request_url_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));

        assert_eq!(
            request_url(None, &headers, &uri("/api/v1/trucks")),
            "http://localhost:3000/api/v1/trucks"
        );
    }

    #[test]
    fn request_url_is_percent_encoded() {
        assert_eq!(
            request_url(Some("https://api.example.com"), &HeaderMap::new(), &uri("/api/v1/cars?q=a%20b")),
            "https://api.example.com/api/v1/cars?q=a%20b"
        );
    }

    #[test]
    fn request_url_empty_without_host() {
        assert_eq!(request_url(None, &HeaderMap::new(), &uri("/api/v1/cars")), "");
    }

    #[test]
    fn default_challenge_surfaces_token_error() {
        let failure = AuthenticationFailure::invalid_token("The token expired");
        let res = default_challenge("Bearer", Some(&failure));

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers()[header::WWW_AUTHENTICATE],
            r#"Bearer error="invalid_token", error_description="The token expired""#
        );
    }

    #[test]
    fn default_challenge_without_error_is_scheme_only() {
        let res = default_challenge("Bearer", None);
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }
}
