#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Router-level tests for the bearer challenge.
//!
//! Tokens are resolved by a fake validator so that each test states the exact
//! claims the caller carries.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use bearer_challenge::{
    app::{build_policies, build_router},
    services::{
        auth::TokenValidator,
        authz::{AuthenticationFailure, ChallengeEvents, ChallengeOptions, Claim, ClaimSet},
    },
    state::AppState,
};
use tower::ServiceExt;

#[derive(Debug)]
struct FakeValidator;

impl TokenValidator for FakeValidator {
    fn validate(&self, token: &str) -> Result<ClaimSet, AuthenticationFailure> {
        let scopes: &[&str] = match token {
            "cars" => &["read-cars"],
            "trucks" => &["read-trucks"],
            "both" => &["read-cars", "read-trucks"],
            "none" => &[],
            "expired" => return Err(AuthenticationFailure::invalid_token("The token expired")),
            _ => return Err(AuthenticationFailure::invalid_token("The token is invalid")),
        };

        let mut claims: ClaimSet = [Claim::new("client_id", "console")].into_iter().collect();
        for scope in scopes {
            claims.push(Claim::new("scope", *scope));
        }
        Ok(claims)
    }
}

fn options() -> ChallengeOptions {
    ChallengeOptions {
        scheme: "Bearer".into(),
        authority: "https://idp.example.com".into(),
        audience: "rest-api".into(),
    }
}

fn app_with(events: ChallengeEvents) -> Router {
    let state = AppState::new(
        Arc::new(FakeValidator),
        build_policies().unwrap(),
        events,
        options(),
    )
    .with_public_base_url("https://api.example.com");

    build_router(state).unwrap()
}

fn app() -> Router {
    app_with(ChallengeEvents::new())
}

async fn get(app: Router, path: &str, token: Option<&str>) -> Response {
    let mut req = Request::builder().uri(path);
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

fn www_authenticate(res: &Response) -> Option<String> {
    res.headers()
        .get(header::WWW_AUTHENTICATE)
        .map(|v| v.to_str().unwrap().to_string())
}

async fn body_string(res: Response) -> String {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let res = get(app(), "/api/v1/health", None).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(www_authenticate(&res), None);
}

#[tokio::test]
async fn missing_token_gets_scope_challenge() {
    let res = get(app(), "/api/v1/cars", None).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        www_authenticate(&res).as_deref(),
        Some(
            r#"Bearer realm="https://api.example.com/api/v1/cars", authorization_uri="https://idp.example.com", audience="rest-api", scope="read-cars""#
        )
    );
    assert_eq!(body_string(res).await, "");
}

#[tokio::test]
async fn insufficient_scope_names_the_missing_scope() {
    let res = get(app(), "/api/v1/trucks", Some("cars")).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(
        www_authenticate(&res)
            .unwrap()
            .ends_with(r#"audience="rest-api", scope="read-trucks""#)
    );
}

#[tokio::test]
async fn two_policies_on_one_route_aggregate_scopes() {
    let res = get(app(), "/api/v1/vehicles", Some("none")).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(
        www_authenticate(&res)
            .unwrap()
            .ends_with(r#"scope="read-cars read-trucks""#)
    );
}

#[tokio::test]
async fn partially_satisfied_route_lists_only_the_miss() {
    let res = get(app(), "/api/v1/vehicles", Some("trucks")).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(
        www_authenticate(&res)
            .unwrap()
            .ends_with(r#"scope="read-cars""#)
    );
}

#[tokio::test]
async fn sufficient_scope_reaches_handler() {
    let res = get(app(), "/api/v1/cars", Some("cars")).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(www_authenticate(&res), None);
    assert_eq!(body_string(res).await, r#"["Car 1","Car 2","Car 3"]"#);
}

#[tokio::test]
async fn vehicles_with_both_scopes() {
    let res = get(app(), "/api/v1/vehicles", Some("both")).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_string(res).await,
        r#"["Car 1","Car 2","Car 3","Truck 1","Truck 2","Truck 3"]"#
    );
}

#[tokio::test]
async fn expired_token_keeps_validator_error() {
    let res = get(app(), "/api/v1/cars", Some("expired")).await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let value = www_authenticate(&res).unwrap();
    assert_eq!(
        value,
        r#"Bearer error="invalid_token", error_description="The token expired""#
    );
    assert!(!value.contains("scope="));
}

#[tokio::test]
async fn authentication_failure_ignores_default_scope() {
    let events = ChallengeEvents::with_default_scope("read-cars").unwrap();
    let res = get(app_with(events), "/api/v1/trucks", Some("garbage")).await;

    assert_eq!(
        www_authenticate(&res).as_deref(),
        Some(r#"Bearer error="invalid_token", error_description="The token is invalid""#)
    );
}

#[tokio::test]
async fn query_string_is_part_of_realm() {
    let res = get(app(), "/api/v1/cars?page=2", None).await;

    assert!(
        www_authenticate(&res)
            .unwrap()
            .starts_with(r#"Bearer realm="https://api.example.com/api/v1/cars?page=2", "#)
    );
}

#[tokio::test]
async fn unknown_route_is_not_challenged() {
    let res = get(app(), "/api/v1/boats", None).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(www_authenticate(&res), None);
}
