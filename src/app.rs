/*
 * Responsibility
 * - Config読み込み → 依存生成 (validator / policies / challenge) → Router 組み立て
 * - Middleware の適用 (route guard / HTTP layers)
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{
    self,
    v1::{READ_CARS, READ_TRUCKS},
};
use crate::config::Config;
use crate::middleware;
use crate::services::auth::build_auth_service;
use crate::services::authz::{
    AuthorizationPolicy, AuthzError, ChallengeEvents, ChallengeOptions, PolicyRegistry,
};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,bearer_challenge=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: fail fast. production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = middleware::http::apply(build_router(state)?, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// One policy per scope the API exposes.
pub fn build_policies() -> Result<PolicyRegistry, AuthzError> {
    let mut registry = PolicyRegistry::new();
    for scope in [READ_CARS, READ_TRUCKS] {
        registry.add_policy(
            AuthorizationPolicy::builder(scope)
                .require_scope(scope)?
                .build()?,
        );
    }
    Ok(registry)
}

pub fn build_challenge_events(default_scope: Option<&str>) -> Result<ChallengeEvents, AuthzError> {
    match default_scope {
        Some(scope) => ChallengeEvents::with_default_scope(scope),
        None => Ok(ChallengeEvents::new()),
    }
}

fn build_state(config: &Config) -> Result<AppState> {
    let validator = build_auth_service(config)?;
    let policies = build_policies()?;
    let challenge = build_challenge_events(config.challenge_default_scope.as_deref())?;
    let options = ChallengeOptions {
        scheme: config.challenge_scheme.clone(),
        authority: config.auth_authority.clone(),
        audience: config.auth_audience.clone(),
    };

    let state = AppState::new(validator, policies, challenge, options);
    Ok(match &config.public_base_url {
        Some(url) => state.with_public_base_url(url.clone()),
        None => state,
    })
}

pub fn build_router(state: AppState) -> Result<Router, AuthzError> {
    let v1 = api::v1::routes(&state)?;

    Ok(Router::new().nest("/api/v1", v1).with_state(state))
}
