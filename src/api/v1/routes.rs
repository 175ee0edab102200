/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health は公開、/cars /trucks /vehicles は policy 付き (route_layer で適用)
 */
use axum::{Router, routing::get};

use crate::middleware::auth::require;
use crate::services::authz::AuthzError;
use crate::state::AppState;

use crate::api::v1::handlers::{
    cars::list_cars, health::health, trucks::list_trucks, vehicles::list_vehicles,
};

pub const READ_CARS: &str = "read-cars";
pub const READ_TRUCKS: &str = "read-trucks";

pub fn routes(state: &AppState) -> Result<Router<AppState>, AuthzError> {
    let cars = require(
        Router::new().route("/cars", get(list_cars)),
        state,
        &[READ_CARS],
    )?;
    let trucks = require(
        Router::new().route("/trucks", get(list_trucks)),
        state,
        &[READ_TRUCKS],
    )?;
    let vehicles = require(
        Router::new().route("/vehicles", get(list_vehicles)),
        state,
        &[READ_CARS, READ_TRUCKS],
    )?;

    Ok(Router::new()
        .route("/health", get(health))
        .merge(cars)
        .merge(trucks)
        .merge(vehicles))
}
