/*
 * Responsibility
 * - GET /vehicles (policies: read-cars + read-trucks)
 * - 2 つの policy を 1 route に掛けたときの不足 scope 集約の確認用
 */
use axum::Json;

use crate::api::v1::extractors::AuthCtxExtractor;
use crate::api::v1::handlers::{cars::CARS, trucks::TRUCKS};

pub async fn list_vehicles(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Vec<&'static str>> {
    tracing::debug!(client_id = ?ctx.client_id, scopes = ?ctx.scopes, "listing vehicles");
    Json(CARS.iter().chain(TRUCKS.iter()).copied().collect())
}
