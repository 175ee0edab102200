/*
 * Responsibility
 * - GET /cars (policy: read-cars)
 */
use axum::Json;

use crate::api::v1::extractors::AuthCtxExtractor;

pub const CARS: [&str; 3] = ["Car 1", "Car 2", "Car 3"];

pub async fn list_cars(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Vec<&'static str>> {
    tracing::debug!(client_id = ?ctx.client_id, "listing cars");
    Json(CARS.to_vec())
}
