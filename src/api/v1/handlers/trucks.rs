/*
 * Responsibility
 * - GET /trucks (policy: read-trucks)
 */
use axum::Json;

use crate::api::v1::extractors::AuthCtxExtractor;

pub const TRUCKS: [&str; 3] = ["Truck 1", "Truck 2", "Truck 3"];

pub async fn list_trucks(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Vec<&'static str>> {
    tracing::debug!(client_id = ?ctx.client_id, "listing trucks");
    Json(TRUCKS.to_vec())
}
