/*
 * Responsibility
 * - Handler から見える「認可済みコンテキスト」の型
 * - middleware が ClaimSet から作って request extensions に格納し、handler はこの型だけを受け取る
 */

use crate::services::authz::ClaimSet;

/// 認可を通過したリクエストに付与されるコンテキスト
///
/// - `subject` はユーザー token のみ (client credentials では None)
/// - `client_id` は token を取得したクライアント
/// - `scopes` は token が持つ scope すべて (route が要求したものに限らない)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCtx {
    pub subject: Option<String>,
    pub client_id: Option<String>,
    pub scopes: Vec<String>,
}

impl AuthCtx {
    pub fn from_claims(claims: &ClaimSet) -> Self {
        Self {
            subject: claims.first("sub").map(str::to_string),
            client_id: claims.first("client_id").map(str::to_string),
            scopes: claims.scopes().map(str::to_string).collect(),
        }
    }
}
