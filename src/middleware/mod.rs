/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: route ごとの認証 + scope 認可 + bearer challenge
 * - http: request id / trace / body limit / timeout
 */
pub mod auth;
pub mod http;
