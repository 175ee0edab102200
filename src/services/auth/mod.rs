/*
 * Responsibility
 * - access token の検証 (外部 IdP が発行した JWT)
 * - 検証結果を ClaimSet / AuthenticationFailure として authz 側に渡す
 */
pub mod access_jwt;
pub mod factory;
pub mod validator;

pub use access_jwt::AuthService;
pub use factory::build_auth_service;
pub use validator::{Authentication, TokenValidator, authenticate};
