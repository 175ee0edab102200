/*
 * Responsibility
 * - scope ベースの認可 (requirement の評価 → 不足 scope の蓄積)
 * - 拒否時に WWW-Authenticate (RFC 6750) の bearer challenge を組み立てる
 * - HTTP / axum への依存は PendingResponse と middleware 側に閉じ込める
 */
pub mod challenge;
pub mod claims;
pub mod error;
pub mod events;
pub mod policy;
pub mod requirement;
pub mod scope_state;

pub use challenge::{
    AuthenticationFailure, BearerChallengeBuilder, ChallengeBuilder, ChallengeContext,
    ChallengeOptions, ChallengeResponse, HeaderOutcome, PendingResponse,
};
pub use claims::{Claim, ClaimSet};
pub use error::AuthzError;
pub use events::{ChallengeEvents, DefaultScope};
pub use policy::{AuthorizationContext, AuthorizationPolicy, AuthorizationResult, PolicyRegistry, authorize};
pub use requirement::{Evaluator, Outcome, ScopeRequirement};
pub use scope_state::RequestScopeState;
