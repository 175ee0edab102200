/*
 * Responsibility
 * - Router / route guard に紐づける共有コンテキスト (AppState)
 *   - validator: token 検証, policies: 認可 policy, challenge: 拒否時の hook
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::TokenValidator;
use crate::services::authz::{ChallengeEvents, ChallengeOptions, PolicyRegistry};

#[derive(Clone, Debug)]
pub struct AppState {
    pub validator: Arc<dyn TokenValidator>,
    pub policies: Arc<PolicyRegistry>,
    pub challenge: Arc<ChallengeEvents>,
    pub challenge_options: Arc<ChallengeOptions>,
    pub public_base_url: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        validator: Arc<dyn TokenValidator>,
        policies: PolicyRegistry,
        challenge: ChallengeEvents,
        challenge_options: ChallengeOptions,
    ) -> Self {
        Self {
            validator,
            policies: Arc::new(policies),
            challenge: Arc::new(challenge),
            challenge_options: Arc::new(challenge_options),
            public_base_url: None,
        }
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(Arc::from(url.into()));
        self
    }
}
