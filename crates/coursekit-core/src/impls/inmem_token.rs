//! InMemoryTokenIssuer - ランダムな一回限りトークン

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::domain::UserId;
use crate::ports::{TokenIssuer, TokenPurpose};

#[derive(Debug, Default)]
pub struct InMemoryTokenIssuer {
    live: Mutex<HashMap<(UserId, TokenPurpose), HashSet<String>>>,
}

impl InMemoryTokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenIssuer for InMemoryTokenIssuer {
    fn issue(&self, user: UserId, purpose: TokenPurpose) -> String {
        let token = format!("{:032x}", rand::random::<u128>());
        self.live
            .lock()
            .entry((user, purpose))
            .or_default()
            .insert(token.clone());
        token
    }

    fn verify(&self, user: UserId, purpose: TokenPurpose, token: &str) -> bool {
        self.live
            .lock()
            .get(&(user, purpose))
            .is_some_and(|tokens| tokens.contains(token))
    }

    fn revoke(&self, user: UserId, purpose: TokenPurpose) {
        self.live.lock().remove(&(user, purpose));
    }
}
