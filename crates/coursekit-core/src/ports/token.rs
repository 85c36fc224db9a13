//! TokenIssuer port - 一回限りのトークン（メール確認・パスワードリセット）
//!
//! 本番では認証プロバイダのトークンジェネレータが実装になります。
//!
//! # 重複実行との関係
//! タスクは at-least-once で配送されるため、確認メールが 2 通届くことがあります。
//! `issue` は以前のトークンを無効にしないので、どちらのリンクも有効なままです。
//! `revoke` で用途ごとに全て無効化します。

use crate::domain::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenPurpose {
    EmailConfirmation,
    PasswordReset,
}

pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: UserId, purpose: TokenPurpose) -> String;

    fn verify(&self, user: UserId, purpose: TokenPurpose, token: &str) -> bool;

    fn revoke(&self, user: UserId, purpose: TokenPurpose);
}
