//! Repository port - 永続ストアの抽象化
//!
//! 本番ではリレーショナル DB（ORM）が正本になります。
//! ここではサービスが必要とする最小の操作（get / save / find）だけを定義します。

use std::fmt;

use async_trait::async_trait;

/// A stored entity with a stable key.
pub trait Record: Clone + Send + Sync + 'static {
    type Key: Ord + Clone + fmt::Display + Send + Sync + 'static;

    /// Human-readable entity name used in not-found errors ("user", "course").
    const KIND: &'static str;

    fn key(&self) -> Self::Key;
}

/// Error returned by the store itself (not by a missing row).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Row filter used by `Repository::find`.
pub type Filter<'a, E> = dyn Fn(&E) -> bool + Send + Sync + 'a;

/// Repository は 1 種類のエンティティの読み書きを提供
///
/// - `get` は行が無ければ `Ok(None)`（NotFound への変換はサービス側）
/// - `save` は upsert
/// - `save_unique` は一意制約つきの upsert（検査と書き込みを 1 操作で行う）
/// - `find` はキー順で返す
#[async_trait]
pub trait Repository<E: Record>: Send + Sync {
    async fn get(&self, key: &E::Key) -> Result<Option<E>, StoreError>;

    async fn save(&self, entity: E) -> Result<(), StoreError>;

    /// Upsert `entity` unless a row with a different key matches `clash`.
    /// Returns `Ok(false)` and stores nothing on a clash.
    async fn save_unique(&self, entity: E, clash: &Filter<'_, E>) -> Result<bool, StoreError>;

    async fn find(&self, filter: &Filter<'_, E>) -> Result<Vec<E>, StoreError>;
}
