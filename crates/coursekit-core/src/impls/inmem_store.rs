//! InMemoryRepository - 開発用・テスト用のストア
//!
//! # 実装詳細
//! - `tokio::sync::RwLock<BTreeMap<Key, E>>` で 1 エンティティ種別を保持
//! - BTreeMap なので `find` は常にキー順（ULID なら作成順）
//! - ロックは各メソッド内で完結し、`.await` を跨がない
//! - `save_unique` は検査と挿入を同じ write ロックの中で行う

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{Filter, Record, Repository, StoreError};

pub struct InMemoryRepository<E: Record> {
    rows: RwLock<BTreeMap<E::Key, E>>,
}

impl<E: Record> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

impl<E: Record> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Record> Repository<E> for InMemoryRepository<E> {
    async fn get(&self, key: &E::Key) -> Result<Option<E>, StoreError> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn save(&self, entity: E) -> Result<(), StoreError> {
        self.rows.write().await.insert(entity.key(), entity);
        Ok(())
    }

    async fn save_unique(&self, entity: E, clash: &Filter<'_, E>) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        let key = entity.key();
        if rows.iter().any(|(k, row)| *k != key && clash(row)) {
            return Ok(false);
        }
        rows.insert(key, entity);
        Ok(true)
    }

    async fn find(&self, filter: &Filter<'_, E>) -> Result<Vec<E>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|e| filter(e)).cloned().collect())
    }
}
