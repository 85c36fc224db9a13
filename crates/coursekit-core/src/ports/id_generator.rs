//! IdGenerator port - ID 生成の抽象化
//!
//! API プロセスとワーカーの両方が ID を作るので、調整不要な ULID を使います。
//! テスト容易性のために trait として抽象化しています。
//!
//! # 実装
//! - **UlidGenerator**: Clock の時刻 + ランダム部

use ulid::Ulid;

use crate::domain::ids::{Id, IdMarker};
use crate::ports::Clock;

/// IdGenerator は分散システムで使える ID を生成
///
/// object-safe に保つため、trait 自体は ULID だけを返し、
/// 型付けは `dyn IdGenerator::generate` で行います。
pub trait IdGenerator: Send + Sync {
    fn next_ulid(&self) -> Ulid;
}

impl dyn IdGenerator {
    /// 型付き ID を生成（`let id: UserId = ids.generate();`）
    pub fn generate<M: IdMarker>(&self) -> Id<M> {
        Id::from_ulid(self.next_ulid())
    }
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// FixedClock を渡せば timestamp 部分が決定的になります。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}
