//! Shape trait - エンティティの宣言済みフィールドと描画
//!
//! # 設計
//! - `FIELDS` はエンティティ型ごとの静的なフィールド登録簿（出力順）
//! - `field()` は 1 フィールドを素の JSON 値に変換する
//! - 関連エンティティは `Projection` 経由で同じ仕組みを再帰的に使う
//! - 計算フィールド（署名付き URL など）は描画時に `SerializeContext` から導出し、保存しない

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use super::selector::FieldMask;

/// An entity type with a statically declared attribute registry.
pub trait Shape {
    /// Declared attribute names, in output order.
    const FIELDS: &'static [&'static str];

    /// Render one declared attribute. Only called with names from `FIELDS`.
    fn field(&self, name: &str, p: &Projection<'_>) -> Value;

    /// Default mask for a related entity when the caller gave none.
    fn nested_mask(_relation: &str) -> Option<FieldMask> {
        None
    }
}

/// Per-request rendering inputs that are not part of any entity.
#[derive(Debug, Clone)]
pub struct SerializeContext {
    media_base_url: String,
}

impl SerializeContext {
    pub fn new(media_base_url: impl Into<String>) -> Self {
        Self {
            media_base_url: media_base_url.into(),
        }
    }

    /// Absolute URL for a stored file reference (`uploads/avatars/a.jpg`).
    pub fn media_url(&self, file_ref: &str) -> String {
        if file_ref.starts_with("http://") || file_ref.starts_with("https://") {
            return file_ref.to_string();
        }
        format!(
            "{}/media/{}",
            self.media_base_url.trim().trim_end_matches('/'),
            file_ref.trim_start_matches('/')
        )
    }
}

/// Handed to `Shape::field` so relations can be rendered with the right mask.
pub struct Projection<'a> {
    mask: &'a FieldMask,
    ctx: &'a SerializeContext,
    defaults: fn(&str) -> Option<FieldMask>,
}

impl<'a> Projection<'a> {
    pub(crate) fn new(
        mask: &'a FieldMask,
        ctx: &'a SerializeContext,
        defaults: fn(&str) -> Option<FieldMask>,
    ) -> Self {
        Self {
            mask,
            ctx,
            defaults,
        }
    }

    pub fn ctx(&self) -> &SerializeContext {
        self.ctx
    }

    /// Caller override, then the parent's default, then every field.
    pub fn mask_for(&self, relation: &str) -> FieldMask {
        self.mask
            .nested(relation)
            .cloned()
            .or_else(|| (self.defaults)(relation))
            .unwrap_or_default()
    }

    /// Render a single related entity.
    pub fn one<E: Shape>(&self, relation: &str, entity: &E) -> Value {
        Value::Object(self.mask_for(relation).serialize(entity, self.ctx))
    }

    /// Render a to-many relation.
    pub fn many<'e, E, I>(&self, relation: &str, entities: I) -> Value
    where
        E: Shape + 'e,
        I: IntoIterator<Item = &'e E>,
    {
        Value::Array(self.mask_for(relation).serialize_many(entities, self.ctx))
    }

    /// Computed URL for an optional file reference; `""` when unset.
    pub fn file_url(&self, file_ref: Option<&str>) -> Value {
        Value::String(file_ref.map(|f| self.ctx.media_url(f)).unwrap_or_default())
    }
}

/// Timestamps are rendered as ISO-8601 strings in UTC.
pub fn iso8601(at: &DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

pub fn iso8601_opt(at: Option<&DateTime<Utc>>) -> Value {
    at.map_or(Value::Null, iso8601)
}

/// Durations render as `HH:MM:SS` (days fold into hours).
pub fn hms(total_secs: u64) -> Value {
    let (h, m, s) = (total_secs / 3600, (total_secs / 60) % 60, total_secs % 60);
    Value::String(format!("{h:02}:{m:02}:{s:02}"))
}
